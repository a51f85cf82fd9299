//! Host-side scalar kinds.
//!
//! A [`HostKind`] describes the shape of a record member as the application
//! sees it. Converters are resolved between pairs of kinds.

use std::fmt;

/// Static description of a fieldless enum used as a record member.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EnumDescriptor {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

impl EnumDescriptor {
    pub fn ordinal_of(&self, name: &str) -> Option<u32> {
        self.variants
            .iter()
            .position(|variant| *variant == name)
            .map(|pos| pos as u32)
    }

    pub fn name_of(&self, ordinal: u32) -> Option<&'static str> {
        self.variants.get(ordinal as usize).copied()
    }
}

/// How an enum member is written to an integer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumEncoding {
    /// Variant name; the only encoding allowed by default.
    #[default]
    Name,
    /// Declared variant position. Breaks when variants are reordered.
    Ordinal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumKind {
    pub descriptor: &'static EnumDescriptor,
    pub encoding: EnumEncoding,
}

/// Scalar kinds a record member may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKind {
    Bool,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal,
    Char,
    Text,
    Date,
    Time,
    DateTime,
    Enum(EnumKind),
}

impl HostKind {
    pub const fn enumeration(descriptor: &'static EnumDescriptor) -> Self {
        HostKind::Enum(EnumKind {
            descriptor,
            encoding: EnumEncoding::Name,
        })
    }

    /// Switch the encoding of an enum kind; other kinds are returned as is.
    pub fn with_enum_encoding(self, encoding: EnumEncoding) -> Self {
        match self {
            HostKind::Enum(kind) => HostKind::Enum(EnumKind { encoding, ..kind }),
            other => other,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, HostKind::SmallInt | HostKind::Int | HostKind::BigInt)
    }

    pub fn is_floating(self) -> bool {
        matches!(self, HostKind::Float | HostKind::Double)
    }

    pub fn name(self) -> &'static str {
        match self {
            HostKind::Bool => "bool",
            HostKind::SmallInt => "i16",
            HostKind::Int => "i32",
            HostKind::BigInt => "i64",
            HostKind::Float => "f32",
            HostKind::Double => "f64",
            HostKind::Decimal => "Decimal",
            HostKind::Char => "char",
            HostKind::Text => "String",
            HostKind::Date => "NaiveDate",
            HostKind::Time => "NaiveTime",
            HostKind::DateTime => "NaiveDateTime",
            HostKind::Enum(kind) => kind.descriptor.name,
        }
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
