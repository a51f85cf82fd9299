//! One-way value converters between host kinds.
//!
//! A [`Converter`] is picked once per column when a binding is built (see
//! [`converter_for`]) and then applied to every value crossing that column.
//! Every converter maps `Value::Null` to `Value::Null`.

use crate::error::{Result, RowbindError};
use crate::value::{EnumDescriptor, EnumEncoding, EnumValue, HostKind, Value};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Signature of an explicitly registered conversion.
pub type ConvertFn = dyn Fn(Value) -> Result<Value> + Send + Sync;

#[derive(Clone)]
pub enum Converter {
    Identity,
    /// Widening or range-checked narrowing between numeric kinds.
    Numeric { to: HostKind },
    EnumToName,
    NameToEnum(&'static EnumDescriptor),
    EnumToOrdinal { to: HostKind },
    OrdinalToEnum(&'static EnumDescriptor),
    TextToChar,
    ToText,
    Custom { label: Arc<str>, convert: Arc<ConvertFn> },
}

impl Converter {
    pub fn convert(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self {
            Converter::Identity => Ok(value),
            Converter::Numeric { to } => convert_numeric(value, *to),
            Converter::EnumToName => match value {
                Value::Enum(v) => Ok(Value::Text(v.name.to_string())),
                other => Err(unexpected("enum", &other)),
            },
            Converter::NameToEnum(descriptor) => match value {
                Value::Text(name) => {
                    let ordinal = descriptor.ordinal_of(&name).ok_or_else(|| {
                        RowbindError::type_error(format!(
                            "`{name}` is not a variant of {}",
                            descriptor.name
                        ))
                    })?;
                    enum_at(descriptor, ordinal)
                }
                other => Err(unexpected("text", &other)),
            },
            Converter::EnumToOrdinal { to } => match value {
                Value::Enum(v) => convert_numeric(Value::BigInt(i64::from(v.ordinal)), *to),
                other => Err(unexpected("enum", &other)),
            },
            Converter::OrdinalToEnum(descriptor) => {
                let ordinal = value
                    .as_i64()
                    .and_then(|v| u32::try_from(v).ok())
                    .ok_or_else(|| unexpected("non-negative integer", &value))?;
                enum_at(descriptor, ordinal)
            }
            Converter::TextToChar => match value {
                Value::Text(text) => {
                    let mut chars = text.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Ok(Value::Char(c)),
                        _ => Err(RowbindError::type_error(format!(
                            "`{text}` is not exactly one character"
                        ))),
                    }
                }
                other => Err(unexpected("text", &other)),
            },
            Converter::ToText => Ok(match value {
                Value::Text(text) => Value::Text(text),
                other => Value::Text(other.to_string()),
            }),
            Converter::Custom { convert, .. } => convert(value),
        }
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Converter::Identity => f.write_str("Identity"),
            Converter::Numeric { to } => write!(f, "Numeric(-> {to})"),
            Converter::EnumToName => f.write_str("EnumToName"),
            Converter::NameToEnum(d) => write!(f, "NameToEnum({})", d.name),
            Converter::EnumToOrdinal { to } => write!(f, "EnumToOrdinal(-> {to})"),
            Converter::OrdinalToEnum(d) => write!(f, "OrdinalToEnum({})", d.name),
            Converter::TextToChar => f.write_str("TextToChar"),
            Converter::ToText => f.write_str("ToText"),
            Converter::Custom { label, .. } => write!(f, "Custom({label})"),
        }
    }
}

fn unexpected(expected: &str, actual: &Value) -> RowbindError {
    RowbindError::type_error(format!(
        "expected {expected} value, got {}",
        actual.variant_name()
    ))
}

fn enum_at(descriptor: &'static EnumDescriptor, ordinal: u32) -> Result<Value> {
    match descriptor.name_of(ordinal) {
        Some(name) => Ok(Value::Enum(EnumValue { ordinal, name })),
        None => Err(RowbindError::type_error(format!(
            "{} has no variant at position {ordinal}",
            descriptor.name
        ))),
    }
}

fn is_numeric(kind: HostKind) -> bool {
    kind.is_integer() || kind.is_floating() || kind == HostKind::Decimal
}

/// Pairs the numeric converter accepts. Floating and decimal values never
/// narrow into integers.
fn numeric_pair(input: HostKind, output: HostKind) -> bool {
    if !is_numeric(input) || !is_numeric(output) {
        return false;
    }
    !(output.is_integer() && !input.is_integer())
}

fn overflow(value: &Value, to: HostKind) -> RowbindError {
    RowbindError::type_error(format!("{value} does not fit in {to}"))
}

fn convert_numeric(value: Value, to: HostKind) -> Result<Value> {
    if let Some(int) = value.as_i64() {
        return match to {
            HostKind::SmallInt => i16::try_from(int)
                .map(Value::SmallInt)
                .map_err(|_| overflow(&value, to)),
            HostKind::Int => i32::try_from(int)
                .map(Value::Int)
                .map_err(|_| overflow(&value, to)),
            HostKind::BigInt => Ok(Value::BigInt(int)),
            HostKind::Float => Ok(Value::Float(int as f32)),
            HostKind::Double => Ok(Value::Double(int as f64)),
            HostKind::Decimal => Ok(Value::Decimal(Decimal::from(int))),
            _ => Err(unexpected("numeric target", &value)),
        };
    }
    let double = match &value {
        Value::Float(v) => f64::from(*v),
        Value::Double(v) => *v,
        Value::Decimal(v) => v.to_f64().ok_or_else(|| overflow(&value, to))?,
        other => return Err(unexpected("numeric", other)),
    };
    match to {
        HostKind::Float => {
            if double.is_finite() && double.abs() > f64::from(f32::MAX) {
                Err(overflow(&value, to))
            } else {
                Ok(Value::Float(double as f32))
            }
        }
        HostKind::Double => Ok(Value::Double(double)),
        HostKind::Decimal => match value {
            Value::Decimal(d) => Ok(Value::Decimal(d)),
            _ => Decimal::from_f64(double)
                .map(Value::Decimal)
                .ok_or_else(|| overflow(&value, to)),
        },
        _ => Err(overflow(&value, to)),
    }
}

/// Explicitly registered converters, consulted after the built-in rules.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<(HostKind, HostKind), Converter>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, input: HostKind, output: HostKind, label: &str, convert: F)
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.converters.insert(
            (input, output),
            Converter::Custom {
                label: Arc::from(label),
                convert: Arc::new(convert),
            },
        );
    }

    pub fn get(&self, input: HostKind, output: HostKind) -> Option<&Converter> {
        self.converters.get(&(input, output))
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.converters.len())
            .finish()
    }
}

/// Resolve the converter turning `input` values into `output` values.
pub fn converter_for(
    input: HostKind,
    output: HostKind,
    registry: &ConverterRegistry,
) -> Result<Converter> {
    if input == output {
        return Ok(Converter::Identity);
    }
    if numeric_pair(input, output) {
        return Ok(Converter::Numeric { to: output });
    }
    match (input, output) {
        (HostKind::Enum(_), HostKind::Text) => return Ok(Converter::EnumToName),
        (HostKind::Text, HostKind::Enum(kind)) => return Ok(Converter::NameToEnum(kind.descriptor)),
        (HostKind::Enum(kind), to) if to.is_integer() => {
            return if kind.encoding == EnumEncoding::Ordinal {
                Ok(Converter::EnumToOrdinal { to })
            } else {
                Err(ordinal_not_enabled(kind.descriptor))
            };
        }
        (from, HostKind::Enum(kind)) if from.is_integer() => {
            return if kind.encoding == EnumEncoding::Ordinal {
                Ok(Converter::OrdinalToEnum(kind.descriptor))
            } else {
                Err(ordinal_not_enabled(kind.descriptor))
            };
        }
        (HostKind::Text, HostKind::Char) => return Ok(Converter::TextToChar),
        (_, HostKind::Text) => return Ok(Converter::ToText),
        _ => {}
    }
    if let Some(custom) = registry.get(input, output) {
        return Ok(custom.clone());
    }
    Err(RowbindError::type_error(format!(
        "no converter for this pair: {input} -> {output}"
    )))
}

fn ordinal_not_enabled(descriptor: &EnumDescriptor) -> RowbindError {
    RowbindError::type_error(format!(
        "{} is stored in an integer column; mark the field #[rowbind(ordinal)] to store it by position",
        descriptor.name
    ))
}
