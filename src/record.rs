//! Record descriptors.
//!
//! A record is an immutable value type bound to a table. Instead of
//! reflecting over the type at runtime, every record supplies a
//! [`RecordDescriptor`]: its simple name, its members with their host kinds,
//! one accessor per member and one or more constructors. `#[derive(Record)]`
//! generates the descriptor and one [`Accessor`] const per field.
//!
//! ```rust
//! use rowbind::Record;
//!
//! #[derive(Debug, Clone, PartialEq, Record)]
//! pub struct Person {
//!     pub id: i32,
//!     pub name: String,
//!     pub email: Option<String>,
//! }
//!
//! let descriptor = Person::descriptor();
//! assert_eq!(descriptor.name(), "Person");
//! assert_eq!(descriptor.fields().len(), 3);
//! assert_eq!(Person::EMAIL.name(), "email");
//! ```

use crate::error::{Result, RowbindError};
use crate::value::{EnumEncoding, HostKind, Value, ValueType};
use std::fmt;
use std::marker::PhantomData;

/// A value type that can be bound to a table.
pub trait Record: Sized + Send + Sync + 'static {
    fn descriptor() -> RecordDescriptor<Self>;

    /// Simple type name used for table matching and binding caching.
    fn record_name() -> &'static str {
        Self::descriptor().name()
    }
}

/// A declared member of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: HostKind,
    pub nullable: bool,
}

impl FieldDescriptor {
    pub fn of<T: ValueType>(name: &'static str) -> Self {
        Self {
            name,
            kind: T::host_kind(),
            nullable: T::nullable(),
        }
    }

    /// Store an enum member by declared position rather than by name.
    pub fn ordinal(mut self) -> Self {
        self.kind = self.kind.with_enum_encoding(EnumEncoding::Ordinal);
        self
    }
}

/// Reads one member of a record as a [`Value`].
pub struct AccessorFn<R> {
    pub name: &'static str,
    pub get: fn(&R) -> Value,
}

impl<R> Clone for AccessorFn<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for AccessorFn<R> {}

impl<R> fmt::Debug for AccessorFn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorFn").field("name", &self.name).finish()
    }
}

/// Builds a record from values given in `params` order.
pub struct Constructor<R> {
    pub params: Vec<&'static str>,
    pub build: fn(Vec<Value>) -> Result<R>,
}

impl<R> Clone for Constructor<R> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            build: self.build,
        }
    }
}

impl<R> fmt::Debug for Constructor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor").field("params", &self.params).finish()
    }
}

pub struct RecordDescriptor<R> {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    accessors: Vec<AccessorFn<R>>,
    constructors: Vec<Constructor<R>>,
}

impl<R> RecordDescriptor<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            accessors: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn accessor(mut self, name: &'static str, get: fn(&R) -> Value) -> Self {
        self.accessors.push(AccessorFn { name, get });
        self
    }

    pub fn constructor(mut self, params: &[&'static str], build: fn(Vec<Value>) -> Result<R>) -> Self {
        self.constructors.push(Constructor {
            params: params.to_vec(),
            build,
        });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn accessors(&self) -> &[AccessorFn<R>] {
        &self.accessors
    }

    pub fn constructors(&self) -> &[Constructor<R>] {
        &self.constructors
    }

    pub fn member_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn accessor_named(&self, name: &str) -> Option<&AccessorFn<R>> {
        self.accessors.iter().find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

impl<R> fmt::Debug for RecordDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("constructors", &self.constructors)
            .finish()
    }
}

/// Positional constructor arguments, consumed in parameter order.
pub struct ConstructorArgs {
    record: &'static str,
    values: std::vec::IntoIter<Value>,
}

impl ConstructorArgs {
    pub fn new(record: &'static str, values: Vec<Value>) -> Self {
        Self {
            record,
            values: values.into_iter(),
        }
    }

    pub fn next<T: ValueType>(&mut self, field: &str) -> Result<T> {
        let value = self.values.next().ok_or_else(|| {
            RowbindError::mapping(format!("{}: no value supplied for `{field}`", self.record))
        })?;
        T::from_value(value)
            .map_err(|err| RowbindError::type_error(format!("{}.{field}: {err}", self.record)))
    }
}

/// A self-describing accessor: a member name plus the function reading it.
///
/// `#[derive(Record)]` emits one per field as an associated const, e.g.
/// `Person::EMAIL`, which the query DSL resolves back to a column.
pub struct Accessor<R, U> {
    name: &'static str,
    get: fn(&R) -> U,
    _record: PhantomData<fn(&R) -> U>,
}

impl<R, U> Accessor<R, U> {
    pub const fn new(name: &'static str, get: fn(&R) -> U) -> Self {
        Self {
            name,
            get,
            _record: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, record: &R) -> U {
        (self.get)(record)
    }
}

impl<R, U> Clone for Accessor<R, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, U> Copy for Accessor<R, U> {}

impl<R, U> fmt::Debug for Accessor<R, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Accessor").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        label: Option<String>,
    }

    fn build_point(values: Vec<Value>) -> Result<Point> {
        let mut args = ConstructorArgs::new("Point", values);
        Ok(Point {
            x: args.next("x")?,
            label: args.next("label")?,
        })
    }

    fn descriptor() -> RecordDescriptor<Point> {
        RecordDescriptor::<Point>::new("Point")
            .field(FieldDescriptor::of::<i32>("x"))
            .field(FieldDescriptor::of::<Option<String>>("label"))
            .accessor("x", |p| Value::Int(p.x))
            .accessor("label", |p| p.label.clone().into_value())
            .constructor(&["x", "label"], build_point)
    }

    #[test]
    fn lookups_ignore_case() {
        let d = descriptor();
        assert_eq!(d.field_named("LABEL").map(|f| f.nullable), Some(true));
        assert!(d.accessor_named("X").is_some());
        assert!(d.accessor_named("y").is_none());
    }

    #[test]
    fn constructor_consumes_values_in_order() {
        let d = descriptor();
        let build = d.constructors()[0].build;
        let point = build(vec![Value::Int(3), Value::Null]).unwrap();
        assert_eq!(point, Point { x: 3, label: None });
    }

    #[test]
    fn null_for_required_member_names_the_field() {
        let err = build_point(vec![Value::Null, Value::Null]).unwrap_err();
        assert!(err.is_type());
        assert!(err.to_string().contains("Point.x"));
    }

    #[test]
    fn missing_argument_is_a_mapping_error() {
        assert!(build_point(vec![Value::Int(1)]).unwrap_err().is_mapping());
    }

    #[test]
    fn accessor_reads_member() {
        const X: Accessor<Point, i32> = Accessor::new("x", |p| p.x);
        let p = Point { x: 9, label: None };
        assert_eq!(X.get(&p), 9);
        assert_eq!(X.name(), "x");
    }
}
