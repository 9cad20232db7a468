use std::collections::BTreeSet;

use crate::{
    catalog::CatalogKind,
    error::{Error, Result},
};

/// A catalog entry identified by its canonical id (national dex number for
/// species, the game's own id for moves, types and items).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entry {
    pub kind: CatalogKind,
    pub id: u16,
}

impl Entry {
    pub fn species(id: u16) -> Self {
        Entry {
            kind: CatalogKind::Species,
            id,
        }
    }

    pub fn move_id(id: u16) -> Self {
        Entry {
            kind: CatalogKind::Move,
            id,
        }
    }

    pub fn element_type(id: u16) -> Self {
        Entry {
            kind: CatalogKind::Type,
            id,
        }
    }

    pub fn item(id: u16) -> Self {
        Entry {
            kind: CatalogKind::Item,
            id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Int(u64),
    Bool(bool),
    Bytes(Vec<u8>),
    Text(String),
    /// A named constant from a fixed table, like a badge or a text speed.
    Symbol(&'static str),
    Entry(Entry),
    /// Sentinel for a byte with no catalog mapping.
    None,
    /// 1-based indices of the set bits in a bitmap.
    Set(BTreeSet<u16>),
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::Bytes(_) => "byte string",
            Value::Text(_) => "text",
            Value::Symbol(_) => "symbol",
            Value::Entry(_) => "catalog entry",
            Value::None => "none",
            Value::Set(_) => "set",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_entry(&self) -> Option<Entry> {
        match self {
            Value::Entry(entry) => Some(*entry),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<u16>> {
        match self {
            Value::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub(crate) fn expect_int(&self, field: &str) -> Result<u64> {
        self.as_int().ok_or_else(|| mismatch(field, "integer", self))
    }

    pub(crate) fn expect_bool(&self, field: &str) -> Result<bool> {
        self.as_bool().ok_or_else(|| mismatch(field, "boolean", self))
    }

    pub(crate) fn expect_bytes(&self, field: &str) -> Result<&[u8]> {
        self.as_bytes()
            .ok_or_else(|| mismatch(field, "byte string", self))
    }

    pub(crate) fn expect_text(&self, field: &str) -> Result<&str> {
        self.as_text().ok_or_else(|| mismatch(field, "text", self))
    }

    pub(crate) fn expect_set(&self, field: &str) -> Result<&BTreeSet<u16>> {
        self.as_set().ok_or_else(|| mismatch(field, "set", self))
    }

    pub(crate) fn expect_list(&self, field: &str) -> Result<&[Value]> {
        self.as_list().ok_or_else(|| mismatch(field, "list", self))
    }

    pub(crate) fn expect_record(&self, field: &str) -> Result<&Record> {
        self.as_record().ok_or_else(|| mismatch(field, "record", self))
    }
}

fn mismatch(field: &str, expected: &'static str, found: &Value) -> Error {
    log::error!(
        "Field {field} expected a {expected} value, found a {}",
        found.kind_name()
    );
    Error::TypeMismatch {
        field: field.to_owned(),
        expected,
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Entry> for Value {
    fn from(value: Entry) -> Self {
        Value::Entry(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

/// Field name -> value, kept in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Replaces the value of an existing field in place, or appends a new one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(field, _)| field == name)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn require(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| {
            log::error!("Record is missing field {name}");
            Error::MissingField(name.to_owned())
        })
    }

    pub fn int(&self, name: &str) -> Result<u64> {
        self.require(name)?.expect_int(name)
    }

    pub fn text(&self, name: &str) -> Result<&str> {
        self.require(name)?.expect_text(name)
    }

    pub fn list(&self, name: &str) -> Result<&[Value]> {
        self.require(name)?.expect_list(name)
    }

    pub fn record(&self, name: &str) -> Result<&Record> {
        self.require(name)?.expect_record(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Record::new(), |record, (name, value)| record.with(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_declaration_order() {
        let mut record = Record::new().with("a", 1u64).with("b", "two");
        assert_eq!(record.insert("a", 3u64), Some(Value::Int(1)));
        let names: Vec<_> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(record.int("a").unwrap(), 3);
    }

    #[test]
    fn typed_access_reports_mismatch() {
        let record = Record::new().with("name", "RED");
        assert_eq!(record.text("name").unwrap(), "RED");
        assert!(matches!(record.int("name"), Err(Error::TypeMismatch { .. })));
        assert!(matches!(record.int("money"), Err(Error::MissingField(_))));
    }
}
