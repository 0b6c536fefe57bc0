use std::sync::Arc;

use serde::{
    ser::{SerializeMap, SerializeStruct},
    Serialize, Serializer,
};

use crate::token::Terminal;

/// Abstract syntax produced from a [`crate::ParseTree`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Ast {
    Terminal(Terminal),
    List(Vec<Ast>),
    Record(Record),
}

/// A named record, a field whose source child was missing or empty is `None`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Record {
    pub name: Arc<str>,
    pub fields: Vec<(Arc<str>, Option<Ast>)>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Ast> {
        self.fields
            .iter()
            .find(|(name, _)| name.as_ref() == field)
            .and_then(|(_, value)| value.as_ref())
    }
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name.as_ref() == field)
    }
}

impl Ast {
    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Ast::Terminal(terminal) => Some(terminal),
            _ => None,
        }
    }
    pub fn as_list(&self) -> Option<&[Ast]> {
        match self {
            Ast::List(items) => Some(items),
            _ => None,
        }
    }
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Ast::Record(record) => Some(record),
            _ => None,
        }
    }
    /// Name of the record, `None` for terminals and lists.
    pub fn name(&self) -> Option<&str> {
        self.as_record().map(|r| r.name.as_ref())
    }
    pub fn field(&self, field: &str) -> Option<&Ast> {
        self.as_record()?.get(field)
    }
    /// Text of the terminal.
    pub fn text(&self) -> Option<&str> {
        self.as_terminal().map(|t| t.text.as_str())
    }
}

impl Serialize for Ast {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ast::Terminal(terminal) => terminal.serialize(serializer),
            Ast::List(items) => items.serialize(serializer),
            Ast::Record(record) => record.serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("Record", 2)?;
        record.serialize_field("name", &*self.name)?;
        record.serialize_field("attributes", &Attributes(&self.fields))?;
        record.end()
    }
}

/// Record fields as an ordered map.
struct Attributes<'a>(&'a [(Arc<str>, Option<Ast>)]);

impl Serialize for Attributes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(&**name, value)?;
        }
        map.end()
    }
}
