use serde::{Deserialize, Serialize};

/// Kind of documented construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Class,
    Method,
    Property,
}

/// One documented construct.
///
/// Absent optional fields are left out of the serialized record rather than
/// written as `null` or `""`; the renderer tells "no docs" apart from "empty
/// docs" by field presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocEntry {
    pub kind: EntryKind,
    /// `Class.member` for class members
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typestr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<ArgEntry>>,
    #[serde(rename = "retType", skip_serializing_if = "Option::is_none")]
    pub ret_type: Option<String>,
    #[serde(rename = "sourceUrl", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// One parameter of a method entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typestr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstr: Option<String>,
}

impl DocEntry {
    /// Entry with only kind and name set
    pub fn new(kind: EntryKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            typestr: None,
            docstr: None,
            args: None,
            ret_type: None,
            source_url: None,
        }
    }
}
