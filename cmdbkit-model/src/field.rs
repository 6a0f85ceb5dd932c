//! Field declarations and values.
//!
//! A [`FieldDef`] lives on a type and declares what a field is; a
//! [`FieldEntry`] lives on an object and carries the stored value. The value
//! is a tagged variant ([`FieldValue`]) — its interpretation (plain scalar vs
//! reference to another object) is decided by the owning type's declaration
//! at the read boundary, never by the value alone.

use cmdbkit_types::PublicId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared kind of a type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Password,
    Textarea,
    Date,
    Checkbox,
    Select,
    Radio,
    Ref,
    Location,
    RefSectionField,
}

impl FieldKind {
    /// Whether a field of this kind points at another object and is expanded
    /// recursively during rendering.
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Ref | Self::Location)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Password => "password",
            Self::Textarea => "textarea",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Ref => "ref",
            Self::Location => "location",
            Self::RefSectionField => "ref-section-field",
        };
        write!(f, "{s}")
    }
}

/// A stored field value.
///
/// The JSON form is the bare scalar (`"srv01"`, `42`, `true`, `null`) so
/// stored documents stay hand-readable and import-friendly. Whether an
/// integer is a number or a reference is resolved through the schema via
/// [`FieldValue::as_reference`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Interprets this value as a public id, the way reference fields store
    /// their target: either an integer or its decimal string form.
    #[must_use]
    pub fn as_reference(&self) -> Option<PublicId> {
        match self {
            Self::Int(i) if *i >= 0 => Some(PublicId::new(*i as u64)),
            Self::Text(s) => PublicId::parse(s).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// True for `Null` and for empty text — the two forms an unset field
    /// takes in stored documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<PublicId> for FieldValue {
    fn from(id: PublicId) -> Self {
        Self::Int(id.value() as i64)
    }
}

/// A named value on an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: String,
    #[serde(default)]
    pub value: FieldValue,
}

impl FieldEntry {
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Summary spec for one referenced type, declared on a `ref` field.
///
/// Controls the one-line label shown for targets of that type. When `line`
/// is set it is a `{}`-positional template over `fields`; otherwise the
/// resolved values are `" | "`-joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefSummary {
    pub type_id: PublicId,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
}

impl RefSummary {
    /// Builds the summary line from the resolved field values.
    ///
    /// With a `line` template the values are `{}`-interpolated positionally
    /// and the count must match; without one they are `" | "`-joined.
    pub fn fill_line(&self, values: &[&str]) -> crate::ModelResult<String> {
        match &self.line {
            Some(template) => crate::type_schema::fill_template(template, values),
            None => Ok(values.join(" | ")),
        }
    }
}

/// Points a reference-section at fields of a referenced object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionReference {
    pub type_id: PublicId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// A field declaration on a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub kind: FieldKind,
    pub name: String,
    pub label: String,
    /// Type public ids a `ref` field may point at. Empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ref_types: Vec<PublicId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summaries: Vec<RefSummary>,
    /// Present on `ref-section-field` fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<SectionReference>,
}

impl FieldDef {
    fn simple(kind: FieldKind, name: &str, label: &str) -> Self {
        Self {
            kind,
            name: name.into(),
            label: label.into(),
            ref_types: Vec::new(),
            summaries: Vec::new(),
            reference: None,
        }
    }

    /// Shorthand for a text field.
    pub fn text(name: &str, label: &str) -> Self {
        Self::simple(FieldKind::Text, name, label)
    }

    /// Shorthand for a date field.
    pub fn date(name: &str, label: &str) -> Self {
        Self::simple(FieldKind::Date, name, label)
    }

    /// Shorthand for a checkbox field.
    pub fn checkbox(name: &str, label: &str) -> Self {
        Self::simple(FieldKind::Checkbox, name, label)
    }

    /// Shorthand for a select field.
    pub fn select(name: &str, label: &str) -> Self {
        Self::simple(FieldKind::Select, name, label)
    }

    /// Shorthand for a reference field restricted to the given target types.
    pub fn reference(name: &str, label: &str, ref_types: Vec<PublicId>) -> Self {
        Self {
            ref_types,
            ..Self::simple(FieldKind::Ref, name, label)
        }
    }

    /// Shorthand for a location field.
    pub fn location(name: &str, label: &str) -> Self {
        Self::simple(FieldKind::Location, name, label)
    }

    /// Shorthand for a reference-section field.
    pub fn ref_section(name: &str, label: &str, reference: SectionReference) -> Self {
        Self {
            reference: Some(reference),
            ..Self::simple(FieldKind::RefSectionField, name, label)
        }
    }

    /// Summary spec declared for the given referenced type, if any.
    #[must_use]
    pub fn summary_for(&self, type_id: PublicId) -> Option<&RefSummary> {
        self.summaries.iter().find(|s| s.type_id == type_id)
    }
}
