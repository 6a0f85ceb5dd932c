//! The runtime-authored type document.
//!
//! A [`TypeSchema`] defines a class of CMDB objects: its ordered fields, how
//! they are grouped into sections, which fields make up the one-line summary
//! label, external URL templates, and the ACL policy. Schemas are authored
//! at runtime and mutated only as whole documents, never partially.

use crate::field::{FieldDef, FieldKind, SectionReference};
use crate::{ModelError, ModelResult, TypeAcl};
use cmdbkit_types::{PublicId, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Field names every object carries implicitly; section and summary specs
/// may name them without declaring a field.
const CONVENTION_FIELDS: [&str; 2] = ["public_id", "object_id"];

/// A named grouping of fields in the type's render layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Section {
    /// A plain grouping of declared field names.
    Fields {
        name: String,
        label: String,
        fields: Vec<String>,
    },
    /// A section whose content is pulled from a referenced object.
    Reference {
        name: String,
        label: String,
        reference: SectionReference,
    },
}

impl Section {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Fields { name, .. } | Self::Reference { name, .. } => name,
        }
    }
}

/// External URL template attached to a type.
///
/// `href` uses `{}`-positional placeholders filled from the object's values
/// of `fields`, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub href: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl ExternalLink {
    /// Fills the href template with the given values.
    ///
    /// Fails with [`ModelError::TemplateFill`] when the number of values
    /// does not match the number of `{}` placeholders.
    pub fn fill_href(&self, values: &[&str]) -> ModelResult<String> {
        fill_template(&self.href, values)
    }

    /// Number of `{}` placeholders in the href.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.href.matches("{}").count()
    }
}

/// Fills a `{}`-positional template, checking the placeholder count.
pub(crate) fn fill_template(template: &str, values: &[&str]) -> ModelResult<String> {
    let expected = template.matches("{}").count();
    if expected != values.len() {
        return Err(ModelError::TemplateFill {
            expected,
            got: values.len(),
        });
    }
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    for value in values {
        let Some(pos) = rest.find("{}") else {
            break;
        };
        out.push_str(&rest[..pos]);
        out.push_str(value);
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Ordered field names used to build an object's one-line summary label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Render layout metadata of a type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub externals: Vec<ExternalLink>,
    #[serde(default)]
    pub summary: Summary,
}

/// A runtime-authored type: the schema for a class of CMDB objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSchema {
    pub public_id: PublicId,
    /// Unique kebab-case identifier.
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Version,
    /// Gates whether objects of this type may be created or deleted.
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub render_meta: RenderMeta,
    #[serde(default)]
    pub acl: TypeAcl,
}

fn default_active() -> bool {
    true
}

impl TypeSchema {
    /// A minimal active schema with no fields.
    pub fn new(public_id: PublicId, name: &str, label: &str) -> Self {
        Self {
            public_id,
            name: name.into(),
            label: label.into(),
            description: None,
            version: Version::initial(),
            active: true,
            fields: Vec::new(),
            render_meta: RenderMeta::default(),
            acl: TypeAcl::default(),
        }
    }

    /// The declared field with the given name.
    pub fn get_field(&self, name: &str) -> ModelResult<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ModelError::FieldNotFound(name.to_string()))
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// All declared fields of the given kind.
    ///
    /// Fails with [`ModelError::FieldNotFound`] when no field matches, so a
    /// caller probing for e.g. reference fields can distinguish "none
    /// declared" without inspecting an empty list.
    pub fn get_fields_of_kind(&self, kind: FieldKind) -> ModelResult<Vec<&FieldDef>> {
        let matches: Vec<&FieldDef> = self.fields.iter().filter(|f| f.kind == kind).collect();
        if matches.is_empty() {
            return Err(ModelError::FieldNotFound(kind.to_string()));
        }
        Ok(matches)
    }

    /// All reference fields that may point at the given type.
    pub fn get_fields_referencing(&self, type_id: PublicId) -> ModelResult<Vec<&FieldDef>> {
        let matches: Vec<&FieldDef> = self
            .fields
            .iter()
            .filter(|f| f.kind.is_reference() && f.ref_types.contains(&type_id))
            .collect();
        if matches.is_empty() {
            return Err(ModelError::FieldNotFound(format!("ref->{type_id}")));
        }
        Ok(matches)
    }

    /// The render section with the given name.
    pub fn get_section(&self, name: &str) -> ModelResult<&Section> {
        self.render_meta
            .sections
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| ModelError::SectionNotFound(name.to_string()))
    }

    /// Field names making up the summary line, in order.
    #[must_use]
    pub fn get_summary(&self) -> &[String] {
        &self.render_meta.summary.fields
    }

    /// All external links declared on this type.
    #[must_use]
    pub fn get_externals(&self) -> &[ExternalLink] {
        &self.render_meta.externals
    }

    /// The external link with the given name.
    pub fn get_external(&self, name: &str) -> ModelResult<&ExternalLink> {
        self.render_meta
            .externals
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| ModelError::ExternalNotFound(name.to_string()))
    }

    /// Checks the schema invariants.
    ///
    /// - `name` matches the identifier pattern (`[a-z][a-z0-9-]*`)
    /// - field names are unique within the type
    /// - every field name referenced by a section, the summary, or an
    ///   external link is declared, or is one of the convention fields
    ///   (`public_id`, `object_id`)
    pub fn validate(&self) -> ModelResult<()> {
        if !is_identifier(&self.name) {
            return Err(ModelError::Validation(format!(
                "type name '{}' is not a valid identifier",
                self.name
            )));
        }

        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(ModelError::Validation("field with empty name".into()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ModelError::Validation(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
            if field.kind == FieldKind::RefSectionField && field.reference.is_none() {
                return Err(ModelError::Validation(format!(
                    "ref-section-field '{}' has no reference spec",
                    field.name
                )));
            }
        }

        for section in &self.render_meta.sections {
            if let Section::Fields { name, fields, .. } = section {
                for fname in fields {
                    self.check_field_reference(fname, &format!("section '{name}'"))?;
                }
            }
        }
        for fname in &self.render_meta.summary.fields {
            self.check_field_reference(fname, "summary")?;
        }
        for external in &self.render_meta.externals {
            for fname in &external.fields {
                self.check_field_reference(fname, &format!("external '{}'", external.name))?;
            }
            if external.placeholder_count() != external.fields.len() {
                return Err(ModelError::Validation(format!(
                    "external '{}' has {} placeholders but {} fields",
                    external.name,
                    external.placeholder_count(),
                    external.fields.len()
                )));
            }
        }
        Ok(())
    }

    fn check_field_reference(&self, name: &str, context: &str) -> ModelResult<()> {
        if self.has_field(name) || CONVENTION_FIELDS.contains(&name) {
            return Ok(());
        }
        Err(ModelError::Validation(format!(
            "{context} references unknown field '{name}'"
        )))
    }
}

/// `[a-z][a-z0-9-]*` — the kebab-case identifier pattern for type names.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
