//! The reference resolver and renderer.
//!
//! Turns a stored object plus its type into a [`RenderResult`]: scalar
//! values copied through, reference fields expanded into nested render
//! results, reference-sections flattened, summary lines and external links
//! resolved. Recursion is bounded by a depth counter and a visited set, so
//! reference cycles terminate and an object is never re-entered on the same
//! path.
//!
//! The access check for the top-level object runs before any field is
//! materialized. Whether nested fetches re-check the ACL is a policy choice
//! ([`NestedAclPolicy`]); the permissive default matches how transitively
//! referenced objects have historically been displayed.

use crate::collections;
use crate::directory::UserDirectory;
use crate::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use cmdbkit_model::{
    FieldDef, FieldEntry, FieldKind, FieldValue, Object, Permission, RefSummary, TypeSchema,
};
use cmdbkit_store::{DocumentStore, Filter, Sort};
use cmdbkit_types::{PublicId, Version};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// How an object is being rendered.
///
/// `Native` is the plain API view; `Render` is the reference-display view,
/// which prefixes summary lines with the type label and id. Nested objects
/// reached through reference fields always use `Render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    Native,
    Render,
}

/// Whether nested reference resolution re-checks the ACL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedAclPolicy {
    /// Only the top-level object is checked; referenced objects are shown
    /// through it. Matches the historical behavior.
    Inherit,
    /// READ is re-verified for every nested fetch; denied fields are
    /// skipped the same way missing references are.
    Enforce,
}

/// Caller-controlled rendering knobs.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    /// Maximum reference expansion depth below the top-level object.
    pub max_depth: usize,
    pub nested_acl: NestedAclPolicy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            nested_acl: NestedAclPolicy::Inherit,
        }
    }
}

/// Flattened scalar attributes of the rendered object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInformation {
    pub public_id: PublicId,
    pub type_id: PublicId,
    pub version: Version,
    pub author_id: PublicId,
    pub creation_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<PublicId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edit_time: Option<DateTime<Utc>>,
    pub active: bool,
}

impl ObjectInformation {
    fn from_object(object: &Object) -> Self {
        Self {
            public_id: object.public_id,
            type_id: object.type_id,
            version: object.version,
            author_id: object.author_id,
            creation_time: object.creation_time,
            editor_id: object.editor_id,
            last_edit_time: object.last_edit_time,
            active: object.active,
        }
    }
}

/// Flattened attributes of the rendered object's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInformation {
    pub public_id: PublicId,
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl TypeInformation {
    fn from_schema(schema: &TypeSchema) -> Self {
        Self {
            public_id: schema.public_id,
            name: schema.name.clone(),
            label: schema.label.clone(),
            icon: schema.render_meta.icon.clone(),
        }
    }
}

/// A field's resolved value in a render result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RenderedValue {
    /// The raw stored value, copied through.
    Scalar(FieldValue),
    /// A resolved reference, expanded one level deeper.
    Reference(Box<RenderResult>),
    /// A flattened reference-section field bag (no recursion).
    Section { fields: Vec<FieldEntry> },
}

/// One rendered field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedField {
    pub name: String,
    pub value: RenderedValue,
}

/// An external link with its href template filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedExternal {
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub href: String,
}

/// The resolved, reference-expanded, permission-checked view of an object.
///
/// Derived and transient: rebuilt on every read, never persisted (audit
/// snapshots store a serialized copy, not the live value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResult {
    pub object_information: ObjectInformation,
    pub type_information: TypeInformation,
    pub fields: Vec<RenderedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_line: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub externals: Vec<ResolvedExternal>,
}

impl RenderResult {
    /// The rendered field with the given name.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&RenderedValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }
}

/// How a single field resolved.
enum Resolution {
    Value(RenderedValue),
    /// Omit the field from the result (tolerated resolution failure).
    Skip,
}

/// Per-call rendering state.
struct RenderPass<'a> {
    cache: &'a mut HashMap<PublicId, Arc<TypeSchema>>,
    /// Object ids on the current recursion path.
    path: Vec<PublicId>,
    config: RenderConfig,
    user_id: PublicId,
}

/// Renders objects against their runtime types.
pub struct Renderer {
    store: Arc<DocumentStore>,
    directory: Arc<dyn UserDirectory>,
}

impl Renderer {
    pub fn new(store: Arc<DocumentStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, directory }
    }

    /// Renders one object on behalf of a user.
    ///
    /// The ACL READ check runs before any field is materialized; a failed
    /// check surfaces [`EngineError::AccessDenied`] without leaking content.
    /// A missing object or type propagates as [`EngineError::NotFound`].
    pub fn render_object(
        &self,
        object_id: PublicId,
        user_id: PublicId,
        view: ViewMode,
        config: &RenderConfig,
    ) -> EngineResult<RenderResult> {
        let mut cache = HashMap::new();
        let object = self.fetch_object(object_id)?;
        let schema = self.fetch_type_cached(object.type_id, &mut cache)?;
        self.check_access(&schema, user_id, Permission::Read)?;
        let mut pass = RenderPass {
            cache: &mut cache,
            path: Vec::new(),
            config: *config,
            user_id,
        };
        self.render(&object, &schema, view, config.max_depth, &mut pass)
    }

    /// Renders many objects by id, fetching each distinct type at most once.
    ///
    /// Missing objects and objects the user may not read are skipped rather
    /// than failing the whole batch.
    pub fn render_many(
        &self,
        object_ids: &[PublicId],
        user_id: PublicId,
        view: ViewMode,
        config: &RenderConfig,
    ) -> EngineResult<Vec<RenderResult>> {
        let mut objects = Vec::with_capacity(object_ids.len());
        for id in object_ids {
            match self.fetch_object(*id) {
                Ok(object) => objects.push(object),
                Err(e) if e.is_not_found() => {
                    debug!(object_id = %id, "object missing, skipped from batch");
                }
                Err(e) => return Err(e),
            }
        }
        self.render_batch(objects, user_id, view, config)
    }

    /// Renders every object matching a store filter (type-cached batch).
    pub fn render_query(
        &self,
        filter: &Filter,
        user_id: PublicId,
        view: ViewMode,
        config: &RenderConfig,
    ) -> EngineResult<Vec<RenderResult>> {
        let (docs, _) =
            self.store
                .get_many(collections::OBJECTS, filter, &Sort::default(), 0, None)?;
        let mut objects = Vec::with_capacity(docs.len());
        for doc in docs {
            objects.push(parse_object(doc)?);
        }
        self.render_batch(objects, user_id, view, config)
    }

    fn render_batch(
        &self,
        objects: Vec<Object>,
        user_id: PublicId,
        view: ViewMode,
        config: &RenderConfig,
    ) -> EngineResult<Vec<RenderResult>> {
        let mut cache = HashMap::new();
        let mut results = Vec::with_capacity(objects.len());
        for object in &objects {
            let schema = match self.fetch_type_cached(object.type_id, &mut cache) {
                Ok(schema) => schema,
                Err(e) if e.is_not_found() => {
                    debug!(object_id = %object.public_id, type_id = %object.type_id,
                        "type missing, object skipped from batch");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if self.check_access(&schema, user_id, Permission::Read).is_err() {
                debug!(object_id = %object.public_id, "read denied, object skipped from batch");
                continue;
            }
            let mut pass = RenderPass {
                cache: &mut cache,
                path: Vec::new(),
                config: *config,
                user_id,
            };
            results.push(self.render(object, &schema, view, config.max_depth, &mut pass)?);
        }
        Ok(results)
    }

    /// Verifies `permission` for `user_id` against a type's ACL.
    pub(crate) fn check_access(
        &self,
        schema: &TypeSchema,
        user_id: PublicId,
        permission: Permission,
    ) -> EngineResult<()> {
        if !schema.acl.activated {
            return Ok(());
        }
        let denied = EngineError::AccessDenied {
            type_id: schema.public_id,
            permission,
        };
        let Some(group) = self.directory.get_group_id(user_id) else {
            return Err(denied);
        };
        if schema.acl.verify_access(group, permission) {
            Ok(())
        } else {
            Err(denied)
        }
    }

    fn render(
        &self,
        object: &Object,
        schema: &TypeSchema,
        view: ViewMode,
        depth: usize,
        pass: &mut RenderPass<'_>,
    ) -> EngineResult<RenderResult> {
        pass.path.push(object.public_id);

        // Fields render in the object's stored order, not the type's.
        let mut fields = Vec::with_capacity(object.fields.len());
        for entry in &object.fields {
            match self.render_field(entry, schema, depth, pass)? {
                Resolution::Value(value) => fields.push(RenderedField {
                    name: entry.name.clone(),
                    value,
                }),
                Resolution::Skip => {}
            }
        }

        let summary_line = build_summary(object, schema, view);
        let externals = build_externals(object, schema)?;

        pass.path.pop();
        Ok(RenderResult {
            object_information: ObjectInformation::from_object(object),
            type_information: TypeInformation::from_schema(schema),
            fields,
            summary_line,
            externals,
        })
    }

    fn render_field(
        &self,
        entry: &FieldEntry,
        schema: &TypeSchema,
        depth: usize,
        pass: &mut RenderPass<'_>,
    ) -> EngineResult<Resolution> {
        // Stored fields the type no longer declares pass through raw.
        let Ok(def) = schema.get_field(&entry.name) else {
            return Ok(Resolution::Value(RenderedValue::Scalar(entry.value.clone())));
        };
        if def.kind.is_reference() && !entry.value.is_empty() && depth > 0 {
            return self.resolve_reference(entry, def, depth, pass);
        }
        if def.kind == FieldKind::RefSectionField && !entry.value.is_empty() {
            return self.resolve_section_reference(entry, def);
        }
        Ok(Resolution::Value(RenderedValue::Scalar(entry.value.clone())))
    }

    fn resolve_reference(
        &self,
        entry: &FieldEntry,
        def: &FieldDef,
        depth: usize,
        pass: &mut RenderPass<'_>,
    ) -> EngineResult<Resolution> {
        let Some(target_id) = entry.value.as_reference() else {
            return Ok(Resolution::Value(RenderedValue::Scalar(entry.value.clone())));
        };
        // Already on this path: stop expanding, keep the raw id.
        if pass.path.contains(&target_id) {
            debug!(field = %entry.name, %target_id, "reference cycle, expansion stopped");
            return Ok(Resolution::Value(RenderedValue::Scalar(entry.value.clone())));
        }

        let target = match self.fetch_object(target_id) {
            Ok(target) => target,
            Err(e) if e.is_not_found() => {
                debug!(field = %entry.name, %target_id, "referenced object missing, field skipped");
                return Ok(Resolution::Skip);
            }
            Err(e) => return Err(e),
        };
        let target_schema = match self.fetch_type_cached(target.type_id, pass.cache) {
            Ok(schema) => schema,
            Err(e) if e.is_not_found() => {
                debug!(field = %entry.name, type_id = %target.type_id,
                    "referenced type missing, field skipped");
                return Ok(Resolution::Skip);
            }
            Err(e) => return Err(e),
        };
        if pass.config.nested_acl == NestedAclPolicy::Enforce
            && self
                .check_access(&target_schema, pass.user_id, Permission::Read)
                .is_err()
        {
            debug!(field = %entry.name, %target_id, "nested read denied, field skipped");
            return Ok(Resolution::Skip);
        }

        let mut nested = self.render(&target, &target_schema, ViewMode::Render, depth - 1, pass)?;
        if let Some(spec) = def.summary_for(target.type_id) {
            nested.summary_line = Some(fill_ref_summary(spec, &target)?);
        }
        Ok(Resolution::Value(RenderedValue::Reference(Box::new(nested))))
    }

    fn resolve_section_reference(
        &self,
        entry: &FieldEntry,
        def: &FieldDef,
    ) -> EngineResult<Resolution> {
        let Some(reference) = &def.reference else {
            debug!(field = %entry.name, "ref-section-field without reference spec, skipped");
            return Ok(Resolution::Skip);
        };
        let Some(target_id) = entry.value.as_reference() else {
            return Ok(Resolution::Value(RenderedValue::Scalar(entry.value.clone())));
        };
        let target = match self.fetch_object(target_id) {
            Ok(target) => target,
            Err(e) if e.is_not_found() => {
                debug!(field = %entry.name, %target_id, "section target missing, field skipped");
                return Ok(Resolution::Skip);
            }
            Err(e) => return Err(e),
        };
        let fields = reference
            .fields
            .iter()
            .filter_map(|name| {
                target.get_value(name).map(|value| FieldEntry {
                    name: name.clone(),
                    value: value.clone(),
                })
            })
            .collect();
        Ok(Resolution::Value(RenderedValue::Section { fields }))
    }

    fn fetch_object(&self, public_id: PublicId) -> EngineResult<Object> {
        let doc = self.store.get(collections::OBJECTS, public_id)?;
        parse_object(doc)
    }

    fn fetch_type_cached(
        &self,
        type_id: PublicId,
        cache: &mut HashMap<PublicId, Arc<TypeSchema>>,
    ) -> EngineResult<Arc<TypeSchema>> {
        if let Some(schema) = cache.get(&type_id) {
            return Ok(Arc::clone(schema));
        }
        let doc = self.store.get(collections::TYPES, type_id)?;
        let schema: TypeSchema = serde_json::from_value(doc)
            .map_err(|e| EngineError::Render(format!("corrupt type {type_id}: {e}")))?;
        let schema = Arc::new(schema);
        cache.insert(type_id, Arc::clone(&schema));
        Ok(schema)
    }
}

fn parse_object(doc: serde_json::Value) -> EngineResult<Object> {
    serde_json::from_value(doc).map_err(|e| EngineError::Render(format!("corrupt object: {e}")))
}

/// The display value of a field, with the `public_id`/`object_id`
/// convention resolved against the object itself.
fn display_value(object: &Object, name: &str) -> String {
    if name == "public_id" || name == "object_id" {
        return object.public_id.to_string();
    }
    object
        .get_value(name)
        .map(FieldValue::to_string)
        .unwrap_or_default()
}

fn build_summary(object: &Object, schema: &TypeSchema, view: ViewMode) -> Option<String> {
    let values: Vec<String> = schema
        .get_summary()
        .iter()
        .map(|name| display_value(object, name))
        .filter(|v| !v.is_empty())
        .collect();
    let joined = values.join(" | ");
    match view {
        ViewMode::Native => (!joined.is_empty()).then_some(joined),
        ViewMode::Render => Some(if joined.is_empty() {
            format!("{} #{}", schema.label, object.public_id)
        } else {
            format!("{} #{} | {}", schema.label, object.public_id, joined)
        }),
    }
}

fn fill_ref_summary(spec: &RefSummary, target: &Object) -> EngineResult<String> {
    let values: Vec<String> = spec
        .fields
        .iter()
        .map(|name| display_value(target, name))
        .collect();
    let strs: Vec<&str> = values.iter().map(String::as_str).collect();
    spec.fill_line(&strs)
        .map_err(|e| EngineError::Render(format!("reference summary: {e}")))
}

fn build_externals(object: &Object, schema: &TypeSchema) -> EngineResult<Vec<ResolvedExternal>> {
    let mut out = Vec::new();
    for external in schema.get_externals() {
        let values: Vec<String> = external
            .fields
            .iter()
            .map(|name| display_value(object, name))
            .collect();
        if values.iter().any(String::is_empty) {
            debug!(external = %external.name, "unresolved field, external skipped");
            continue;
        }
        let strs: Vec<&str> = values.iter().map(String::as_str).collect();
        let href = external
            .fill_href(&strs)
            .map_err(|e| EngineError::Render(format!("external '{}': {e}", external.name)))?;
        out.push(ResolvedExternal {
            name: external.name.clone(),
            label: external.label.clone(),
            icon: external.icon.clone(),
            href,
        });
    }
    Ok(out)
}
