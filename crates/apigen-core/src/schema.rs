//! JSON-Schema synthesis for manifest types.
//!
//! Struct types become named components under `#/components/schemas`; slices and
//! primitives are always rendered inline. Only types reachable from an endpoint
//! are ever visited, so unreferenced entries of the manifest never show up.

// Internal imports (std, crate)
use std::collections::{BTreeMap, HashSet};

use crate::context::BuildContext;
use crate::kind::TypeKind;
use crate::manifest::{Manifest, ManifestType, TypeRef};
use crate::Result;

// External imports (alphabetized)
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Component name of the shared error envelope
pub const ERROR_RESPONSE: &str = "ErrorResponse";

const COMPONENT_PREFIX: &str = "#/components/schemas/";

/// The subset of JSON-Schema the synthesizer emits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Properties in field declaration order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Schema {
    /// `$ref` to a named component
    pub fn component(name: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", COMPONENT_PREFIX, name)),
            ..Self::default()
        }
    }

    pub fn primitive(kind: TypeKind) -> Self {
        let (schema_type, format) = kind.schema_type();
        Self {
            schema_type: Some(schema_type.to_string()),
            format: format.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    pub fn object() -> Self {
        Self {
            schema_type: Some("object".to_string()),
            properties: Some(IndexMap::new()),
            ..Self::default()
        }
    }

    /// Attach a description.
    ///
    /// OpenAPI 3.0 ignores siblings of `$ref`, so a reference is wrapped in `allOf`.
    pub fn with_description(self, description: Option<&str>) -> Self {
        let Some(text) = description else {
            return self;
        };
        if self.reference.is_some() {
            return Self {
                all_of: vec![self],
                description: Some(text.to_string()),
                ..Self::default()
            };
        }
        Self {
            description: Some(text.to_string()),
            ..self
        }
    }

    fn with_property(mut self, name: &str, schema: Schema, required: bool) -> Self {
        self.properties
            .get_or_insert_with(IndexMap::new)
            .insert(name.to_string(), schema);
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// `{error: {code, message}}`, the body of every error response
    pub fn error_response() -> Self {
        let string = || Schema::primitive(TypeKind::String);
        let detail = Schema::object()
            .with_property("code", string(), true)
            .with_property("message", string(), true);
        Schema::object()
            .with_property("error", detail, true)
            .with_description(Some("Error envelope returned by every failing request"))
    }
}

/// Collects the components reachable from the type-ids it is asked about
#[derive(Debug)]
pub struct SchemaRegistry<'m> {
    manifest: &'m Manifest,
    components: BTreeMap<String, Schema>,
    rendered: HashSet<&'m str>,
}

impl<'m> SchemaRegistry<'m> {
    /// Create a registry holding only the error envelope.
    ///
    /// The envelope's name is reserved in `ctx` so no user type can take it.
    pub fn new(manifest: &'m Manifest, ctx: &mut BuildContext) -> Self {
        ctx.reserve_component(ERROR_RESPONSE);
        let mut components = BTreeMap::new();
        components.insert(ERROR_RESPONSE.to_string(), Schema::error_response());
        Self {
            manifest,
            components,
            rendered: HashSet::new(),
        }
    }

    /// Schema of one use of `type_id`, registering every struct it reaches.
    ///
    /// Names are claimed before fields are walked, so encounter order is pre-order
    /// over the manifest's field declaration order.
    pub fn schema_for(&mut self, ctx: &mut BuildContext, type_id: &'m str) -> Result<Schema> {
        let schema = match self.manifest.resolve(type_id)? {
            TypeRef::Primitive(kind) => Schema::primitive(kind),
            TypeRef::Slice(elem) => {
                let items = self.schema_for(ctx, elem)?;
                let doc = self
                    .manifest
                    .types
                    .get(type_id)
                    .and_then(|ty| ty.doc.as_deref());
                Schema::array(items).with_description(doc)
            }
            TypeRef::Struct(id, ty) => {
                let name = ctx.component_name(id);
                if self.rendered.insert(id) {
                    let object = self.struct_schema(ctx, ty)?;
                    self.components.insert(name.clone(), object);
                }
                Schema::component(&name)
            }
        };
        Ok(schema)
    }

    fn struct_schema(&mut self, ctx: &mut BuildContext, ty: &'m ManifestType) -> Result<Schema> {
        let mut object = Schema::object();
        // Fields without a JSON name are bound from the transport only
        for field in ty.fields.iter().filter(|f| f.in_body()) {
            let schema = self
                .schema_for(ctx, &field.type_id)?
                .with_description(field.doc.as_deref());
            object = object.with_property(&field.json_name, schema, field.required);
        }
        Ok(object.with_description(ty.doc.as_deref()))
    }

    pub fn components(&self) -> &BTreeMap<String, Schema> {
        &self.components
    }

    pub fn into_components(self) -> BTreeMap<String, Schema> {
        self.components
    }
}
