use crate::type_expr::Primitive;
use crate::type_resolver::ResolvedType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Definitions table keyed by canonical id
pub type Definitions = BTreeMap<String, Schema>;

/// Prefix of every definition reference
pub const DEFINITIONS_REF_PREFIX: &str = "#/definitions/";

/// A Definitions entry: a record or a string enumeration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// `object` for records, `string` for enumerations
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Names of required properties, in first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl Schema {
    pub fn object() -> Self {
        Schema {
            schema_type: Some("object".to_string()),
            ..Default::default()
        }
    }

    pub fn string_enum(values: Vec<String>) -> Self {
        Schema {
            schema_type: Some("string".to_string()),
            enum_values: Some(values),
            ..Default::default()
        }
    }

    /// Marks `name` required unless it already is
    pub fn require(&mut self, name: &str) {
        if !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
    }

    /// Merges a later resolution of the same id into this one.
    ///
    /// Properties of `other` overwrite same-named ones, required names are unioned.
    pub fn merge(&mut self, other: Schema) {
        if other.schema_type.is_some() {
            self.schema_type = other.schema_type;
        }
        if other.enum_values.is_some() {
            self.enum_values = other.enum_values;
        }
        self.properties.extend(other.properties);
        for name in &other.required {
            self.require(name);
        }
    }
}

/// Schema of a property, array items, a response body or a body parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,
}

impl Property {
    /// `{type, format}` for a primitive, `None` for unsupported primitives
    pub fn primitive(primitive: Primitive) -> Option<Property> {
        let (wire_type, format) = primitive.wire()?;
        Some(Property {
            property_type: Some(wire_type.to_string()),
            format: format.map(str::to_string),
            ..Default::default()
        })
    }

    /// `{$ref: "#/definitions/<id>"}`
    pub fn reference(id: &str) -> Property {
        Property {
            reference: Some(format!("{}{}", DEFINITIONS_REF_PREFIX, id)),
            ..Default::default()
        }
    }

    pub fn array(items: Property) -> Property {
        Property {
            property_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// Value of unknown shape
    pub fn object() -> Property {
        Property {
            property_type: Some("object".to_string()),
            ..Default::default()
        }
    }

    /// Schema for a resolved type; `None` if it bottoms out in an unsupported primitive.
    pub fn from_resolved(resolved: &ResolvedType) -> Option<Property> {
        match resolved {
            ResolvedType::Primitive(primitive) => Self::primitive(*primitive),
            ResolvedType::Wildcard => Some(Self::object()),
            ResolvedType::Model(id) => Some(Self::reference(id)),
            ResolvedType::Array(items) => Self::from_resolved(items).map(Self::array),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}
