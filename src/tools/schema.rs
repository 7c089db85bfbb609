//! JSON Schema builder for tool input descriptors.

use serde_json::{json, Map, Value};

/// Builder for object-typed tool input schemas.
pub struct SchemaBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
}

/// Start an object schema.
pub fn object() -> SchemaBuilder {
    SchemaBuilder {
        properties: Map::new(),
        required: Vec::new(),
    }
}

impl SchemaBuilder {
    /// Add a string property.
    pub fn string(mut self, name: &str, description: &str, required: bool) -> Self {
        self.properties.insert(
            name.to_string(),
            json!({"type": "string", "description": description}),
        );
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// Add a string-array property.
    pub fn string_array(mut self, name: &str, description: &str, required: bool) -> Self {
        self.properties.insert(
            name.to_string(),
            json!({
                "type": "array",
                "items": {"type": "string"},
                "description": description,
            }),
        );
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// Add a free-form object property.
    pub fn object_value(mut self, name: &str, description: &str, required: bool) -> Self {
        self.properties.insert(
            name.to_string(),
            json!({"type": "object", "description": description}),
        );
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// Build the schema value.
    pub fn build(self) -> Value {
        json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        })
    }
}
