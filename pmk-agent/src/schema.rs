//! Response schemas for structured model output.

use jsonschema::Validator;
use pmk_core::{PmkError, Result};
use schemars::{JsonSchema, r#gen::SchemaSettings};
use serde_json::Value;

/// Integer and number formats the Gemini schema dialect understands.
const SUPPORTED_FORMATS: [&str; 5] = ["int32", "int64", "float", "double", "date-time"];

/// Generate a Gemini-compatible schema (no $schema, $ref, or definitions)
pub fn generate_gemini_schema<T: JsonSchema>() -> Result<Value> {
    let settings = SchemaSettings::openapi3().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let generator = schemars::r#gen::SchemaGenerator::new(settings);
    let mut schema = generator.into_root_schema_for::<T>();
    schema.schema.metadata().title = None;

    let mut value = serde_json::to_value(schema.schema)?;
    clean_schema(&mut value);
    Ok(value)
}

/// Remove fields that Gemini doesn't support
fn clean_schema(value: &mut Value) {
    if let Value::Object(map) = value {
        map.remove("$schema");
        map.remove("definitions");
        map.remove("$ref");
        map.remove("additionalProperties");
        let unsupported_format =
            map.get("format")
                .and_then(Value::as_str)
                .is_some_and(|f| !SUPPORTED_FORMATS.contains(&f));
        if unsupported_format {
            map.remove("format");
        }

        for (_, v) in map.iter_mut() {
            clean_schema(v);
        }
    } else if let Value::Array(arr) = value {
        for v in arr.iter_mut() {
            clean_schema(v);
        }
    }
}

/// The schema sent to the model together with the validator applied to its reply.
///
/// The two start out identical. [`OutputSchema::constrain_enum`] narrows only the copy
/// sent to the model, so values outside the enumeration still reach the caller.
pub struct OutputSchema {
    model_schema: Value,
    validator: Validator,
}

impl OutputSchema {
    pub fn for_type<T: JsonSchema>() -> Result<Self> {
        let schema = generate_gemini_schema::<T>()?;
        let validator = Validator::new(&schema)
            .map_err(|e| PmkError::Config(format!("Invalid response schema: {e}")))?;
        Ok(Self { model_schema: schema, validator })
    }

    /// Offer the model a fixed set of values for a top-level string property.
    pub fn constrain_enum(mut self, property: &str, values: &[&str]) -> Self {
        if let Some(prop) = self.model_schema.pointer_mut(&format!("/properties/{property}")) {
            prop["enum"] = Value::from(values.to_vec());
        }
        self
    }

    pub fn model_schema(&self) -> &Value {
        &self.model_schema
    }

    /// Validate a reply, joining every violation into one message.
    pub fn validate(&self, instance: &Value) -> std::result::Result<(), String> {
        let errors: Vec<String> =
            self.validator.iter_errors(instance).map(|e| e.to_string()).collect();
        if errors.is_empty() { Ok(()) } else { Err(errors.join("; ")) }
    }
}
