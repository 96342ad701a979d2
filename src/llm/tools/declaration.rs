//! Tool declaration helpers using JSON Schema generation

use schemars::{gen::SchemaSettings, JsonSchema};

use crate::llm::core::types::ToolDeclaration;

/// Create a tool declaration from an argument type that implements JsonSchema
///
/// Doc comments on the argument fields become parameter descriptions, which
/// is what the model reads when deciding how to call the tool.
///
/// ```ignore
/// #[derive(Deserialize, JsonSchema)]
/// struct MatchIdArgs {
///     /// Match identifier
///     id: String,
/// }
///
/// let decl = create_tool_declaration::<MatchIdArgs>("get_match", "Fetch one match");
/// ```
pub fn create_tool_declaration<T: JsonSchema>(
    name: impl Into<String>,
    description: impl Into<String>,
) -> ToolDeclaration {
    let mut settings = SchemaSettings::draft07();
    settings.inline_subschemas = true;
    settings.meta_schema = None;
    let schema = settings.into_generator().into_root_schema_for::<T>();

    let mut input_schema = serde_json::to_value(&schema)
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
    if let Some(object) = input_schema.as_object_mut() {
        object.remove("title");
        // Argument-less tools still need an object schema with properties
        object
            .entry("properties")
            .or_insert_with(|| serde_json::json!({}));
    }

    ToolDeclaration {
        name: name.into(),
        description: description.into(),
        input_schema,
    }
}
