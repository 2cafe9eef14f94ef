//! Render context - the JSON view of the data model handed to templates
//!
//! Keys are PascalCase. Every label and name is accompanied by its case variants
//! (`LabelSnake`, `NameKebab`, ...) so templates rarely need a case filter.

use serde_json::{Map, Value as JsonValue, json};

use crate::core::directive::directives_to_json;
use crate::core::utils::NameCase;
use crate::core::{
    ApiDefinition, EnumDefinition, FieldDefinition, FunctionImplementation,
    MicroserviceDefinition, ModelDefinition, TagDefinition,
};

/// Data passed to a renderer or a path template
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub data: JsonValue,
}

impl RenderContext {
    /// Context for one microservice of an API: `Api`, `Microservice`, `Label`
    pub fn for_microservice(api: &ApiDefinition, ms: &MicroserviceDefinition) -> Self {
        Self {
            data: json!({
                "Api": api_value(api),
                "Microservice": microservice_value(ms),
                "Label": api.label,
            }),
        }
    }

    /// Context for a whole API: `Api`, `Label`
    pub fn for_api(api: &ApiDefinition) -> Self {
        Self {
            data: json!({
                "Api": api_value(api),
                "Label": api.label,
            }),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, tera::Error> {
        tera::Context::from_value(self.data.clone())
    }
}

/// Insert `<prefix>` and every `<prefix><Case>` variant of `value`
fn insert_cases(obj: &mut Map<String, JsonValue>, prefix: &str, value: &str) {
    obj.insert(prefix.to_string(), json!(value));
    for case in NameCase::ALL {
        obj.insert(format!("{prefix}{}", case.suffix()), json!(case.apply(value)));
    }
}

pub fn api_value(api: &ApiDefinition) -> JsonValue {
    let mut obj = Map::new();
    insert_cases(&mut obj, "Label", &api.label);
    obj.insert("Package".into(), json!(api.package));
    obj.insert(
        "Microservices".into(),
        api.microservices.iter().map(microservice_value).collect(),
    );
    JsonValue::Object(obj)
}

pub fn microservice_value(ms: &MicroserviceDefinition) -> JsonValue {
    let mut obj = Map::new();
    insert_cases(&mut obj, "Label", &ms.label);
    obj.insert("PrimaryModel".into(), model_value(&ms.primary_model));
    obj.insert(
        "SecondaryModels".into(),
        ms.secondary_models.iter().map(model_value).collect(),
    );
    obj.insert(
        "FunctionImplementations".into(),
        ms.function_implementations
            .iter()
            .map(function_implementation_value)
            .collect(),
    );
    JsonValue::Object(obj)
}

pub fn model_value(model: &ModelDefinition) -> JsonValue {
    let mut obj = Map::new();
    insert_cases(&mut obj, "Name", &model.name);
    obj.insert("Description".into(), json!(model.description));
    obj.insert(
        "Fields".into(),
        model.fields.iter().map(field_value).collect(),
    );
    obj.insert("Enums".into(), model.enums.iter().map(enum_value).collect());
    obj.insert("Directives".into(), directives_to_json(&model.directives));
    JsonValue::Object(obj)
}

pub fn field_value(field: &FieldDefinition) -> JsonValue {
    let mut obj = Map::new();
    insert_cases(&mut obj, "Name", &field.name);
    obj.insert("Type".into(), json!(field.field_type));
    obj.insert("Description".into(), json!(field.description));
    obj.insert("Optional".into(), json!(field.optional));
    obj.insert("Directives".into(), directives_to_json(&field.directives));
    obj.insert("Tags".into(), field.tags.iter().map(tag_value).collect());
    JsonValue::Object(obj)
}

fn tag_value(tag: &TagDefinition) -> JsonValue {
    json!({ "Name": tag.name, "Type": tag.tag_type.as_str() })
}

fn enum_value(def: &EnumDefinition) -> JsonValue {
    let mut obj = Map::new();
    insert_cases(&mut obj, "Name", &def.name);
    obj.insert("Values".into(), json!(def.values));
    obj.insert("Description".into(), json!(def.description));
    JsonValue::Object(obj)
}

fn function_implementation_value(imp: &FunctionImplementation) -> JsonValue {
    let mut function = Map::new();
    insert_cases(&mut function, "Name", &imp.function.name);
    function.insert("Parameters".into(), json!(imp.function.parameters));
    function.insert("Description".into(), json!(imp.function.description));
    json!({ "Function": function })
}
