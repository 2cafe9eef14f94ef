//! Template function catalog shared by every renderer.
//!
//! Each entry is a plain function over positional JSON arguments. The renderers
//! adapt the catalog to their own calling conventions: Tera registers every entry
//! both as a function (named arguments, in `params` order) and as a filter (first
//! argument piped), Handlebars registers every entry as a helper (positional
//! arguments, usable in subexpressions).
//!
//! Arguments that a template omits arrive as `Value::Null`.

use std::collections::HashMap;

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};
use serde_json::Value;
use tracing::warn;

use crate::core::directive::{GRAPHQL_FIELD_NAME_MASK, GRAPHQL_TYPE_NAME_MASK};
use crate::core::utils::to_go_field_case;
use crate::core::{is_primitive_field_type, unwrap_array};

type HelperResult = Result<Value, String>;

/// One catalog entry
pub struct TemplateFunction {
    pub name: &'static str,
    /// Argument names, in positional order
    pub params: &'static [&'static str],
    pub call: fn(&[Value]) -> HelperResult,
}

impl TemplateFunction {
    const fn new(
        name: &'static str,
        params: &'static [&'static str],
        call: fn(&[Value]) -> HelperResult,
    ) -> Self {
        Self { name, params, call }
    }

    /// Positional arguments from Tera's named arguments
    pub fn positional_from_named(&self, named: &HashMap<String, Value>) -> Vec<Value> {
        self.params
            .iter()
            .map(|p| named.get(*p).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Positional arguments for a filter: the piped value, then the named rest
    pub fn positional_from_filter(
        &self,
        piped: &Value,
        named: &HashMap<String, Value>,
    ) -> Vec<Value> {
        std::iter::once(piped.clone())
            .chain(
                self.params
                    .iter()
                    .skip(1)
                    .map(|p| named.get(*p).cloned().unwrap_or(Value::Null)),
            )
            .collect()
    }

    /// Pad or truncate positional arguments to the declared arity
    pub fn normalize(&self, mut args: Vec<Value>) -> Vec<Value> {
        args.resize(self.params.len(), Value::Null);
        args
    }
}

pub static CATALOG: &[TemplateFunction] = &[
    // type maps
    TemplateFunction::new("proto_type", &["type"], proto_type),
    TemplateFunction::new("go_type", &["type"], go_type),
    TemplateFunction::new("go_type_with_prefix", &["type", "prefix"], go_type_with_prefix),
    TemplateFunction::new("graphql_type", &["type"], graphql_type),
    TemplateFunction::new("graphql_input_type", &["type"], graphql_input_type),
    TemplateFunction::new("typescript_type", &["type"], typescript_type),
    TemplateFunction::new("is_primitive_type", &["type"], is_primitive_type),
    // case
    TemplateFunction::new("kebab_case", &["s"], kebab_case),
    TemplateFunction::new("camel_case", &["s"], camel_case),
    TemplateFunction::new("lower_camel_case", &["s"], lower_camel_case),
    TemplateFunction::new("screaming_snake_case", &["s"], screaming_snake_case),
    TemplateFunction::new("snake_case", &["s"], snake_case),
    TemplateFunction::new("go_field_case", &["s"], go_field_case),
    TemplateFunction::new("camel_case_capitalize_id", &["s"], camel_case_capitalize_id),
    TemplateFunction::new(
        "lower_camel_case_capitalize_id",
        &["s"],
        lower_camel_case_capitalize_id,
    ),
    TemplateFunction::new("camel_case_no_exceptions", &["s"], camel_case_no_exceptions),
    TemplateFunction::new(
        "lower_camel_case_no_exceptions",
        &["s"],
        lower_camel_case_no_exceptions,
    ),
    TemplateFunction::new("add", &["a", "b"], add),
    // directives and tags
    TemplateFunction::new("field_directive", &["field", "name", "default"], field_directive),
    TemplateFunction::new("model_directive", &["model", "name", "default"], model_directive),
    TemplateFunction::new("model_directive_list", &["model", "name"], model_directive_list),
    TemplateFunction::new("field_has_tag", &["field", "tag"], field_has_tag),
    TemplateFunction::new(
        "model_tagged_field_name",
        &["model", "tag", "default"],
        model_tagged_field_name,
    ),
    TemplateFunction::new("graphql_type_for_field", &["field"], graphql_type_for_field),
    TemplateFunction::new("graphql_name_for_field", &["field"], graphql_name_for_field),
];

fn str_arg<'a>(args: &'a [Value], idx: usize, func: &str) -> Result<&'a str, String> {
    args.get(idx)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("{func} expects a string as argument {}", idx + 1))
}

fn opt_str_arg(args: &[Value], idx: usize) -> &str {
    args.get(idx).and_then(Value::as_str).unwrap_or_default()
}

fn obj_arg<'a>(args: &'a [Value], idx: usize, func: &str) -> Result<&'a Value, String> {
    match args.get(idx) {
        Some(v @ Value::Object(_)) => Ok(v),
        _ => Err(format!("{func} expects an object as argument {}", idx + 1)),
    }
}

/// Primitive keyword mapping shared by the per-language type maps
fn map_primitive(t: &str, table: [&'static str; 6]) -> Option<&'static str> {
    let idx = match t {
        "ID" => 0,
        "String" => 1,
        "Int" => 2,
        "Float" => 3,
        "Boolean" => 4,
        "DateTime" => 5,
        _ => return None,
    };
    Some(table[idx])
}

const PROTO: [&str; 6] = [
    "string",
    "string",
    "int64",
    "double",
    "bool",
    "google.protobuf.Timestamp",
];
const GO: [&str; 6] = ["string", "string", "int64", "float64", "bool", "time.Time"];
const GRAPHQL: [&str; 6] = ["String", "String", "Int", "Float", "Boolean", "Int"];
const TYPESCRIPT: [&str; 6] = ["string", "string", "number", "number", "boolean", "number"];

pub fn map_proto_type(t: &str) -> String {
    if let Some(p) = map_primitive(t, PROTO) {
        return p.to_string();
    }
    match unwrap_array(t) {
        Some(inner) => format!("repeated {}", map_proto_type(inner)),
        None => t.to_string(),
    }
}

pub fn map_go_type(t: &str) -> String {
    if let Some(p) = map_primitive(t, GO) {
        return p.to_string();
    }
    match unwrap_array(t) {
        Some(inner) => format!("[]{}", map_go_type(inner)),
        None => t.to_string(),
    }
}

/// Like [`map_go_type`] but prefixes named types. Array elements are mapped
/// without the prefix.
pub fn map_go_type_with_prefix(t: &str, prefix: &str) -> String {
    if let Some(p) = map_primitive(t, GO) {
        return p.to_string();
    }
    match unwrap_array(t) {
        Some(inner) => format!("[]{}", map_go_type(inner)),
        None => format!("{prefix}{t}"),
    }
}

pub fn map_graphql_type(t: &str) -> String {
    if let Some(p) = map_primitive(t, GRAPHQL) {
        return p.to_string();
    }
    match unwrap_array(t) {
        Some(inner) => format!("[{}]", map_graphql_type(inner)),
        None => t.to_string(),
    }
}

pub fn map_graphql_input_type(t: &str) -> String {
    if let Some(p) = map_primitive(t, GRAPHQL) {
        return p.to_string();
    }
    match unwrap_array(t) {
        Some(inner) => format!("[{}]", map_graphql_input_type(inner)),
        None => format!("{t}Input"),
    }
}

/// Named types and arrays pass through unchanged
pub fn map_typescript_type(t: &str) -> String {
    map_primitive(t, TYPESCRIPT)
        .map(str::to_string)
        .unwrap_or_else(|| t.to_string())
}

fn proto_type(args: &[Value]) -> HelperResult {
    Ok(Value::String(map_proto_type(str_arg(args, 0, "proto_type")?)))
}

fn go_type(args: &[Value]) -> HelperResult {
    Ok(Value::String(map_go_type(str_arg(args, 0, "go_type")?)))
}

fn go_type_with_prefix(args: &[Value]) -> HelperResult {
    let t = str_arg(args, 0, "go_type_with_prefix")?;
    Ok(Value::String(map_go_type_with_prefix(t, opt_str_arg(args, 1))))
}

fn graphql_type(args: &[Value]) -> HelperResult {
    Ok(Value::String(map_graphql_type(str_arg(args, 0, "graphql_type")?)))
}

fn graphql_input_type(args: &[Value]) -> HelperResult {
    Ok(Value::String(map_graphql_input_type(str_arg(
        args,
        0,
        "graphql_input_type",
    )?)))
}

fn typescript_type(args: &[Value]) -> HelperResult {
    Ok(Value::String(map_typescript_type(str_arg(
        args,
        0,
        "typescript_type",
    )?)))
}

fn is_primitive_type(args: &[Value]) -> HelperResult {
    Ok(Value::Bool(is_primitive_field_type(str_arg(
        args,
        0,
        "is_primitive_type",
    )?)))
}

fn kebab_case(args: &[Value]) -> HelperResult {
    Ok(Value::String(str_arg(args, 0, "kebab_case")?.to_kebab_case()))
}

fn camel_case(args: &[Value]) -> HelperResult {
    Ok(Value::String(str_arg(args, 0, "camel_case")?.to_pascal_case()))
}

fn lower_camel_case(args: &[Value]) -> HelperResult {
    Ok(Value::String(
        str_arg(args, 0, "lower_camel_case")?.to_lower_camel_case(),
    ))
}

fn screaming_snake_case(args: &[Value]) -> HelperResult {
    Ok(Value::String(
        str_arg(args, 0, "screaming_snake_case")?.to_shouty_snake_case(),
    ))
}

fn snake_case(args: &[Value]) -> HelperResult {
    Ok(Value::String(str_arg(args, 0, "snake_case")?.to_snake_case()))
}

fn go_field_case(args: &[Value]) -> HelperResult {
    Ok(Value::String(to_go_field_case(str_arg(
        args,
        0,
        "go_field_case",
    )?)))
}

/// `owner_id` -> `Owner<suffix>`; names without an `_id` suffix come back snake_cased
fn with_id_suffix(s: &str, lower: bool, suffix: &str) -> String {
    let snake = s.to_snake_case();
    match snake.strip_suffix("_id") {
        Some(stem) if lower => format!("{}{suffix}", stem.to_lower_camel_case()),
        Some(stem) => format!("{}{suffix}", stem.to_pascal_case()),
        None => snake,
    }
}

fn camel_case_capitalize_id(args: &[Value]) -> HelperResult {
    let s = str_arg(args, 0, "camel_case_capitalize_id")?;
    Ok(Value::String(with_id_suffix(s, false, "ID")))
}

fn lower_camel_case_capitalize_id(args: &[Value]) -> HelperResult {
    let s = str_arg(args, 0, "lower_camel_case_capitalize_id")?;
    Ok(Value::String(with_id_suffix(s, true, "ID")))
}

fn camel_case_no_exceptions(args: &[Value]) -> HelperResult {
    let s = str_arg(args, 0, "camel_case_no_exceptions")?;
    Ok(Value::String(with_id_suffix(s, false, "Id")))
}

fn lower_camel_case_no_exceptions(args: &[Value]) -> HelperResult {
    let s = str_arg(args, 0, "lower_camel_case_no_exceptions")?;
    Ok(Value::String(with_id_suffix(s, true, "Id")))
}

fn add(args: &[Value]) -> HelperResult {
    let int = |idx: usize| {
        args.get(idx)
            .and_then(Value::as_i64)
            .ok_or_else(|| format!("add expects an integer as argument {}", idx + 1))
    };
    int(0)?
        .checked_add(int(1)?)
        .map(Value::from)
        .ok_or_else(|| "add overflowed".to_string())
}

/// String directive of a projected model or field; non-string values read as absent
fn directive_str<'a>(owner: &'a Value, name: &str) -> Option<&'a str> {
    match owner.get("Directives").and_then(|d| d.get(name)) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            warn!(directive = %name, value = %other, "Directive is not a string");
            None
        }
    }
}

fn field_directive(args: &[Value]) -> HelperResult {
    let field = obj_arg(args, 0, "field_directive")?;
    let name = str_arg(args, 1, "field_directive")?;
    let value = directive_str(field, name).unwrap_or_else(|| opt_str_arg(args, 2));
    Ok(Value::String(value.to_string()))
}

fn model_directive(args: &[Value]) -> HelperResult {
    let model = obj_arg(args, 0, "model_directive")?;
    let name = str_arg(args, 1, "model_directive")?;
    let value = directive_str(model, name).unwrap_or_else(|| opt_str_arg(args, 2));
    Ok(Value::String(value.to_string()))
}

fn model_directive_list(args: &[Value]) -> HelperResult {
    let model = obj_arg(args, 0, "model_directive_list")?;
    let name = str_arg(args, 1, "model_directive_list")?;
    let list = match model.get("Directives").and_then(|d| d.get(name)) {
        Some(Value::Array(items)) => items.clone(),
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            warn!(directive = %name, value = %other, "Directive is not a list");
            Vec::new()
        }
    };
    Ok(Value::Array(list))
}

fn tags_contain(field: &Value, tag: &str) -> bool {
    field
        .get("Tags")
        .and_then(Value::as_array)
        .is_some_and(|tags| tags.iter().any(|t| t.get("Name").and_then(Value::as_str) == Some(tag)))
}

fn field_has_tag(args: &[Value]) -> HelperResult {
    let field = obj_arg(args, 0, "field_has_tag")?;
    let tag = str_arg(args, 1, "field_has_tag")?;
    Ok(Value::Bool(tags_contain(field, tag)))
}

fn model_tagged_field_name(args: &[Value]) -> HelperResult {
    let model = obj_arg(args, 0, "model_tagged_field_name")?;
    let tag = str_arg(args, 1, "model_tagged_field_name")?;
    let name = model
        .get("Fields")
        .and_then(Value::as_array)
        .and_then(|fields| fields.iter().find(|f| tags_contain(f, tag)))
        .and_then(|f| f.get("Name"))
        .and_then(Value::as_str)
        .unwrap_or_else(|| opt_str_arg(args, 2));
    Ok(Value::String(name.to_string()))
}

fn graphql_type_for_field(args: &[Value]) -> HelperResult {
    let field = obj_arg(args, 0, "graphql_type_for_field")?;
    if let Some(mask) = directive_str(field, GRAPHQL_TYPE_NAME_MASK) {
        return Ok(Value::String(mask.to_string()));
    }
    let t = field.get("Type").and_then(Value::as_str).unwrap_or_default();
    Ok(Value::String(map_graphql_type(t)))
}

fn graphql_name_for_field(args: &[Value]) -> HelperResult {
    let field = obj_arg(args, 0, "graphql_name_for_field")?;
    if let Some(mask) = directive_str(field, GRAPHQL_FIELD_NAME_MASK) {
        return Ok(Value::String(mask.to_string()));
    }
    let name = field.get("Name").and_then(Value::as_str).unwrap_or_default();
    Ok(Value::String(name.to_lower_camel_case()))
}

/// Register every catalog entry on a Tera instance as a function and a filter
pub fn register_tera(tera: &mut tera::Tera) {
    for func in CATALOG {
        tera.register_function(
            func.name,
            move |args: &HashMap<String, Value>| -> tera::Result<Value> {
                (func.call)(&func.positional_from_named(args)).map_err(tera::Error::msg)
            },
        );
        tera.register_filter(
            func.name,
            move |value: &Value, args: &HashMap<String, Value>| -> tera::Result<Value> {
                (func.call)(&func.positional_from_filter(value, args)).map_err(tera::Error::msg)
            },
        );
    }
}

/// Handlebars adapter for one catalog entry
struct CatalogHelper(&'static TemplateFunction);

impl handlebars::HelperDef for CatalogHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &handlebars::Helper<'rc>,
        _: &'reg handlebars::Handlebars<'reg>,
        _: &'rc handlebars::Context,
        _: &mut handlebars::RenderContext<'reg, 'rc>,
    ) -> Result<handlebars::ScopedJson<'rc>, handlebars::RenderError> {
        let args = self
            .0
            .normalize(h.params().iter().map(|p| p.value().clone()).collect());
        (self.0.call)(&args)
            .map(handlebars::ScopedJson::Derived)
            .map_err(|msg| handlebars::RenderErrorReason::Other(msg).into())
    }
}

/// Register every catalog entry on a Handlebars registry as a helper
pub fn register_handlebars(registry: &mut handlebars::Handlebars<'_>) {
    for func in CATALOG {
        registry.register_helper(func.name, Box::new(CatalogHelper(func)));
    }
}
