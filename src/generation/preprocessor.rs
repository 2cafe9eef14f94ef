//! Macro preprocessing of raw template text.
//!
//! Three macro families are rewritten before a template reaches its renderer,
//! each by its own single left-to-right scan, in this order:
//!
//! 1. `#tagName` inside a `{{ ... }}` expression becomes the name of the primary
//!    model field carrying that tag. When the shorthand is the whole expression
//!    the expression itself is replaced, otherwise only `#tagName` is.
//! 2. `@Tags.name` becomes the quoted tag name when the tag is registered. The
//!    first unknown name becomes `"TAG_NOT_FOUND"` and ends resolution for any
//!    name not already seen.
//! 3. `@PM` and `@PrimaryModel` become `Microservice.PrimaryModel`.
//!
//! A scan never revisits its own output.

use std::collections::HashSet;

use tracing::warn;

use crate::core::{ModelDefinition, TagRegistry};

/// Replacement for the first unresolved `@Tags.` reference
pub const TAG_NOT_FOUND: &str = "\"TAG_NOT_FOUND\"";

/// Context path substituted for the primary-model alias
pub const PRIMARY_MODEL_PATH: &str = "Microservice.PrimaryModel";

const TAGS_PREFIX: &str = "@Tags.";

/// Runs all three macro passes against one registry
pub struct MacroPreprocessor<'a> {
    tags: &'a TagRegistry,
}

impl<'a> MacroPreprocessor<'a> {
    pub fn new(tags: &'a TagRegistry) -> Self {
        Self { tags }
    }

    /// Expand macros for a template rendered against `primary_model`, or against
    /// no microservice at all when `None`
    pub fn preprocess(&self, template: &str, primary_model: Option<&ModelDefinition>) -> String {
        let expanded = expand_tag_shorthand(template, primary_model);
        let resolved = resolve_tag_references(&expanded, self.tags);
        expand_primary_model_alias(&resolved)
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Length of the leading run of word characters
fn word_len(s: &str) -> usize {
    s.find(|c: char| !is_word(c)).unwrap_or(s.len())
}

/// Byte offsets of `#` characters in an expression body that sit outside string
/// literals and start a tag name
fn shorthand_positions(body: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match quote {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' | '`' => quote = Some(c),
                '#' if word_len(&body[i + 1..]) > 0 => positions.push(i),
                _ => {}
            },
        }
    }
    positions
}

/// Offset of the `}}` closing an expression whose body starts at `s`, skipping
/// string literals
fn expression_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '}' if s[i..].starts_with("}}") => return Some(i),
            _ => {}
        }
    }
    None
}

/// Whitespace and whitespace-control markers around an expression body
fn is_trim_marker(c: char) -> bool {
    c.is_whitespace() || c == '~' || c == '-'
}

fn tagged_field_name<'m>(model: Option<&'m ModelDefinition>, tag: &str) -> Option<&'m str> {
    model
        .and_then(|m| m.tagged_field(tag))
        .map(|f| f.name.as_str())
}

/// Pass 1: `#tagName` shorthand inside `{{ ... }}`
pub fn expand_tag_shorthand(template: &str, primary_model: Option<&ModelDefinition>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let body_start = open + 2;
        let Some(body_len) = expression_end(&rest[body_start..]) else {
            break;
        };
        let body_end = body_start + body_len;
        let expression = &rest[open..body_end + 2];
        let body = &rest[body_start..body_end];

        out.push_str(&rest[..open]);
        out.push_str(&rewrite_expression(expression, body, primary_model));
        rest = &rest[body_end + 2..];
    }
    out.push_str(rest);
    out
}

fn rewrite_expression(expression: &str, body: &str, model: Option<&ModelDefinition>) -> String {
    let positions = shorthand_positions(body);
    let Some(&first) = positions.first() else {
        return expression.to_string();
    };

    let leading = body[..first].trim_matches(is_trim_marker).is_empty();
    if leading {
        let name_len = word_len(&body[first + 1..]);
        let tag = &body[first + 1..first + 1 + name_len];
        let trailing = &body[first + 1 + name_len..];

        // `{{#each Fields}}` and friends are block helpers, not shorthands
        if !trailing.trim_matches(is_trim_marker).is_empty() {
            return expression.to_string();
        }

        return match tagged_field_name(model, tag) {
            Some(field) => field.to_string(),
            None => {
                warn_unresolved_shorthand(tag, model);
                expression.to_string()
            }
        };
    }

    let mut rewritten = String::with_capacity(body.len());
    let mut cursor = 0;
    for pos in positions {
        let name_len = word_len(&body[pos + 1..]);
        let tag = &body[pos + 1..pos + 1 + name_len];
        rewritten.push_str(&body[cursor..pos]);
        match tagged_field_name(model, tag) {
            Some(field) => rewritten.push_str(field),
            None => {
                warn_unresolved_shorthand(tag, model);
                rewritten.push_str(&body[pos..pos + 1 + name_len]);
            }
        }
        cursor = pos + 1 + name_len;
    }
    rewritten.push_str(&body[cursor..]);
    format!("{{{{{rewritten}}}}}")
}

fn warn_unresolved_shorthand(tag: &str, model: Option<&ModelDefinition>) {
    warn!(
        tag = %tag,
        model = %model.map(|m| m.name.as_str()).unwrap_or_default(),
        "Got no field for tag"
    );
}

/// Pass 2: `@Tags.name` references
pub fn resolve_tag_references(template: &str, tags: &TagRegistry) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut resolved: HashSet<&str> = HashSet::new();
    let mut missing: Option<&str> = None;

    while let Some(at) = rest.find(TAGS_PREFIX) {
        let name_start = at + TAGS_PREFIX.len();
        let name_len = word_len(&rest[name_start..]);
        out.push_str(&rest[..at]);

        if name_len == 0 {
            out.push_str(TAGS_PREFIX);
            rest = &rest[name_start..];
            continue;
        }

        let name = &rest[name_start..name_start + name_len];
        let reference = &rest[at..name_start + name_len];

        match missing {
            None => {
                if tags.lookup(name).is_sentinel() {
                    warn!(tag = %name, "Tag not found");
                    missing = Some(name);
                    out.push_str(TAG_NOT_FOUND);
                } else {
                    resolved.insert(name);
                    out.push('"');
                    out.push_str(name);
                    out.push('"');
                }
            }
            Some(first_missing) if first_missing == name => out.push_str(TAG_NOT_FOUND),
            Some(_) if resolved.contains(name) => {
                out.push('"');
                out.push_str(name);
                out.push('"');
            }
            Some(first_missing) => {
                warn!(
                    tag = %name,
                    missing = %first_missing,
                    "Tag reference left unresolved after an earlier missing tag"
                );
                out.push_str(reference);
            }
        }
        rest = &rest[name_start + name_len..];
    }
    out.push_str(rest);
    out
}

/// Pass 3: `@PM` / `@PrimaryModel` alias
pub fn expand_primary_model_alias(template: &str) -> String {
    const ALIASES: [&str; 2] = ["@PrimaryModel", "@PM"];

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(at) = rest.find('@') {
        out.push_str(&rest[..at]);
        let candidate = &rest[at..];
        let alias = ALIASES.iter().find(|alias| {
            candidate.starts_with(**alias)
                && !candidate[alias.len()..].starts_with(is_word)
        });
        match alias {
            Some(alias) => {
                out.push_str(PRIMARY_MODEL_PATH);
                rest = &candidate[alias.len()..];
            }
            None => {
                out.push('@');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
