//! String and path utilities shared by templates and output paths

use std::borrow::Cow;
use std::path::PathBuf;

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENV_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("env var pattern is valid")
});

/// Naming conventions exposed to templates as `<Prefix><Case>` keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCase {
    Kebab,
    Camel,
    LowerCamel,
    Screaming,
    ScreamingSnake,
    Snake,
}

impl NameCase {
    pub const ALL: [NameCase; 6] = [
        NameCase::Kebab,
        NameCase::Camel,
        NameCase::LowerCamel,
        NameCase::Screaming,
        NameCase::ScreamingSnake,
        NameCase::Snake,
    ];

    /// Key suffix, e.g. `LabelSnake`
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Kebab => "Kebab",
            Self::Camel => "Camel",
            Self::LowerCamel => "LowerCamel",
            Self::Screaming => "Screaming",
            Self::ScreamingSnake => "ScreamingSnake",
            Self::Snake => "Snake",
        }
    }

    pub fn apply(&self, s: &str) -> String {
        match self {
            Self::Kebab => s.to_kebab_case(),
            Self::Camel => s.to_pascal_case(),
            Self::LowerCamel => s.to_lower_camel_case(),
            Self::Screaming => s.to_uppercase(),
            Self::ScreamingSnake => s.to_shouty_snake_case(),
            Self::Snake => s.to_snake_case(),
        }
    }
}

/// Go-style exported field name: `ownerId` becomes `OwnerID`
pub fn to_go_field_case(s: &str) -> String {
    let pascal = s.to_pascal_case();
    match pascal.strip_suffix("Id") {
        Some(stem) => format!("{stem}ID"),
        None => pascal,
    }
}

/// Expand `~` to the home directory and `$VAR` / `${VAR}` to environment values.
///
/// Undefined variables expand to the empty string.
pub fn expand_path(raw: &str) -> PathBuf {
    let with_home: Cow<'_, str> = match dirs::home_dir() {
        Some(home) if raw.contains('~') => Cow::Owned(raw.replace('~', &home.to_string_lossy())),
        _ => Cow::Borrowed(raw),
    };

    let expanded = ENV_VAR.replace_all(&with_home, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        std::env::var(name).unwrap_or_default()
    });

    PathBuf::from(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_cases() {
        assert_eq!(NameCase::Kebab.apply("LineItem"), "line-item");
        assert_eq!(NameCase::Camel.apply("line_item"), "LineItem");
        assert_eq!(NameCase::LowerCamel.apply("LineItem"), "lineItem");
        assert_eq!(NameCase::Screaming.apply("LineItem"), "LINEITEM");
        assert_eq!(NameCase::ScreamingSnake.apply("LineItem"), "LINE_ITEM");
        assert_eq!(NameCase::Snake.apply("LineItem"), "line_item");
    }

    #[test]
    fn test_go_field_case() {
        assert_eq!(to_go_field_case("ownerId"), "OwnerID");
        assert_eq!(to_go_field_case("owner_id"), "OwnerID");
        assert_eq!(to_go_field_case("name"), "Name");
        assert_eq!(to_go_field_case("identity"), "Identity");
    }

    #[test]
    #[allow(unsafe_code)] // set_var is unsafe in edition 2024
    fn test_expand_path_env() {
        // SAFETY: tests in this module do not read this variable concurrently
        unsafe { std::env::set_var("CODEMA_TEST_OUT", "/tmp/out") };
        assert_eq!(
            expand_path("$CODEMA_TEST_OUT/a.go"),
            PathBuf::from("/tmp/out/a.go")
        );
        assert_eq!(
            expand_path("${CODEMA_TEST_OUT}/b.go"),
            PathBuf::from("/tmp/out/b.go")
        );
        assert_eq!(
            expand_path("$CODEMA_TEST_UNDEFINED_VAR/c.go"),
            PathBuf::from("/c.go")
        );
    }

    #[test]
    fn test_expand_path_home() {
        let home = dirs::home_dir().expect("home dir");
        assert_eq!(expand_path("~/gen/x.go"), home.join("gen/x.go"));
        assert_eq!(expand_path("./plain.go"), PathBuf::from("./plain.go"));
    }
}
