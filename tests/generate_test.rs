//! Integration tests for target generation against the Billing fixture

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use codema::core::{Config, ConfigFormat, ConfigLoader};
use codema::generation::{ErrorKind, GenerationError, Generator, Plugin, TargetSelection};
use codema::infrastructure::plugins::{CommandPlugin, PluginRegistry};
use codema::infrastructure::shell::{CommandExecutor, CommandResult};
use tempfile::TempDir;

const GO_MODEL_TEMPLATE: &str = r#"package {{ Api.Package }}

// {{ Microservice.PrimaryModel.Name }} owned through {{#owner}}
type {{ @PM.Name }} struct {
{% for f in Microservice.PrimaryModel.Fields %}	{{ f.NameCamel }} {{ f.Type | go_type }}
{% endfor %}}
/* FUNCTION_IMPLEMENTATIONS */
"#;

/// Billing API with `Invoice` and `Payment` and a `go-models` target
fn billing_yaml(out_dir: &Path, target_extra: &str) -> String {
    format!(
        r#"
templateDir: templates
apis:
  - label: Billing
    package: billing
    microservices:
      - label: Invoice
        primaryModel:
          name: Invoice
          fields:
            - name: id
              type: ID
            - name: ownerId
              type: ID
              tags:
                - name: owner
                  type: OWNER
            - name: total
              type: Float
        functionImplementations:
          - function:
              name: sendInvoice
            targetSnippets:
              go-models:
                contentPath: snippets/send_invoice.go
      - label: Payment
        primaryModel:
          name: Payment
          fields:
            - name: id
              type: ID
            - name: ownerId
              type: ID
              tags:
                - name: owner
                  type: OWNER
targets:
  - label: go-models
    templateDir: models
    defaultVersion: v1
{target_extra}
    apis:
      - label: Billing
        outPath: '{out}/{{{{ Microservice.LabelSnake }}}}.go'
"#,
        out = out_dir.display(),
    )
}

struct Fixture {
    _root: TempDir,
    templates: PathBuf,
    out: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let templates = root.path().join("templates");
        let out = root.path().join("out");
        fs::create_dir_all(templates.join("models")).unwrap();
        fs::create_dir_all(templates.join("snippets")).unwrap();
        fs::write(templates.join("models/v1.template"), GO_MODEL_TEMPLATE).unwrap();
        fs::write(
            templates.join("snippets/send_invoice.go"),
            "func Send{{ Microservice.PrimaryModel.Name }}() {}\n",
        )
        .unwrap();
        Self {
            _root: root,
            templates,
            out,
        }
    }

    fn config(&self, target_extra: &str) -> Config {
        ConfigLoader::parse(&billing_yaml(&self.out, target_extra), ConfigFormat::Yaml)
            .expect("Billing config should parse")
    }

    fn run(&self, config: &Config) -> codema::generation::Result<usize> {
        Generator::new(config, &self.templates)?
            .run(&TargetSelection::All)
            .map(|summary| summary.file_count)
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.out.join(name)).expect("generated file should exist")
    }
}

#[cfg(unix)]
fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o777
}

#[test]
fn test_billing_each_mode_writes_one_file_per_microservice() {
    let fixture = Fixture::new();
    let config = fixture.config("    each: true");

    assert_eq!(fixture.run(&config).unwrap(), 2);

    let invoice = fixture.read("invoice.go");
    assert!(invoice.starts_with("package billing"));
    assert!(invoice.contains("// Invoice owned through ownerId"));
    assert!(invoice.contains("type Invoice struct {"));
    assert!(invoice.contains("\tOwnerId string\n"));
    assert!(invoice.contains("\tTotal float64\n"));

    let payment = fixture.read("payment.go");
    assert!(payment.contains("type Payment struct {"));

    let mut entries: Vec<_> = fs::read_dir(&fixture.out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["invoice.go", "payment.go"]);

    #[cfg(unix)]
    {
        assert_eq!(mode_of(&fixture.out.join("invoice.go")), 0o444);
        assert_eq!(mode_of(&fixture.out.join("payment.go")), 0o444);
    }
}

#[test]
fn test_skip_labels_reduce_each_mode_file_count() {
    let fixture = Fixture::new();
    let mut config = fixture.config("    each: true");
    config.targets[0].apis[0].skip_labels = vec!["Payment".into()];

    assert_eq!(fixture.run(&config).unwrap(), 1);
    assert!(fixture.out.join("invoice.go").exists());
    assert!(!fixture.out.join("payment.go").exists());
}

#[test]
fn test_single_mode_writes_one_file_per_api() {
    let fixture = Fixture::new();
    fs::write(
        fixture.templates.join("models/v1.template"),
        concat!(
            "{% for ms in Api.Microservices %}{{ ms.LabelKebab }};{% endfor %}",
            " /* FUNCTION_IMPLEMENTATIONS */",
        ),
    )
    .unwrap();
    let mut config = fixture.config("    each: false");
    config.targets[0].apis[0].out_path =
        format!("{}/{{{{ Api.LabelSnake }}}}.txt", fixture.out.display());

    assert_eq!(fixture.run(&config).unwrap(), 1);
    // no microservice in scope, so the marker collapses without content
    assert_eq!(fixture.read("billing.txt"), "invoice;payment;");
}

#[test]
fn test_snippet_markers_are_closed() {
    let fixture = Fixture::new();
    let config = fixture.config("    each: true");
    fixture.run(&config).unwrap();

    let invoice = fixture.read("invoice.go");
    assert_eq!(invoice.matches("func SendInvoice() {}").count(), 1);
    assert!(!invoice.contains("FUNCTION_IMPLEMENTATIONS"));

    let payment = fixture.read("payment.go");
    assert!(!payment.contains("func Send"));
    assert!(!payment.contains("FUNCTION_IMPLEMENTATIONS"));
}

#[test]
fn test_generation_is_idempotent() {
    let fixture = Fixture::new();
    let config = fixture.config("    each: true");

    fixture.run(&config).unwrap();
    let first = fixture.read("invoice.go");
    fixture.run(&config).unwrap();

    assert_eq!(fixture.read("invoice.go"), first);
}

#[cfg(unix)]
#[test]
fn test_configured_file_mode_is_applied() {
    let fixture = Fixture::new();
    let config = fixture.config("    each: true\n    options:\n      fileMode: \"0644\"");

    fixture.run(&config).unwrap();
    assert_eq!(mode_of(&fixture.out.join("invoice.go")), 0o644);
}

#[test]
fn test_target_api_version_wins_over_default() {
    let fixture = Fixture::new();
    fs::write(fixture.templates.join("models/v2.tera"), "v2 {{ Microservice.Label }}").unwrap();
    let mut config = fixture.config("    each: true");
    config.targets[0].apis[0].version = "v2".into();

    fixture.run(&config).unwrap();
    assert_eq!(fixture.read("invoice.go"), "v2 Invoice");
}

#[test]
fn test_missing_version_is_fatal() {
    let fixture = Fixture::new();
    let mut config = fixture.config("    each: true");
    config.targets[0].default_version.clear();

    let err = fixture.run(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VersionUnresolved);
    assert!(err.to_string().contains("go-models"));
    assert!(err.to_string().contains("Billing"));
    assert!(!fixture.out.exists());
}

#[test]
fn test_handlebars_template_is_selected_by_extension() {
    let fixture = Fixture::new();
    fs::remove_file(fixture.templates.join("models/v1.template")).unwrap();
    fs::write(
        fixture.templates.join("models/v1.hbs"),
        concat!(
            "{{Microservice.PrimaryModel.NameSnake}}:",
            "{{#each Microservice.PrimaryModel.Fields}} {{NameCamel}}={{go_type Type}}{{/each}}",
        ),
    )
    .unwrap();
    let config = fixture.config("    each: true");

    fixture.run(&config).unwrap();
    assert_eq!(
        fixture.read("payment.go"),
        "payment: Id=string OwnerId=string"
    );
}

struct RejectingPlugin;

impl Plugin for RejectingPlugin {
    fn name(&self) -> &str {
        "Rejecting"
    }

    fn pre_write_file(&self, path: &Path, _content: String) -> Result<String, GenerationError> {
        Err(GenerationError::plugin("Rejecting", path, "syntax error"))
    }
}

#[test]
fn test_plugin_failure_leaves_no_file() {
    let fixture = Fixture::new();
    let config = fixture.config("    each: true");

    let mut plugins = PluginRegistry::new();
    plugins.register("go-models", Arc::new(RejectingPlugin));

    let err = Generator::new(&config, &fixture.templates)
        .unwrap()
        .with_plugins(plugins)
        .run(&TargetSelection::All)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PluginFailure);
    assert!(!fixture.out.join("invoice.go").exists());
    assert!(!fixture.out.join("payment.go").exists());
}

/// Echoes stdin back and records the working directory of every call
#[derive(Default)]
struct RecordingExecutor {
    working_dirs: Mutex<Vec<PathBuf>>,
}

impl CommandExecutor for RecordingExecutor {
    fn execute(
        &self,
        _program: &str,
        _args: &[&str],
        stdin: &str,
        working_dir: &Path,
    ) -> Result<CommandResult, GenerationError> {
        self.working_dirs.lock().unwrap().push(working_dir.to_path_buf());
        Ok(CommandResult {
            exit_code: 0,
            stdout: format!("{stdin}// formatted in {}\n", working_dir.display()),
            stderr: String::new(),
        })
    }
}

#[test]
fn test_plugins_run_in_output_directory_on_fresh_tree() {
    let fixture = Fixture::new();
    let config = fixture.config("    each: true");
    let executor = Arc::new(RecordingExecutor::default());

    let run = || {
        let mut plugins = PluginRegistry::new();
        plugins.register(
            "go-models",
            Arc::new(CommandPlugin::new("Fmt", "fmt", &[], executor.clone())),
        );
        Generator::new(&config, &fixture.templates)
            .unwrap()
            .with_plugins(plugins)
            .run(&TargetSelection::All)
            .unwrap();
    };

    assert!(!fixture.out.exists());
    run();
    let first = fixture.read("invoice.go");
    run();

    assert_eq!(fixture.read("invoice.go"), first);
    assert!(first.contains(&format!("// formatted in {}", fixture.out.display())));

    let working_dirs = executor.working_dirs.lock().unwrap();
    assert_eq!(working_dirs.len(), 4);
    assert!(working_dirs.iter().all(|dir| dir == &fixture.out));
}

#[test]
fn test_unknown_plugin_is_rejected_at_startup() {
    let fixture = Fixture::new();
    let config = fixture.config("    each: true\n    plugins: [Prettier]");

    let err = Generator::new(&config, &fixture.templates).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_undefined_targets_are_reported() {
    let fixture = Fixture::new();
    let config = fixture.config("    each: true");

    let summary = Generator::new(&config, &fixture.templates)
        .unwrap()
        .run(&TargetSelection::parse("go-models,ts-types"))
        .unwrap();

    assert_eq!(summary.file_count, 2);
    assert_eq!(summary.rendered_targets, vec!["go-models"]);
    assert_eq!(summary.undefined_targets, vec!["ts-types"]);
}
