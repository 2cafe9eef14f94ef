//! Tag and model lookup tables built once before generation.
//!
//! Both registries share the same contract: `register` fails loudly on a duplicate
//! name, `lookup` never fails and hands back an empty-named sentinel when the name
//! is unknown. Macro resolution checks for the sentinel instead of matching on
//! errors.

use std::collections::HashMap;

use tracing::debug;

use super::config::{Config, ModelDefinition, TagDefinition};
use super::error::{Error, Result};

#[derive(Debug, Default)]
pub struct TagRegistry {
    tags: HashMap<String, TagDefinition>,
    sentinel: TagDefinition,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: TagDefinition) -> Result<()> {
        if self.tags.contains_key(&tag.name) {
            return Err(Error::duplicate("Tag", tag.name));
        }
        self.tags.insert(tag.name.clone(), tag);
        Ok(())
    }

    /// Registered tag, or the empty sentinel
    pub fn lookup(&self, name: &str) -> &TagDefinition {
        self.tags.get(name).unwrap_or(&self.sentinel)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelDefinition>,
    sentinel: ModelDefinition,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model: ModelDefinition) -> Result<()> {
        if self.models.contains_key(&model.name) {
            return Err(Error::duplicate("Model", model.name));
        }
        debug!(model = %model.name, "Registered model");
        self.models.insert(model.name.clone(), model);
        Ok(())
    }

    /// Registered model, or the empty sentinel
    pub fn lookup(&self, name: &str) -> &ModelDefinition {
        self.models.get(name).unwrap_or(&self.sentinel)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Both registries, filled by a single scan over every API
#[derive(Debug, Default)]
pub struct Registries {
    pub tags: TagRegistry,
    pub models: ModelRegistry,
}

impl Registries {
    /// Scan all APIs and register every model and every field tag.
    ///
    /// The same model or tag is commonly declared in several places; a declaration
    /// identical to the registered one is skipped, a conflicting one is a
    /// `DuplicateKey` error.
    pub fn build(config: &Config) -> Result<Self> {
        let mut registries = Self::default();

        for api in &config.apis {
            for ms in &api.microservices {
                for model in ms.models() {
                    registries.add_model(model)?;
                    for field in &model.fields {
                        for tag in &field.tags {
                            registries.add_tag(tag)?;
                        }
                    }
                }
            }
        }

        debug!(
            tags = registries.tags.len(),
            models = registries.models.len(),
            "Built registries"
        );
        Ok(registries)
    }

    fn add_model(&mut self, model: &ModelDefinition) -> Result<()> {
        if self.models.lookup(&model.name) == model {
            return Ok(());
        }
        self.models.register(model.clone())
    }

    fn add_tag(&mut self, tag: &TagDefinition) -> Result<()> {
        if self.tags.lookup(&tag.name) == tag {
            return Ok(());
        }
        self.tags.register(tag.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{
        ApiDefinition, FieldDefinition, MicroserviceDefinition, TagType,
    };

    fn model(name: &str, tags: &[TagDefinition]) -> ModelDefinition {
        ModelDefinition {
            name: name.to_string(),
            fields: vec![FieldDefinition {
                name: "ownerId".to_string(),
                field_type: "ID".to_string(),
                tags: tags.to_vec(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn config_with(models: Vec<ModelDefinition>) -> Config {
        Config {
            apis: vec![ApiDefinition {
                label: "Billing".to_string(),
                microservices: models
                    .into_iter()
                    .enumerate()
                    .map(|(i, m)| MicroserviceDefinition {
                        label: format!("ms{i}"),
                        primary_model: m,
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_tag_register_and_lookup() {
        let mut reg = TagRegistry::new();
        reg.register(TagDefinition::new("owner", TagType::Owner)).unwrap();

        assert_eq!(reg.lookup("owner").tag_type, TagType::Owner);
        assert!(reg.lookup("missing").is_sentinel());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_tag_register_duplicate_fails() {
        let mut reg = TagRegistry::new();
        reg.register(TagDefinition::new("owner", TagType::Owner)).unwrap();
        let err = reg
            .register(TagDefinition::new("owner", TagType::Owner))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { kind: "Tag", .. }));
    }

    #[test]
    fn test_model_register_and_lookup() {
        let mut reg = ModelRegistry::new();
        reg.register(model("Invoice", &[])).unwrap();

        assert_eq!(reg.lookup("Invoice").fields.len(), 1);
        assert!(reg.lookup("Payment").is_sentinel());
        assert!(reg.register(model("Invoice", &[])).is_err());
    }

    #[test]
    fn test_build_skips_identical_declarations() {
        let owner = TagDefinition::new("owner", TagType::Owner);
        let config = config_with(vec![
            model("Invoice", &[owner.clone()]),
            model("Payment", &[owner.clone()]),
            model("Invoice", &[owner]),
        ]);

        let registries = Registries::build(&config).unwrap();
        assert_eq!(registries.tags.len(), 1);
        assert_eq!(registries.models.len(), 2);
    }

    #[test]
    fn test_build_rejects_conflicting_tag() {
        let config = config_with(vec![
            model("Invoice", &[TagDefinition::new("owner", TagType::Owner)]),
            model("Payment", &[TagDefinition::new("owner", TagType::Parent)]),
        ]);

        let err = Registries::build(&config).unwrap_err();
        assert_eq!(err.to_string(), "Tag with name owner already registered");
    }

    #[test]
    fn test_build_rejects_conflicting_model() {
        let mut other = model("Invoice", &[]);
        other.description = "different".to_string();
        let config = config_with(vec![model("Invoice", &[]), other]);

        assert!(matches!(
            Registries::build(&config),
            Err(Error::DuplicateKey { kind: "Model", .. })
        ));
    }
}
