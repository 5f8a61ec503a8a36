//! Validated processor configuration.
//!
//! The raw JSON object is checked for every required key before typed
//! deserialization, so a config missing several keys reports all of them at once.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use cfihos_ingest::SourceConfig;
use cfihos_model::constants::CONTAINER_PROPERTY_LIMIT;
use cfihos_model::{CfihosError, Result};

/// Output shape of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Wide sparse containers plus one container per first-class citizen.
    Containers,
    /// One view per entity with inherited properties removed.
    Views,
}

impl std::str::FromStr for ModelType {
    type Err = CfihosError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "containers" => Ok(ModelType::Containers),
            "views" => Ok(ModelType::Views),
            other => Err(CfihosError::InvalidModelType(other.to_string())),
        }
    }
}

/// Which entities a views model includes besides first-class citizens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeConfig {
    All,
    Tags,
    Equipment,
    Scoped,
}

/// A named subset of entities published as its own views model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewScope {
    pub scope_name: String,
    pub scope_model_external_id: String,
    pub scope_model_version: String,
    #[serde(default)]
    pub scope_description: Option<String>,
    /// Entity storage ids selected when `scope_config` is `Scoped`.
    #[serde(default)]
    pub scope_subset: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Ordered list of `{ <processor name>: SourceConfig }` entries.
    pub model_processors_config: Vec<BTreeMap<String, SourceConfig>>,
    /// Passed through untouched to emission.
    pub containers_indexes: Value,
    pub container_data_model_space: String,
    pub views_data_model_space: String,
    pub model_version: String,
    pub model_creator: String,
    pub data_model_name: String,
    pub data_model_description: String,
    pub data_model_external_id: String,
    pub dms_identifier: String,
    pub scope_config: ScopeConfig,
    pub processor_type: String,

    #[serde(default)]
    pub model_type: String,
    #[serde(default)]
    pub scopes: Vec<ViewScope>,
    #[serde(default)]
    pub scope_name: Option<String>,
    /// Configured denormalization anchors, CFIHOS codes without the T/E letter.
    #[serde(default)]
    pub root_nodes_list: Vec<String>,
    #[serde(default = "default_property_limit")]
    pub container_property_limit: u64,
    #[serde(default)]
    pub add_scalar_properties_for_direct_relations: bool,
    /// Processor names in mapping merge order; configuration order when empty.
    #[serde(default)]
    pub mapping_merge_order: Vec<String>,
}

fn default_property_limit() -> u64 {
    CONTAINER_PROPERTY_LIMIT
}

impl ProcessorConfig {
    pub const REQUIRED_KEYS: [&'static str; 12] = [
        "model_processors_config",
        "containers_indexes",
        "container_data_model_space",
        "views_data_model_space",
        "model_version",
        "model_creator",
        "data_model_name",
        "data_model_description",
        "data_model_external_id",
        "dms_identifier",
        "scope_config",
        "processor_type",
    ];

    /// Check required keys, deserialize and validate.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = &value else {
            return Err(CfihosError::InvalidConfig(
                "configuration must be a JSON object".into(),
            ));
        };
        let missing: Vec<String> = Self::REQUIRED_KEYS
            .iter()
            .filter(|k| !map.contains_key(**k))
            .map(|k| k.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(CfihosError::MissingConfigKeys(missing));
        }

        let config: ProcessorConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("parsing configuration {}", path.display()))?;
        let config = Self::from_value(value)
            .with_context(|| format!("validating configuration {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let model_type = self.model_type()?;
        if model_type == ModelType::Views {
            match self.scope_name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => {
                    self.scope(name)?;
                }
                _ => {
                    return Err(CfihosError::InvalidConfig(
                        "scope cannot be None or empty string when model_type is 'views'".into(),
                    ))
                }
            }
        }
        if self.container_property_limit == 0 {
            return Err(CfihosError::InvalidConfig(
                "container_property_limit must be positive".into(),
            ));
        }

        let names: Vec<&str> = self.processor_entries().map(|(n, _)| n).collect();
        let unique: BTreeSet<&str> = names.iter().copied().collect();
        if unique.len() != names.len() {
            return Err(CfihosError::InvalidConfig(
                "model processor names must be unique".into(),
            ));
        }
        for name in &self.mapping_merge_order {
            if !unique.contains(name.as_str()) {
                return Err(CfihosError::InvalidConfig(format!(
                    "mapping_merge_order names unknown processor '{name}'"
                )));
            }
        }
        Ok(())
    }

    pub fn model_type(&self) -> Result<ModelType> {
        if self.model_type.trim().is_empty() {
            return Err(CfihosError::InvalidConfig(
                "model_type cannot be None or empty string".into(),
            ));
        }
        self.model_type.parse()
    }

    pub fn scope(&self, name: &str) -> Result<&ViewScope> {
        self.scopes
            .iter()
            .find(|s| s.scope_name == name)
            .ok_or_else(|| CfihosError::ScopeNotFound(name.to_string()))
    }

    /// The scope selected by `scope_name`, if any.
    pub fn active_scope(&self) -> Result<Option<&ViewScope>> {
        match self.scope_name.as_deref() {
            Some(name) if !name.trim().is_empty() => self.scope(name.trim()).map(Some),
            _ => Ok(None),
        }
    }

    /// Processor entries in configuration order.
    pub fn processor_entries(&self) -> impl Iterator<Item = (&str, &SourceConfig)> + '_ {
        self.model_processors_config
            .iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Processor names in the order their mapping tables are merged.
    pub fn merge_order(&self) -> Vec<String> {
        let mut order: Vec<String> = self.mapping_merge_order.clone();
        for (name, _) in self.processor_entries() {
            if !order.iter().any(|n| n == name) {
                order.push(name.to_string());
            }
        }
        order
    }
}
