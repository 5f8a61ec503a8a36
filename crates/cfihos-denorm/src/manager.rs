//! Model managers: configuration in, model entities plus metadata out.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cfihos_ingest::SheetReader;
use cfihos_model::{CfihosError, ModelEntities};

use crate::config::{ModelType, ProcessorConfig, ViewScope};
use crate::pipeline::Pipeline;
use crate::scope::collect_model_subset;

/// Identifiers of the produced data model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub space: String,
    pub external_id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub creator: String,
}

/// Handoff to emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResult {
    pub entities: ModelEntities,
    pub metadata: ModelMetadata,
}

/// Known model managers, selected by `processor_type`.
#[derive(Debug, Clone)]
pub enum CfihosManager {
    /// Sparse property groups, either as containers or as scoped views.
    Sparse(ProcessorConfig),
}

impl CfihosManager {
    pub fn from_config(config: ProcessorConfig) -> cfihos_model::Result<Self> {
        match config.processor_type.trim() {
            "sparse" => Ok(CfihosManager::Sparse(config)),
            other => Err(CfihosError::UnknownProcessorType(other.to_string())),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        match self {
            CfihosManager::Sparse(config) => config,
        }
    }

    /// Index definitions for emission, as configured.
    pub fn containers_indexes(&self) -> &Value {
        &self.config().containers_indexes
    }

    pub fn dms_identifier(&self) -> &str {
        &self.config().dms_identifier
    }

    pub fn read(&self, reader: &dyn SheetReader) -> Result<ReadResult> {
        match self {
            CfihosManager::Sparse(config) => read_sparse(config, reader),
        }
    }
}

fn read_sparse(config: &ProcessorConfig, reader: &dyn SheetReader) -> Result<ReadResult> {
    let output = Pipeline::new(config, reader).run()?;
    match config.model_type()? {
        ModelType::Containers => {
            tracing::info!(containers = output.entities.len(), "built containers model");
            Ok(ReadResult {
                entities: output.entities,
                metadata: containers_metadata(config),
            })
        }
        ModelType::Views => {
            let scope = config.active_scope()?.ok_or_else(|| {
                CfihosError::InvalidConfig(
                    "scope cannot be None or empty string when model_type is 'views'".into(),
                )
            })?;
            tracing::info!(scope = %scope.scope_name, "building scoped views model");
            let entities = collect_model_subset(
                &output.entities,
                config.scope_config,
                &scope.scope_subset,
                &config.container_data_model_space,
            );
            Ok(ReadResult {
                entities,
                metadata: views_metadata(config, scope),
            })
        }
    }
}

fn containers_metadata(config: &ProcessorConfig) -> ModelMetadata {
    ModelMetadata {
        space: config.container_data_model_space.clone(),
        external_id: config.data_model_external_id.clone(),
        name: config.data_model_name.clone(),
        description: config.data_model_description.clone(),
        version: config.model_version.clone(),
        creator: config.model_creator.clone(),
    }
}

/// `CFIHOS_` + upper-cased identifier with spaces and dashes turned into `_`.
fn scoped_identifier(raw: &str) -> String {
    format!("CFIHOS_{}", raw.replace([' ', '-'], "_").to_uppercase())
}

fn views_metadata(config: &ProcessorConfig, scope: &ViewScope) -> ModelMetadata {
    ModelMetadata {
        space: config.views_data_model_space.clone(),
        external_id: scoped_identifier(&scope.scope_model_external_id),
        name: scoped_identifier(&scope.scope_name),
        description: scope.scope_description.clone().unwrap_or_default(),
        version: scope.scope_model_version.clone(),
        creator: config.model_creator.clone(),
    }
}
