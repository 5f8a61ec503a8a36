//! Model builder: processed tables → model entities.
//!
//! The output shape is fixed when the builder is created:
//!
//! - [`ModelType::Containers`]: generic entity properties are partitioned into
//!   numeric-range groups, tag and equipment class properties are folded into
//!   their denormalization anchor, and every first-class citizen keeps its own
//!   container. The reserved `EntityTypeGroup` container is always added.
//! - [`ModelType::Views`]: every entity with in-model properties becomes a view
//!   holding the properties it does not inherit.
//!
//! Consistency failures abort the build; there is no partial model.

mod containers;
mod rows;
mod views;

use cfihos_ingest::MappingContext;
use cfihos_model::{ModelEntities, Result};

use crate::collect::ProcessedTables;
use crate::config::ModelType;
use crate::partition::PropertyPartitioner;

#[derive(Debug, Clone)]
pub struct ModelBuilder<'a> {
    model_type: ModelType,
    partitioner: &'a PropertyPartitioner,
    context: &'a MappingContext,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(
        model_type: ModelType,
        partitioner: &'a PropertyPartitioner,
        context: &'a MappingContext,
    ) -> Self {
        Self {
            model_type,
            partitioner,
            context,
        }
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn build(&self, tables: &ProcessedTables) -> Result<ModelEntities> {
        match self.model_type {
            ModelType::Containers => containers::build(tables, self.partitioner),
            ModelType::Views => views::build(tables, self.partitioner, self.context),
        }
    }
}
