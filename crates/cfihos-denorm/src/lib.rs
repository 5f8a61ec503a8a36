//! CFIHOS denormalization engine.
//!
//! Turns the merged tables of every configured CFIHOS source into a bounded set
//! of model entities:
//!
//! ```text
//!   sources ──► loaders ──► collect ──► validate ──► process ──► build
//!                  │                                  │            │
//!          MappingContext                  anchors + ancestors   containers | views
//!                                          + companion props          │
//!                                                                scope subset
//! ```
//!
//! - `config`: validated processor configuration
//! - `collect`: merge, uniqueness checks, metadata and companion properties
//! - `inheritance`: property-owning ancestors per entity
//! - `denormalize`: anchors of tag and equipment classes
//! - `partition`: numeric-range groups of generic entity properties
//! - `builder`: containers and views model builders
//! - `scope`: view subsets and instance filters
//! - `manager` / `pipeline`: end-to-end runs

pub mod builder;
pub mod collect;
pub mod config;
pub mod denormalize;
pub mod inheritance;
pub mod manager;
pub mod partition;
pub mod pipeline;
pub mod scope;


pub use builder::ModelBuilder;
pub use collect::{collect, process, validate, CollectedTables, ProcessOptions, ProcessedTables};
pub use config::{ModelType, ProcessorConfig, ScopeConfig, ViewScope};
pub use denormalize::{normalize_class_id, DenormalizationMap};
pub use inheritance::{apply_full_inheritance, full_inheritance};
pub use manager::{CfihosManager, ModelMetadata, ReadResult};
pub use partition::PropertyPartitioner;
pub use pipeline::{Pipeline, PipelineOutput};
pub use scope::{collect_model_subset, view_filter};
