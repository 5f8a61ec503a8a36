//! CFIHOS model records shared by the loader and the denormalization engine.
//!
//! Two layers of records live here:
//!
//! - **Table records** (`EntityRecord`, `PropertyRecord`): one row per CFIHOS concept
//!   or attribute, as produced by the source loaders and merged across sources.
//! - **Model records** (`ModelEntity`, `ModelProperty`): the handoff shape produced by
//!   the model builder, keyed by storage identifier and ready for emission.
//!
//! The closed vocabularies (`CfihosType`, `PropertyType`, `EdgeDirection`) and the
//! domain error enum are shared by every crate in the workspace.

pub mod constants;
pub mod entity;
pub mod error;
pub mod property;

#[cfg(test)]
mod tests;

pub use entity::{CfihosType, CoreModelRef, EntityRecord, ModelEntity};
pub use error::{CfihosError, ErrorKind, Result};
pub use property::{
    EdgeDirection, EdgeInfo, ModelProperty, PropertyRecord, PropertyType, ReverseDeclaration,
};

use std::collections::BTreeMap;

/// Storage identifier → model entity. Ordered so that repeated runs emit identically.
pub type ModelEntities = BTreeMap<String, ModelEntity>;
