//! Per-source loader configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use cfihos_model::{CfihosError, CfihosType, Result};

/// One `model_processors_config` entry: a master object sheet plus the CFIHOS
/// source kinds to load alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Id prefix of this source, e.g. `CFIHOS`. Also seeds the sparse groupings.
    pub id_prefix: String,
    /// Folder holding the master object sheet.
    pub abs_fpath_model_raw_data_folder: PathBuf,
    pub rdl_master_objects_fname: String,
    pub rdl_master_object_id_col_name: String,
    pub rdl_master_object_name_col_name: String,
    pub rdl_master_object_file_type_col_name: String,
    pub included_cfihos_types_config: Vec<SourceTypeConfig>,
}

/// Files of one CFIHOS source kind. Which fields are required depends on `type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTypeConfig {
    #[serde(rename = "type")]
    pub kind: String,
    /// Folder of the kind's sheets; falls back to the source's raw data folder.
    pub data_folder_abs_fpath: Option<PathBuf>,
    pub entities_fname: String,
    pub entities_attrib_fname: Option<String>,
    pub property_metadata_fname: Option<String>,
    pub entities_edges: Option<String>,
    pub entities_core_model: Option<String>,
    /// Base CFIHOS files, when the source extends the standard.
    pub base_folder_abs_fpath: Option<PathBuf>,
    pub base_entities_attrib_fname: Option<String>,
    pub base_property_metadata_fname: Option<String>,
    pub base_tag_attrib_fname: Option<String>,
    /// Overrides the kind's default class id prefix (`CFIHOS-0`, `CFIHOS-3`).
    pub type_id_prefix: Option<String>,
}

impl SourceTypeConfig {
    pub fn cfihos_type(&self) -> Result<CfihosType> {
        CfihosType::from_config_tag(&self.kind).ok_or_else(|| CfihosError::UnsupportedSourceType {
            found: self.kind.clone(),
            supported: CfihosType::ALL
                .iter()
                .map(|t| t.config_tag().to_string())
                .collect(),
        })
    }

    pub fn type_id_prefix(&self, kind: CfihosType) -> String {
        self.type_id_prefix
            .clone()
            .unwrap_or_else(|| kind.default_type_id_prefix().to_string())
    }

    fn folder<'a>(&'a self, fallback: &'a Path) -> &'a Path {
        self.data_folder_abs_fpath.as_deref().unwrap_or(fallback)
    }

    pub fn data_path(&self, fallback: &Path, fname: &str) -> PathBuf {
        self.folder(fallback).join(fname)
    }

    /// Path of a base CFIHOS file; `None` unless both folder and file are set.
    pub fn base_path(&self, fname: Option<&str>) -> Option<PathBuf> {
        match (&self.base_folder_abs_fpath, fname) {
            (Some(folder), Some(f)) if !f.is_empty() => Some(folder.join(f)),
            _ => None,
        }
    }
}

impl SourceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.id_prefix.trim().is_empty() {
            return Err(CfihosError::InvalidConfig(
                "id_prefix must be set for every model processor".into(),
            ));
        }
        for t in &self.included_cfihos_types_config {
            let kind = t.cfihos_type()?;
            if t.entities_fname.is_empty() {
                return Err(CfihosError::InvalidConfig(format!(
                    "{} requires entities_fname",
                    t.kind
                )));
            }
            if kind != CfihosType::Entity
                && (t.entities_attrib_fname.is_none() || t.property_metadata_fname.is_none())
            {
                return Err(CfihosError::InvalidConfig(format!(
                    "{} requires entities_attrib_fname and property_metadata_fname",
                    t.kind
                )));
            }
        }
        Ok(())
    }

    pub fn cfihos_types(&self) -> Result<Vec<CfihosType>> {
        self.included_cfihos_types_config
            .iter()
            .map(SourceTypeConfig::cfihos_type)
            .collect()
    }

    /// Sparse grouping prefixes of this source: `<id_prefix>_0` … `<id_prefix>_9`.
    pub fn groupings(&self) -> Vec<String> {
        (0..10).map(|i| format!("{}_{i}", self.id_prefix)).collect()
    }
}
