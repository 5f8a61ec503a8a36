//! Source loaders: CFIHOS sheets → entity, property and metadata tables.
//!
//! A [`SourceLoader`] is built from one `model_processors_config` entry. Building it
//! reads the master object sheet and derives the loader's own [`MappingTables`].
//! Processing happens later, against the [`MappingContext`] holding the union of
//! all loaders' tables, so relations can be resolved across sources.

mod class;
mod entity;


use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};

use cfihos_model::{CfihosError, CfihosType, EntityRecord, PropertyRecord};

use crate::config::{SourceConfig, SourceTypeConfig};
use crate::context::{MappingContext, MappingTables};
use crate::sheet::{Sheet, SheetReader};

/// Output of one loader run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedTables {
    pub entities: Vec<EntityRecord>,
    pub properties: Vec<PropertyRecord>,
    /// Property metadata not referenced by any entity property.
    pub metadata: Vec<PropertyRecord>,
}

impl LoadedTables {
    fn extend(&mut self, other: LoadedTables) {
        self.entities.extend(other.entities);
        self.properties.extend(other.properties);
        self.metadata.extend(other.metadata);
    }
}

#[derive(Debug, Clone)]
pub struct SourceLoader {
    name: String,
    config: SourceConfig,
    kinds: Vec<(CfihosType, SourceTypeConfig)>,
    tables: MappingTables,
}

impl SourceLoader {
    /// Validate `config` and build the mapping tables from its master object sheet.
    pub fn new(name: impl Into<String>, config: SourceConfig, reader: &dyn SheetReader) -> Result<Self> {
        let name = name.into();
        config.validate()?;
        let kinds = config
            .included_cfihos_types_config
            .iter()
            .map(|t| Ok((t.cfihos_type()?, t.clone())))
            .collect::<cfihos_model::Result<Vec<_>>>()?;

        let master_path = config
            .abs_fpath_model_raw_data_folder
            .join(&config.rdl_master_objects_fname);
        let master = reader
            .read_sheet(&master_path)
            .with_context(|| format!("loading master objects for processor '{name}'"))?;
        let type_prefixes: Vec<&str> = kinds.iter().map(|(k, _)| k.type_prefix()).collect();
        let tables = build_mapping_tables(&master, &config, &type_prefixes)?;

        tracing::debug!(
            processor = %name,
            entities = tables.entity_id_to_dms_id.len(),
            names = tables.name_to_entity_id.len(),
            "built mapping tables"
        );

        Ok(Self {
            name,
            config,
            kinds,
            tables,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_prefix(&self) -> &str {
        &self.config.id_prefix
    }

    pub fn groupings(&self) -> Vec<String> {
        self.config.groupings()
    }

    pub fn mapping_tables(&self) -> &MappingTables {
        &self.tables
    }

    pub fn cfihos_types(&self) -> impl Iterator<Item = CfihosType> + '_ {
        self.kinds.iter().map(|(k, _)| *k)
    }

    /// Load every configured source kind and return the normalized tables.
    pub fn process(&self, reader: &dyn SheetReader, ctx: &MappingContext) -> Result<LoadedTables> {
        let mut out = LoadedTables::default();
        for (kind, type_config) in &self.kinds {
            tracing::info!(processor = %self.name, kind = kind.type_name(), "collecting");
            let loaded = match kind {
                CfihosType::Entity => entity::load(self, type_config, reader, ctx)?,
                CfihosType::Tag | CfihosType::Equipment => {
                    class::load(self, *kind, type_config, reader, ctx)?
                }
            };
            out.extend(loaded);
        }

        finish(&mut out)?;
        Ok(out)
    }

    fn read(&self, reader: &dyn SheetReader, t: &SourceTypeConfig, fname: &str) -> Result<Sheet> {
        let path = t.data_path(&self.config.abs_fpath_model_raw_data_folder, fname);
        reader
            .read_sheet(&path)
            .with_context(|| format!("processor '{}'", self.name))
    }
}

/// Build name→id and id→storage-id tables from the master object sheet.
pub fn build_mapping_tables(
    master: &Sheet,
    config: &SourceConfig,
    type_prefixes: &[&str],
) -> cfihos_model::Result<MappingTables> {
    let id_col = config.rdl_master_object_id_col_name.as_str();
    let name_col = config.rdl_master_object_name_col_name.as_str();
    let type_col = config.rdl_master_object_file_type_col_name.as_str();
    for col in [id_col, name_col, type_col] {
        if !master.rows.is_empty() && !master.has_column(col) {
            return Err(CfihosError::MissingColumn {
                sheet: master.name.clone(),
                column: col.to_string(),
            });
        }
    }

    let supported: BTreeSet<&str> = CfihosType::ALL.iter().map(|t| t.master_type()).collect();
    let mut tables = MappingTables::default();

    for row in &master.rows {
        let (Some(id), Some(kind)) = (row.non_empty(id_col), row.text(type_col)) else {
            continue;
        };
        if !supported.contains(kind.trim()) {
            continue;
        }
        let name = row.text(name_col).unwrap_or_default().to_lowercase();
        tables.name_to_entity_id.insert(name, id);
    }

    let full_prefix = format!("{}-", config.id_prefix);
    for row in &master.rows {
        let Some(id) = row.non_empty(id_col) else {
            continue;
        };
        if !id.starts_with(&full_prefix) {
            continue;
        }
        for prefix in type_prefixes {
            tables
                .entity_id_to_dms_id
                .insert(format!("{prefix}{id}"), format!("{prefix}{}", id.replace('-', "_")));
        }
    }
    tables.dms_id_to_entity_id = tables
        .entity_id_to_dms_id
        .iter()
        .map(|(k, v)| (v.clone(), k.clone()))
        .collect();

    Ok(tables)
}

/// Merge-time cleanup shared by every source kind: validation ids, metadata
/// de-duplication and the per-loader uniqueness checks.
fn finish(out: &mut LoadedTables) -> cfihos_model::Result<()> {
    for p in &mut out.properties {
        if p.unique_validation_id.is_none() {
            p.unique_validation_id = p
                .entity_id
                .as_deref()
                .map(|e| PropertyRecord::validation_id_for(e, &p.id));
        }
    }

    let property_ids: BTreeSet<&str> = out.properties.iter().map(|p| p.id.as_str()).collect();
    let mut seen = BTreeSet::new();
    let metadata = std::mem::take(&mut out.metadata);
    out.metadata = metadata
        .into_iter()
        .filter(|m| !property_ids.contains(m.id.as_str()))
        .filter(|m| seen.insert(m.id.clone()))
        .collect();

    let dup_entities = duplicates(out.entities.iter().map(|e| e.id.as_str()));
    if !dup_entities.is_empty() {
        return Err(CfihosError::DuplicateEntityIds(dup_entities));
    }
    let dup_props = duplicates(
        out.properties
            .iter()
            .filter_map(|p| p.unique_validation_id.as_deref()),
    );
    if !dup_props.is_empty() {
        return Err(CfihosError::DuplicateValidationIds(dup_props));
    }
    Ok(())
}

/// Values that occur more than once, sorted.
pub fn duplicates<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(v, _)| v.to_string())
        .collect()
}

/// Last `-`-separated segment of an id (`CFIHOS-00000042` → `00000042`).
fn id_tail(id: &str) -> &str {
    id.rsplit('-').next().unwrap_or(id)
}
