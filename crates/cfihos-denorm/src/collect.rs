//! Collection, validation and processing of the merged loader tables.

use std::collections::BTreeSet;

use cfihos_ingest::{duplicates, LoadedTables};
use cfihos_model::constants::{RELATION_SUFFIX, STRING_TARGET_TYPE, UOM_SUFFIX};
use cfihos_model::{CfihosError, EntityRecord, PropertyRecord, PropertyType, Result};

use crate::denormalize::DenormalizationMap;
use crate::inheritance::apply_full_inheritance;

/// Tables of every loader, concatenated in processor order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedTables {
    pub entities: Vec<EntityRecord>,
    pub properties: Vec<PropertyRecord>,
    pub metadata: Vec<PropertyRecord>,
}

/// Processed tables ready for the model builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedTables {
    /// Entities with `full_inheritance` filled.
    pub entities: Vec<EntityRecord>,
    /// Entity properties, unreferenced metadata and generated companions.
    pub properties: Vec<PropertyRecord>,
    pub denormalization: DenormalizationMap,
}

impl ProcessedTables {
    pub fn entity(&self, id: &str) -> Option<&EntityRecord> {
        self.entities.iter().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Configured denormalization anchors.
    pub root_nodes: Vec<String>,
    /// Add a scalar copy of every direct relation.
    pub scalar_relation_companions: bool,
}

/// Concatenate loader outputs. Metadata rows are keyed by processor so that
/// the same property described by two sources stays distinguishable, and
/// properties of first-class-citizen entities become first-class citizens.
pub fn collect<I>(outputs: I) -> CollectedTables
where
    I: IntoIterator<Item = (String, LoadedTables)>,
{
    let mut out = CollectedTables::default();
    for (processor, tables) in outputs {
        out.entities.extend(tables.entities);
        out.properties.extend(tables.properties);
        out.metadata.extend(tables.metadata.into_iter().map(|mut m| {
            m.unique_validation_id = Some(format!("{}_metadata_{processor}", m.id));
            m
        }));
    }

    let fcc: BTreeSet<String> = out
        .entities
        .iter()
        .filter(|e| e.first_class_citizen)
        .map(|e| e.id.clone())
        .collect();
    for p in &mut out.properties {
        if p.entity_id.as_ref().is_some_and(|e| fcc.contains(e)) {
            p.first_class_citizen = true;
        }
    }

    tracing::info!(
        entities = out.entities.len(),
        properties = out.properties.len(),
        metadata = out.metadata.len(),
        "collected processor data"
    );
    out
}

/// Uniqueness and reference checks over the collected tables.
pub fn validate(tables: &CollectedTables) -> Result<()> {
    let ids = duplicates(tables.entities.iter().map(|e| e.id.as_str()));
    if !ids.is_empty() {
        return Err(CfihosError::DuplicateEntityIds(ids));
    }

    let dms = duplicates(tables.entities.iter().map(|e| e.dms_name.as_str()));
    if !dms.is_empty() {
        return Err(CfihosError::DuplicateDmsNames(dms));
    }

    let uvids = duplicates(
        tables
            .properties
            .iter()
            .filter_map(|p| p.unique_validation_id.as_deref()),
    );
    if !uvids.is_empty() {
        return Err(CfihosError::DuplicateValidationIds(uvids));
    }

    let known: BTreeSet<&str> = tables.entities.iter().map(|e| e.id.as_str()).collect();
    for entity in &tables.entities {
        if let Some(parent) = entity.parents.iter().find(|p| !known.contains(p.as_str())) {
            return Err(CfihosError::UnknownParent {
                entity: entity.id.clone(),
                parent: parent.clone(),
            });
        }
    }
    Ok(())
}

/// Merge metadata, resolve anchors and ancestors, and add companion properties.
pub fn process(tables: CollectedTables, options: &ProcessOptions) -> Result<ProcessedTables> {
    let CollectedTables {
        mut entities,
        mut properties,
        metadata,
    } = tables;

    let property_ids: BTreeSet<String> = properties.iter().map(|p| p.id.clone()).collect();
    properties.extend(metadata.into_iter().filter(|m| !property_ids.contains(&m.id)));

    let denormalization = DenormalizationMap::build(&entities, &options.root_nodes);
    tracing::debug!(anchored = denormalization.len(), "built denormalization map");

    apply_full_inheritance(&mut entities, &properties)?;

    if options.scalar_relation_companions {
        let added = add_companions(&mut properties, scalar_companion);
        tracing::debug!(added, "added scalar companions for direct relations");
    }
    let added = add_companions(&mut properties, uom_companion);
    tracing::debug!(added, "added unit of measure companions");

    Ok(ProcessedTables {
        entities,
        properties,
        denormalization,
    })
}

/// Append the companion of every property that has one, skipping companions
/// whose validation id is already taken.
fn add_companions(
    properties: &mut Vec<PropertyRecord>,
    companion: fn(&PropertyRecord) -> Option<PropertyRecord>,
) -> usize {
    let mut taken: BTreeSet<String> = properties
        .iter()
        .filter_map(|p| p.unique_validation_id.clone())
        .collect();
    let fresh: Vec<PropertyRecord> = properties
        .iter()
        .filter_map(companion)
        .filter(|c| match &c.unique_validation_id {
            Some(uvid) => taken.insert(uvid.clone()),
            None => true,
        })
        .collect();
    let added = fresh.len();
    properties.extend(fresh);
    added
}

/// Scalar copy of a direct relation, typed by the relation's raw `format`.
fn scalar_companion(p: &PropertyRecord) -> Option<PropertyRecord> {
    if p.property_type != PropertyType::EntityRelation {
        return None;
    }
    let mut c = p.clone();
    c.id = p.id.replace(RELATION_SUFFIX, "");
    c.dms_name = p.dms_name.replace(RELATION_SUFFIX, "");
    c.unique_validation_id = p
        .unique_validation_id
        .as_ref()
        .map(|u| u.replace(RELATION_SUFFIX, ""));
    c.property_type = PropertyType::BasicDataType;
    c.target_type = p.original_target_type.clone();
    c.reverse_declaration = None;
    Some(c)
}

/// String property holding the unit of measure of `p`.
fn uom_companion(p: &PropertyRecord) -> Option<PropertyRecord> {
    if !p.has_uom() {
        return None;
    }
    let mut c = p.clone();
    c.id = format!("{}{UOM_SUFFIX}", p.id);
    c.dms_name = format!("{}{UOM_SUFFIX}", p.dms_name);
    c.unique_validation_id = p
        .unique_validation_id
        .as_ref()
        .map(|u| format!("{u}{UOM_SUFFIX}"));
    c.property_type = PropertyType::BasicDataType;
    c.target_type = Some(STRING_TARGET_TYPE.to_string());
    c.uom = None;
    c.reverse_declaration = None;
    c.through_property = None;
    c.edge = None;
    Some(c)
}
