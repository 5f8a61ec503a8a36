//! Views mode: one view per entity holding only the properties it does not inherit.

use std::collections::{BTreeMap, BTreeSet};

use cfihos_ingest::{bound_length, MappingContext};
use cfihos_model::constants::MAX_DMS_MODEL_NAME;
use cfihos_model::{
    CfihosError, EntityRecord, ModelEntities, ModelEntity, PropertyRecord, PropertyType, Result,
};

use super::rows::{self, Placement};
use crate::collect::ProcessedTables;
use crate::partition::PropertyPartitioner;

fn storage_id(ctx: &MappingContext, entity_id: &str) -> String {
    match ctx.dms_id(entity_id) {
        Some(id) => id.to_string(),
        None => {
            tracing::debug!(entity = %entity_id, "entity not in mapping table, using its own id");
            entity_id.replace('-', "_")
        }
    }
}

pub(crate) fn build(
    tables: &ProcessedTables,
    partitioner: &PropertyPartitioner,
    ctx: &MappingContext,
) -> Result<ModelEntities> {
    let mut owned: BTreeMap<&str, Vec<&PropertyRecord>> = BTreeMap::new();
    for p in &tables.properties {
        if let Some(owner) = p.entity_id.as_deref() {
            owned.entry(owner).or_default().push(p);
        }
    }

    let mut model = ModelEntities::new();
    let mut empty = 0usize;
    for entity in &tables.entities {
        let own: Vec<&PropertyRecord> = owned
            .get(entity.id.as_str())
            .map(|ps| ps.iter().copied().filter(|p| p.in_model).collect())
            .unwrap_or_default();
        if own.is_empty() {
            tracing::debug!(entity = %entity.id, "entity has no properties in model, skipped");
            empty += 1;
            continue;
        }

        let view = view(entity, &own, &owned, partitioner, ctx)?;
        if model.contains_key(&view.entity_id) {
            return Err(CfihosError::DuplicateModelEntity(view.entity_id));
        }
        model.insert(view.entity_id.clone(), view);
    }

    if empty > 0 {
        tracing::warn!(skipped = empty, "entities without properties in model were left out");
    }
    tracing::info!(views = model.len(), "built entity views");
    Ok(model)
}

fn view(
    entity: &EntityRecord,
    own: &[&PropertyRecord],
    owned: &BTreeMap<&str, Vec<&PropertyRecord>>,
    partitioner: &PropertyPartitioner,
    ctx: &MappingContext,
) -> Result<ModelEntity> {
    let view_id = storage_id(ctx, &entity.id);
    let mut view = ModelEntity::new(view_id.clone(), entity.name.clone());
    view.dms_name = bound_length(&entity.dms_name, MAX_DMS_MODEL_NAME)?;
    view.description = entity.description.clone();
    view.cfihos_type = entity.cfihos_type.type_name().to_string();
    view.cfihos_id = entity.id.clone();
    view.first_class_citizen = entity.first_class_citizen;
    view.inherits_from_id = entity.parents.iter().map(|p| storage_id(ctx, p)).collect();
    view.inherits_from_name = entity.parent_names.clone();
    view.full_inheritance = entity
        .full_inheritance
        .iter()
        .map(|a| storage_id(ctx, a))
        .collect();
    view.implements_core_model = entity.implements_core_model.clone();

    let inherited: BTreeSet<&str> = entity
        .full_inheritance
        .iter()
        .filter_map(|a| owned.get(a.as_str()))
        .flatten()
        .map(|p| p.id.as_str())
        .collect();

    let fcc_group = entity.id.replace('-', "_");
    let mut ids: BTreeSet<&str> = BTreeSet::new();
    let mut fcc_ids: BTreeSet<&str> = BTreeSet::new();

    for p in own.iter().copied() {
        if inherited.contains(p.id.as_str()) {
            continue;
        }
        let (namespace, scope) = if p.first_class_citizen {
            (&mut fcc_ids, "FCC ")
        } else {
            (&mut ids, "")
        };
        if !namespace.insert(p.id.as_str()) {
            return Err(CfihosError::DuplicateModelProperty {
                property: p.id.clone(),
                entity: view_id,
                scope,
            });
        }

        if p.property_type == PropertyType::EntityRelation
            && p.target_type.as_deref().and_then(|t| ctx.entity_id(t)).is_none()
        {
            tracing::warn!(
                relation_target = p.target_type.as_deref().unwrap_or_default(),
                entity = %entity.id,
                "could not map relation target, property skipped"
            );
            continue;
        }

        let row = if entity.first_class_citizen {
            rows::model_property(
                p,
                Placement {
                    group: &fcc_group,
                    group_dms_name: &entity.dms_name,
                    first_class_citizen: true,
                },
            )?
        } else {
            let Some(group) = partitioner.assign(&p.id) else {
                tracing::warn!(property = %p.id, entity = %entity.id, "property matches no grouping prefix, skipped");
                continue;
            };
            rows::model_property(
                p,
                Placement {
                    group: &group,
                    group_dms_name: &group,
                    first_class_citizen: false,
                },
            )?
        };
        view.properties.push(row);
    }

    if !entity.first_class_citizen {
        view.properties.push(rows::view_entity_type());
    }
    Ok(view)
}
