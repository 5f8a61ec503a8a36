//! Containers mode: wide sparse groups plus one container per first-class citizen.

use std::collections::{BTreeMap, BTreeSet};

use cfihos_ingest::bound_length;
use cfihos_model::constants::{
    ENTITY_TYPE_GROUP, ENTITY_TYPE_GROUP_DESCRIPTION, MAX_DMS_MODEL_NAME, UOM_SUFFIX,
};
use cfihos_model::{
    CfihosError, CfihosType, EntityRecord, ModelEntities, ModelEntity, PropertyRecord,
    PropertyType, Result,
};

use super::rows::{self, Placement};
use crate::collect::ProcessedTables;
use crate::partition::PropertyPartitioner;

pub(crate) fn build(tables: &ProcessedTables, partitioner: &PropertyPartitioner) -> Result<ModelEntities> {
    let mut model = sparse_groups(tables, partitioner)?;
    first_class_citizens(tables, &mut model)?;
    model.insert(ENTITY_TYPE_GROUP.to_string(), entity_type_group());
    Ok(model)
}

// ============================================================================
// Sparse groups
// ============================================================================

fn is_sparse(p: &PropertyRecord) -> bool {
    !p.first_class_citizen
        && !matches!(
            p.property_type,
            PropertyType::EdgeRelation | PropertyType::EntityReverseRelation
        )
        && p.entity_id.is_some()
}

/// Where a sparse property goes, and what the group entity is called if the
/// property is the first one to land there.
struct GroupSlot {
    group: String,
    dms_name: String,
    name: String,
    description: Option<String>,
    cfihos_type: CfihosType,
    uom: bool,
}

/// DMS name of a class without its tag/equipment marker.
fn base_dms_name(class: &EntityRecord) -> String {
    class.dms_name.replace("_T", "").replace("_E", "")
}

fn class_slot(tables: &ProcessedTables, owner: &str, property_id: &str) -> Option<GroupSlot> {
    let Some(group) = tables.denormalization.group_for(owner) else {
        tracing::warn!(entity = %owner, property = %property_id, "class has no denormalization anchor, property skipped");
        return None;
    };
    let anchor_id = format!("{}{}", &owner[..1], group.replace('_', "-"));
    let anchor = tables.entity(&anchor_id);
    let cfihos_type = CfihosType::of_entity_id(owner);

    let mut slot = GroupSlot {
        dms_name: anchor.map(base_dms_name).unwrap_or_else(|| group.clone()),
        name: anchor.map(|a| a.name.clone()).unwrap_or_else(|| group.clone()),
        description: anchor.and_then(|a| a.description.clone()),
        group,
        cfihos_type,
        uom: false,
    };
    if property_id.to_lowercase().ends_with("_uom") {
        slot.description = Some(format!("Unit of Measure for {}", slot.name));
        slot.group.push_str(UOM_SUFFIX);
        slot.dms_name.push_str(UOM_SUFFIX);
        slot.name.push_str(UOM_SUFFIX);
        slot.uom = true;
    }
    Some(slot)
}

fn range_slot(partitioner: &PropertyPartitioner, property_id: &str) -> Option<GroupSlot> {
    let Some(group) = partitioner.assign(property_id) else {
        tracing::warn!(property = %property_id, "property matches no grouping prefix, skipped");
        return None;
    };
    Some(GroupSlot {
        dms_name: group.clone(),
        name: group.clone(),
        description: None,
        group,
        cfihos_type: CfihosType::Entity,
        uom: false,
    })
}

fn sparse_groups(tables: &ProcessedTables, partitioner: &PropertyPartitioner) -> Result<ModelEntities> {
    let sparse: Vec<&PropertyRecord> = tables.properties.iter().filter(|p| is_sparse(p)).collect();
    check_consistency(sparse.iter().map(|&p| (p.id.as_str(), p)), true)?;

    let mut model = ModelEntities::new();
    let mut seen: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for p in sparse {
        let Some(owner) = p.entity_id.as_deref() else {
            continue;
        };
        let slot = if CfihosType::of_entity_id(owner) == CfihosType::Entity {
            range_slot(partitioner, &p.id)
        } else {
            class_slot(tables, owner, &p.id)
        };
        let Some(slot) = slot else {
            continue;
        };

        let at = Placement {
            group: &slot.group,
            group_dms_name: &slot.dms_name,
            first_class_citizen: false,
        };
        let row = if slot.uom {
            rows::uom_property(p, at)?
        } else {
            rows::model_property(p, at)?
        };

        if !model.contains_key(&slot.group) {
            let mut entity = ModelEntity::new(slot.group.clone(), slot.name.clone());
            entity.dms_name = bound_length(&slot.dms_name, MAX_DMS_MODEL_NAME)?;
            entity.description = slot.description.clone();
            entity.cfihos_type = slot.cfihos_type.type_name().to_string();
            let seed = rows::group_entity_type();
            seen.entry(slot.group.clone()).or_default().insert(seed.id.clone());
            entity.properties.push(seed);
            model.insert(slot.group.clone(), entity);
        }

        let ids = seen.entry(slot.group.clone()).or_default();
        if ids.insert(row.id.clone()) {
            if let Some(entity) = model.get_mut(&slot.group) {
                entity.properties.push(row);
            }
        }
    }

    tracing::info!(groups = model.len(), "built sparse property groups");
    Ok(model)
}

/// Every property sharing a key must agree on name, DMS name, type and
/// multiplicity. Scalar target types are compared too; relation targets may
/// differ per owner. The first column with disagreeing keys fails the build.
fn check_consistency<'a>(
    rows: impl Iterator<Item = (&'a str, &'a PropertyRecord)>,
    scalar_targets_only: bool,
) -> Result<()> {
    #[derive(Default)]
    struct Seen<'a> {
        name: BTreeSet<&'a str>,
        dms_name: BTreeSet<&'a str>,
        target_type: BTreeSet<Option<&'a str>>,
        property_type: BTreeSet<PropertyType>,
        multi_valued: BTreeSet<bool>,
    }

    let mut by_key: BTreeMap<&str, Seen> = BTreeMap::new();
    for (key, p) in rows {
        let seen = by_key.entry(key).or_default();
        seen.name.insert(&p.name);
        seen.dms_name.insert(&p.dms_name);
        seen.property_type.insert(p.property_type);
        seen.multi_valued.insert(p.multi_valued);
        if !scalar_targets_only || p.property_type == PropertyType::BasicDataType {
            seen.target_type.insert(p.target_type.as_deref());
        }
    }

    let checks: [(&str, fn(&Seen) -> bool); 5] = [
        ("name", |s| s.name.len() != 1),
        ("dms_name", |s| s.dms_name.len() != 1),
        ("target_type", |s| s.target_type.len() > 1),
        ("property_type", |s| s.property_type.len() != 1),
        ("multi_valued", |s| s.multi_valued.len() != 1),
    ];
    for (column, disagrees) in checks {
        let ids: Vec<String> = by_key
            .iter()
            .filter(|(_, s)| disagrees(s))
            .map(|(k, _)| k.to_string())
            .collect();
        if !ids.is_empty() {
            return Err(CfihosError::InconsistentProperty {
                column: column.to_string(),
                ids,
            });
        }
    }
    Ok(())
}

// ============================================================================
// First-class citizens
// ============================================================================

/// Storage ids of first-class-citizen entities, keyed by their `_` form.
struct FirstClass<'a> {
    by_storage_id: BTreeMap<String, &'a EntityRecord>,
    ids: BTreeSet<&'a str>,
}

impl<'a> FirstClass<'a> {
    fn new(entities: &'a [EntityRecord]) -> Self {
        let fcc: Vec<&EntityRecord> = entities.iter().filter(|e| e.first_class_citizen).collect();
        Self {
            by_storage_id: fcc.iter().map(|e| (e.id.replace('-', "_"), *e)).collect(),
            ids: fcc.iter().map(|e| e.id.as_str()).collect(),
        }
    }

    fn contains_storage_id(&self, id: Option<&str>) -> bool {
        id.is_some_and(|id| self.by_storage_id.contains_key(id))
    }

    /// Whether the relation's target may be kept. Direct relations to a
    /// non-FCC entity are dropped by the caller; reverse and edge relations
    /// between non-FCC entities cannot be expressed and fail the build.
    fn relation_is_eligible(&self, p: &PropertyRecord) -> Result<bool> {
        match p.property_type {
            PropertyType::BasicDataType => Ok(true),
            PropertyType::EntityRelation => Ok(self.contains_storage_id(p.target_type.as_deref())),
            PropertyType::EntityReverseRelation => {
                if self.contains_storage_id(p.target_type.as_deref()) {
                    Ok(true)
                } else {
                    Err(CfihosError::IneligibleReverseTarget(p.id.clone()))
                }
            }
            PropertyType::EdgeRelation => {
                let eligible = p.edge.as_ref().is_some_and(|e| {
                    self.ids.contains(e.source.as_str()) && self.ids.contains(e.target.as_str())
                });
                if eligible {
                    Ok(true)
                } else {
                    Err(CfihosError::IneligibleEdgeEndpoint(p.id.clone()))
                }
            }
        }
    }
}

fn first_class_citizens(tables: &ProcessedTables, model: &mut ModelEntities) -> Result<()> {
    let fcc_rows: Vec<(&str, &PropertyRecord)> = tables
        .properties
        .iter()
        .filter(|p| p.first_class_citizen)
        .filter_map(|p| p.unique_validation_id.as_deref().map(|k| (k, p)))
        .collect();
    if fcc_rows.is_empty() {
        tracing::warn!("no first-class citizen properties found, skipping");
        return Ok(());
    }
    check_consistency(fcc_rows.iter().copied(), false)?;

    let fcc = FirstClass::new(&tables.entities);
    for (_, p) in fcc_rows {
        let Some(owner) = p.entity_id.as_deref() else {
            continue;
        };
        let group = owner.replace('-', "_");
        if !model.contains_key(&group) {
            let Some(entity) = tables.entity(owner) else {
                tracing::warn!(entity = %owner, property = %p.id, "first-class citizen property without entity, skipped");
                continue;
            };
            let mut container = ModelEntity::new(group.clone(), entity.name.clone());
            container.dms_name = bound_length(&entity.dms_name, MAX_DMS_MODEL_NAME)?;
            container.description = entity.description.clone();
            container.cfihos_type = entity.cfihos_type.type_name().to_string();
            container.cfihos_id = entity.id.clone();
            container.first_class_citizen = true;
            container.implements_core_model = entity.implements_core_model.clone();
            model.insert(group.clone(), container);
        }

        let Some(container) = model.get_mut(&group) else {
            continue;
        };
        let mut row = rows::model_property(
            p,
            Placement {
                group: &group,
                group_dms_name: &container.dms_name,
                first_class_citizen: true,
            },
        )?;
        if !fcc.relation_is_eligible(p)? {
            tracing::debug!(property = %p.id, "direct relation target is not a first-class citizen, target dropped");
            row.target_type = None;
        }
        container.properties.push(row);
    }
    Ok(())
}

fn entity_type_group() -> ModelEntity {
    let mut entity = ModelEntity::new(ENTITY_TYPE_GROUP, ENTITY_TYPE_GROUP);
    entity.description = Some(ENTITY_TYPE_GROUP_DESCRIPTION.to_string());
    entity.cfihos_type = ENTITY_TYPE_GROUP.to_string();
    entity.first_class_citizen = true;
    entity.properties.push(rows::reserved_entity_type());
    entity
}
