//! Scope subsetting of a views model and the instance filters of its views.

use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

use cfihos_model::constants::{
    ENTITY_TYPE_GROUP, ENTITY_TYPE_PROPERTY, EQUIPMENT_TYPE_PREFIX, TAG_TYPE_PREFIX,
};
use cfihos_model::{ModelEntities, ModelEntity, PropertyType};

use crate::config::ScopeConfig;

fn in_scope(id: &str, entity: &ModelEntity, config: ScopeConfig, subset: &BTreeSet<&str>) -> bool {
    entity.first_class_citizen
        || match config {
            ScopeConfig::All => true,
            ScopeConfig::Tags => id.starts_with(TAG_TYPE_PREFIX),
            ScopeConfig::Equipment => id.starts_with(EQUIPMENT_TYPE_PREFIX),
            ScopeConfig::Scoped => subset.contains(id),
        }
}

/// Select the entities of a scope plus everything they depend on: relation
/// targets and parents, transitively. Non-FCC views get their instance filter.
pub fn collect_model_subset(
    model: &ModelEntities,
    config: ScopeConfig,
    subset: &[String],
    containers_space: &str,
) -> ModelEntities {
    let subset: BTreeSet<&str> = subset.iter().map(String::as_str).collect();
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut stack: Vec<&str> = model
        .iter()
        .filter(|(id, e)| in_scope(id, e, config, &subset))
        .map(|(id, _)| id.as_str())
        .rev()
        .collect();

    while let Some(id) = stack.pop() {
        if visited.contains(id) {
            continue;
        }
        let Some(entity) = model.get(id) else {
            tracing::warn!(entity = %id, "referenced entity is not part of the model, skipped");
            continue;
        };
        visited.insert(id);
        for p in &entity.properties {
            if p.property_type == PropertyType::EntityRelation {
                if let Some(target) = p.target_type.as_deref() {
                    stack.push(target);
                }
            }
        }
        stack.extend(entity.inherits_from_id.iter().map(String::as_str));
    }

    tracing::info!("Selected {} objects from {}", visited.len(), model.len());

    let mut scoped: ModelEntities = visited
        .iter()
        .filter_map(|id| model.get(*id).map(|e| (id.to_string(), e.clone())))
        .collect();
    assign_view_filters(&mut scoped, containers_space);
    scoped
}

/// Parent id → every transitive descendant within `model`.
pub fn descendants(model: &ModelEntities) -> BTreeMap<String, BTreeSet<String>> {
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (id, entity) in model {
        for parent in &entity.inherits_from_id {
            children.entry(parent.as_str()).or_default().push(id.as_str());
        }
    }

    let mut out = BTreeMap::new();
    for parent in children.keys() {
        let mut found: BTreeSet<String> = BTreeSet::new();
        let mut stack: Vec<&str> = children[parent].clone();
        while let Some(child) = stack.pop() {
            if !found.insert(child.to_string()) {
                continue;
            }
            if let Some(grand) = children.get(child) {
                stack.extend(grand.iter().copied());
            }
        }
        out.insert(parent.to_string(), found);
    }
    out
}

/// Raw filter matching instances whose `entityType` is one of `entity_types`.
pub fn view_filter(containers_space: &str, entity_types: &BTreeSet<String>) -> String {
    let filter = json!({
        "and": [{
            "in": {
                "property": [containers_space, ENTITY_TYPE_GROUP, ENTITY_TYPE_PROPERTY],
                "values": entity_types,
            }
        }]
    });
    format!("rawFilter({filter})")
}

fn assign_view_filters(model: &mut ModelEntities, containers_space: &str) {
    let tree = descendants(model);
    for (id, entity) in model.iter_mut() {
        if entity.first_class_citizen {
            entity.view_filter = None;
            continue;
        }
        let mut types = tree.get(id).cloned().unwrap_or_default();
        types.insert(id.clone());
        entity.view_filter = Some(view_filter(containers_space, &types));
    }
}
