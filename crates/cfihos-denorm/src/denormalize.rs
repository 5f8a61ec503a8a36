//! Denormalization anchors for tag and equipment classes.
//!
//! Keys and values are CFIHOS codes without the tag/equipment letter
//! (`TCFIHOS-30000397` → `CFIHOS-30000397`), so a tag class and the equipment
//! class of the same code share one anchor.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use cfihos_model::constants::{EQUIPMENT_ROOT_NODE, TAG_ROOT_NODE};
use cfihos_model::{CfihosType, EntityRecord};

/// Strip the leading `T`/`E` from a class id: `TEPC-30000397` → `EPC-30000397`.
pub fn normalize_class_id(id: &str) -> String {
    if id.starts_with(['T', 'E']) {
        if let Some((code, number)) = id.split_once('-') {
            let code = if code.len() > 1 { &code[1..] } else { code };
            return format!("{code}-{number}");
        }
    }
    id.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenormalizationMap {
    anchors: BTreeMap<String, String>,
}

impl DenormalizationMap {
    /// Resolve the anchor of every tag and equipment class.
    ///
    /// `configured` holds explicit anchors in normalized form. Resolution per
    /// class, first match wins:
    ///
    /// 1. the class itself is configured
    /// 2. nearest configured ancestor
    /// 3. the class is a first child (direct child of a global root)
    /// 4. a direct parent is a first child
    /// 5. nearest first-child ancestor
    ///
    /// Classes matching none of these are left out.
    pub fn build(entities: &[EntityRecord], configured: &[String]) -> Self {
        let configured: BTreeSet<&str> = configured.iter().map(String::as_str).collect();
        let parents: BTreeMap<&str, &[String]> = entities
            .iter()
            .map(|e| (e.id.as_str(), e.parents.as_slice()))
            .collect();

        let roots = [TAG_ROOT_NODE, EQUIPMENT_ROOT_NODE];
        let first_children: BTreeSet<&str> = entities
            .iter()
            .filter(|e| e.parents.iter().any(|p| roots.contains(&p.as_str())))
            .map(|e| e.id.as_str())
            .collect();

        let mut anchors = BTreeMap::new();
        for entity in entities.iter().filter(|e| e.cfihos_type != CfihosType::Entity) {
            let key = normalize_class_id(&entity.id);
            if anchors.contains_key(&key) {
                continue;
            }

            let anchor = if configured.contains(key.as_str()) {
                Some(key.clone())
            } else if let Some(found) =
                nearest_ancestor(&parents, &entity.id, |id| configured.contains(normalize_class_id(id).as_str()))
            {
                Some(normalize_class_id(found))
            } else if first_children.contains(entity.id.as_str()) {
                Some(key.clone())
            } else if let Some(parent) = entity
                .parents
                .iter()
                .find(|p| first_children.contains(p.as_str()))
            {
                Some(normalize_class_id(parent))
            } else {
                nearest_ancestor(&parents, &entity.id, |id| first_children.contains(id))
                    .map(normalize_class_id)
            };

            match anchor {
                Some(anchor) => {
                    anchors.insert(key, anchor);
                }
                None => tracing::debug!(entity = %entity.id, "class has no denormalization anchor"),
            }
        }

        Self { anchors }
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Anchor of a normalized class id.
    pub fn anchor(&self, normalized_id: &str) -> Option<&str> {
        self.anchors.get(normalized_id).map(String::as_str)
    }

    /// Container group of a (prefixed) tag or equipment class: its anchor with
    /// dashes turned into underscores.
    pub fn group_for(&self, entity_id: &str) -> Option<String> {
        if !entity_id.starts_with(['T', 't', 'E', 'e']) {
            return None;
        }
        self.anchor(&entity_id[1..]).map(|a| a.replace('-', "_"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.anchors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Breadth-first walk up the parent links; the start node itself is tested first.
fn nearest_ancestor<'a>(
    parents: &BTreeMap<&'a str, &'a [String]>,
    start: &'a str,
    matches: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut queue: VecDeque<&str> = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if matches(current) {
            return Some(current);
        }
        if let Some(next) = parents.get(current) {
            queue.extend(next.iter().map(String::as_str));
        }
    }
    None
}
