//! Transitive ancestors that own properties.

use std::collections::{BTreeMap, BTreeSet};

use cfihos_model::{CfihosError, EntityRecord, PropertyRecord, Result};

struct Closure<'a> {
    parents: BTreeMap<&'a str, &'a [String]>,
    owners: BTreeSet<&'a str>,
    memo: BTreeMap<&'a str, Vec<String>>,
    in_progress: BTreeSet<&'a str>,
}

impl<'a> Closure<'a> {
    fn ancestors(&mut self, id: &'a str) -> Result<Vec<String>> {
        if let Some(done) = self.memo.get(id) {
            return Ok(done.clone());
        }
        if !self.in_progress.insert(id) {
            return Err(CfihosError::InheritanceCycle(id.to_string()));
        }

        let parents = self.parents.get(id).copied().unwrap_or_default();
        let mut out: Vec<String> = Vec::new();
        for parent in parents {
            if self.owners.contains(parent.as_str()) && !out.contains(parent) {
                out.push(parent.clone());
            }
            for ancestor in self.ancestors(parent.as_str())? {
                if !out.contains(&ancestor) {
                    out.push(ancestor);
                }
            }
        }

        self.in_progress.remove(id);
        self.memo.insert(id, out.clone());
        Ok(out)
    }
}

/// Map every entity id to its property-owning ancestors, depth first: each
/// parent before its own ancestors, parents in declaration order.
///
/// Parents missing from the entity table end the walk there. A parent cycle is
/// reported as [`CfihosError::InheritanceCycle`].
pub fn full_inheritance(
    entities: &[EntityRecord],
    properties: &[PropertyRecord],
) -> Result<BTreeMap<String, Vec<String>>> {
    let mut closure = Closure {
        parents: entities
            .iter()
            .map(|e| (e.id.as_str(), e.parents.as_slice()))
            .collect(),
        owners: properties
            .iter()
            .filter_map(|p| p.entity_id.as_deref())
            .collect(),
        memo: BTreeMap::new(),
        in_progress: BTreeSet::new(),
    };

    let mut out = BTreeMap::new();
    for entity in entities {
        let ancestors = closure.ancestors(entity.id.as_str())?;
        out.insert(entity.id.clone(), ancestors);
    }
    Ok(out)
}

/// Fill `full_inheritance` on every entity.
pub fn apply_full_inheritance(
    entities: &mut [EntityRecord],
    properties: &[PropertyRecord],
) -> Result<()> {
    let mut closure = full_inheritance(entities, properties)?;
    for entity in entities.iter_mut() {
        entity.full_inheritance = closure.remove(&entity.id).unwrap_or_default();
    }
    Ok(())
}
