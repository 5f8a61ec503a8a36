//! Id/name mapping tables and their cross-source union.
//!
//! Every loader builds its own tables from its master object sheet. Relations
//! may point across sources (an entity attribute targeting a tag class, say),
//! so loaders resolve names against a [`MappingContext`] holding the union of
//! all loaders' tables, merged in an explicit order.

use std::collections::BTreeMap;

/// Lookup tables built from one master object sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTables {
    /// Prefixed entity id → storage id (`TCFIHOS-30000101` → `TCFIHOS_30000101`).
    pub entity_id_to_dms_id: BTreeMap<String, String>,
    pub dms_id_to_entity_id: BTreeMap<String, String>,
    /// Lowercased entity name → unprefixed entity id.
    pub name_to_entity_id: BTreeMap<String, String>,
}

impl MappingTables {
    pub fn is_empty(&self) -> bool {
        self.entity_id_to_dms_id.is_empty() && self.name_to_entity_id.is_empty()
    }

    /// Copy every entry of `other` into `self`; entries of `other` win on collision.
    pub fn absorb(&mut self, other: &MappingTables) -> usize {
        let mut overwritten = 0;
        for (k, v) in &other.entity_id_to_dms_id {
            if self.entity_id_to_dms_id.insert(k.clone(), v.clone()).is_some_and(|old| &old != v) {
                overwritten += 1;
            }
        }
        for (k, v) in &other.dms_id_to_entity_id {
            if self.dms_id_to_entity_id.insert(k.clone(), v.clone()).is_some_and(|old| &old != v) {
                overwritten += 1;
            }
        }
        for (k, v) in &other.name_to_entity_id {
            if self.name_to_entity_id.insert(k.clone(), v.clone()).is_some_and(|old| &old != v) {
                overwritten += 1;
            }
        }
        overwritten
    }
}

/// Union of the mapping tables of every configured source.
#[derive(Debug, Clone, Default)]
pub struct MappingContext {
    tables: MappingTables,
    merge_order: Vec<String>,
}

impl MappingContext {
    /// Merge `sources` in the given order; later sources win on key collisions.
    pub fn synchronize<'a, I>(sources: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a MappingTables)>,
    {
        let mut ctx = Self::default();
        for (name, tables) in sources {
            let overwritten = ctx.tables.absorb(tables);
            if overwritten > 0 {
                tracing::warn!(
                    source = name,
                    overwritten,
                    "mapping entries overwritten while merging source"
                );
            }
            ctx.merge_order.push(name.to_string());
        }
        if ctx.merge_order.is_empty() {
            tracing::warn!("no model processors configured, mapping tables are empty");
        } else {
            tracing::info!(
                sources = ctx.merge_order.len(),
                entities = ctx.tables.entity_id_to_dms_id.len(),
                names = ctx.tables.name_to_entity_id.len(),
                "synchronized mapping tables"
            );
        }
        ctx
    }

    pub fn tables(&self) -> &MappingTables {
        &self.tables
    }

    /// Source names in the order they were merged.
    pub fn merge_order(&self) -> &[String] {
        &self.merge_order
    }

    pub fn dms_id(&self, entity_id: &str) -> Option<&str> {
        self.tables.entity_id_to_dms_id.get(entity_id).map(String::as_str)
    }

    pub fn entity_id(&self, dms_id: &str) -> Option<&str> {
        self.tables.dms_id_to_entity_id.get(dms_id).map(String::as_str)
    }

    /// Case-insensitive name lookup.
    pub fn entity_id_by_name(&self, name: &str) -> Option<&str> {
        self.tables
            .name_to_entity_id
            .get(&name.to_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(pairs: &[(&str, &str)], names: &[(&str, &str)]) -> MappingTables {
        let mut t = MappingTables::default();
        for (id, dms) in pairs {
            t.entity_id_to_dms_id.insert(id.to_string(), dms.to_string());
            t.dms_id_to_entity_id.insert(dms.to_string(), id.to_string());
        }
        for (name, id) in names {
            t.name_to_entity_id.insert(name.to_string(), id.to_string());
        }
        t
    }

    #[test]
    fn test_union_spans_sources() {
        let entities = tables(&[("CFIHOS-00000001", "CFIHOS_00000001")], &[("pump", "CFIHOS-00000001")]);
        let tags = tables(&[("TCFIHOS-30000101", "TCFIHOS_30000101")], &[("valve tag", "CFIHOS-30000101")]);

        let ctx = MappingContext::synchronize([("entities", &entities), ("tags", &tags)]);

        assert_eq!(ctx.dms_id("TCFIHOS-30000101"), Some("TCFIHOS_30000101"));
        assert_eq!(ctx.entity_id("CFIHOS_00000001"), Some("CFIHOS-00000001"));
        assert_eq!(ctx.entity_id_by_name("Valve Tag"), Some("CFIHOS-30000101"));
        assert_eq!(ctx.merge_order(), ["entities".to_string(), "tags".to_string()]);
    }

    #[test]
    fn test_later_source_wins_on_collision() {
        let first = tables(&[], &[("pump", "CFIHOS-00000001")]);
        let second = tables(&[], &[("pump", "CFIHOS-00000002")]);

        let ctx = MappingContext::synchronize([("a", &first), ("b", &second)]);
        assert_eq!(ctx.entity_id_by_name("pump"), Some("CFIHOS-00000002"));

        let ctx = MappingContext::synchronize([("b", &second), ("a", &first)]);
        assert_eq!(ctx.entity_id_by_name("pump"), Some("CFIHOS-00000001"));
    }

    #[test]
    fn test_empty_source_list() {
        let ctx = MappingContext::synchronize(std::iter::empty::<(&str, &MappingTables)>());
        assert!(ctx.tables().is_empty());
        assert!(ctx.merge_order().is_empty());
    }
}
