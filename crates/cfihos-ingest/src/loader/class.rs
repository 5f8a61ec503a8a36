use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};

use cfihos_model::{CfihosType, EntityRecord, PropertyRecord};

use super::{LoadedTables, SourceLoader};
use crate::columns as col;
use crate::config::SourceTypeConfig;
use crate::context::MappingContext;
use crate::sanitize::{pascal, snake};
use crate::sheet::{Row, Sheet, SheetReader};
use crate::vocab::map_scalar_type_or_text;

/// Load a tag-class or equipment-class source.
pub(super) fn load(
    loader: &SourceLoader,
    kind: CfihosType,
    t: &SourceTypeConfig,
    reader: &dyn SheetReader,
    ctx: &MappingContext,
) -> Result<LoadedTables> {
    let type_id_prefix = t.type_id_prefix(kind);
    let classes = loader.read(reader, t, &t.entities_fname)?;
    let entities = class_rows(&classes, kind, &type_id_prefix, ctx);

    let mut metadata = Vec::new();
    if let Some(fname) = &t.property_metadata_fname {
        metadata.extend(metadata_rows(&loader.read(reader, t, fname)?)?);
    }
    if let Some(path) = t.base_path(t.base_property_metadata_fname.as_deref()) {
        metadata.extend(metadata_rows(&reader.read_sheet(&path)?)?);
    }

    let mut properties = Vec::new();
    if let Some(fname) = &t.entities_attrib_fname {
        let sheet = loader.read(reader, t, fname)?;
        properties = class_properties(&sheet, kind, &type_id_prefix, &metadata)?;
    }

    Ok(LoadedTables {
        entities,
        properties,
        metadata,
    })
}

fn prefixed(id: &str, kind: CfihosType, type_id_prefix: &str) -> String {
    if id.starts_with(type_id_prefix) {
        format!("{}{id}", kind.type_prefix())
    } else {
        id.to_string()
    }
}

/// Class rows; a class listed on several rows collects all of its parents.
fn class_rows(
    sheet: &Sheet,
    kind: CfihosType,
    type_id_prefix: &str,
    ctx: &MappingContext,
) -> Vec<EntityRecord> {
    let id_col = col::class_id(kind);
    let name_col = col::class_name(kind);
    let definition_col = col::class_definition(kind);
    let parent_col = col::parent_class_name(kind);

    // First pass: ids and names of every class in the sheet.
    let mut order: Vec<String> = Vec::new();
    let mut classes: BTreeMap<String, EntityRecord> = BTreeMap::new();
    let mut raw_parents: Vec<(String, String)> = Vec::new();
    for row in &sheet.rows {
        let Some(raw_id) = row.non_empty(&id_col) else {
            continue;
        };
        let id = prefixed(&raw_id, kind, type_id_prefix);
        if !classes.contains_key(&id) {
            let name = row.text(&name_col).unwrap_or_default();
            let mut e = EntityRecord::new(id.clone(), name, kind);
            e.dms_name = format!("{}_{}", pascal(&e.name), kind.type_prefix());
            e.description = row.non_empty(&definition_col);
            classes.insert(id.clone(), e);
            order.push(id.clone());
        }
        if let Some(parent_name) = row.non_empty(&parent_col) {
            raw_parents.push((id, parent_name));
        }
    }

    // Second pass: parents resolve by name and must be classes of this sheet.
    for (id, parent_name) in raw_parents {
        let parent = ctx
            .entity_id_by_name(&parent_name)
            .filter(|p| p.starts_with(type_id_prefix))
            .map(|p| format!("{}{p}", kind.type_prefix()));
        let Some(parent) = parent.filter(|p| classes.contains_key(p)) else {
            tracing::debug!(class = %id, parent = %parent_name, "parent class not resolved");
            continue;
        };
        let parent_display = classes
            .get(&parent)
            .map(|p| p.name.clone())
            .unwrap_or(parent_name);
        if let Some(e) = classes.get_mut(&id) {
            if !e.parents.contains(&parent) {
                e.parents.push(parent);
                e.parent_names.push(parent_display);
            }
        }
    }

    order.into_iter().filter_map(|id| classes.remove(&id)).collect()
}

/// Property metadata rows of the tag/equipment metadata sheet.
pub(super) fn metadata_rows(sheet: &Sheet) -> cfihos_model::Result<Vec<PropertyRecord>> {
    let mut out = Vec::new();
    for row in &sheet.rows {
        if let Some(p) = metadata_row(row)? {
            out.push(p);
        }
    }
    Ok(out)
}

fn metadata_row(row: &Row) -> cfihos_model::Result<Option<PropertyRecord>> {
    let Some(id) = row.non_empty(col::UNIQUE_CODE) else {
        return Ok(None);
    };
    let raw_type = row.text(col::PROPERTY_DATA_TYPE);
    let scalar = map_scalar_type_or_text(raw_type.as_deref(), &id)?;
    let mut p = PropertyRecord::basic(id, row.text(col::PROPERTY_NAME).unwrap_or_default());
    p.dms_name = snake(&p.name);
    p.description = row.non_empty(col::PROPERTY_DEFINITION);
    p.target_type = Some(scalar.to_string());
    p.original_target_type = Some(scalar.to_string());
    p.enumeration_table = row.non_empty(col::PROPERTY_PICKLIST);
    p.uom = row.non_empty(col::PROPERTY_UOM_DIMENSION);
    p.in_model = row.truthy(col::IN_MODEL);
    Ok(Some(p))
}

/// Class-property rows merged with their metadata: the row's own name, unit and
/// in-model flag win; description, data type and picklist come from metadata.
fn class_properties(
    sheet: &Sheet,
    kind: CfihosType,
    type_id_prefix: &str,
    metadata: &[PropertyRecord],
) -> cfihos_model::Result<Vec<PropertyRecord>> {
    let class_col = col::class_code(kind);
    let class_name_col = col::class_name(kind);
    let mut by_id: BTreeMap<&str, &PropertyRecord> = BTreeMap::new();
    for m in metadata {
        by_id.entry(m.id.as_str()).or_insert(m);
    }

    let mut out = Vec::new();
    let mut missing: BTreeSet<String> = BTreeSet::new();
    for row in &sheet.rows {
        let Some(id) = row.non_empty(col::PROPERTY_UNIQUE_CODE) else {
            continue;
        };
        let meta = by_id.get(id.as_str()).copied();
        if meta.is_none() {
            missing.insert(id.clone());
        }

        let name = row
            .non_empty(col::PROPERTY_NAME)
            .or_else(|| meta.map(|m| m.name.clone()))
            .unwrap_or_default();
        let mut p = PropertyRecord::basic(id.clone(), name);
        p.dms_name = snake(&p.name);
        p.description = meta.and_then(|m| m.description.clone());
        let scalar = match meta.and_then(|m| m.target_type.as_deref()) {
            Some(t) => t.to_string(),
            None => map_scalar_type_or_text(None, &id)?.to_string(),
        };
        p.target_type = Some(scalar.clone());
        p.original_target_type = Some(scalar);
        p.enumeration_table = meta.and_then(|m| m.enumeration_table.clone());
        p.uom = row
            .non_empty(col::SI_UOM_CODE)
            .or_else(|| meta.and_then(|m| m.uom.clone()));
        p.in_model = if row.value(col::IN_MODEL).is_some() {
            row.truthy(col::IN_MODEL)
        } else {
            meta.is_some_and(|m| m.in_model)
        };
        p.entity_id = row
            .non_empty(&class_col)
            .map(|c| prefixed(&c, kind, type_id_prefix));
        p.entity_name = row.text(&class_name_col);
        out.push(p);
    }

    if !missing.is_empty() {
        tracing::warn!(
            kind = kind.type_name(),
            count = missing.len(),
            "class properties without metadata"
        );
    }
    Ok(out)
}
