use anyhow::Result;
use std::collections::BTreeMap;

use cfihos_model::constants::{EDGE_SUFFIX, LIST_SUFFIX, RELATION_SUFFIX};
use cfihos_model::{
    CfihosError, CfihosType, CoreModelRef, EdgeDirection, EdgeInfo, EntityRecord, PropertyRecord,
    PropertyType, ReverseDeclaration,
};

use super::{class, id_tail, LoadedTables, SourceLoader};
use crate::columns as col;
use crate::config::SourceTypeConfig;
use crate::context::MappingContext;
use crate::sanitize::{pascal, sanitize_name, snake, CaseStyle};
use crate::sheet::{Row, Sheet, SheetReader};
use crate::vocab::{map_required, map_scalar_type_or_text, map_unique};

pub(super) fn load(
    loader: &SourceLoader,
    t: &SourceTypeConfig,
    reader: &dyn SheetReader,
    ctx: &MappingContext,
) -> Result<LoadedTables> {
    let dictionary = loader.read(reader, t, &t.entities_fname)?;

    let mut entities = entity_rows(&dictionary);
    if let Some(fname) = &t.entities_core_model {
        let sheet = loader.read(reader, t, fname)?;
        attach_core_models(&mut entities, &sheet);
    }

    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
    for e in &entities {
        owners.entry(e.name.as_str()).or_insert(e.id.as_str());
    }

    let mut properties = Vec::new();
    let mut reverse = Vec::new();
    for row in dictionary.rows_where(col::OBJECT, col::OBJECT_ATTRIBUTE) {
        let Some((property, points_to)) = entity_property(row, &owners, ctx)? else {
            continue;
        };
        if let Some(rev) = reverse_relation(&property, points_to.as_deref(), ctx) {
            reverse.push(rev);
        }
        properties.push(property);
    }
    if !reverse.is_empty() {
        tracing::info!(count = reverse.len(), "appending reverse direct relation properties");
    }
    properties.extend(reverse);

    if let Some(fname) = &t.entities_edges {
        let sheet = loader.read(reader, t, fname)?;
        let edges = edge_properties(&sheet, ctx);
        tracing::info!(count = edges.len(), "appending edge properties");
        properties.extend(edges);
    }

    let mut metadata = Vec::new();
    if let Some(fname) = &t.entities_attrib_fname {
        let sheet = loader.read(reader, t, fname)?;
        metadata.extend(entity_metadata(&sheet)?);
    }
    if let Some(path) = t.base_path(t.base_entities_attrib_fname.as_deref()) {
        metadata.extend(entity_metadata(&reader.read_sheet(&path)?)?);
    }
    if let Some(path) = t.base_path(t.base_tag_attrib_fname.as_deref()) {
        metadata.extend(class::metadata_rows(&reader.read_sheet(&path)?)?);
    }

    Ok(LoadedTables {
        entities,
        properties,
        metadata,
    })
}

fn entity_rows(sheet: &Sheet) -> Vec<EntityRecord> {
    let mut out = Vec::new();
    for row in sheet.rows_where(col::OBJECT, col::OBJECT_ENTITY) {
        let Some(id) = row.non_empty(col::UNIQUE_CODE) else {
            tracing::warn!(sheet = %sheet.name, "entity row without id, skipped");
            continue;
        };
        let name = row.text(col::ENTITY_NAME).unwrap_or_default();
        let mut entity = EntityRecord::new(id, name, CfihosType::Entity);
        entity.dms_name = pascal(&entity.name);
        entity.description = row.non_empty(col::DEFINITION);
        entity.first_class_citizen = row.truthy(col::FIRST_CLASS_CITIZEN);
        entity.parents = row.non_empty(col::PARENT_ID).into_iter().collect();
        entity.parent_names = row.non_empty(col::PARENT_NAME).into_iter().collect();
        out.push(entity);
    }
    out
}

fn attach_core_models(entities: &mut [EntityRecord], sheet: &Sheet) {
    let mut by_entity: BTreeMap<String, Vec<CoreModelRef>> = BTreeMap::new();
    for row in &sheet.rows {
        let (Some(id), Some(external_id)) = (
            row.non_empty(col::CORE_MODEL_ENTITY_ID),
            row.non_empty(col::CORE_MODEL_TYPE),
        ) else {
            continue;
        };
        by_entity.entry(id).or_default().push(CoreModelRef {
            external_id,
            space: row.text(col::CORE_MODEL_SPACE).unwrap_or_default(),
            version: row.text(col::CORE_MODEL_VERSION).unwrap_or_default(),
        });
    }
    for e in entities {
        if let Some(refs) = by_entity.remove(&e.id) {
            e.implements_core_model = refs;
        }
    }
}

/// One attribute row. Returns the property and, for relations, the raw target name.
fn entity_property(
    row: &Row,
    owners: &BTreeMap<&str, &str>,
    ctx: &MappingContext,
) -> cfihos_model::Result<Option<(PropertyRecord, Option<String>)>> {
    let Some(raw_id) = row.non_empty(col::UNIQUE_CODE) else {
        tracing::warn!("attribute row without id, skipped");
        return Ok(None);
    };
    let name = row.text(col::PROPERTY_NAME).unwrap_or_default();
    let entity_name = row.text(col::ENTITY_NAME);
    let entity_id = entity_name
        .as_deref()
        .and_then(|n| owners.get(n))
        .map(|id| id.to_string());
    if entity_id.is_none() {
        tracing::debug!(property = %raw_id, entity = ?entity_name, "attribute without known owner");
    }

    let scalar = map_scalar_type_or_text(row.text(col::FORMAT).as_deref(), &raw_id)?;
    let points_to = row.non_empty(col::RELATION_TARGET);
    let (property_type, target_type) = match &points_to {
        Some(target) => {
            let key = target.replace("  ", " ");
            let dms = ctx
                .entity_id_by_name(&key)
                .and_then(|id| ctx.dms_id(id))
                .ok_or_else(|| CfihosError::RelationTargetNotFound(target.clone()))?;
            (PropertyType::EntityRelation, dms.to_string())
        }
        None => (PropertyType::BasicDataType, scalar.to_string()),
    };
    let is_relation = property_type == PropertyType::EntityRelation;
    let multi_valued = row.truthy(col::IS_LIST);

    let mut id = raw_id;
    if is_relation {
        id.push_str(RELATION_SUFFIX);
    }
    if multi_valued {
        id.push_str(LIST_SUFFIX);
    }

    let mut p = PropertyRecord::basic(id, name);
    p.dms_name = sanitize_name(&p.name, CaseStyle::Snake, is_relation);
    p.description = row.non_empty(col::DEFINITION);
    p.property_type = property_type;
    p.target_type = Some(target_type);
    p.original_target_type = Some(scalar.to_string());
    p.multi_valued = multi_valued;
    p.is_required = map_required(row.value(col::REQUIREMENT))?;
    p.is_unique = map_unique(row.value(col::REQUIREMENT))?;
    p.in_model = row.truthy(col::IN_MODEL);
    p.entity_id = entity_id;
    p.entity_name = entity_name;
    p.reverse_declaration = row
        .non_empty(col::REVERSE_PROPERTY_ID)
        .map(|property_id| ReverseDeclaration {
            property_id,
            name: row.text(col::REVERSE_PROPERTY_NAME).unwrap_or_default(),
            description: row.non_empty(col::REVERSE_PROPERTY_DESCRIPTION),
        });
    Ok(Some((p, points_to)))
}

/// The inverse of a direct relation that declares a reverse property, owned by
/// the relation's target entity.
fn reverse_relation(
    source: &PropertyRecord,
    points_to: Option<&str>,
    ctx: &MappingContext,
) -> Option<PropertyRecord> {
    let decl = source.reverse_declaration.as_ref()?;
    if source.property_type != PropertyType::EntityRelation {
        tracing::warn!(property = %source.id, "reverse property declared on a non-relation, skipped");
        return None;
    }
    let Some(source_entity) = source.entity_id.as_deref() else {
        tracing::warn!(property = %source.id, "reverse property on an attribute without owner, skipped");
        return None;
    };
    let owner = source.target_type.as_deref().and_then(|t| ctx.entity_id(t));
    let target = ctx.dms_id(source_entity);
    let (Some(owner), Some(target)) = (owner, target) else {
        tracing::warn!(property = %source.id, "reverse property endpoints not in mapping table, skipped");
        return None;
    };

    let id = format!("{}_{}", source.id, id_tail(source_entity));
    let mut rev = source.clone();
    rev.unique_validation_id = Some(PropertyRecord::validation_id_for(owner, &id));
    rev.id = id;
    rev.name = decl.name.clone();
    rev.dms_name = snake(&decl.name);
    rev.description = decl.description.clone();
    rev.property_type = PropertyType::EntityReverseRelation;
    rev.target_type = Some(target.to_string());
    rev.multi_valued = true;
    rev.entity_id = Some(owner.to_string());
    rev.entity_name = points_to.map(str::to_string);
    rev.reverse_declaration = None;
    rev.through_property = Some(source.id.clone());
    Some(rev)
}

fn edge_properties(sheet: &Sheet, ctx: &MappingContext) -> Vec<PropertyRecord> {
    let mut out = Vec::new();
    for row in &sheet.rows {
        let (Some(source), Some(destination), Some(edge_id)) = (
            row.non_empty(col::EDGE_SOURCE),
            row.non_empty(col::EDGE_DESTINATION),
            row.non_empty(col::EDGE_ID),
        ) else {
            tracing::warn!(sheet = %sheet.name, "edge row without source, destination or id, skipped");
            continue;
        };
        let external_id = format!("{source}.{edge_id}");
        let source_name = row.text(col::EDGE_SOURCE_NAME).unwrap_or_default();
        let destination_name = row.text(col::EDGE_DESTINATION_NAME).unwrap_or_default();
        let in_model = row.truthy(col::IN_MODEL);

        let outwards = EdgeInfo {
            external_id: external_id.clone(),
            source: source.clone(),
            target: destination.clone(),
            source_dms_name: snake(&source_name),
            target_dms_name: snake(&destination_name),
            direction: EdgeDirection::Outwards,
        };
        out.push(edge_property(
            edge_id,
            row.text(col::EDGE_NAME).unwrap_or_default(),
            row.non_empty(col::EDGE_DEFINITION),
            outwards,
            in_model,
            ctx,
        ));

        if let Some(reverse_id) = row.non_empty(col::REVERSE_EDGE_ID) {
            let inwards = EdgeInfo {
                external_id,
                source: destination,
                target: source,
                source_dms_name: snake(&destination_name),
                target_dms_name: snake(&source_name),
                direction: EdgeDirection::Inwards,
            };
            out.push(edge_property(
                reverse_id,
                row.text(col::REVERSE_EDGE_NAME).unwrap_or_default(),
                row.non_empty(col::REVERSE_EDGE_DEFINITION),
                inwards,
                in_model,
                ctx,
            ));
        }
    }
    out
}

fn edge_property(
    id: String,
    name: String,
    description: Option<String>,
    edge: EdgeInfo,
    in_model: bool,
    ctx: &MappingContext,
) -> PropertyRecord {
    let mut p = PropertyRecord::basic(id, name);
    p.dms_name = format!("{}{EDGE_SUFFIX}", snake(&p.name));
    p.description = description;
    p.property_type = PropertyType::EdgeRelation;
    p.target_type = ctx.dms_id(&edge.target).map(str::to_string);
    p.multi_valued = true;
    p.in_model = in_model;
    p.entity_id = Some(edge.source.clone());
    p.edge = Some(edge);
    p
}

/// Entity attribute metadata: `CFIHOS unique code`, `name`, `definition`, `format`.
fn entity_metadata(sheet: &Sheet) -> cfihos_model::Result<Vec<PropertyRecord>> {
    let mut out = Vec::new();
    for row in &sheet.rows {
        let Some(id) = row.non_empty(col::UNIQUE_CODE) else {
            continue;
        };
        let scalar = map_scalar_type_or_text(row.text(col::FORMAT).as_deref(), &id)?;
        let mut p = PropertyRecord::basic(id, row.text(col::METADATA_NAME).unwrap_or_default());
        p.dms_name = snake(&p.name);
        p.description = row.non_empty(col::DEFINITION);
        p.target_type = Some(scalar.to_string());
        p.original_target_type = Some(scalar.to_string());
        out.push(p);
    }
    Ok(out)
}
