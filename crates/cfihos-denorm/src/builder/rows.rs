use cfihos_ingest::bound_length;
use cfihos_model::constants::{
    ENTITY_TYPE_GROUP, ENTITY_TYPE_PROPERTY, ENTITY_TYPE_PROPERTY_DESCRIPTION,
    ENTITY_TYPE_PROPERTY_NAME, MAX_DMS_FIELD_NAME, STRING_TARGET_TYPE,
};
use cfihos_model::{EdgeInfo, ModelProperty, PropertyRecord, PropertyType, Result};

/// Group a property lands in, with the storage name of that group.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement<'a> {
    pub group: &'a str,
    pub group_dms_name: &'a str,
    pub first_class_citizen: bool,
}

fn storage_id(id: &str) -> String {
    id.replace('-', "_")
}

/// Model property for one table row.
///
/// Required and unique flags only survive on first-class-citizen rows: shared
/// sparse groups and views hold every class's properties side by side.
pub(crate) fn model_property(p: &PropertyRecord, at: Placement<'_>) -> Result<ModelProperty> {
    let keep_flags = at.first_class_citizen;
    Ok(ModelProperty {
        id: storage_id(&p.id),
        name: p.name.clone(),
        dms_name: bound_length(&p.dms_name, MAX_DMS_FIELD_NAME)?,
        description: p.description.clone(),
        property_type: p.property_type,
        target_type: p.target_type.clone(),
        multi_valued: p.multi_valued,
        is_required: keep_flags && p.is_required,
        is_unique: keep_flags && p.is_unique,
        uom: p.uom.clone(),
        enumeration_table: p.enumeration_table.clone(),
        first_class_citizen: at.first_class_citizen,
        property_group: at.group.to_string(),
        property_group_dms_name: at.group_dms_name.to_string(),
        unique_validation_id: p.unique_validation_id.as_deref().map(storage_id),
        cfihos_id: p.id.clone(),
        through_property: p.through_property.as_deref().map(storage_id),
        edge: p.edge.as_ref().map(|e| EdgeInfo {
            external_id: storage_id(&e.external_id),
            source: storage_id(&e.source),
            target: storage_id(&e.target),
            ..e.clone()
        }),
    })
}

/// Unit-of-measure row of a tag/equipment group: a String holding the unit.
pub(crate) fn uom_property(p: &PropertyRecord, at: Placement<'_>) -> Result<ModelProperty> {
    let mut row = model_property(p, at)?;
    row.description = Some(format!("Unit of Measure for {}", p.name));
    row.property_type = PropertyType::BasicDataType;
    row.target_type = Some(STRING_TARGET_TYPE.to_string());
    Ok(row)
}

fn discriminator(name: &str, description: &str, first_class_citizen: bool) -> ModelProperty {
    ModelProperty {
        id: ENTITY_TYPE_PROPERTY.to_string(),
        name: name.to_string(),
        dms_name: ENTITY_TYPE_PROPERTY.to_string(),
        description: Some(description.to_string()),
        property_type: PropertyType::BasicDataType,
        target_type: Some(STRING_TARGET_TYPE.to_string()),
        multi_valued: false,
        is_required: true,
        is_unique: false,
        uom: None,
        enumeration_table: None,
        first_class_citizen,
        property_group: ENTITY_TYPE_GROUP.to_string(),
        property_group_dms_name: ENTITY_TYPE_GROUP.to_string(),
        unique_validation_id: None,
        cfihos_id: ENTITY_TYPE_PROPERTY.to_string(),
        through_property: None,
        edge: None,
    }
}

/// `entityType` seeded into every sparse group.
pub(crate) fn group_entity_type() -> ModelProperty {
    discriminator(ENTITY_TYPE_PROPERTY, ENTITY_TYPE_PROPERTY, false)
}

/// `entityType` of the reserved `EntityTypeGroup` container itself.
pub(crate) fn reserved_entity_type() -> ModelProperty {
    discriminator(ENTITY_TYPE_PROPERTY, ENTITY_TYPE_PROPERTY, true)
}

/// `entityType` appended to every non-FCC view.
pub(crate) fn view_entity_type() -> ModelProperty {
    discriminator(ENTITY_TYPE_PROPERTY_NAME, ENTITY_TYPE_PROPERTY_DESCRIPTION, false)
}
