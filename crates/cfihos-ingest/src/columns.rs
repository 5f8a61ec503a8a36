//! Column names of the CFIHOS source sheets.
//!
//! Entity sheets mix entity rows and attribute rows, told apart by the `object`
//! column. Tag and equipment sheets embed the class kind in their column names,
//! so those are built by the functions at the bottom of this file.

use cfihos_model::CfihosType;

pub const OBJECT: &str = "object";
pub const OBJECT_ENTITY: &str = "entity:";
pub const OBJECT_ATTRIBUTE: &str = "attribute:";

// ============================================================================
// Generic entity sheet
// ============================================================================

pub const UNIQUE_CODE: &str = "CFIHOS unique code";
pub const ENTITY_NAME: &str = "entity name";
pub const DEFINITION: &str = "definition";
pub const FIRST_CLASS_CITIZEN: &str = "is first class citizen";
pub const PARENT_ID: &str = "parent CFIHOS unique ID";
pub const PARENT_NAME: &str = "parent entity name";

pub const PROPERTY_NAME: &str = "property name";
pub const RELATION_TARGET: &str = "constraint must be present in";
pub const REQUIREMENT: &str = "identifier / mandatory / optional";
pub const FORMAT: &str = "format";
pub const REVERSE_PROPERTY_ID: &str = "CDF reverse property id";
pub const REVERSE_PROPERTY_NAME: &str = "CDF reverse property name";
pub const REVERSE_PROPERTY_DESCRIPTION: &str = "CDF reverse property description";
pub const IS_LIST: &str = "CDF isList";
pub const IN_MODEL: &str = "in model";

/// Entity property metadata sheet.
pub const METADATA_NAME: &str = "name";

// ============================================================================
// Core model and edge sheets
// ============================================================================

pub const CORE_MODEL_ENTITY_ID: &str = "CFIHOS ID";
pub const CORE_MODEL_TYPE: &str = "inherited core model type";
pub const CORE_MODEL_SPACE: &str = "inherited from space";
pub const CORE_MODEL_VERSION: &str = "type version";

pub const EDGE_SOURCE: &str = "source";
pub const EDGE_DESTINATION: &str = "destination";
pub const EDGE_ID: &str = "edge unique id";
pub const EDGE_NAME: &str = "edge name";
pub const EDGE_DEFINITION: &str = "edge definition";
pub const EDGE_SOURCE_NAME: &str = "source name";
pub const EDGE_DESTINATION_NAME: &str = "destination name";
pub const REVERSE_EDGE_ID: &str = "reverse edge unique id";
pub const REVERSE_EDGE_NAME: &str = "reverse edge name";
pub const REVERSE_EDGE_DEFINITION: &str = "reverse edge definition";

// ============================================================================
// Tag / equipment property metadata sheet
// ============================================================================

pub const PROPERTY_DEFINITION: &str = "property definition";
pub const PROPERTY_DATA_TYPE: &str = "property data type";
pub const PROPERTY_PICKLIST: &str = "property picklist name";
pub const PROPERTY_UOM_DIMENSION: &str = "unit of measure dimension code";
pub const PROPERTY_UNIQUE_CODE: &str = "property CFIHOS unique code";
pub const SI_UOM_CODE: &str = "SI unit of measure CFIHOS unique code";

// ============================================================================
// Tag / equipment class sheets
// ============================================================================

/// Class id column of the class sheet. Equipment sheets qualify it, tag sheets don't.
pub fn class_id(kind: CfihosType) -> String {
    match kind {
        CfihosType::Equipment => class_code(kind),
        _ => UNIQUE_CODE.to_string(),
    }
}

/// Class id column of the class-property sheet.
pub fn class_code(kind: CfihosType) -> String {
    format!("{} class CFIHOS unique code", kind.type_name())
}

pub fn class_name(kind: CfihosType) -> String {
    format!("{} class name", kind.type_name())
}

pub fn class_definition(kind: CfihosType) -> String {
    format!("{} class definition", kind.type_name())
}

pub fn parent_class_name(kind: CfihosType) -> String {
    format!("parent {} class name", kind.type_name())
}
