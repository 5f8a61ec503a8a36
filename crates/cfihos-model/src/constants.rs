//! Fixed CFIHOS naming and sizing constants.

/// Default number of properties per sparse group.
pub const CONTAINER_PROPERTY_LIMIT: u64 = 100;
pub const MODEL_VERSION_LENGTH: usize = 4;
pub const MAX_DMS_MODEL_NAME: usize = 54;
pub const MAX_DMS_FIELD_NAME: usize = 54;

pub const CDF_CDM_SPACE: &str = "cdf_cdm";
pub const CDF_CDM_VERSION: &str = "v1";

pub const CFIHOS_TYPE_ENTITY: &str = "entity";
pub const CFIHOS_TYPE_TAG: &str = "tag";
pub const CFIHOS_TYPE_EQUIPMENT: &str = "equipment";
pub const CFIHOS_TYPE_TAG_OR_EQUIPMENT: &str = "tag or equipment class";

pub const ENTITY_TYPE_PREFIX: &str = "";
pub const EQUIPMENT_TYPE_PREFIX: &str = "E";
pub const TAG_TYPE_PREFIX: &str = "T";

pub const CFIHOS_ID_PREFIX: &str = "CFIHOS-";
pub const ENTITY_ID_PREFIX: &str = "CFIHOS-0";
pub const TAG_OR_EQUIPMENT_ID_PREFIX: &str = "CFIHOS-3";

pub const PARENT_SUFFIX: &str = "_parent";
pub const RELATION_SUFFIX: &str = "_rel";
pub const LIST_SUFFIX: &str = "_list";
pub const EDGE_SUFFIX: &str = "_edge";
pub const UOM_SUFFIX: &str = "_UOM";
pub const EXTENSION_SUFFIX: &str = "_ext";

/// Global roots of the tag-class and equipment-class hierarchies.
pub const TAG_ROOT_NODE: &str = "TCFIHOS-30000311";
pub const EQUIPMENT_ROOT_NODE: &str = "ECFIHOS-30000311";

/// Reserved synthetic entity used to filter instances inside wide containers.
pub const ENTITY_TYPE_GROUP: &str = "EntityTypeGroup";
pub const ENTITY_TYPE_PROPERTY: &str = "entityType";
pub const ENTITY_TYPE_GROUP_DESCRIPTION: &str =
    "Container that holds CFIHOS IDs to be used in filtering instances in wide containers";
pub const ENTITY_TYPE_PROPERTY_NAME: &str = "Entity Type Property";
pub const ENTITY_TYPE_PROPERTY_DESCRIPTION: &str =
    "Property used to hold CFIHOS IDs to be used in filtering instances in containers";

/// Scalar type given to synthetic discriminator and unit-of-measure properties.
pub const STRING_TARGET_TYPE: &str = "String";
