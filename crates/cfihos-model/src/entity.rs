use serde::{Deserialize, Serialize};

use crate::constants::{
    CFIHOS_TYPE_ENTITY, CFIHOS_TYPE_EQUIPMENT, CFIHOS_TYPE_TAG, CFIHOS_TYPE_TAG_OR_EQUIPMENT,
    ENTITY_ID_PREFIX, ENTITY_TYPE_PREFIX, EQUIPMENT_TYPE_PREFIX, TAG_OR_EQUIPMENT_ID_PREFIX,
    TAG_TYPE_PREFIX,
};
use crate::property::ModelProperty;

// ============================================================================
// Source kinds
// ============================================================================

/// The CFIHOS source kinds a loader can ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CfihosType {
    Entity,
    Tag,
    Equipment,
}

impl CfihosType {
    pub const ALL: [CfihosType; 3] = [CfihosType::Entity, CfihosType::Tag, CfihosType::Equipment];

    /// Tag used in `included_cfihos_types_config` entries.
    pub fn config_tag(self) -> &'static str {
        match self {
            CfihosType::Entity => "cfihosTypeEntity",
            CfihosType::Tag => "cfihosTypeTag",
            CfihosType::Equipment => "cfihosTypeEquipment",
        }
    }

    pub fn from_config_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.config_tag() == tag)
    }

    /// Lowercase type name, also used as the `<kind>` in tag/equipment column names.
    pub fn type_name(self) -> &'static str {
        match self {
            CfihosType::Entity => CFIHOS_TYPE_ENTITY,
            CfihosType::Tag => CFIHOS_TYPE_TAG,
            CfihosType::Equipment => CFIHOS_TYPE_EQUIPMENT,
        }
    }

    /// Value of the master sheet's type column for this kind.
    pub fn master_type(self) -> &'static str {
        match self {
            CfihosType::Entity => CFIHOS_TYPE_ENTITY,
            CfihosType::Tag | CfihosType::Equipment => CFIHOS_TYPE_TAG_OR_EQUIPMENT,
        }
    }

    /// Letter prepended to class ids so tag and equipment classes never collide.
    pub fn type_prefix(self) -> &'static str {
        match self {
            CfihosType::Entity => ENTITY_TYPE_PREFIX,
            CfihosType::Tag => TAG_TYPE_PREFIX,
            CfihosType::Equipment => EQUIPMENT_TYPE_PREFIX,
        }
    }

    pub fn default_type_id_prefix(self) -> &'static str {
        match self {
            CfihosType::Entity => ENTITY_ID_PREFIX,
            CfihosType::Tag | CfihosType::Equipment => TAG_OR_EQUIPMENT_ID_PREFIX,
        }
    }

    /// Kind of a (prefixed) entity id, judged by its leading letter.
    pub fn of_entity_id(id: &str) -> Self {
        if id.starts_with(TAG_TYPE_PREFIX) {
            CfihosType::Tag
        } else if id.starts_with(EQUIPMENT_TYPE_PREFIX) {
            CfihosType::Equipment
        } else {
            CfihosType::Entity
        }
    }
}

// ============================================================================
// Table records
// ============================================================================

/// Link from a CFIHOS entity to a base type of an external core model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoreModelRef {
    pub external_id: String,
    pub space: String,
    pub version: String,
}

/// One CFIHOS entity, tag class or equipment class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Source id, prefixed with the type letter for tag/equipment classes.
    pub id: String,
    pub name: String,
    pub dms_name: String,
    pub description: Option<String>,
    /// Parent ids; empty for roots.
    pub parents: Vec<String>,
    pub parent_names: Vec<String>,
    pub first_class_citizen: bool,
    pub implements_core_model: Vec<CoreModelRef>,
    /// Transitive ancestors that own at least one property. Filled by the closure pass.
    #[serde(default)]
    pub full_inheritance: Vec<String>,
    pub cfihos_type: CfihosType,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cfihos_type: CfihosType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dms_name: String::new(),
            description: None,
            parents: Vec::new(),
            parent_names: Vec::new(),
            first_class_citizen: false,
            implements_core_model: Vec::new(),
            full_inheritance: Vec::new(),
            cfihos_type,
        }
    }
}

// ============================================================================
// Model records
// ============================================================================

/// An entity of the produced model: a view, a wide sparse container, or a
/// first-class-citizen container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntity {
    /// Storage identifier; also the key in `ModelEntities`.
    pub entity_id: String,
    pub name: String,
    pub dms_name: String,
    pub description: Option<String>,
    pub cfihos_type: String,
    pub cfihos_id: String,
    pub first_class_citizen: bool,
    pub inherits_from_id: Vec<String>,
    pub inherits_from_name: Vec<String>,
    pub full_inheritance: Vec<String>,
    pub implements_core_model: Vec<CoreModelRef>,
    /// Raw filter restricting a non-FCC view to its own and descendant entity types.
    pub view_filter: Option<String>,
    pub properties: Vec<ModelProperty>,
}

impl ModelEntity {
    pub fn new(entity_id: impl Into<String>, name: impl Into<String>) -> Self {
        let entity_id = entity_id.into();
        Self {
            dms_name: entity_id.clone(),
            cfihos_type: String::new(),
            cfihos_id: entity_id.clone(),
            entity_id,
            name: name.into(),
            description: None,
            first_class_citizen: false,
            inherits_from_id: Vec::new(),
            inherits_from_name: Vec::new(),
            full_inheritance: Vec::new(),
            implements_core_model: Vec::new(),
            view_filter: None,
            properties: Vec::new(),
        }
    }

    pub fn property(&self, id: &str) -> Option<&ModelProperty> {
        self.properties.iter().find(|p| p.id == id)
    }
}
