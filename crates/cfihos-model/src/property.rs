use serde::{Deserialize, Serialize};

/// Kind of a property: a scalar attribute or one of three relation shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    BasicDataType,
    /// Single reference to one target entity.
    EntityRelation,
    /// Inverse of a direct relation, owned by the relation's target entity.
    EntityReverseRelation,
    /// Many-to-many relation materialized as connecting records.
    EdgeRelation,
}

impl PropertyType {
    pub fn is_relation(self) -> bool {
        !matches!(self, PropertyType::BasicDataType)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::BasicDataType => "BASIC_DATA_TYPE",
            PropertyType::EntityRelation => "ENTITY_RELATION",
            PropertyType::EntityReverseRelation => "ENTITY_REVERSE_RELATION",
            PropertyType::EdgeRelation => "EDGE_RELATION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    Outwards,
    Inwards,
}

/// Endpoints of an edge relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeInfo {
    /// `<source>.<edge unique id>`, shared by both directions of the same edge.
    pub external_id: String,
    pub source: String,
    pub target: String,
    pub source_dms_name: String,
    pub target_dms_name: String,
    pub direction: EdgeDirection,
}

/// Reverse property declared on the source side of a direct relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseDeclaration {
    pub property_id: String,
    pub name: String,
    pub description: Option<String>,
}

/// One attribute or relation row of the merged property table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: String,
    pub name: String,
    pub dms_name: String,
    pub description: Option<String>,
    pub property_type: PropertyType,
    /// Scalar type name, or the storage id of the target entity for relations.
    pub target_type: Option<String>,
    /// Scalar type of the raw `format` column, kept for relation scalar companions.
    pub original_target_type: Option<String>,
    pub multi_valued: bool,
    pub is_required: bool,
    pub is_unique: bool,
    pub uom: Option<String>,
    pub enumeration_table: Option<String>,
    pub first_class_citizen: bool,
    pub in_model: bool,
    /// Owning entity id; `None` for free-standing property metadata.
    pub entity_id: Option<String>,
    pub entity_name: Option<String>,
    /// Globally unique key of the row, normally `entity_id + id`.
    pub unique_validation_id: Option<String>,
    /// Set on direct relations that also declare an inverse.
    pub reverse_declaration: Option<ReverseDeclaration>,
    /// Set on reverse relations: id of the direct relation they invert.
    pub through_property: Option<String>,
    pub edge: Option<EdgeInfo>,
}

impl PropertyRecord {
    pub fn basic(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dms_name: String::new(),
            description: None,
            property_type: PropertyType::BasicDataType,
            target_type: None,
            original_target_type: None,
            multi_valued: false,
            is_required: false,
            is_unique: false,
            uom: None,
            enumeration_table: None,
            first_class_citizen: false,
            in_model: false,
            entity_id: None,
            entity_name: None,
            unique_validation_id: None,
            reverse_declaration: None,
            through_property: None,
            edge: None,
        }
    }

    /// Owner id concatenated with the property id.
    pub fn validation_id_for(entity_id: &str, property_id: &str) -> String {
        format!("{entity_id}{property_id}")
    }

    pub fn has_uom(&self) -> bool {
        self.uom.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// A property of a produced model entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProperty {
    pub id: String,
    pub name: String,
    pub dms_name: String,
    pub description: Option<String>,
    pub property_type: PropertyType,
    pub target_type: Option<String>,
    pub multi_valued: bool,
    pub is_required: bool,
    pub is_unique: bool,
    pub uom: Option<String>,
    pub enumeration_table: Option<String>,
    pub first_class_citizen: bool,
    pub property_group: String,
    pub property_group_dms_name: String,
    pub unique_validation_id: Option<String>,
    pub cfihos_id: String,
    pub through_property: Option<String>,
    pub edge: Option<EdgeInfo>,
}
