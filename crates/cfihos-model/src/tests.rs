use super::*;

#[test]
fn test_config_tags_round_trip_through_type() {
    for t in CfihosType::ALL {
        assert_eq!(CfihosType::from_config_tag(t.config_tag()), Some(t));
    }
    assert_eq!(CfihosType::from_config_tag("cfihosTypeValve"), None);
}

#[test]
fn test_entity_kind_from_prefixed_id() {
    assert_eq!(CfihosType::of_entity_id("TCFIHOS-30000101"), CfihosType::Tag);
    assert_eq!(CfihosType::of_entity_id("ECFIHOS-30000101"), CfihosType::Equipment);
    assert_eq!(CfihosType::of_entity_id("CFIHOS-00000001"), CfihosType::Entity);
}

#[test]
fn test_property_type_serializes_to_wire_names() {
    let json = serde_json::to_string(&PropertyType::EntityReverseRelation).unwrap();
    assert_eq!(json, "\"ENTITY_REVERSE_RELATION\"");
    assert_eq!(PropertyType::EdgeRelation.as_str(), "EDGE_RELATION");
    assert!(!PropertyType::BasicDataType.is_relation());
    assert!(PropertyType::EntityRelation.is_relation());
}

#[test]
fn test_error_kinds_follow_taxonomy() {
    assert_eq!(
        CfihosError::MissingConfigKeys(vec!["model_version".into()]).kind(),
        ErrorKind::Configuration
    );
    assert_eq!(
        CfihosError::MissingTypeConversion("Blob".into()).kind(),
        ErrorKind::Mapping
    );
    assert_eq!(
        CfihosError::IneligibleReverseTarget("P1".into()).kind(),
        ErrorKind::Consistency
    );
}

#[test]
fn test_error_messages_carry_offending_ids() {
    let err = CfihosError::DuplicateValidationIds(vec!["E1P1".into(), "E2P2".into()]);
    assert_eq!(
        err.to_string(),
        "Processed Properties has overlapping entity-property-ids: E1P1, E2P2"
    );
    let err = CfihosError::DuplicateModelProperty {
        property: "P1".into(),
        entity: "E1".into(),
        scope: "FCC ",
    };
    assert_eq!(err.to_string(), "Found duplicate property id 'P1' in FCC E1");
}

#[test]
fn test_uom_presence_ignores_blank_values() {
    let mut p = PropertyRecord::basic("CFIHOS-1", "length");
    assert!(!p.has_uom());
    p.uom = Some("  ".into());
    assert!(!p.has_uom());
    p.uom = Some("CFIHOS-70000001".into());
    assert!(p.has_uom());
}
