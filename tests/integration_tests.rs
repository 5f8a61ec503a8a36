//! End-to-end tests: JSON sheets on disk → configuration → manager → model.
//!
//! Run with: cargo test --test integration_tests

use std::path::Path;

use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};

use cfihos_denorm::{CfihosManager, ProcessorConfig, ReadResult};
use cfihos_ingest::JsonSheetReader;
use cfihos_model::constants::{ENTITY_TYPE_GROUP, ENTITY_TYPE_PROPERTY};
use cfihos_model::{CfihosError, ErrorKind, ModelEntity, ModelProperty};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn write(dir: &Path, name: &str, value: &Value) {
    std::fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn prop<'a>(entity: &'a ModelEntity, id: &str) -> &'a ModelProperty {
    entity
        .property(id)
        .unwrap_or_else(|| panic!("{} has no property {id}", entity.entity_id))
}

// ============================================================================
// Fixture: one CFIHOS source with generic entities and tag classes
// ============================================================================

fn entity_dictionary(with_reverse: bool) -> Value {
    let mut owning = json!({
        "object": "attribute:", "CFIHOS unique code": "CFIHOS-40000002", "entity name": "Plant",
        "property name": "Owning Document", "format": "Text",
        "constraint must be present in": "Document",
        "identifier / mandatory / optional": "Optional", "in model": "yes"
    });
    if with_reverse {
        owning["CDF reverse property id"] = json!("CFIHOS-40000003");
        owning["CDF reverse property name"] = json!("Plants");
    }
    json!([
        {"object": "entity:", "CFIHOS unique code": "CFIHOS-00000001", "entity name": "Document",
         "definition": "A document", "is first class citizen": "Yes"},
        {"object": "entity:", "CFIHOS unique code": "CFIHOS-00000002", "entity name": "Plant",
         "definition": "A plant", "is first class citizen": "no",
         "parent CFIHOS unique ID": "CFIHOS-00000001", "parent entity name": "Document"},
        {"object": "attribute:", "CFIHOS unique code": "CFIHOS-40000001", "entity name": "Document",
         "property name": "Document Title", "format": "Text, 255",
         "identifier / mandatory / optional": "Mandatory", "in model": "True"},
        owning,
        {"object": "attribute:", "CFIHOS unique code": "CFIHOS-10000050", "entity name": "Plant",
         "property name": "Capacity", "format": "Integer",
         "identifier / mandatory / optional": "Optional", "in model": "yes"},
    ])
}

fn write_sheets(dir: &Path, with_reverse: bool) {
    write(
        dir,
        "master.json",
        &json!([
            {"id": "CFIHOS-00000001", "name": "Document", "kind": "entity"},
            {"id": "CFIHOS-00000002", "name": "Plant", "kind": "entity"},
            {"id": "CFIHOS-30000311", "name": "Tag Root", "kind": "tag or equipment class"},
            {"id": "CFIHOS-30000101", "name": "Valve", "kind": "tag or equipment class"},
            {"id": "CFIHOS-30000397", "name": "Gate Valve", "kind": "tag or equipment class"},
        ]),
    );
    write(dir, "entities.json", &entity_dictionary(with_reverse));
    write(
        dir,
        "tags.json",
        &json!([
            {"CFIHOS unique code": "CFIHOS-30000311", "tag class name": "Tag Root"},
            {"CFIHOS unique code": "CFIHOS-30000101", "tag class name": "Valve",
             "tag class definition": "A valve", "parent tag class name": "Tag Root"},
            {"CFIHOS unique code": "CFIHOS-30000397", "tag class name": "Gate Valve",
             "parent tag class name": "Valve"},
        ]),
    );
    write(
        dir,
        "tag_props.json",
        &json!([
            {"tag class CFIHOS unique code": "CFIHOS-30000397", "tag class name": "Gate Valve",
             "property CFIHOS unique code": "CFIHOS-10000080", "property name": "Nominal Size",
             "in model": "true"},
            {"tag class CFIHOS unique code": "CFIHOS-30000101", "tag class name": "Valve",
             "property CFIHOS unique code": "CFIHOS-10000060", "property name": "Body Material"},
        ]),
    );
    write(
        dir,
        "meta.json",
        &json!([
            {"CFIHOS unique code": "CFIHOS-10000080", "property name": "nominal size",
             "property definition": "Size", "property data type": "NUM",
             "unit of measure dimension code": "length", "in model": "true"},
            {"CFIHOS unique code": "CFIHOS-10000060", "property name": "body material",
             "property data type": "Text", "in model": "yes"},
        ]),
    );
}

fn config(dir: &Path, model_type: &str) -> Value {
    json!({
        "model_processors_config": [{
            "cfihos": {
                "id_prefix": "CFIHOS",
                "abs_fpath_model_raw_data_folder": dir,
                "rdl_master_objects_fname": "master.json",
                "rdl_master_object_id_col_name": "id",
                "rdl_master_object_name_col_name": "name",
                "rdl_master_object_file_type_col_name": "kind",
                "included_cfihos_types_config": [
                    {"type": "cfihosTypeEntity", "entities_fname": "entities.json"},
                    {"type": "cfihosTypeTag", "entities_fname": "tags.json",
                     "entities_attrib_fname": "tag_props.json",
                     "property_metadata_fname": "meta.json"}
                ]
            }
        }],
        "containers_indexes": {"CFIHOS_00000001": ["document_title"]},
        "container_data_model_space": "cfihos_containers",
        "views_data_model_space": "cfihos_views",
        "model_version": "v1",
        "model_creator": "integration",
        "data_model_name": "CFIHOS Model",
        "data_model_description": "CFIHOS containers",
        "data_model_external_id": "cfihos_model",
        "dms_identifier": "cfihos",
        "scope_config": "Tags",
        "processor_type": "sparse",
        "model_type": model_type,
        "scope_name": "Valves",
        "scopes": [{
            "scope_name": "Valves",
            "scope_model_external_id": "valve-scope",
            "scope_model_version": "v2",
            "scope_description": "Valve classes"
        }]
    })
}

fn setup(model_type: &str, with_reverse: bool) -> (TempDir, CfihosManager) {
    init_tracing();
    let dir = tempdir().unwrap();
    write_sheets(dir.path(), with_reverse);
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, config(dir.path(), model_type).to_string()).unwrap();

    let config = ProcessorConfig::from_path(&config_path).unwrap();
    let manager = CfihosManager::from_config(config).unwrap();
    (dir, manager)
}

fn read(model_type: &str) -> ReadResult {
    let (_dir, manager) = setup(model_type, false);
    manager.read(&JsonSheetReader).unwrap()
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn test_containers_end_to_end() {
    let result = read("containers");
    let model = &result.entities;

    assert_eq!(result.metadata.space, "cfihos_containers");
    assert_eq!(result.metadata.external_id, "cfihos_model");
    assert_eq!(result.metadata.version, "v1");

    let document = &model["CFIHOS_00000001"];
    assert!(document.first_class_citizen);
    assert_eq!(document.cfihos_id, "CFIHOS-00000001");
    let title = prop(document, "CFIHOS_40000001");
    assert!(title.is_required);
    assert_eq!(title.property_group, "CFIHOS_00000001");

    let capacity = &model["CFIHOS_1_10000001_10000100"];
    assert_eq!(capacity.properties[0].id, ENTITY_TYPE_PROPERTY);
    assert!(capacity.property("CFIHOS_10000050").is_some());

    let relations = &model["CFIHOS_4_40000001_40000100_ext"];
    assert_eq!(
        prop(relations, "CFIHOS_40000002_rel").target_type.as_deref(),
        Some("CFIHOS_00000001")
    );

    let valve = &model["CFIHOS_30000101"];
    assert_eq!(valve.dms_name, "Valve");
    assert!(valve.property("CFIHOS_10000060").is_some());
    assert!(valve.property("CFIHOS_10000080").is_some());

    let units = &model["CFIHOS_30000101_UOM"];
    assert_eq!(units.description.as_deref(), Some("Unit of Measure for Valve"));
    assert_eq!(
        prop(units, "CFIHOS_10000080_UOM").target_type.as_deref(),
        Some("String")
    );

    assert!(model[ENTITY_TYPE_GROUP].first_class_citizen);
}

#[test]
fn test_containers_are_deterministic() {
    let first = serde_json::to_value(read("containers")).unwrap();
    let second = serde_json::to_value(read("containers")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_reverse_relation_to_non_fcc_aborts_the_run() {
    let (_dir, manager) = setup("containers", true);
    let err = manager.read(&JsonSheetReader).unwrap_err();
    let err = err.downcast_ref::<CfihosError>().unwrap();
    assert_eq!(err.kind(), ErrorKind::Consistency);
    assert!(matches!(err, CfihosError::IneligibleReverseTarget(_)));
}

#[test]
fn test_manager_passes_indexes_through() {
    let (_dir, manager) = setup("containers", false);
    assert_eq!(manager.dms_identifier(), "cfihos");
    assert_eq!(
        manager.containers_indexes(),
        &json!({"CFIHOS_00000001": ["document_title"]})
    );
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn test_views_end_to_end() {
    let result = read("views");
    let model = &result.entities;

    assert_eq!(result.metadata.space, "cfihos_views");
    assert_eq!(result.metadata.name, "CFIHOS_VALVES");
    assert_eq!(result.metadata.external_id, "CFIHOS_VALVE_SCOPE");
    assert_eq!(result.metadata.description, "Valve classes");
    assert_eq!(result.metadata.version, "v2");

    let ids: Vec<&str> = model.keys().map(String::as_str).collect();
    assert_eq!(ids, ["CFIHOS_00000001", "TCFIHOS_30000101", "TCFIHOS_30000397"]);

    let document = &model["CFIHOS_00000001"];
    assert_eq!(document.view_filter, None);
    assert!(document.property(ENTITY_TYPE_PROPERTY).is_none());

    let valve = &model["TCFIHOS_30000101"];
    assert_eq!(
        valve.view_filter.as_deref(),
        Some(
            r#"rawFilter({"and":[{"in":{"property":["cfihos_containers","EntityTypeGroup","entityType"],"values":["TCFIHOS_30000101","TCFIHOS_30000397"]}}]})"#
        )
    );

    let gate = &model["TCFIHOS_30000397"];
    assert_eq!(gate.inherits_from_id, vec!["TCFIHOS_30000101".to_string()]);
    assert_eq!(gate.full_inheritance, vec!["TCFIHOS_30000101".to_string()]);
    assert!(gate.property("CFIHOS_10000060").is_none());
    assert_eq!(
        prop(gate, "CFIHOS_10000080").property_group,
        "CFIHOS_1_10000001_10000100"
    );
    assert_eq!(
        prop(gate, "CFIHOS_10000080_UOM").property_group,
        "CFIHOS_1_10000001_10000100_ext"
    );
    assert!(gate.property(ENTITY_TYPE_PROPERTY).is_some());
}

#[test]
fn test_views_without_scope_is_a_configuration_error() {
    let dir = tempdir().unwrap();
    let mut value = config(dir.path(), "views");
    value.as_object_mut().unwrap().remove("scope_name");
    let err = ProcessorConfig::from_value(value).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
