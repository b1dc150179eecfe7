use crate::compiler::{EventTypeMap, KeyFieldPlan, compile, compile_schema};
use crate::error::{Error, ErrorKind};
use crate::field_values;
use crate::triggers::parse_trigger_spec;

const TWO_TYPES: &str = "X = {
        1: ['a'],  # importance: 0.9
        2: ['a', 'b'],  # importance: 1.0
}
TRIGGERS['all'] = ['b', 'a', 'c']

Y = {
        1: ['d'],  # importance: 1.0
}
TRIGGERS['all'] = ['d', 'e']
";

fn mapping(pairs: &[(&str, &str)]) -> EventTypeMap {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn compile_preserves_spec_order() {
    let spec = parse_trigger_spec(TWO_TYPES, true).unwrap();
    let catalog = compile(&spec, &mapping(&[("X", "Foo"), ("Y", "Bar")])).unwrap().finalize_default().unwrap();

    let rows = catalog.event_type_fields_list();
    let ids: Vec<&str> = rows.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(ids, vec!["Foo", "Bar"]);
    assert_eq!(rows[0].fields, vec!["b", "a", "c"]);
    assert_eq!(rows[0].key_fields, rows[0].fields);
    assert_eq!(rows[0].min_match_count, 2);
}

#[test]
fn unmapped_event_type_aborts_compilation() {
    let spec = parse_trigger_spec(TWO_TYPES, true).unwrap();
    let err = compile(&spec, &mapping(&[("X", "Foo")])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(matches!(err, Error::UnmappedEventType { ref event_type } if event_type == "Y"));
}

#[test]
fn extra_mapping_entries_are_tolerated() {
    let spec = parse_trigger_spec(TWO_TYPES, true).unwrap();
    let drafts = compile(&spec, &mapping(&[("X", "Foo"), ("Y", "Bar"), ("Z", "Baz")])).unwrap();
    assert_eq!(drafts.len(), 2);
}

#[test]
fn drafts_default_keys_to_all_fields() {
    let spec = parse_trigger_spec(TWO_TYPES, true).unwrap();
    let draft = compile_schema(&spec.blocks()[1], "Bar").unwrap();
    assert_eq!(draft.name(), "Y");
    assert_eq!(draft.identifier(), "Bar");
    assert_eq!(draft.key_fields(), draft.fields());
}

#[test]
fn lookups_by_event_type_and_identifier() {
    let spec = parse_trigger_spec(TWO_TYPES, true).unwrap();
    let catalog = compile(&spec, &mapping(&[("X", "Foo"), ("Y", "Bar")])).unwrap().finalize_default().unwrap();

    assert_eq!(catalog.get("X").map(|s| s.identifier()), Some("Foo"));
    assert_eq!(catalog.get_by_identifier("Bar").map(|s| s.name()), Some("Y"));
    assert!(catalog.get("Foo").is_none());
    assert_eq!(catalog.event_type_to_schema().len(), 2);
}

#[test]
fn key_plan_narrows_named_schemas_only() {
    let spec = parse_trigger_spec(TWO_TYPES, true).unwrap();
    let plan = KeyFieldPlan::new().with("Foo", ["a"]);
    let catalog = compile(&spec, &mapping(&[("X", "Foo"), ("Y", "Bar")])).unwrap().finalize_with(&plan).unwrap();

    assert_eq!(catalog.get("X").unwrap().key_fields(), &["a".to_string()][..]);
    assert_eq!(catalog.get("Y").unwrap().key_fields(), catalog.get("Y").unwrap().fields());
}

#[test]
fn key_plan_with_unknown_field_fails() {
    let spec = parse_trigger_spec(TWO_TYPES, true).unwrap();
    let plan = KeyFieldPlan::new().with("Foo", ["zzz"]);
    let err = compile(&spec, &mapping(&[("X", "Foo"), ("Y", "Bar")])).unwrap().finalize_with(&plan).unwrap_err();
    assert!(matches!(err, Error::UnknownKeyField { ref field, .. } if field == "zzz"));
}

#[test]
fn key_plan_from_rank_uses_rank_fields() {
    let spec = parse_trigger_spec(TWO_TYPES, true).unwrap();
    let map = mapping(&[("X", "Foo"), ("Y", "Bar")]);

    let plan = KeyFieldPlan::from_rank(&spec, &map, 2);
    assert_eq!(plan.get("Foo"), Some(&["a".to_string(), "b".to_string()][..]));
    assert_eq!(plan.get("Bar"), None);

    let catalog = compile(&spec, &map).unwrap().finalize_with(&plan).unwrap();
    // Keys follow schema field order, not rank order.
    assert_eq!(catalog.get("X").unwrap().key_fields(), &["b".to_string(), "a".to_string()][..]);
}

#[test]
fn duplicate_event_types_last_wins_but_all_are_listed() {
    let text = "X = {1: ['a']}\nTRIGGERS['all'] = ['a']\n\nX = {1: ['b']}\nTRIGGERS['all'] = ['b']\n";
    let spec = parse_trigger_spec(text, true).unwrap();
    let catalog = compile(&spec, &mapping(&[("X", "Foo")])).unwrap().finalize_default().unwrap();

    assert_eq!(catalog.event_type_fields_list().len(), 2);
    assert_eq!(catalog.get("X").unwrap().fields(), &["b".to_string()][..]);
    assert_eq!(catalog.duplicate_event_types(), vec!["X"]);
}

#[test]
fn duplicate_fields_in_all_list_fail() {
    let spec = parse_trigger_spec("X = {}\nTRIGGERS['all'] = ['a', 'a']\n", true).unwrap();
    let err = compile(&spec, &mapping(&[("X", "Foo")])).unwrap_err();
    assert!(matches!(err, Error::DuplicateField { .. }));
}

#[test]
fn empty_all_list_compiles_into_unusable_schema() {
    let spec = parse_trigger_spec("X = {}\nTRIGGERS['all'] = []\n", true).unwrap();
    let catalog = compile(&spec, &mapping(&[("X", "Foo")])).unwrap().finalize_default().unwrap();
    assert!(catalog.get("X").unwrap().fields().is_empty());
    assert_eq!(catalog.instantiate("X").unwrap_err().kind(), ErrorKind::DegenerateSchema);
}

#[test]
fn instantiate_unknown_event_type_is_a_configuration_error() {
    let spec = parse_trigger_spec(TWO_TYPES, true).unwrap();
    let catalog = compile(&spec, &mapping(&[("X", "Foo"), ("Y", "Bar")])).unwrap().finalize_default().unwrap();
    assert!(catalog.instantiate("nope").unwrap_err().is_configuration());
}

#[test]
fn key_fields_round_trip_through_instance() {
    let spec = parse_trigger_spec(TWO_TYPES, true).unwrap();
    let plan = KeyFieldPlan::new().with("Foo", ["a", "c"]);
    let catalog = compile(&spec, &mapping(&[("X", "Foo"), ("Y", "Bar")])).unwrap().finalize_with(&plan).unwrap();

    let mut ev = catalog.instantiate("X").unwrap();
    ev.update(&field_values! { "a" => "1", "c" => "3" }, Some("guid".to_string()));

    assert!(ev.is_key_complete());
    assert_eq!(ev.nonempty_count(), catalog.get("X").unwrap().key_fields().len());
    assert_eq!(ev.as_tuple(), vec![None, Some("1".to_string()), Some("3".to_string())]);
}

#[test]
fn shared_identifier_is_reported() {
    let text = "X = {1: ['a']}\nTRIGGERS['all'] = ['a']\n\nY = {1: ['b']}\nTRIGGERS['all'] = ['b']\n";
    let spec = parse_trigger_spec(text, true).unwrap();
    let catalog = compile(&spec, &mapping(&[("X", "Foo"), ("Y", "Foo")])).unwrap().finalize_default().unwrap();

    assert!(catalog.duplicate_event_types().is_empty());
    assert_eq!(catalog.duplicate_identifiers(), vec!["Foo"]);
    assert_eq!(catalog.get_by_identifier("Foo").map(|s| s.name()), Some("Y"));
    assert_eq!(catalog.get("X").map(|s| s.identifier()), Some("Foo"));
}

#[test]
fn repeated_event_type_is_not_a_shared_identifier() {
    let text = "X = {1: ['a']}\nTRIGGERS['all'] = ['a']\n\nX = {1: ['b']}\nTRIGGERS['all'] = ['b']\n";
    let spec = parse_trigger_spec(text, true).unwrap();
    let catalog = compile(&spec, &mapping(&[("X", "Foo")])).unwrap().finalize_default().unwrap();
    assert!(catalog.duplicate_identifiers().is_empty());
}

#[test]
fn json_output_includes_ordered_field_rows() {
    let spec = parse_trigger_spec(TWO_TYPES, true).unwrap();
    let plan = KeyFieldPlan::new().with("Foo", ["a"]);
    let catalog = compile(&spec, &mapping(&[("X", "Foo"), ("Y", "Bar")])).unwrap().finalize_with(&plan).unwrap();

    let json = serde_json::to_value(&catalog).unwrap();
    assert_eq!(json["schemas"].as_array().map(Vec::len), Some(2));

    let rows = json["event_type_fields"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["identifier"], "Foo");
    assert_eq!(rows[0]["fields"], serde_json::json!(["b", "a", "c"]));
    assert_eq!(rows[0]["key_fields"], serde_json::json!(["a"]));
    assert_eq!(rows[0]["min_match_count"], 2);
    assert_eq!(rows[1]["identifier"], "Bar");
    assert!(json.get("by_event_type").is_none());
}
