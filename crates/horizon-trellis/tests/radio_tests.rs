//! Tests for the Radio component.

use horizon_trellis::prelude::*;
use horizon_trellis::components::ChoiceValue;
use serde_json::{json, Value};

fn setup() {
    init_global_registry();
}

fn radio(choices: Vec<Choice>, mode: &str) -> Radio {
    Radio::builder()
        .with_choices(choices)
        .with_return_type(mode)
        .build()
        .expect("Failed to build radio")
}

#[test]
fn test_value_mode_passes_through() {
    setup();
    let choices = vec![Choice::from("a"), Choice::from(2), Choice::from(3.5)];
    let radio = radio(choices.clone(), "value");
    for choice in &choices {
        let value = choice.value.to_json();
        assert_eq!(radio.preprocess(Some(value.clone())).unwrap(), Some(value));
    }
    // Values outside the choices are not checked in value mode
    assert_eq!(radio.preprocess(Some(json!("zzz"))).unwrap(), Some(json!("zzz")));
}

#[test]
fn test_index_mode_returns_first_position() {
    setup();
    let radio = radio(
        vec![Choice::from("a"), Choice::from("b"), Choice::new("B again", "b")],
        "index",
    );
    assert_eq!(radio.preprocess(Some(json!("a"))).unwrap(), Some(json!(0)));
    assert_eq!(radio.preprocess(Some(json!("b"))).unwrap(), Some(json!(1)));
}

#[test]
fn test_index_mode_scenario() {
    setup();
    let radio = Radio::builder()
        .with_choices(["a", "b", "c"])
        .with_return_type("index")
        .build()
        .unwrap();
    assert_eq!(radio.preprocess(Some(json!("b"))).unwrap(), Some(json!(1)));
    assert_eq!(radio.preprocess(Some(json!("z"))).unwrap(), None);
    assert_eq!(radio.preprocess(None).unwrap(), None);
}

#[test]
fn test_index_mode_numeric_choices() {
    setup();
    let radio = radio(vec![Choice::from(10), Choice::from(20)], "index");
    assert_eq!(radio.preprocess(Some(json!(20))).unwrap(), Some(json!(1)));
    assert_eq!(radio.preprocess(Some(json!(20.0))).unwrap(), Some(json!(1)));
    assert_eq!(radio.preprocess(Some(json!("20"))).unwrap(), None);
}

#[test]
fn test_bogus_return_type_rejected() {
    setup();
    let result = Radio::builder().with_return_type("bogus").build();
    match result {
        Err(Error::InvalidConfiguration { parameter, message }) => {
            assert_eq!(parameter, "type");
            assert!(message.contains("'value', 'index'"));
        }
        other => panic!("expected InvalidConfiguration, got {other:?}"),
    }
}

#[test]
fn test_example_inputs() {
    setup();
    let empty = Radio::builder().build().unwrap();
    assert_eq!(empty.example_inputs(), None);

    let radio = Radio::builder()
        .with_choices([("First", 7), ("Second", 8)])
        .build()
        .unwrap();
    assert_eq!(radio.example_inputs(), Some(json!(7)));
}

#[test]
fn test_postprocess_is_identity() {
    setup();
    let radio = Radio::builder().with_choices(["a"]).build().unwrap();
    assert_eq!(radio.postprocess(Some(json!("a"))).unwrap(), Some(json!("a")));
    assert_eq!(radio.postprocess(None).unwrap(), None);
}

#[test]
fn test_api_info_is_always_string() {
    setup();
    let radio = Radio::builder().with_choices([1, 2, 3]).build().unwrap();
    assert_eq!(radio.api_info(), json!({"type": "string"}));
    assert!(matches!(radio.choices()[0].value, ChoiceValue::Int(1)));
}

#[test]
fn test_radio_in_container_config() {
    setup();
    let blocks = Blocks::with_defaults();
    let radio = blocks.add(Radio::builder().with_choices(["x"]).build().unwrap());
    let config = blocks.components_config();
    let entry = &config[0];
    assert_eq!(entry["id"], json!(radio.object_id().as_raw()));
    assert_eq!(entry["type"], "radio");
    assert_eq!(entry["props"]["choices"], json!([["x", "x"]]));
    assert_eq!(entry["capabilities"]["selectable"], Value::Bool(false));
}
