use std::{path::PathBuf, sync::Arc};

use serde::Deserialize;
use tablelayer::prelude::*;

#[derive(Debug, Clone, PartialEq, Deserialize, Record)]
#[record(table = "items")]
struct Item {
    id: i32,
    name: String,
    rank: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Record)]
#[record(table = "tags")]
struct Tag {
    label: String,
    item_id: Option<i32>,
    weight: f64,
}

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn ids(items: &[&Item]) -> Vec<i32> {
    items.iter().map(|item| item.id).collect()
}

#[test]
fn concrete_scenario_from_a_bundle() {
    let bundle = ResourceBundle::new(fixtures());
    let mut items = Table::<Item>::from_bundle(&bundle, "id").unwrap();

    assert_eq!(
        items.find_by_primary_key_value(2),
        Some(&Item { id: 2, name: "b".to_string(), rank: 1 })
    );

    items.add_index("by_rank", "rank", true).unwrap();
    assert_eq!(ids(&items.find_all_using_index_name("by_rank").unwrap()), vec![2, 3, 1]);

    let predicate = Filter::gt("rank", 1);
    assert_eq!(ids(&items.find_all_using_predicate(&predicate).unwrap()), vec![1, 3]);
    assert_eq!(
        ids(&items.find_all_using_predicate_sorted_by(&predicate, "by_rank").unwrap()),
        vec![3, 1]
    );
}

#[test]
fn every_record_is_materialized_in_file_order() {
    let items = Table::<Item>::from_file(fixtures().join("items.json"), "id").unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(ids(&items.find_all()), vec![1, 2, 3]);
    for item in items.find_all() {
        assert_eq!(items.find_by_primary_key_value(item.id), Some(item));
    }
}

#[test]
fn predicate_subset_is_reordered_by_the_index() {
    let mut tags = Table::<Tag>::from_bundle(&ResourceBundle::new(fixtures()), "label").unwrap();
    tags.add_index("heaviest", "weight", false).unwrap();

    let predicate = Filter::exists("item_id").and(Filter::lt("weight", 4));
    let unsorted = tags.find_all_using_predicate(&predicate).unwrap();
    let sorted = tags.find_all_using_predicate_sorted_by(&predicate, "heaviest").unwrap();

    let labels = |tags: &[&Tag]| tags.iter().map(|tag| tag.label.clone()).collect::<Vec<_>>();
    assert_eq!(labels(&unsorted), vec!["fragile", "bulky"]);
    assert_eq!(labels(&sorted), vec!["bulky", "fragile"]);
}

#[test]
fn related_objects_follow_key_equality() {
    let bundle = ResourceBundle::new(fixtures());
    let tags = Arc::new(Table::<Tag>::from_bundle(&bundle, "label").unwrap());

    let mut items = Table::<Item>::from_bundle(&bundle, "id").unwrap();
    items.add_relationship("tags", Arc::clone(&tags), "id", "item_id").unwrap();

    for item in items.find_all() {
        let related = items.find_all_related_objects_for::<Tag>(item, "tags").unwrap();
        let expected = tags
            .find_all()
            .into_iter()
            .filter(|tag| tag.item_id == Some(item.id))
            .collect::<Vec<_>>();

        assert_eq!(related, expected);
    }

    let item = items.find_by_primary_key_value(2).unwrap();
    assert!(items.find_all_related_objects_for::<Tag>(item, "tags").unwrap().is_empty());

    // reverse direction, from tag to item
    let mut tags = Table::<Tag>::from_bundle(&bundle, "label").unwrap();
    tags.add_relationship("item", Arc::new(items), "item_id", "id").unwrap();

    let spare = tags.find_by_primary_key_value("spare").unwrap();
    assert!(tags.find_all_related_objects_for::<Item>(spare, "item").unwrap().is_empty());

    let heavy = tags.find_by_primary_key_value("heavy").unwrap();
    assert_eq!(
        ids(&tags.find_all_related_objects_for::<Item>(heavy, "item").unwrap()),
        vec![1]
    );
}

#[test]
fn construction_errors_produce_no_table() {
    let dir = fixtures();

    assert!(matches!(
        Table::<Item>::from_file(dir.join("duplicates.json"), "id"),
        Err(TableError::DuplicateKey { .. })
    ));
    assert!(matches!(
        Table::<Item>::from_file(dir.join("malformed.json"), "id"),
        Err(TableError::Source(_))
    ));
    assert!(matches!(
        Table::<Item>::from_file(dir.join("missing.json"), "id"),
        Err(TableError::SourceNotFound(_))
    ));
    assert!(matches!(
        Table::<Item>::from_bundle(&ResourceBundle::new(dir.join("nowhere")), "id"),
        Err(TableError::SourceNotFound(_))
    ));
    assert!(matches!(
        Table::<Tag>::from_file(dir.join("tags.json"), "item_id"),
        Err(TableError::DuplicateKey { ref key, .. }) if key == "1"
    ));
    assert!(matches!(
        Table::<Tag>::builder("item_id")
            .duplicate_keys(DuplicateKeyPolicy::LastWriteWins)
            .build(JsonFileSource::new(dir.join("tags.json"))),
        Err(TableError::MissingKey { position: 3, .. })
    ));
}

#[test]
fn duplicate_policy_can_come_from_configuration() {
    let options: TableOptions =
        serde_json::from_str(r#"{ "duplicate_keys": "last_write_wins", "name": "catalog" }"#).unwrap();

    let items = Table::<Item>::builder("id")
        .options(options)
        .build(JsonFileSource::new(fixtures().join("duplicates.json")))
        .unwrap();

    assert_eq!(items.name(), "catalog");
    assert_eq!(items.len(), 1);
    assert_eq!(items.find_by_primary_key_value(1).map(|item| item.rank), Some(7));
}

#[test]
fn find_all_by_value_and_unknown_names() {
    let mut items = Table::<Item>::from_file(fixtures().join("items.json"), "id").unwrap();

    assert_eq!(ids(&items.find_all_by_value("c", "name")), vec![3]);
    assert!(items.find_all_by_value("z", "name").is_empty());
    assert!(items.find_all_by_value("c", "colour").is_empty());

    assert!(matches!(
        items.find_all_using_index_name("by_name"),
        Err(TableError::UnknownIndex { .. })
    ));
    assert!(matches!(
        items.add_index("by_colour", "colour", true),
        Err(TableError::UnknownProperty { .. })
    ));
    assert!(matches!(
        items.find_all_using_predicate(&Filter::eq("colour", "red")),
        Err(TableError::UnknownProperty { .. })
    ));
}
