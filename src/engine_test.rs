use super::*;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

fn fields(name: &str) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("name".to_string(), json!(name));
    m
}

#[test]
fn opening_an_empty_directory_creates_log_and_snapshot() {
    let dir = tempdir().unwrap();
    let config = Config::new(dir.path());
    let engine = Engine::open(config.clone()).unwrap();

    assert!(engine.is_empty());
    assert!(config.log_path.exists());
    assert!(config.snapshot_path.exists());
}

#[test]
fn seed_count_populates_a_fresh_store() {
    let dir = tempdir().unwrap();
    let config = Config::new(dir.path()).with_seed_count(3);
    let engine = Engine::open(config).unwrap();

    assert_eq!(engine.len(), 3);
    let first = engine.get("0000000000").unwrap();
    assert_eq!(first.value.id(), Some("0000000000"));
}

#[test]
fn insert_then_get_round_trips_the_record() {
    let dir = tempdir().unwrap();
    let mut engine = Engine::open(Config::new(dir.path())).unwrap();

    let inserted = engine.insert(fields("ada")).unwrap();
    let key = inserted.value.id().unwrap().to_string();

    let fetched = engine.get(&key).unwrap();
    assert_eq!(fetched.value, inserted.value);
}

#[test]
fn get_of_absent_key_is_not_found() {
    let dir = tempdir().unwrap();
    let engine = Engine::open(Config::new(dir.path())).unwrap();
    assert!(matches!(engine.get("missing"), Err(Error::NotFound(_))));
}

#[test]
fn insert_requires_at_least_one_field() {
    let dir = tempdir().unwrap();
    let mut engine = Engine::open(Config::new(dir.path())).unwrap();
    assert!(matches!(
        engine.insert(Map::new()),
        Err(Error::MalformedInput(_))
    ));
}

#[test]
fn delete_then_get_is_not_found_but_delete_twice_errors() {
    let dir = tempdir().unwrap();
    let mut engine = Engine::open(Config::new(dir.path())).unwrap();
    let key = engine.insert(fields("ada")).unwrap().value.id().unwrap().to_string();

    engine.delete(&key).unwrap();
    assert!(matches!(engine.get(&key), Err(Error::NotFound(_))));
    assert!(matches!(engine.delete(&key), Err(Error::NotFound(_))));
}

#[test]
fn page_concatenation_matches_insertion_order() {
    let dir = tempdir().unwrap();
    let mut engine = Engine::open(Config::new(dir.path())).unwrap();
    for i in 0..45 {
        engine.insert(fields(&format!("user-{i}"))).unwrap();
    }

    let mut seen = Vec::new();
    for page_no in 1..=3 {
        let page = engine.page(page_no).unwrap().value;
        seen.extend(page.records.into_iter().map(|r| r.id().unwrap().to_string()));
    }

    assert_eq!(seen.len(), 45);
    let mut sorted = seen.clone();
    sorted.sort();
    assert_eq!(seen, sorted, "pages must already be in ascending key order");
}

#[test]
fn page_number_below_one_is_coerced_to_the_first_page() {
    let dir = tempdir().unwrap();
    let mut engine = Engine::open(Config::new(dir.path()).with_seed_count(5)).unwrap();
    engine.insert(fields("extra")).unwrap();

    let zero = engine.page(0).unwrap().value;
    let negative = engine.page(-7).unwrap().value;
    let one = engine.page(1).unwrap().value;
    assert_eq!(zero, one);
    assert_eq!(negative, one);
}

#[test]
fn page_past_the_end_is_empty_not_an_error() {
    let dir = tempdir().unwrap();
    let engine = Engine::open(Config::new(dir.path()).with_seed_count(3)).unwrap();
    let page = engine.page(50).unwrap().value;
    assert!(page.records.is_empty());
}

#[test]
fn restart_with_snapshot_preserves_records_without_touching_the_log() {
    let dir = tempdir().unwrap();
    let config = Config::new(dir.path());
    {
        let mut engine = Engine::open(config.clone()).unwrap();
        engine.insert(fields("ada")).unwrap();
        engine.insert(fields("grace")).unwrap();
    }

    let reopened = Engine::open(config).unwrap();
    assert_eq!(reopened.len(), 2);
    let page = reopened.page(1).unwrap().value;
    assert_eq!(page.records.len(), 2);
}

#[test]
fn restart_without_a_snapshot_rebuilds_from_the_log() {
    let dir = tempdir().unwrap();
    let config = Config::new(dir.path());
    {
        let mut engine = Engine::open(config.clone()).unwrap();
        engine.insert(fields("ada")).unwrap();
        engine.insert(fields("grace")).unwrap();
    }
    fs::remove_file(&config.snapshot_path).unwrap();

    let reopened = Engine::open(config.clone()).unwrap();
    assert_eq!(reopened.len(), 2);
    assert!(config.snapshot_path.exists(), "rebuild should re-persist a snapshot");
}

#[test]
fn restart_with_a_corrupt_snapshot_falls_back_to_rebuild() {
    let dir = tempdir().unwrap();
    let config = Config::new(dir.path());
    {
        let mut engine = Engine::open(config.clone()).unwrap();
        engine.insert(fields("ada")).unwrap();
    }
    fs::write(&config.snapshot_path, "not json").unwrap();

    let reopened = Engine::open(config).unwrap();
    assert_eq!(reopened.len(), 1);
}

#[test]
fn minted_keys_are_monotonic_and_survive_a_restart() {
    let dir = tempdir().unwrap();
    let config = Config::new(dir.path());
    let first_key = {
        let mut engine = Engine::open(config.clone()).unwrap();
        engine.insert(fields("ada")).unwrap().value.id().unwrap().to_string()
    };

    let mut reopened = Engine::open(config).unwrap();
    let second_key = reopened.insert(fields("grace")).unwrap().value.id().unwrap().to_string();
    assert!(second_key > first_key);
}

#[test]
fn deleted_keys_are_never_reminted() {
    let dir = tempdir().unwrap();
    let mut engine = Engine::open(Config::new(dir.path())).unwrap();
    let first = engine.insert(fields("ada")).unwrap().value.id().unwrap().to_string();
    engine.delete(&first).unwrap();
    let second = engine.insert(fields("grace")).unwrap().value.id().unwrap().to_string();
    assert_ne!(first, second);
    assert!(second > first);
}

#[test]
fn elapsed_ms_is_recorded_and_non_negative() {
    let dir = tempdir().unwrap();
    let mut engine = Engine::open(Config::new(dir.path())).unwrap();
    let outcome = engine.insert(fields("ada")).unwrap();
    assert!(outcome.elapsed_ms >= 0.0);
}
