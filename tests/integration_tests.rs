//! Integration tests for the live chat moderator
//!
//! These tests exercise the public API across modules: loading the
//! profanity database from disk, building filters from configuration, and
//! the classification properties every threshold must satisfy.

use livechat_moderator::config::Config;
use livechat_moderator::profanity::{Filter, ProfanityDatabase, ProfanityError, Severity};
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

// ==================== Test Helpers ====================

const SAMPLE_DB: &str = r#"{
    "english": {"mild": ["darn", "heck"], "moderate": ["crap"], "severe": ["slur"]},
    "spanish": {"mild": ["tonto"], "moderate": ["mierda"], "severe": ["palabra"]},
    "catalan": {"mild": ["ximple"], "moderate": [], "severe": ["merda"]}
}"#;

/// Write a database file into a temp dir and return its path
fn write_db(temp_dir: &TempDir, json: &str) -> std::path::PathBuf {
    let path = temp_dir.path().join("profanity.json");
    std::fs::write(&path, json).expect("Failed to write database");
    path
}

fn filters_for(json: &str) -> Vec<(Severity, Filter)> {
    let db = Arc::new(ProfanityDatabase::from_slice(json.as_bytes()).expect("valid database"));
    Severity::ALL
        .into_iter()
        .map(|severity| (severity, Filter::new(Arc::clone(&db), severity)))
        .collect()
}

// ==================== End-to-end Scenario Tests ====================

#[test]
fn test_scenario_mild_word_at_mild_threshold() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_db(
        &temp_dir,
        r#"{"english": {"mild": ["darn"], "moderate": [], "severe": []}}"#,
    );

    let filter = Filter::from_file(&path, Severity::Mild).expect("Should build");
    assert!(filter.contains_profanity("that darn thing"));
}

#[test]
fn test_scenario_mild_word_at_severe_threshold() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_db(
        &temp_dir,
        r#"{"english": {"mild": ["darn"], "moderate": [], "severe": []}}"#,
    );

    let filter = Filter::from_file(&path, Severity::Severe).expect("Should build");
    assert!(!filter.contains_profanity("that darn thing"));
}

#[test]
fn test_scenario_severe_spanish_word_at_moderate_threshold() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_db(&temp_dir, r#"{"spanish": {"severe": ["palabra"]}}"#);

    let filter = Filter::from_file(&path, Severity::Moderate).expect("Should build");
    assert!(filter.contains_profanity("una PALABRA aqui"));
}

#[test]
fn test_substring_policy_matches_inside_words() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_db(&temp_dir, r#"{"english": {"mild": ["ass"]}}"#);

    let filter = Filter::from_file(&path, Severity::Mild).expect("Should build");
    assert!(filter.contains_profanity("assassin"));
}

// ==================== Construction Error Tests ====================

#[test]
fn test_malformed_database_file_is_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_db(&temp_dir, r#"{"english": {"mild": ["darn"]"#);

    let result = Filter::from_file(&path, Severity::Mild);
    assert!(matches!(result, Err(ProfanityError::DatabaseLoad(_))));
}

#[test]
fn test_missing_database_file_is_io_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("missing.json");

    let err = Filter::from_file(&path, Severity::Mild).unwrap_err();
    assert!(matches!(err, ProfanityError::Io { .. }));
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn test_unknown_severity_string_is_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_db(&temp_dir, SAMPLE_DB);

    let result = Filter::from_file_with_severity_str(&path, "nuclear");
    assert!(matches!(result, Err(ProfanityError::UnknownSeverity(_))));
}

// ==================== Config Integration Tests ====================

#[test]
fn test_filter_built_from_config_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = write_db(&temp_dir, SAMPLE_DB);
    let config_path = temp_dir.path().join("config.json");
    std::fs::write(
        &config_path,
        serde_json::json!({
            "live_chat_id": "chat",
            "profanity_database": db_path.to_str().unwrap(),
            "min_severity": "moderate"
        })
        .to_string(),
    )
    .expect("Failed to write config");

    let config = Config::load(&config_path).expect("Should load config");
    let filter = Filter::from_file(&config.profanity_database, config.min_severity().unwrap())
        .expect("Should build filter");

    assert_eq!(filter.min_severity(), Severity::Moderate);
    assert!(!filter.contains_profanity("heck"));
    assert!(filter.contains_profanity("Mierda"));
    assert!(filter.contains_profanity("MERDA"));
}

#[test]
fn test_shipped_database_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/profanity.json");
    let db = ProfanityDatabase::from_file(path).expect("Shipped database should parse");

    for language in ["english", "spanish", "catalan"] {
        let words = db.get(language).expect("language present");
        assert!(!words.is_empty(), "{} should have words", language);
    }
}

// ==================== Concurrency Tests ====================

#[test]
fn test_filter_shared_across_threads() {
    let filter = Arc::new(Filter::from_slice(SAMPLE_DB.as_bytes(), Severity::Mild).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let filter = Arc::clone(&filter);
            std::thread::spawn(move || {
                let text = if i % 2 == 0 { "clean text" } else { "some CRAP here" };
                filter.contains_profanity(text)
            })
        })
        .collect();

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![false, true, false, true]);
}

// ==================== Property Tests ====================

proptest! {
    #[test]
    fn prop_empty_message_never_flagged(json_index in 0usize..2) {
        let json = [SAMPLE_DB, r#"{"english": {"mild": [""], "severe": ["x"]}}"#][json_index];
        for (_, filter) in filters_for(json) {
            prop_assert!(!filter.contains_profanity(""));
        }
    }

    #[test]
    fn prop_lower_threshold_flags_superset(
        prefix in "[a-zA-Z ]{0,20}",
        word in prop::sample::select(vec!["", "heck", "crap", "slur", "tonto", "mierda", "merda"]),
        suffix in "[a-zA-Z ]{0,20}",
    ) {
        let message = format!("{}{}{}", prefix, word, suffix);
        let filters = filters_for(SAMPLE_DB);
        let flagged: Vec<bool> = filters
            .iter()
            .map(|(_, filter)| filter.contains_profanity(&message))
            .collect();

        // filters are ordered mild, moderate, severe
        if flagged[2] {
            prop_assert!(flagged[1]);
        }
        if flagged[1] {
            prop_assert!(flagged[0]);
        }
    }

    #[test]
    fn prop_dictionary_word_flagged_regardless_of_case(
        word in "(darn|heck|crap|slur|tonto|mierda|palabra|ximple|merda)",
        prefix in "[a-z ]{0,10}",
        suffix in "[a-z ]{0,10}",
    ) {
        let (_, mild) = filters_for(SAMPLE_DB).remove(0);
        let message = format!("{}{}{}", prefix, word, suffix);

        prop_assert!(mild.contains_profanity(&message));
        prop_assert_eq!(
            mild.contains_profanity(&message.to_uppercase()),
            mild.contains_profanity(&message)
        );
    }

    #[test]
    fn prop_classification_is_case_insensitive(message in "[a-zA-Z ]{0,30}") {
        for (_, filter) in filters_for(SAMPLE_DB) {
            prop_assert_eq!(
                filter.contains_profanity(&message.to_lowercase()),
                filter.contains_profanity(&message.to_uppercase())
            );
        }
    }

    #[test]
    fn prop_missing_tiers_never_error(
        language in "[a-z]{1,8}",
        word in "[a-z]{1,8}",
        tier in prop::sample::select(vec!["mild", "moderate", "severe"]),
    ) {
        let json = format!(r#"{{"{}": {{"{}": ["{}"]}}}}"#, language, tier, word);
        let db = ProfanityDatabase::from_slice(json.as_bytes());
        prop_assert!(db.is_ok());
        prop_assert_eq!(db.unwrap().word_count(), 1);
    }
}
