//! Configuration files and environment overlays driving a full engine.

use std::io::Write;
use std::time::Instant;

use journal::prelude::*;

#[test]
fn json_file_configures_the_engine() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "max_history": 2,
            "display_order": "newest_first",
            "channel_visibility": {{ "pvp": false }}
        }}"#
    )
    .unwrap();

    let config = JournalConfig::from_json_path(file.path()).unwrap();
    assert_eq!(config.max_history, 2);

    let mut source = MemorySource::new();
    source.extend([
        RawEntry::builder(Timestamp::from_secs(1.0), "System", "[PvP Chat] Bob: gank").build(),
        RawEntry::builder(Timestamp::from_secs(2.0), "Regular", "one").speaker("Alice").build(),
        RawEntry::builder(Timestamp::from_secs(3.0), "Regular", "two").speaker("Alice").build(),
        RawEntry::builder(Timestamp::from_secs(4.0), "Regular", "three").speaker("Alice").build(),
    ]);
    let mut engine = JournalEngine::new(config, source, MemorySink::new()).unwrap();
    engine.tick(Instant::now());

    assert_eq!(
        engine.sink().last_frame().unwrap().plain(),
        vec!["Alice: three", "Alice: two"]
    );
    assert_eq!(engine.stats().hidden, 1);
    assert_eq!(engine.stats().evicted, 1);
}

#[test]
fn env_overlay_feeds_the_engine() {
    let parse = JournalConfig::default().overlay_env_with(|key| match key {
        "JOURNAL_MAX_HISTORY" => Some("1".into()),
        "JOURNAL_MIN_RESEND_INTERVAL_MS" => Some("not a number".into()),
        _ => None,
    });
    assert_eq!(parse.config.max_history, 1);
    assert_eq!(parse.errors.len(), 1);

    let engine = JournalEngine::new(parse.config, MemorySource::new(), MemorySink::new()).unwrap();
    assert_eq!(engine.config().min_resend_interval_ms, 1000);
}

#[test]
fn invalid_file_reports_every_problem() {
    let err = JournalConfig::from_json_str(r#"{ "max_history": 0, "long_token_threshold": 0 }"#)
        .unwrap_err();
    let errors = match err {
        journal::core::ConfigLoadError::Invalid(errors) => errors,
        other => panic!("expected validation errors, got {other}"),
    };
    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert!(fields.contains(&"max_history"));
    assert!(fields.contains(&"long_token_threshold"));
}
