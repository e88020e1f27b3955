//! Property tests for history bounds and dedup bookkeeping.

use journal_core::{ClassifiedEvent, RawEntry, Timestamp};
use journal_filter::dedup::{ContentCheck, DedupKey, Deduper, ExactKey};
use journal_filter::history::HistoryStore;
use proptest::prelude::*;

fn accept(
    history: &mut HistoryStore,
    deduper: &mut Deduper,
    ts: f64,
    text: &str,
) -> bool {
    let entry = RawEntry::builder(Timestamp::from_secs(ts), "System", text).build();
    let Some(exact) = deduper.check_exact(&entry) else {
        return false;
    };
    let event = ClassifiedEvent::Other {
        text: text.to_string(),
    };
    let ContentCheck::Fresh(content) = deduper.check_content(&event) else {
        return false;
    };
    let key = DedupKey { exact, content };
    deduper.record(&key);
    if history.push(event, entry.timestamp(), key) > 0 {
        deduper.rebuild(history.dedup_keys());
    }
    true
}

proptest! {
    #[test]
    fn history_never_exceeds_bound(
        max in 1usize..32,
        texts in prop::collection::vec("[a-e]{1,3}", 0..200),
    ) {
        let mut history = HistoryStore::new(max);
        let mut deduper = Deduper::new(true);
        for (i, text) in texts.iter().enumerate() {
            accept(&mut history, &mut deduper, i as f64, text);
            prop_assert!(history.len() <= max);
        }
    }

    #[test]
    fn retained_content_is_unique(
        texts in prop::collection::vec("[a-c]{1,2}", 0..100),
    ) {
        let mut history = HistoryStore::new(16);
        let mut deduper = Deduper::new(true);
        for (i, text) in texts.iter().enumerate() {
            accept(&mut history, &mut deduper, i as f64, text);
        }
        let mut seen = std::collections::HashSet::new();
        for record in history.iter() {
            prop_assert!(seen.insert(record.plain.to_lowercase()));
        }
    }

    #[test]
    fn replaying_a_batch_accepts_nothing(
        texts in prop::collection::vec("[a-z ]{1,12}", 1..40),
    ) {
        let mut history = HistoryStore::new(1000);
        let mut deduper = Deduper::new(false);
        // All entries share one timestamp, so they all sit on the frontier.
        for text in &texts {
            accept(&mut history, &mut deduper, 7.0, text);
        }
        let before = history.len();
        for text in &texts {
            prop_assert!(!accept(&mut history, &mut deduper, 7.0, text));
        }
        prop_assert_eq!(history.len(), before);
    }

    #[test]
    fn evicted_content_can_return(n in 2usize..10) {
        let mut history = HistoryStore::new(n);
        let mut deduper = Deduper::new(true);
        prop_assert!(accept(&mut history, &mut deduper, 0.0, "first"));
        for i in 0..n {
            let text = format!("filler {i}");
            prop_assert!(accept(&mut history, &mut deduper, 1.0 + i as f64, &text));
        }
        prop_assert!(history.iter().all(|r| r.plain != "first"));
        prop_assert!(accept(&mut history, &mut deduper, 100.0, "first"));
    }
}

#[test]
fn exact_key_ignores_negative_zero() {
    let a = RawEntry::builder(Timestamp::from_secs(0.0), "System", "x").build();
    let b = RawEntry::builder(Timestamp::from_secs(-0.0), "System", "x").build();
    assert_eq!(ExactKey::of(&a), ExactKey::of(&b));
}
