//! Property tests for span estimation and windowing.

use journal_view::span::{SpanCache, estimate_span};
use journal_view::viewport::{ViewportState, ViewportWindower};
use proptest::prelude::*;

proptest! {
    #[test]
    fn span_is_at_least_one(text in ".{0,200}", width in 0usize..120) {
        prop_assert!(estimate_span(&text, width) >= 1);
    }

    #[test]
    fn appending_never_shrinks_span(
        text in "[a-z ]{0,80}",
        suffix in "[a-z ]{0,40}",
        width in 1usize..40,
    ) {
        let longer = format!("{text}{suffix}");
        prop_assert!(estimate_span(&longer, width) >= estimate_span(&text, width));
    }

    #[test]
    fn narrower_never_shrinks_span(text in "[a-z ]{0,120}", width in 2usize..60) {
        prop_assert!(estimate_span(&text, width - 1) >= estimate_span(&text, width));
    }

    #[test]
    fn window_covers_budget(
        texts in prop::collection::vec("[a-z ]{1,60}", 1..60),
        width in 5usize..40,
        available in 1usize..30,
        scroll in 0usize..50,
    ) {
        let mut state = ViewportState::default();
        state.scroll_up(scroll);
        let mut cache = SpanCache::new(1024);
        let window = ViewportWindower::new(width, available).select(&texts, &mut state, &mut cache);

        prop_assert!(!window.is_empty());
        prop_assert!(window.range.end <= texts.len());

        let total: usize = texts.iter().map(|t| estimate_span(t, width).max(1)).sum();
        let below: usize = texts[window.range.end..]
            .iter()
            .map(|t| estimate_span(t, width).max(1))
            .sum();
        let through: usize = texts[window.range.start..]
            .iter()
            .map(|t| estimate_span(t, width).max(1))
            .sum();

        // The newest selected record reaches past the offset.
        prop_assert!(below <= window.offset_lines);
        prop_assert!(through > window.offset_lines);
        // Either the budget is covered or the oldest record is included.
        prop_assert!(through >= window.offset_lines + available || window.range.start == 0);
        prop_assert!(window.offset_lines <= total);
    }

    #[test]
    fn stick_to_bottom_always_includes_newest(
        texts in prop::collection::vec("[a-z ]{1,60}", 1..60),
        available in 1usize..10,
    ) {
        let mut state = ViewportState::default();
        let mut cache = SpanCache::new(1024);
        let window = ViewportWindower::new(20, available).select(&texts, &mut state, &mut cache);
        prop_assert_eq!(window.range.end, texts.len());
        prop_assert_eq!(state.scroll_offset_lines, 0);
    }
}
