#![forbid(unsafe_code)]

//! Noise filtering for raw journal entries.
//!
//! A [`NoiseFilterChain`] is an ordered list of independent predicates. The
//! first predicate that rejects an entry wins and evaluation stops. Filters
//! look only at the raw speaker and text, so the chain runs before
//! classification.
//!
//! Chain order, built from [`JournalConfig`]:
//!
//! 1. self-authored lines
//! 2. speaker deny lists (always-on list, then the two toggled lists)
//! 3. anti-spam: numeric-only, long token, letterless
//! 4. exact / substring / prefix phrase deny lists
//! 5. decorative status lines and tag-only markers
//! 6. numeric command echoes (`withdraw 5000`)
//!
//! # Example
//!
//! ```
//! use journal_core::{JournalConfig, RawEntry, Timestamp};
//! use journal_filter::noise::{FilterVerdict, NoiseFilterChain};
//!
//! let chain = NoiseFilterChain::from_config(&JournalConfig::default()).unwrap();
//! let spam = RawEntry::builder(Timestamp::ZERO, "Regular", "a1b2c3d4e5f6g7h8i9j0k1l2m3")
//!     .speaker("Bob")
//!     .build();
//! assert_eq!(chain.evaluate(&spam), FilterVerdict::Reject("long_token"));
//! ```

use std::fmt;
use std::sync::LazyLock;

use journal_core::{JournalConfig, RawEntry};
use regex::Regex;
use rustc_hash::FxHashSet;

/// Outcome of running the chain over one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    Pass,
    /// Rejected by the named filter.
    Reject(&'static str),
}

impl FilterVerdict {
    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// A single noise predicate.
pub trait NoiseFilter: fmt::Debug + Send + Sync {
    /// Stable name used in logs and verdicts.
    fn name(&self) -> &'static str;

    /// Return `true` to drop the entry.
    fn rejects(&self, entry: &RawEntry) -> bool;
}

/// Failure to build a filter from configuration.
#[derive(Debug, thiserror::Error)]
#[error("invalid pattern for {filter}: {source}")]
pub struct FilterBuildError {
    pub filter: &'static str,
    #[source]
    pub source: regex::Error,
}

// ---------------------------------------------------------------------------
// Speaker filters
// ---------------------------------------------------------------------------

/// Drops lines spoken by the local player.
#[derive(Debug, Clone)]
pub struct SelfAuthored {
    identity: String,
}

impl SelfAuthored {
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into().trim().to_string(),
        }
    }
}

impl NoiseFilter for SelfAuthored {
    fn name(&self) -> &'static str {
        "self_authored"
    }

    fn rejects(&self, entry: &RawEntry) -> bool {
        entry
            .speaker()
            .is_some_and(|s| s.eq_ignore_ascii_case(&self.identity))
    }
}

/// Whole-name speaker deny list (ASCII case-insensitive).
#[derive(Debug, Clone)]
pub struct SpeakerDenyList {
    name: &'static str,
    speakers: FxHashSet<String>,
}

impl SpeakerDenyList {
    pub fn new<I, S>(name: &'static str, speakers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name,
            speakers: speakers
                .into_iter()
                .map(|s| s.as_ref().trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }
}

impl NoiseFilter for SpeakerDenyList {
    fn name(&self) -> &'static str {
        self.name
    }

    fn rejects(&self, entry: &RawEntry) -> bool {
        entry
            .speaker()
            .is_some_and(|s| self.speakers.contains(&s.to_ascii_lowercase()))
    }
}

// ---------------------------------------------------------------------------
// Anti-spam heuristics
// ---------------------------------------------------------------------------

/// Drops text made only of digits and number separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericOnly;

impl NoiseFilter for NumericOnly {
    fn name(&self) -> &'static str {
        "numeric_only"
    }

    fn rejects(&self, entry: &RawEntry) -> bool {
        let mut saw_digit = false;
        for c in entry.text().chars() {
            if c.is_ascii_digit() {
                saw_digit = true;
            } else if !(c.is_whitespace() || matches!(c, ',' | '.' | '-' | '+')) {
                return false;
            }
        }
        saw_digit
    }
}

/// Drops text containing an alphanumeric run longer than `threshold` chars.
#[derive(Debug, Clone, Copy)]
pub struct LongToken {
    threshold: usize,
}

impl LongToken {
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }
}

impl NoiseFilter for LongToken {
    fn name(&self) -> &'static str {
        "long_token"
    }

    fn rejects(&self, entry: &RawEntry) -> bool {
        entry
            .text()
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| token.chars().count() > self.threshold)
    }
}

/// Drops text with no letters at all (digits and punctuation only).
#[derive(Debug, Clone, Copy, Default)]
pub struct Letterless;

impl NoiseFilter for Letterless {
    fn name(&self) -> &'static str {
        "letterless"
    }

    fn rejects(&self, entry: &RawEntry) -> bool {
        let mut visible = entry.text().chars().filter(|c| !c.is_whitespace()).peekable();
        visible.peek().is_some() && !visible.any(char::is_alphabetic)
    }
}

// ---------------------------------------------------------------------------
// Phrase and pattern filters
// ---------------------------------------------------------------------------

/// Case-insensitive exact, substring, and prefix deny lists.
#[derive(Debug, Clone, Default)]
pub struct PhraseDenyList {
    exact: FxHashSet<String>,
    substrings: Vec<String>,
    prefixes: Vec<String>,
}

impl PhraseDenyList {
    #[must_use]
    pub fn new(exact: &[String], substrings: &[String], prefixes: &[String]) -> Self {
        let lower = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            exact: lower(exact).into_iter().collect(),
            substrings: lower(substrings),
            prefixes: lower(prefixes),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.substrings.is_empty() && self.prefixes.is_empty()
    }
}

impl NoiseFilter for PhraseDenyList {
    fn name(&self) -> &'static str {
        "phrase"
    }

    fn rejects(&self, entry: &RawEntry) -> bool {
        let text = entry.text().trim().to_lowercase();
        self.exact.contains(&text)
            || self.substrings.iter().any(|s| text.contains(s.as_str()))
            || self.prefixes.iter().any(|p| text.starts_with(p.as_str()))
    }
}

/// `*You feel stronger*`, `~~ blessed ~~`, `++ buffed ++`.
static STATUS_EFFECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\*+[^*]+\*+|~+[^~]+~+|\++[^+]+\++|-{2,}[^-]+-{2,}|=+[^=]+=+)\s*$")
        .expect("status effect pattern is valid")
});

/// `{invulnerable}`, `[paralyzed]`, and mismatched forms like `{word)`.
static TAG_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[\[{(<]\s*[A-Za-z][\w' -]{0,30}?\s*[\]})>]\s*$")
        .expect("tag-only pattern is valid")
});

/// Decorative lines that carry no information for a reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecorativePattern;

impl NoiseFilter for DecorativePattern {
    fn name(&self) -> &'static str {
        "decorative"
    }

    fn rejects(&self, entry: &RawEntry) -> bool {
        let text = entry.text();
        STATUS_EFFECT.is_match(text) || TAG_ONLY.is_match(text)
    }
}

/// Echoes of numeric commands such as `withdraw 5,000`.
#[derive(Debug, Clone)]
pub struct NumericCommand {
    pattern: Regex,
}

impl NumericCommand {
    pub fn new<I, S>(keywords: I) -> Result<Option<Self>, FilterBuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = keywords
            .into_iter()
            .map(|k| regex::escape(k.as_ref().trim()))
            .filter(|k| !k.is_empty())
            .collect();
        if alternatives.is_empty() {
            return Ok(None);
        }
        let source = format!(r"(?i)^\s*(?:{})\s+[\d,]+\s*$", alternatives.join("|"));
        let pattern = Regex::new(&source).map_err(|source| FilterBuildError {
            filter: "numeric_command",
            source,
        })?;
        Ok(Some(Self { pattern }))
    }
}

impl NoiseFilter for NumericCommand {
    fn name(&self) -> &'static str {
        "numeric_command"
    }

    fn rejects(&self, entry: &RawEntry) -> bool {
        self.pattern.is_match(entry.text())
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Ordered, short-circuiting list of noise filters.
#[derive(Debug, Default)]
pub struct NoiseFilterChain {
    filters: Vec<Box<dyn NoiseFilter>>,
}

impl NoiseFilterChain {
    /// An empty chain that passes everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter at the lowest priority.
    #[must_use]
    pub fn with(mut self, filter: impl NoiseFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Build the standard chain from configuration toggles.
    pub fn from_config(config: &JournalConfig) -> Result<Self, FilterBuildError> {
        let mut chain = Self::new();

        if config.filter_self
            && let Some(identity) = config.local_identity.as_deref()
        {
            chain = chain.with(SelfAuthored::new(identity));
        }

        chain = chain.with(SpeakerDenyList::new("deny_speakers", &config.deny_speakers));
        if config.deny_non_player_sources {
            chain = chain.with(SpeakerDenyList::new(
                "non_player_source",
                &config.non_player_speakers,
            ));
        }
        if config.deny_noisy_sources {
            chain = chain.with(SpeakerDenyList::new("noisy_source", &config.noisy_speakers));
        }

        if config.drop_numeric_only {
            chain = chain.with(NumericOnly);
        }
        if config.drop_long_tokens {
            chain = chain.with(LongToken::new(config.long_token_threshold));
        }
        if config.drop_letterless {
            chain = chain.with(Letterless);
        }

        let phrases = PhraseDenyList::new(
            &config.deny_exact,
            &config.deny_substrings,
            &config.deny_prefixes,
        );
        if !phrases.is_empty() {
            chain = chain.with(phrases);
        }

        if config.deny_decorative {
            chain = chain.with(DecorativePattern);
        }
        if config.deny_numeric_commands
            && let Some(filter) = NumericCommand::new(&config.numeric_command_keywords)?
        {
            chain = chain.with(filter);
        }

        Ok(chain)
    }

    /// Run the chain; the first rejecting filter wins.
    #[must_use]
    pub fn evaluate(&self, entry: &RawEntry) -> FilterVerdict {
        self.filters
            .iter()
            .find(|f| f.rejects(entry))
            .map_or(FilterVerdict::Pass, |f| FilterVerdict::Reject(f.name()))
    }

    /// Filter names in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.iter().map(|f| f.name())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_core::Timestamp;

    fn said(speaker: &str, text: &str) -> RawEntry {
        RawEntry::builder(Timestamp::ZERO, "Regular", text)
            .speaker(speaker)
            .build()
    }

    fn system(text: &str) -> RawEntry {
        RawEntry::builder(Timestamp::ZERO, "System", text).build()
    }

    fn chain(config: &JournalConfig) -> NoiseFilterChain {
        NoiseFilterChain::from_config(config).unwrap()
    }

    #[test]
    fn self_authored_is_dropped_first() {
        let config = JournalConfig {
            filter_self: true,
            local_identity: Some("Alice".into()),
            deny_speakers: vec!["alice".into()],
            ..JournalConfig::default()
        };
        let verdict = chain(&config).evaluate(&said("ALICE", "hello there"));
        assert_eq!(verdict, FilterVerdict::Reject("self_authored"));
    }

    #[test]
    fn self_filter_off_passes_own_lines() {
        let config = JournalConfig {
            local_identity: Some("Alice".into()),
            ..JournalConfig::default()
        };
        assert!(chain(&config).evaluate(&said("Alice", "hello there")).is_pass());
    }

    #[test]
    fn deny_list_always_enforced() {
        let config = JournalConfig {
            deny_speakers: vec!["Spammer".into()],
            ..JournalConfig::default()
        };
        assert_eq!(
            chain(&config).evaluate(&said("spammer", "buy gold")),
            FilterVerdict::Reject("deny_speakers")
        );
    }

    #[test]
    fn toggled_speaker_lists() {
        let mut config = JournalConfig::default();
        let banker = said("Banker", "Thy current bank balance is 100 gold.");
        assert!(chain(&config).evaluate(&banker).is_pass());

        config.deny_non_player_sources = true;
        assert_eq!(
            chain(&config).evaluate(&banker),
            FilterVerdict::Reject("non_player_source")
        );

        config.deny_noisy_sources = true;
        config.noisy_speakers = vec!["Parrot".into()];
        assert_eq!(
            chain(&config).evaluate(&said("Parrot", "squawk")),
            FilterVerdict::Reject("noisy_source")
        );
    }

    #[test]
    fn numeric_only() {
        let config = JournalConfig::default();
        assert_eq!(
            chain(&config).evaluate(&said("Bob", " 1,250 ")),
            FilterVerdict::Reject("numeric_only")
        );
        assert!(chain(&config).evaluate(&said("Bob", "1250 gold")).is_pass());
    }

    #[test]
    fn long_token_respects_toggle() {
        let mash = said("Bob", "a1b2c3d4e5f6g7h8i9j0k1l2m3");
        let mut config = JournalConfig::default();
        assert_eq!(
            chain(&config).evaluate(&mash),
            FilterVerdict::Reject("long_token")
        );
        config.drop_long_tokens = false;
        assert!(chain(&config).evaluate(&mash).is_pass());
    }

    #[test]
    fn long_token_threshold_is_exclusive() {
        let filter = LongToken::new(5);
        assert!(!filter.rejects(&said("Bob", "abcde fghij")));
        assert!(filter.rejects(&said("Bob", "abcdef")));
    }

    #[test]
    fn letterless_text() {
        let config = JournalConfig::default();
        assert_eq!(
            chain(&config).evaluate(&said("Bob", "?!? ... :)")),
            FilterVerdict::Reject("letterless")
        );
        assert!(chain(&config).evaluate(&said("Bob", "ok!")).is_pass());
    }

    #[test]
    fn phrase_lists_are_case_insensitive() {
        let config = JournalConfig {
            deny_exact: vec!["You see: a cat".into()],
            deny_substrings: vec!["fizzles".into()],
            deny_prefixes: vec!["You are now".into()],
            ..JournalConfig::default()
        };
        let c = chain(&config);
        assert_eq!(c.evaluate(&system("you see: A CAT")), FilterVerdict::Reject("phrase"));
        assert_eq!(c.evaluate(&system("The spell FIZZLES.")), FilterVerdict::Reject("phrase"));
        assert_eq!(c.evaluate(&system("You are now hidden.")), FilterVerdict::Reject("phrase"));
        assert!(c.evaluate(&system("You see: a dog")).is_pass());
    }

    #[test]
    fn decorative_lines() {
        let filter = DecorativePattern;
        assert!(filter.rejects(&system("*You feel stronger*")));
        assert!(filter.rejects(&system("~~ blessed ~~")));
        assert!(filter.rejects(&system("{invulnerable}")));
        assert!(filter.rejects(&system("{word)")));
        assert!(filter.rejects(&system("[paralyzed]")));
        assert!(!filter.rejects(&system("*waves* hello everyone")));
        assert!(!filter.rejects(&system("[Trade Chat] Bob: wts")));
    }

    #[test]
    fn numeric_commands() {
        let config = JournalConfig::default();
        let c = chain(&config);
        assert_eq!(
            c.evaluate(&said("Bob", "withdraw 5,000")),
            FilterVerdict::Reject("numeric_command")
        );
        assert!(c.evaluate(&said("Bob", "withdraw the sword")).is_pass());
    }

    #[test]
    fn numeric_command_keywords_are_escaped() {
        let filter = NumericCommand::new(["a.b"]).unwrap().unwrap();
        assert!(filter.rejects(&said("Bob", "a.b 10")));
        assert!(!filter.rejects(&said("Bob", "axb 10")));
        assert!(NumericCommand::new(Vec::<String>::new()).unwrap().is_none());
    }

    #[test]
    fn chain_order_matches_priority() {
        let config = JournalConfig {
            filter_self: true,
            local_identity: Some("Alice".into()),
            deny_exact: vec!["x".into()],
            ..JournalConfig::default()
        };
        let names: Vec<_> = chain(&config).names().collect();
        assert_eq!(
            names,
            vec![
                "self_authored",
                "deny_speakers",
                "numeric_only",
                "long_token",
                "letterless",
                "phrase",
                "decorative",
                "numeric_command",
            ]
        );
    }

    #[test]
    fn empty_chain_passes_everything() {
        let c = NoiseFilterChain::new();
        assert!(c.is_empty());
        assert!(c.evaluate(&system("12345")).is_pass());
    }
}
