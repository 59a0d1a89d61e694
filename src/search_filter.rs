use crate::data::record::{display_value, Record};
use async_trait::async_trait;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Decides whether a record belongs in a filtered table.
///
/// Filters evaluate the predicate exactly once per upstream record, so an
/// implementation is free to be slow or to await on something.
#[async_trait]
pub trait Predicate: Send + Sync {
    async fn matches(&self, record: &Record) -> bool;
}

/// Wraps a plain closure as a predicate
pub struct FnPredicate<F>(pub F);

#[async_trait]
impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&Record) -> bool + Send + Sync,
{
    async fn matches(&self, record: &Record) -> bool {
        (self.0)(record)
    }
}

/// How the search text is compared against cell values
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive substring
    #[default]
    Substring,
    /// Skim-style fuzzy match
    Fuzzy,
    /// Case-insensitive regular expression
    Regex,
}

enum Matcher {
    Substring,
    Fuzzy(SkimMatcherV2),
    Regex(Regex),
}

/// The search-as-you-type predicate: a record matches when any of its
/// values matches the query.
pub struct TextMatcher {
    query: String,
    matcher: Matcher,
}

impl TextMatcher {
    pub fn new(query: &str, mode: MatchMode) -> Self {
        let matcher = match mode {
            MatchMode::Substring => Matcher::Substring,
            MatchMode::Fuzzy => Matcher::Fuzzy(SkimMatcherV2::default().ignore_case()),
            MatchMode::Regex => match RegexBuilder::new(query).case_insensitive(true).build() {
                Ok(regex) => Matcher::Regex(regex),
                Err(e) => {
                    // half-typed patterns like "(" are routine while searching
                    debug!(target: "filter", "Query {:?} is not a regex, matching literally: {}", query, e);
                    Matcher::Substring
                }
            },
        };

        Self {
            query: query.to_lowercase(),
            matcher,
        }
    }

    /// Substring matcher, the default search behaviour
    pub fn substring(query: &str) -> Self {
        Self::new(query, MatchMode::Substring)
    }

    pub fn matches_text(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Substring => text.to_lowercase().contains(&self.query),
            Matcher::Fuzzy(skim) => skim
                .fuzzy_match(text, &self.query)
                .is_some_and(|score| score > 0),
            Matcher::Regex(regex) => regex.is_match(text),
        }
    }

    pub fn matches_record(&self, record: &Record) -> bool {
        record
            .values()
            .any(|value| self.matches_text(&display_value(value)))
    }
}

#[async_trait]
impl Predicate for TextMatcher {
    async fn matches(&self, record: &Record) -> bool {
        self.matches_record(record)
    }
}
