//! Rule-based question interpreter
//!
//! Maps a free-text Spanish question to a [`FilterSpec`] with fixed
//! vocabularies and a size pattern. No external calls.
//!
//! # Rules
//! 1. Match on the lowercased question
//! 2. Model: first alias contained in the question
//! 3. Size: first whole-word integer in 35–44
//! 4. Seller: first known seller contained in the question
//! 5. Intent: a sale keyword restricts to sold pairs, "total" lifts the
//!    status filter, otherwise only pairs in stock are counted

use crate::filter_spec::{AggregationKind, FilterSpec};
use crate::vocabulary::Vocabulary;
use once_cell::sync::Lazy;
use regex::Regex;
use stock_dataset::Status;

static SIZE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(3[5-9]|4[0-4])\b").expect("size pattern is valid"));

const SOLD_KEYWORDS: &[&str] = &["vendid", "vendí"];
const TOTAL_KEYWORD: &str = "total";

/// What the question asks about, regarding status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIntent {
    /// Only pairs in stock (default)
    InStock,
    /// Only sold pairs
    Sold,
    /// No status filter
    Total,
}

impl StatusIntent {
    /// Detect intent in a lowercased question
    ///
    /// A sale keyword wins over "total".
    #[must_use]
    pub fn detect(text: &str) -> Self {
        if SOLD_KEYWORDS.iter().any(|k| text.contains(k)) {
            Self::Sold
        } else if text.contains(TOTAL_KEYWORD) {
            Self::Total
        } else {
            Self::InStock
        }
    }

    /// Status label to filter on, if any
    #[must_use]
    pub fn status(self) -> Option<Status> {
        match self {
            Self::InStock => Some(Status::InStock),
            Self::Sold => Some(Status::Sold),
            Self::Total => None,
        }
    }
}

/// Keyword matcher over a fixed vocabulary
#[derive(Debug, Clone, Default)]
pub struct RuleInterpreter {
    vocabulary: Vocabulary,
}

impl RuleInterpreter {
    /// Create interpreter with the given vocabulary
    #[inline]
    #[must_use]
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Vocabulary in use
    #[inline]
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Interpret a question
    ///
    /// Returns `None` for an empty (or blank) question, meaning there is
    /// nothing to compute.
    #[must_use]
    pub fn interpret(&self, question: &str) -> Option<FilterSpec> {
        if question.trim().is_empty() {
            return None;
        }
        let text = question.to_lowercase();

        let spec = FilterSpec {
            model: self.vocabulary.match_model(&text).map(str::to_string),
            size: detect_size(&text),
            status: StatusIntent::detect(&text)
                .status()
                .map(|s| s.label().to_string()),
            seller: self.vocabulary.match_seller(&text),
            aggregation: AggregationKind::Count,
        };

        tracing::debug!(?spec, "rule-based interpretation");
        Some(spec)
    }
}

/// First plausible shoe size in the text
fn detect_size(text: &str) -> Option<i64> {
    SIZE_PATTERN
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpret(q: &str) -> Option<FilterSpec> {
        RuleInterpreter::default().interpret(q)
    }

    #[test]
    fn model_size_and_default_in_stock() {
        let spec = interpret("¿Cuántas blancas 41 me quedan?").unwrap();
        assert_eq!(spec.model.as_deref(), Some("Air Max Blanca"));
        assert_eq!(spec.size, Some(41));
        assert_eq!(spec.status.as_deref(), Some("En stock"));
        assert_eq!(spec.seller, None);
        assert_eq!(spec.aggregation, AggregationKind::Count);
    }

    #[test]
    fn sale_keyword_only() {
        let spec = interpret("¿Cuántas vendidas hay?").unwrap();
        assert_eq!(spec, FilterSpec::new().with_status("Vendido"));
    }

    #[test]
    fn first_person_sale_keyword() {
        let spec = interpret("Qué VENDÍ ayer").unwrap();
        assert_eq!(spec.status.as_deref(), Some("Vendido"));
    }

    #[test]
    fn total_lifts_status_filter() {
        let spec = interpret("Total de negras").unwrap();
        assert_eq!(spec.model.as_deref(), Some("Air Max Negra"));
        assert_eq!(spec.status, None);
    }

    #[test]
    fn sold_wins_over_total() {
        let spec = interpret("total vendido por enzo").unwrap();
        assert_eq!(spec.status.as_deref(), Some("Vendido"));
        assert_eq!(spec.seller.as_deref(), Some("Enzo"));
    }

    #[test]
    fn size_outside_range_ignored() {
        assert_eq!(interpret("talle 45").unwrap().size, None);
        assert_eq!(interpret("talle 34").unwrap().size, None);
        assert_eq!(interpret("talle 441").unwrap().size, None);
        assert_eq!(interpret("talle 35").unwrap().size, Some(35));
    }

    #[test]
    fn first_size_wins() {
        assert_eq!(interpret("40 o 42").unwrap().size, Some(40));
    }

    #[test]
    fn empty_question_is_noop() {
        assert_eq!(interpret(""), None);
        assert_eq!(interpret("   "), None);
    }
}
