//! Question answering entry point
//!
//! Ties both interpretation modes to the executor. Answers never fail:
//! extraction errors become the answer text and the next question starts
//! from scratch.

use crate::completion::CompletionClient;
use crate::executor::{DisplayResult, QueryExecutor};
use crate::extractor::StructuredExtractor;
use crate::interpreter::RuleInterpreter;
use crate::vocabulary::Vocabulary;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stock_dataset::Dataset;

/// How a question is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpretationMode {
    /// Keyword rules, no external calls
    #[default]
    Basic,
    /// Language-model extraction
    Advanced,
}

impl fmt::Display for InterpretationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
        })
    }
}

/// Unrecognised mode name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown interpretation mode: '{0}' (expected basic or advanced)")]
pub struct UnknownMode(pub String);

impl FromStr for InterpretationMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" | "basico" | "básico" => Ok(Self::Basic),
            "advanced" | "avanzado" => Ok(Self::Advanced),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Answers questions against an explicit dataset handle
#[derive(Debug)]
pub struct QueryEngine<C> {
    interpreter: RuleInterpreter,
    extractor: StructuredExtractor<C>,
    executor: QueryExecutor,
}

impl<C: CompletionClient> QueryEngine<C> {
    /// Create engine with the default vocabulary
    #[must_use]
    pub fn new(client: C) -> Self {
        Self::with_vocabulary(client, Vocabulary::default())
    }

    /// Create engine with a custom vocabulary
    #[must_use]
    pub fn with_vocabulary(client: C, vocabulary: Vocabulary) -> Self {
        Self {
            extractor: StructuredExtractor::with_vocabulary(client, &vocabulary),
            interpreter: RuleInterpreter::new(vocabulary),
            executor: QueryExecutor::new(),
        }
    }

    /// Rule-based interpreter
    #[inline]
    #[must_use]
    pub fn interpreter(&self) -> &RuleInterpreter {
        &self.interpreter
    }

    /// Model-backed extractor
    #[inline]
    #[must_use]
    pub fn extractor(&self) -> &StructuredExtractor<C> {
        &self.extractor
    }

    /// Answer with the selected mode
    pub async fn answer(
        &self,
        dataset: &Dataset,
        question: &str,
        mode: InterpretationMode,
    ) -> DisplayResult {
        tracing::info!(%mode, question, "answering question");
        match mode {
            InterpretationMode::Basic => self.answer_basic(dataset, question),
            InterpretationMode::Advanced => self.answer_advanced(dataset, question).await,
        }
    }

    /// Rule-based answer: match count and profit over the same subset
    ///
    /// An empty question yields an empty result without touching the dataset.
    #[must_use]
    pub fn answer_basic(&self, dataset: &Dataset, question: &str) -> DisplayResult {
        let Some(spec) = self.interpreter.interpret(question) else {
            return DisplayResult::empty();
        };
        DisplayResult::text(self.executor.summarize(dataset, &spec).message())
    }

    /// Model-backed answer using the extracted aggregation
    pub async fn answer_advanced(&self, dataset: &Dataset, question: &str) -> DisplayResult {
        match self.extractor.extract(question).await {
            Ok(spec) => self.executor.execute(dataset, &spec),
            Err(err) => {
                tracing::warn!(error = %err, "could not extract filters");
                DisplayResult::text(err.user_message())
            }
        }
    }
}
