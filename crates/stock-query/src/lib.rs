//! Stock Query
//!
//! Turns Spanish free-text questions about sneaker stock into structured
//! filters and answers them against a [`stock_dataset::Dataset`].
//!
//! # Interpretation modes
//!
//! - **Basic**: [`RuleInterpreter`] matches fixed vocabularies and a size
//!   pattern; always reports count and profit of the matching pairs
//! - **Advanced**: [`StructuredExtractor`] asks a language model for a JSON
//!   filter spec, including which aggregation to run
//!
//! # Architecture
//!
//! ```text
//! question → RuleInterpreter ─────┐
//!          → StructuredExtractor ─┴→ FilterSpec → QueryExecutor → DisplayResult
//!                 ↑
//!          CompletionClient (OpenAiClient)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_query::prelude::*;
//!
//! # async fn example(dataset: &stock_dataset::Dataset) {
//! let engine = QueryEngine::new(OpenAiClient::new(std::env::var("OPENAI_API_KEY").ok()));
//! let answer = engine
//!     .answer(dataset, "¿Cuántas blancas 41 me quedan?", InterpretationMode::Basic)
//!     .await;
//! println!("{}", answer.message);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod completion;
pub mod engine;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod filter_spec;
pub mod interpreter;
pub mod vocabulary;

// Re-exports for convenience
pub use completion::{CompletionClient, CompletionRequest, OpenAiClient};
pub use engine::{InterpretationMode, QueryEngine, UnknownMode};
pub use error::{ExtractError, ExtractResult, MISSING_CREDENTIAL_MESSAGE};
pub use executor::{format_currency, format_thousands, DisplayResult, MatchSummary, QueryExecutor};
pub use extractor::{parse_filter_spec, strip_code_fences, StructuredExtractor};
pub use filter_spec::{AggregationKind, FilterSpec};
pub use interpreter::{RuleInterpreter, StatusIntent};
pub use vocabulary::{Vocabulary, KNOWN_SELLERS, MODEL_ALIASES};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for answering questions
    pub use crate::{
        AggregationKind, CompletionClient, DisplayResult, FilterSpec, InterpretationMode,
        OpenAiClient, QueryEngine, QueryExecutor, RuleInterpreter, StructuredExtractor,
    };
}
