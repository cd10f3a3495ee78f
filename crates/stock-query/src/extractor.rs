//! Structured-filter extraction through a language model
//!
//! The question is sent with a fixed instruction listing the valid field
//! vocabularies and aggregation kinds; the reply must be a JSON object.
//! Replies are validated loosely: text fields are used as literal equality
//! constraints without checking them against the vocabulary, so an unknown
//! value simply matches nothing.

use crate::completion::{CompletionClient, CompletionRequest};
use crate::error::{ExtractError, ExtractResult};
use crate::filter_spec::{AggregationKind, FilterSpec};
use crate::vocabulary::Vocabulary;
use serde_json::{Map, Value};

const MODEL_KEYS: &[&str] = &["model", "modelo"];
const SIZE_KEYS: &[&str] = &["size", "talle"];
const STATUS_KEYS: &[&str] = &["status", "estado"];
const SELLER_KEYS: &[&str] = &["seller", "vendedor"];
const AGGREGATION_KEYS: &[&str] = &["aggregation", "agregacion", "agregación"];

/// Extracts a [`FilterSpec`] from a question via a [`CompletionClient`]
#[derive(Debug, Clone)]
pub struct StructuredExtractor<C> {
    client: C,
    instruction: String,
}

impl<C: CompletionClient> StructuredExtractor<C> {
    /// Create extractor with the default vocabulary
    #[must_use]
    pub fn new(client: C) -> Self {
        Self::with_vocabulary(client, &Vocabulary::default())
    }

    /// Create extractor whose instruction lists `vocabulary`
    #[must_use]
    pub fn with_vocabulary(client: C, vocabulary: &Vocabulary) -> Self {
        Self {
            client,
            instruction: system_instruction(vocabulary),
        }
    }

    /// Fixed system instruction sent with every question
    #[inline]
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Underlying client
    #[inline]
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Build the request for a question
    #[must_use]
    pub fn request_for(&self, question: &str) -> CompletionRequest {
        CompletionRequest {
            system: self.instruction.clone(),
            user: format!("Pregunta: {question}"),
            temperature: 0.0,
        }
    }

    /// Ask the service for a filter spec
    ///
    /// Fails with [`ExtractError::MissingCredential`] before sending anything
    /// when the client has no credential.
    pub async fn extract(&self, question: &str) -> ExtractResult<FilterSpec> {
        if !self.client.has_credential() {
            return Err(ExtractError::MissingCredential);
        }

        let raw = self.client.complete(&self.request_for(question)).await?;
        tracing::debug!(reply = %raw, "completion reply");

        let spec = parse_filter_spec(&raw)?;
        tracing::debug!(?spec, "extracted filter spec");
        Ok(spec)
    }
}

/// Build the instruction text from a vocabulary
#[must_use]
pub fn system_instruction(vocabulary: &Vocabulary) -> String {
    let aggregations: Vec<String> = AggregationKind::ALL
        .iter()
        .map(|k| format!("\"{}\"", k.name()))
        .collect();
    format!(
        "Sos un asistente que traduce preguntas sobre stock de zapatillas a filtros estructurados en JSON.\n\
         Campos válidos: model ({models}), size (entero), status ({statuses}), seller ({sellers}).\n\
         Incluir 'aggregation': uno de [{aggregations}].\n\
         Omitir los campos que la pregunta no menciona. Responder SOLO con un objeto JSON.",
        models = vocabulary.canonical_models().join("/"),
        statuses = vocabulary.status_labels().join("/"),
        sellers = vocabulary.seller_names().join("/"),
        aggregations = aggregations.join(","),
    )
}

/// Remove code fences and a leading language tag around a JSON reply
#[must_use]
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim().trim_matches('`').trim_start();
    let text = match text.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &text[4..],
        _ => text,
    };
    text.trim()
}

/// Parse a reply into a filter spec
pub fn parse_filter_spec(raw: &str) -> ExtractResult<FilterSpec> {
    let Value::Object(mut object) = serde_json::from_str::<Value>(strip_code_fences(raw))? else {
        return Err(ExtractError::Parse(serde::de::Error::custom(
            "expected a JSON object",
        )));
    };

    let aggregation = match pick(&mut object, AGGREGATION_KEYS).as_ref().and_then(Value::as_str) {
        Some(name) => AggregationKind::from_name(name).unwrap_or_else(|| {
            tracing::debug!(name, "unknown aggregation, counting matches instead");
            AggregationKind::Matches
        }),
        None => AggregationKind::Count,
    };

    Ok(FilterSpec {
        model: literal(pick(&mut object, MODEL_KEYS)),
        size: coerce_size(pick(&mut object, SIZE_KEYS))?,
        status: literal(pick(&mut object, STATUS_KEYS)),
        seller: literal(pick(&mut object, SELLER_KEYS)),
        aggregation,
    })
}

/// Value under the first key that carries something
///
/// English and Spanish names may both be present; a blank one never hides
/// a filled one.
fn pick(object: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut blank = None;
    for key in keys {
        match object.remove(*key) {
            Some(value) if is_blank(&value) => {
                blank.get_or_insert(value);
            }
            Some(value) => return Some(value),
            None => {}
        }
    }
    blank
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Use a value as a literal constraint if present and non-empty
fn literal(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Coerce a size value to an integer
///
/// Integers pass, floats are truncated, strings must hold an integer.
/// Null, empty string and zero mean "no size".
#[allow(clippy::cast_possible_truncation)]
fn coerce_size(value: Option<Value>) -> ExtractResult<Option<i64>> {
    let size = match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i),
            (None, Some(f)) if f.is_finite() && f.abs() < 1e15 => Some(f.trunc() as i64),
            _ => return Err(ExtractError::InvalidSize(n.to_string())),
        },
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(
            s.trim()
                .parse::<i64>()
                .map_err(|_| ExtractError::InvalidSize(format!("{s:?}")))?,
        ),
        Some(other) => return Err(ExtractError::InvalidSize(other.to_string())),
    };
    Ok(size.filter(|&s| s != 0))
}
