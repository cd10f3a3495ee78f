//! Fixed vocabularies for question matching
//!
//! Model aliases are an ordered list of `(alias, canonical)` pairs scanned
//! front to back; the first alias contained in the question wins. This is a
//! first-hit policy, not longest match: "blanca airmax" resolves through
//! "blanca" because that entry comes first. Both give the same canonical
//! name, so ordering only matters for questions naming two models.

use stock_dataset::Status;

/// Ordered alias table, matched against lowercased questions
pub const MODEL_ALIASES: &[(&str, &str)] = &[
    ("blanca", "Air Max Blanca"),
    ("blanca airmax", "Air Max Blanca"),
    ("air max blanca", "Air Max Blanca"),
    ("negra", "Air Max Negra"),
    ("negra airmax", "Air Max Negra"),
    ("air max negra", "Air Max Negra"),
    ("gris", "Gris tela"),
    ("gris tela", "Gris tela"),
    ("roja", "Roja"),
    ("combinada", "Combinada"),
];

/// Seller first names, lowercase
pub const KNOWN_SELLERS: &[&str] = &["enzo", "tefi", "laura"];

/// Vocabulary used by both interpreters
#[derive(Debug, Clone)]
pub struct Vocabulary {
    aliases: Vec<(String, String)>,
    sellers: Vec<String>,
}

impl Vocabulary {
    /// Build from custom tables
    ///
    /// Aliases and sellers are matched lowercase; they are stored lowercased.
    pub fn new<A, S>(aliases: A, sellers: S) -> Self
    where
        A: IntoIterator<Item = (String, String)>,
        S: IntoIterator<Item = String>,
    {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(alias, canonical)| (alias.to_lowercase(), canonical))
                .collect(),
            sellers: sellers.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// First canonical model whose alias occurs in `text`
    ///
    /// `text` must already be lowercase.
    #[must_use]
    pub fn match_model(&self, text: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(alias, _)| text.contains(alias.as_str()))
            .map(|(_, canonical)| canonical.as_str())
    }

    /// First known seller named in `text`, capitalized
    ///
    /// `text` must already be lowercase.
    #[must_use]
    pub fn match_seller(&self, text: &str) -> Option<String> {
        self.sellers
            .iter()
            .find(|seller| text.contains(seller.as_str()))
            .map(|seller| capitalize(seller))
    }

    /// Distinct canonical model names, in table order
    #[must_use]
    pub fn canonical_models(&self) -> Vec<&str> {
        let mut models: Vec<&str> = Vec::new();
        for (_, canonical) in &self.aliases {
            if !models.contains(&canonical.as_str()) {
                models.push(canonical);
            }
        }
        models
    }

    /// Seller names as stored in the sheet
    #[must_use]
    pub fn seller_names(&self) -> Vec<String> {
        self.sellers.iter().map(|s| capitalize(s)).collect()
    }

    /// Status labels as stored in the sheet
    #[must_use]
    pub fn status_labels(&self) -> [&'static str; 2] {
        [Status::InStock.label(), Status::Sold.label()]
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(
            MODEL_ALIASES
                .iter()
                .map(|(alias, canonical)| ((*alias).to_string(), (*canonical).to_string())),
            KNOWN_SELLERS.iter().map(|s| (*s).to_string()),
        )
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_alias_wins() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.match_model("tenés la blanca airmax?"), Some("Air Max Blanca"));
        // two models named: table order decides
        assert_eq!(vocab.match_model("roja o negra"), Some("Air Max Negra"));
        assert_eq!(vocab.match_model("zapatilla verde"), None);
    }

    #[test]
    fn sellers_are_capitalized() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.match_seller("qué vendió tefi"), Some("Tefi".to_string()));
        assert_eq!(vocab.match_seller("qué vendió martín"), None);
    }

    #[test]
    fn canonical_models_deduplicated() {
        let vocab = Vocabulary::default();
        assert_eq!(
            vocab.canonical_models(),
            vec!["Air Max Blanca", "Air Max Negra", "Gris tela", "Roja", "Combinada"]
        );
    }

    #[test]
    fn custom_vocabulary_lowercases() {
        let vocab = Vocabulary::new(
            [("Verde".to_string(), "Verde Musgo".to_string())],
            ["Mora".to_string()],
        );
        assert_eq!(vocab.match_model("la verde 40"), Some("Verde Musgo"));
        assert_eq!(vocab.match_seller("vendió mora"), Some("Mora".to_string()));
    }
}
