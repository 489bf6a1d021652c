//! Query normalization, domain expansion, and tokenization.

/// Common verbs that carry no lexical signal in disclosure text.
const DOMAIN_STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
];

/// Synonym expansions for financial terms. Only the first two expansions of a
/// matched term are appended to the query.
const TERM_EXPANSIONS: &[(&str, &[&str])] = &[
    ("risk", &["risks", "risk factors", "uncertainties", "exposure"]),
    ("litigation", &["lawsuit", "legal proceedings", "legal action", "court"]),
    ("revenue", &["sales", "income", "earnings", "net sales"]),
    ("debt", &["borrowings", "obligations", "liabilities", "loans"]),
    ("competition", &["competitors", "competitive", "market competition"]),
    ("regulation", &["regulatory", "compliance", "government", "legal requirements"]),
    ("cybersecurity", &["cyber", "security breach", "data breach", "hacking"]),
    ("supply chain", &["suppliers", "supply disruption", "logistics"]),
    ("earnings", &["quarterly results", "financial results", "net income"]),
    ("guidance", &["outlook", "forecast", "projections", "expectations"]),
];

const MAX_EXPANSIONS_PER_TERM: usize = 2;

/// Normalizes queries and tokenizes text for lexical scoring.
///
/// The same `tokenize` is used on both the index-build and query paths;
/// diverging tokenization would make BM25 scores incomparable.
#[derive(Debug, Clone)]
pub struct QueryPreprocessor {
    expand_terms: bool,
    remove_stopwords: bool,
}

impl Default for QueryPreprocessor {
    fn default() -> Self {
        Self {
            expand_terms: true,
            remove_stopwords: false,
        }
    }
}

impl QueryPreprocessor {
    pub fn new(expand_terms: bool, remove_stopwords: bool) -> Self {
        Self {
            expand_terms,
            remove_stopwords,
        }
    }

    /// Collapse whitespace and append up to two synonyms per recognized
    /// financial term. Expansion is additive; the original terms always
    /// remain in place for downstream scorers.
    pub fn preprocess(&self, query: &str) -> String {
        let mut query = query.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.expand_terms {
            let query_lower = query.to_lowercase();
            let mut expanded: Vec<&str> = Vec::new();
            for (term, expansions) in TERM_EXPANSIONS {
                if query_lower.contains(term) {
                    expanded.extend(expansions.iter().take(MAX_EXPANSIONS_PER_TERM));
                }
            }
            if !expanded.is_empty() {
                query.push(' ');
                query.push_str(&expanded.join(" "));
            }
        }
        query
    }

    /// Lowercase and split into ASCII alphanumeric runs.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut tokens: Vec<String> = Vec::new();
        let mut current = String::new();
        for c in lower.chars() {
            if c.is_ascii_alphanumeric() {
                current.push(c);
            } else if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }
        if self.remove_stopwords {
            tokens.retain(|t| !DOMAIN_STOPWORDS.contains(&t.as_str()));
        }
        tokens
    }
}
