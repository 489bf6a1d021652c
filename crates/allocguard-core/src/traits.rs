use crate::types::{EarningsEntry, FilingChunk, RetrievalResult, SafetyLogRecord};
use chrono::NaiveDate;

/// Turns query text into a fixed-dimension vector. Deterministic for
/// identical input; implementations return a zero vector for empty input.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Vector similarity search over stored disclosure chunks. Ranking and
/// date/type/section filtering happen inside the store.
pub trait VectorStore: Send + Sync {
    fn vector_search(
        &self,
        query_embedding: &[f32],
        ticker: &str,
        match_count: usize,
        days_back: u32,
        filing_types: Option<&[String]>,
        section_names: Option<&[String]>,
    ) -> anyhow::Result<Vec<FilingChunk>>;
}

/// Earnings calendar lookup.
pub trait EarningsCalendar: Send + Sync {
    fn next_earnings(&self, ticker: &str, after: NaiveDate)
        -> anyhow::Result<Option<EarningsEntry>>;
}

/// Opaque key-value cache with upsert writes and TTL expiry.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str, ttl_hours: u32) -> anyhow::Result<()>;
}

/// Sink for decision audit records. Callers treat writes as best-effort.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &SafetyLogRecord) -> anyhow::Result<()>;
}

/// Strategy seam for converting retrieved evidence into a risk score and
/// critical-event descriptions, so alternative or learned scorers can be
/// swapped in without touching the decision engine.
pub trait RiskScorer: Send + Sync {
    /// Risk score in [0, 10]. No evidence is medium risk, not safe.
    fn score(&self, results: &[RetrievalResult]) -> f32;
    /// Severe disclosed conditions, at most three, in scan order.
    fn critical_events(&self, results: &[RetrievalResult]) -> Vec<String>;
}
