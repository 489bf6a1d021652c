//! Domain types shared by the retrieval and safety engines.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type ChunkId = String;
pub type Meta = HashMap<String, String>;

/// A disclosure chunk as returned by the vector store.
///
/// - `id`: globally unique chunk identifier
/// - `section_name`: filing section item (e.g., "1A" for Risk Factors)
/// - `filing_type`: e.g., "10-K" or "10-Q"
/// - `similarity`: vector similarity assigned by the store, higher is better
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingChunk {
    pub id: ChunkId,
    pub content: String,
    pub section_name: String,
    pub filing_type: String,
    pub filing_date: NaiveDate,
    pub ticker: String,
    pub similarity: f32,
}

/// One ranked piece of evidence produced by hybrid retrieval.
///
/// `semantic_score` comes from the vector store, `keyword_score` is the
/// batch-normalized BM25 score in [0,1], and `combined_score` is their
/// weighted sum under the active retrieval config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub chunk_id: ChunkId,
    pub content: String,
    pub section_name: String,
    pub filing_type: String,
    pub filing_date: NaiveDate,
    pub ticker: String,
    pub semantic_score: f32,
    pub keyword_score: f32,
    pub combined_score: f32,
    #[serde(default)]
    pub metadata: Meta,
}

/// Three-way outcome of a safety check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SafetyDecision {
    Proceed,
    Reduce,
    Veto,
}

impl fmt::Display for SafetyDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyDecision::Proceed => write!(f, "PROCEED"),
            SafetyDecision::Reduce => write!(f, "REDUCE"),
            SafetyDecision::Veto => write!(f, "VETO"),
        }
    }
}

/// One entry in the earnings calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsEntry {
    pub ticker: String,
    pub earnings_date: NaiveDate,
    /// "BMO" (before market open), "AMC" (after market close), or "UNKNOWN".
    pub time_of_day: String,
    pub fiscal_quarter: Option<String>,
    pub source: String,
}

/// Result of an earnings proximity check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsProximity {
    pub ticker: String,
    pub has_upcoming_earnings: bool,
    pub days_until_earnings: Option<i64>,
    pub earnings_date: Option<NaiveDate>,
    pub time_of_day: Option<String>,
    pub is_within_threshold: bool,
    pub threshold_days: u32,
}

impl EarningsProximity {
    /// A proximity result for a ticker with no upcoming earnings on record.
    pub fn none(ticker: &str, threshold_days: u32) -> Self {
        Self {
            ticker: ticker.to_string(),
            has_upcoming_earnings: false,
            days_until_earnings: None,
            earnings_date: None,
            time_of_day: None,
            is_within_threshold: false,
            threshold_days,
        }
    }

    /// Warning text when earnings are approaching, `None` otherwise.
    pub fn warning_message(&self) -> Option<String> {
        if !self.has_upcoming_earnings {
            return None;
        }
        let days = self.days_until_earnings.unwrap_or_default();
        let date = self
            .earnings_date
            .map(|d| d.to_string())
            .unwrap_or_default();
        if self.is_within_threshold {
            let tod = self.time_of_day.as_deref().unwrap_or("UNKNOWN");
            Some(format!(
                "WARNING: Earnings for {} in {} day(s) on {} ({})",
                self.ticker, days, date, tod
            ))
        } else {
            Some(format!(
                "Upcoming earnings for {} in {} day(s) on {}",
                self.ticker, days, date
            ))
        }
    }
}

/// Audit snapshot of one retrieved chunk, kept with the decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    /// Leading content only; truncated for audit readability.
    pub content: String,
    pub section_name: String,
    pub filing_type: String,
    pub score: f32,
}

/// Final result of a safety check.
///
/// Constructed once per check and immutable afterwards, except `cache_hit`
/// which is flipped when the result is served from the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyCheckResult {
    pub decision: SafetyDecision,
    pub ticker: String,
    pub risk_score: f32,
    pub reasoning: String,
    pub earnings_warning: Option<String>,
    pub critical_events: Option<Vec<String>>,
    pub allocation_warning: Option<String>,
    #[serde(default)]
    pub cache_hit: bool,
    pub retrieved_chunks: Option<Vec<ChunkSnapshot>>,
}

/// Record handed to the audit sink after every decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyLogRecord {
    pub ticker: String,
    pub proposed_allocation: f32,
    pub decision: SafetyDecision,
    pub reasoning: String,
    pub risk_score: f32,
    pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn decision_serializes_uppercase() {
        let json = serde_json::to_string(&SafetyDecision::Veto).unwrap();
        assert_eq!(json, "\"VETO\"");
        let back: SafetyDecision = serde_json::from_str("\"REDUCE\"").unwrap();
        assert_eq!(back, SafetyDecision::Reduce);
    }

    #[test]
    fn proximity_warning_inside_threshold() {
        let prox = EarningsProximity {
            ticker: "AAPL".into(),
            has_upcoming_earnings: true,
            days_until_earnings: Some(2),
            earnings_date: NaiveDate::from_ymd_opt(2024, 5, 2),
            time_of_day: Some("AMC".into()),
            is_within_threshold: true,
            threshold_days: 3,
        };
        let msg = prox.warning_message().unwrap();
        assert!(msg.starts_with("WARNING:"));
        assert!(msg.contains("2 day(s)"));
        assert!(msg.contains("AMC"));
    }

    #[test]
    fn proximity_warning_outside_threshold_is_informational() {
        let prox = EarningsProximity {
            ticker: "AAPL".into(),
            has_upcoming_earnings: true,
            days_until_earnings: Some(10),
            earnings_date: NaiveDate::from_ymd_opt(2024, 5, 10),
            time_of_day: None,
            is_within_threshold: false,
            threshold_days: 3,
        };
        let msg = prox.warning_message().unwrap();
        assert!(!msg.starts_with("WARNING:"));
        assert!(msg.contains("10 day(s)"));
    }

    #[test]
    fn proximity_warning_absent_without_earnings() {
        assert!(EarningsProximity::none("AAPL", 3).warning_message().is_none());
    }

    #[test]
    fn safety_result_round_trips_through_json() {
        let result = SafetyCheckResult {
            decision: SafetyDecision::Reduce,
            ticker: "AAPL".into(),
            risk_score: 6.5,
            reasoning: "Elevated risk score (6.5)".into(),
            earnings_warning: None,
            critical_events: None,
            allocation_warning: Some("High allocation: 18.0%".into()),
            cache_hit: false,
            retrieved_chunks: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: SafetyCheckResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.decision, SafetyDecision::Reduce);
        assert!((back.risk_score - 6.5).abs() < f32::EPSILON);
        assert_eq!(back.allocation_warning.as_deref(), Some("High allocation: 18.0%"));
    }
}
