//! Keyword-weighted risk scoring over retrieved evidence.

use allocguard_core::traits::RiskScorer;
use allocguard_core::types::RetrievalResult;

/// Risk keywords with weights. Matched weights are summed per chunk.
const RISK_KEYWORDS: &[(&str, f32)] = &[
    ("litigation", 2.0),
    ("lawsuit", 2.0),
    ("regulatory", 1.5),
    ("investigation", 2.5),
    ("violation", 2.0),
    ("penalty", 1.5),
    ("fraud", 3.0),
    ("breach", 2.0),
    ("default", 2.5),
    ("bankruptcy", 3.0),
    ("material weakness", 2.5),
    ("going concern", 3.0),
    ("restatement", 2.0),
];

/// Severe conditions that force a VETO. Presence-only, no weighting.
const CRITICAL_KEYWORDS: &[&str] = &[
    "bankruptcy",
    "going concern",
    "material weakness",
    "fraud",
    "criminal investigation",
    "delisting",
    "default",
];

/// Risk reported when retrieval produced no evidence. No evidence is medium
/// risk, not safe.
pub const NO_EVIDENCE_RISK_SCORE: f32 = 5.0;

const MAX_CHUNKS_EXAMINED: usize = 10;
const MAX_CRITICAL_EVENTS: usize = 3;
/// Item 1A (Risk Factors) carries the most signal.
const RISK_SECTION_MULTIPLIER: f32 = 1.5;
const CONTEXT_BEFORE: usize = 50;
const CONTEXT_AFTER: usize = 100;

/// Heuristic scorer over fixed keyword tables. The default `RiskScorer`
/// implementation; swap in a learned scorer through the same trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordRiskScorer;

impl KeywordRiskScorer {
    pub fn new() -> Self {
        Self
    }
}

impl RiskScorer for KeywordRiskScorer {
    fn score(&self, results: &[RetrievalResult]) -> f32 {
        if results.is_empty() {
            return NO_EVIDENCE_RISK_SCORE;
        }
        let mut total_risk = 0.0f32;
        let mut chunk_count = 0usize;
        for result in results.iter().take(MAX_CHUNKS_EXAMINED) {
            let content_lower = result.content.to_lowercase();
            let mut chunk_risk = 0.0f32;
            for (keyword, weight) in RISK_KEYWORDS {
                if content_lower.contains(keyword) {
                    chunk_risk += weight;
                }
            }
            if result.section_name == "1A" {
                chunk_risk *= RISK_SECTION_MULTIPLIER;
            }
            total_risk += chunk_risk;
            chunk_count += 1;
        }
        let avg_risk = total_risk / chunk_count.max(1) as f32;
        let clamped = avg_risk.min(10.0);
        (clamped * 10.0).round() / 10.0
    }

    fn critical_events(&self, results: &[RetrievalResult]) -> Vec<String> {
        let mut events: Vec<String> = Vec::new();
        for result in results.iter().take(MAX_CHUNKS_EXAMINED) {
            let content_lower = result.content.to_lowercase();
            for keyword in CRITICAL_KEYWORDS {
                let Some(idx) = content_lower.find(keyword) else {
                    continue;
                };
                let context = context_window(&result.content, idx);
                events.push(format!("{}: {}", title_case(keyword), context.trim()));
                break; // one event per chunk
            }
            if events.len() >= MAX_CRITICAL_EVENTS {
                break;
            }
        }
        events.truncate(MAX_CRITICAL_EVENTS);
        events
    }
}

/// Slice `content` around a match, clamped to char boundaries.
///
/// The match index comes from searching the lowercased content; lowercasing
/// can change byte offsets for non-ASCII text, so fall back to scanning the
/// lowercased form when lengths diverge.
fn context_window(content: &str, idx: usize) -> String {
    let lower = content.to_lowercase();
    let source: &str = if lower.len() == content.len() { content } else { &lower };
    let mut start = idx.saturating_sub(CONTEXT_BEFORE);
    while start > 0 && !source.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (idx + CONTEXT_AFTER).min(source.len());
    while end < source.len() && !source.is_char_boundary(end) {
        end += 1;
    }
    source[start..end].to_string()
}

/// "going concern" -> "Going Concern".
fn title_case(keyword: &str) -> String {
    keyword
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn result(section: &str, content: &str) -> RetrievalResult {
        RetrievalResult {
            chunk_id: format!("{section}-{}", content.len()),
            content: content.to_string(),
            section_name: section.to_string(),
            filing_type: "10-K".to_string(),
            filing_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ticker: "ACME".to_string(),
            semantic_score: 0.8,
            keyword_score: 0.5,
            combined_score: 0.71,
            metadata: Default::default(),
        }
    }

    #[test]
    fn empty_results_score_exactly_five() {
        let scorer = KeywordRiskScorer::new();
        assert_eq!(scorer.score(&[]), 5.0);
    }

    #[test]
    fn keyword_matches_raise_the_score() {
        let scorer = KeywordRiskScorer::new();
        let calm = scorer.score(&[result("7", "routine operations continued as planned")]);
        let risky = scorer.score(&[result("7", "litigation and fraud investigation ongoing")]);
        assert_eq!(calm, 0.0);
        // litigation 2.0 + fraud 3.0 + investigation 2.5 = 7.5
        assert!((risky - 7.5).abs() < 1e-6);
    }

    #[test]
    fn risk_factors_section_weighs_heavier() {
        let scorer = KeywordRiskScorer::new();
        let text = "pending litigation disclosed";
        let in_1a = scorer.score(&[result("1A", text)]);
        let in_7 = scorer.score(&[result("7", text)]);
        assert!(in_1a > in_7);
        assert!((in_1a - 3.0).abs() < 1e-6); // 2.0 * 1.5
        assert!((in_7 - 2.0).abs() < 1e-6);
    }

    #[test]
    fn score_averages_over_examined_chunks_and_clamps() {
        let scorer = KeywordRiskScorer::new();
        let quiet = result("7", "nothing notable here");
        let loud = result("7", "fraud and default disclosed");
        // (0 + 5.5) / 2 = 2.75, rounded to 2.8
        let mixed = scorer.score(&[quiet, loud]);
        assert!((mixed - 2.8).abs() < 1e-6);
        // A single chunk can exceed 10 before clamping.
        let extreme = result(
            "1A",
            "fraud bankruptcy going concern default litigation lawsuit breach investigation",
        );
        assert_eq!(scorer.score(&[extreme]), 10.0);
    }

    #[test]
    fn score_rounds_to_one_decimal() {
        let scorer = KeywordRiskScorer::new();
        let a = result("7", "penalty assessed"); // 1.5
        let b = result("7", "no flags");
        let c = result("7", "no flags either");
        // 1.5 / 3 = 0.5
        assert_eq!(scorer.score(&[a, b, c]), 0.5);
    }

    #[test]
    fn only_top_ten_chunks_are_examined() {
        let scorer = KeywordRiskScorer::new();
        let mut results: Vec<RetrievalResult> =
            (0..10).map(|_| result("7", "clean quarter")).collect();
        results.push(result("7", "fraud fraud fraud"));
        assert_eq!(scorer.score(&results), 0.0, "the eleventh chunk is ignored");
    }

    #[test]
    fn critical_events_formatted_with_context() {
        let scorer = KeywordRiskScorer::new();
        let content = "The auditors expressed substantial doubt about the company's ability to continue as a going concern within one year.";
        let events = scorer.critical_events(&[result("1A", content)]);
        assert_eq!(events.len(), 1);
        assert!(events[0].starts_with("Going Concern: "));
        assert!(events[0].contains("ability to continue"));
        assert!(events[0].contains("within one year"));
    }

    #[test]
    fn one_event_per_chunk_first_keyword_wins() {
        let scorer = KeywordRiskScorer::new();
        let events = scorer.critical_events(&[result(
            "1A",
            "bankruptcy filing follows the fraud allegations",
        )]);
        assert_eq!(events.len(), 1);
        assert!(events[0].starts_with("Bankruptcy: "));
    }

    #[test]
    fn at_most_three_events_in_scan_order() {
        let scorer = KeywordRiskScorer::new();
        let results = vec![
            result("1A", "a bankruptcy petition was filed"),
            result("1A", "material weakness in internal controls"),
            result("7", "delisting notice received from the exchange"),
            result("7", "default on senior notes occurred"),
        ];
        let events = scorer.critical_events(&results);
        assert_eq!(events.len(), 3);
        assert!(events[0].starts_with("Bankruptcy"));
        assert!(events[1].starts_with("Material Weakness"));
        assert!(events[2].starts_with("Delisting"));
    }

    #[test]
    fn no_events_in_clean_filings() {
        let scorer = KeywordRiskScorer::new();
        let events = scorer.critical_events(&[result("1A", "revenue grew and margins expanded")]);
        assert!(events.is_empty());
    }
}
