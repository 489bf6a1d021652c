//! The PROCEED/REDUCE/VETO state machine.

use allocguard_core::config::SafetyThresholds;
use allocguard_core::error::Result;
use allocguard_core::types::{ChunkSnapshot, EarningsProximity, SafetyCheckResult, SafetyDecision};

/// Critical events are quoted into reasoning truncated to this many chars.
const EVENT_QUOTE_LEN: usize = 100;

/// Everything the engine needs to decide one check.
pub struct DecisionInput<'a> {
    pub ticker: &'a str,
    pub allocation_pct: f32,
    pub risk_score: f32,
    pub critical_events: Vec<String>,
    pub earnings: &'a EarningsProximity,
    pub retrieved_chunks: Option<Vec<ChunkSnapshot>>,
}

/// Threshold-driven decision engine. Rules are evaluated in strict priority
/// order and short-circuit: critical events, then the VETO risk threshold,
/// then accumulated REDUCE reasons, then PROCEED.
pub struct DecisionEngine {
    thresholds: SafetyThresholds,
}

impl DecisionEngine {
    /// Fails fast on invalid thresholds; an inverted threshold pair is a
    /// programmer error, not a runtime condition.
    pub fn new(thresholds: SafetyThresholds) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &SafetyThresholds {
        &self.thresholds
    }

    pub fn decide(&self, input: DecisionInput<'_>) -> SafetyCheckResult {
        let DecisionInput {
            ticker,
            allocation_pct,
            risk_score,
            critical_events,
            earnings,
            retrieved_chunks,
        } = input;

        if let Some(first) = critical_events.first() {
            let quoted: String = first.chars().take(EVENT_QUOTE_LEN).collect();
            return SafetyCheckResult {
                decision: SafetyDecision::Veto,
                ticker: ticker.to_string(),
                risk_score,
                reasoning: format!("Critical event detected: {quoted}"),
                earnings_warning: earnings.warning_message(),
                critical_events: Some(critical_events),
                allocation_warning: None,
                cache_hit: false,
                retrieved_chunks,
            };
        }

        if risk_score >= self.thresholds.veto_risk_score {
            return SafetyCheckResult {
                decision: SafetyDecision::Veto,
                ticker: ticker.to_string(),
                risk_score,
                reasoning: format!(
                    "High risk score ({risk_score:.1}) exceeds VETO threshold ({:.1})",
                    self.thresholds.veto_risk_score
                ),
                earnings_warning: earnings.warning_message(),
                critical_events: None,
                allocation_warning: None,
                cache_hit: false,
                retrieved_chunks,
            };
        }

        let mut reasons: Vec<String> = Vec::new();
        if risk_score >= self.thresholds.reduce_risk_score {
            reasons.push(format!("Elevated risk score ({risk_score:.1})"));
        }
        let is_high_allocation = allocation_pct > self.thresholds.high_allocation_pct;
        if earnings.is_within_threshold && is_high_allocation {
            reasons.push(format!(
                "Earnings in {} days with high allocation ({allocation_pct:.1}%)",
                earnings.days_until_earnings.unwrap_or_default()
            ));
        }
        if !reasons.is_empty() {
            return SafetyCheckResult {
                decision: SafetyDecision::Reduce,
                ticker: ticker.to_string(),
                risk_score,
                reasoning: reasons.join("; "),
                earnings_warning: earnings.warning_message(),
                critical_events: None,
                allocation_warning: is_high_allocation
                    .then(|| format!("High allocation: {allocation_pct:.1}%")),
                cache_hit: false,
                retrieved_chunks,
            };
        }

        let mut proceed_reasons = vec![format!("Low risk score ({risk_score:.1})")];
        if earnings.has_upcoming_earnings && !earnings.is_within_threshold {
            proceed_reasons.push(format!(
                "Earnings in {} days (outside threshold)",
                earnings.days_until_earnings.unwrap_or_default()
            ));
        }
        SafetyCheckResult {
            decision: SafetyDecision::Proceed,
            ticker: ticker.to_string(),
            risk_score,
            reasoning: proceed_reasons.join("; "),
            earnings_warning: if earnings.has_upcoming_earnings {
                earnings.warning_message()
            } else {
                None
            },
            critical_events: None,
            allocation_warning: None,
            cache_hit: false,
            retrieved_chunks,
        }
    }
}
