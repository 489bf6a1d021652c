//! End-to-end safety check orchestration: cache, earnings, retrieval, risk
//! scoring, decision, audit.

use crate::cache;
use crate::decision::{DecisionEngine, DecisionInput};
use crate::earnings::EarningsChecker;
use crate::risk::NO_EVIDENCE_RISK_SCORE;
use allocguard_core::config::SafetyThresholds;
use allocguard_core::traits::{AuditSink, CacheStore, RiskScorer, VectorStore};
use allocguard_core::types::{ChunkSnapshot, SafetyCheckResult, SafetyLogRecord};
use allocguard_retrieval::HybridRetriever;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

/// Evidence chunks kept in the result for auditability.
const SNAPSHOT_COUNT: usize = 5;
/// Leading chars of each snapshot.
const SNAPSHOT_CONTENT_LEN: usize = 200;
/// Evidence fetched per risk aspect.
const RESULTS_PER_ASPECT: usize = 5;

/// Runs the full allocation safety check.
///
/// Cache reads, audit writes, and cache writes are best-effort: a failing
/// cache or audit backend degrades to an uncached, unlogged check rather
/// than blocking the decision. Retrieval failure is the one exception; a
/// check that cannot see the evidence must not pass, so it becomes a VETO.
pub struct SafetyChecker<S: VectorStore> {
    retriever: HybridRetriever<S>,
    earnings: EarningsChecker,
    scorer: Box<dyn RiskScorer>,
    cache: Box<dyn CacheStore>,
    audit: Box<dyn AuditSink>,
    engine: DecisionEngine,
}

impl<S: VectorStore> SafetyChecker<S> {
    pub fn new(
        retriever: HybridRetriever<S>,
        earnings: EarningsChecker,
        scorer: Box<dyn RiskScorer>,
        cache: Box<dyn CacheStore>,
        audit: Box<dyn AuditSink>,
        thresholds: SafetyThresholds,
    ) -> allocguard_core::error::Result<Self> {
        Ok(Self {
            retriever,
            earnings,
            scorer,
            cache,
            audit,
            engine: DecisionEngine::new(thresholds)?,
        })
    }

    /// Check whether allocating `allocation_pct` percent to `ticker` is safe.
    ///
    /// `reference_date` anchors earnings proximity; `None` means today.
    pub fn check_safety(
        &self,
        ticker: &str,
        allocation_pct: f32,
        reference_date: Option<NaiveDate>,
        use_cache: bool,
    ) -> Result<SafetyCheckResult> {
        let reference_date = reference_date.unwrap_or_else(|| Utc::now().date_naive());
        let cache_key = cache::key(ticker, allocation_pct);

        if use_cache {
            if let Some(cached) = self.read_cache(&cache_key) {
                info!(ticker, "safety check served from cache");
                return Ok(cached);
            }
        }

        let earnings = self.earnings.check_proximity(ticker, reference_date)?;

        let (evidence, retrieval_failure) =
            match self
                .retriever
                .retrieve_for_safety_check(ticker, None, RESULTS_PER_ASPECT)
            {
                Ok(results) => (results, None),
                Err(err) => {
                    warn!(ticker, error = %err, "evidence retrieval failed; failing safe");
                    (Vec::new(), Some(err))
                }
            };

        let (risk_score, critical_events) = match retrieval_failure {
            // No evidence means the check cannot clear the ticker.
            Some(err) => (
                NO_EVIDENCE_RISK_SCORE,
                vec![format!("Safety check error: {err}")],
            ),
            None => (
                self.scorer.score(&evidence),
                self.scorer.critical_events(&evidence),
            ),
        };
        debug!(
            ticker,
            risk_score,
            evidence = evidence.len(),
            events = critical_events.len(),
            "evidence scored"
        );

        let retrieved_chunks: Vec<ChunkSnapshot> = evidence
            .iter()
            .take(SNAPSHOT_COUNT)
            .map(|r| ChunkSnapshot {
                content: r.content.chars().take(SNAPSHOT_CONTENT_LEN).collect(),
                section_name: r.section_name.clone(),
                filing_type: r.filing_type.clone(),
                score: r.combined_score,
            })
            .collect();

        let result = self.engine.decide(DecisionInput {
            ticker,
            allocation_pct,
            risk_score,
            critical_events,
            earnings: &earnings,
            retrieved_chunks: Some(retrieved_chunks),
        });
        info!(
            ticker,
            decision = %result.decision,
            risk_score = result.risk_score,
            "safety check complete"
        );

        if let Err(err) = self.audit.record(&SafetyLogRecord {
            ticker: ticker.to_string(),
            proposed_allocation: allocation_pct,
            decision: result.decision,
            reasoning: result.reasoning.clone(),
            risk_score: result.risk_score,
            checked_at: Utc::now(),
        }) {
            warn!(ticker, error = %err, "audit write failed");
        }

        if use_cache {
            self.write_cache(&cache_key, &result);
        }
        Ok(result)
    }

    /// Cache read that treats every failure mode as a miss.
    fn read_cache(&self, key: &str) -> Option<SafetyCheckResult> {
        let raw = match self.cache.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "cache read failed; treating as miss");
                return None;
            }
        };
        match serde_json::from_str::<SafetyCheckResult>(&raw) {
            Ok(mut result) => {
                result.cache_hit = true;
                Some(result)
            }
            Err(err) => {
                warn!(key, error = %err, "cached entry undecodable; treating as miss");
                None
            }
        }
    }

    /// Best-effort cache write with a risk-tiered TTL.
    fn write_cache(&self, key: &str, result: &SafetyCheckResult) {
        let ttl = cache::ttl_hours(result.risk_score);
        match serde_json::to_string(result) {
            Ok(raw) => {
                if let Err(err) = self.cache.set(key, &raw, ttl) {
                    warn!(key, error = %err, "cache write failed");
                }
            }
            Err(err) => warn!(key, error = %err, "result serialization failed"),
        }
    }
}
