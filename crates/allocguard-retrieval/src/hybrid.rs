//! Hybrid retrieval: semantic candidates from the vector store, reranked
//! with an ephemeral BM25 index and fused under configurable weights.

use crate::bm25::{Bm25Searcher, IndexDocument};
use crate::preprocess::QueryPreprocessor;
use allocguard_core::config::RetrievalConfig;
use allocguard_core::traits::{Embedder, VectorStore};
use allocguard_core::types::{ChunkId, Meta, RetrievalResult};
use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

/// Overfetch factor for semantic candidates. The lexical rerank needs more
/// material than the final result count to discriminate among semantically
/// similar chunks.
const OVERFETCH_FACTOR: usize = 3;

/// Aspect queries run by `retrieve_for_safety_check` when the caller does
/// not supply its own.
pub const DEFAULT_RISK_ASPECTS: &[&str] = &[
    "litigation risks and legal proceedings",
    "regulatory risks and compliance issues",
    "financial risks and debt obligations",
    "competitive risks and market position",
    "operational risks and supply chain",
    "cybersecurity and data privacy risks",
];

pub const DEFAULT_RESULTS_PER_ASPECT: usize = 5;

// Safety checks look only at periodic filings and risk-relevant sections.
const SAFETY_FILING_TYPES: &[&str] = &["10-K", "10-Q"];
const SAFETY_SECTION_NAMES: &[&str] = &["1A", "7", "7A"];

/// Per-call overrides for `retrieve`. Unset fields fall back to the
/// retriever's `RetrievalConfig`.
#[derive(Debug, Clone, Default)]
pub struct RetrieveOptions {
    pub filing_types: Option<Vec<String>>,
    pub section_names: Option<Vec<String>>,
    pub max_results: Option<usize>,
    pub days_back: Option<u32>,
}

pub struct HybridRetriever<S: VectorStore> {
    store: S,
    embedder: Box<dyn Embedder>,
    config: RetrievalConfig,
    preprocessor: QueryPreprocessor,
}

impl<S: VectorStore> HybridRetriever<S> {
    pub fn new(store: S, embedder: Box<dyn Embedder>, config: RetrievalConfig) -> Self {
        Self {
            store,
            embedder,
            config,
            preprocessor: QueryPreprocessor::default(),
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Hybrid retrieval for one query.
    ///
    /// The expanded query drives the semantic search; the BM25 rerank scores
    /// the original query so expansion terms cannot crowd out the user's own
    /// terms. Lexical scores are normalized by the batch maximum before
    /// fusion. Store and embedder errors propagate to the caller.
    pub fn retrieve(
        &self,
        query: &str,
        ticker: &str,
        opts: &RetrieveOptions,
    ) -> Result<Vec<RetrievalResult>> {
        // A zero override is meaningless; fall back to the configured limit.
        let max_results = opts
            .max_results
            .filter(|n| *n > 0)
            .unwrap_or(self.config.max_results);
        let days_back = opts.days_back.unwrap_or(self.config.days_back);

        let processed = self.preprocessor.preprocess(query);
        let query_embedding = self.embedder.embed_query(&processed)?;

        let fetch_count = max_results * OVERFETCH_FACTOR;
        let candidates = self.store.vector_search(
            &query_embedding,
            ticker,
            fetch_count,
            days_back,
            opts.filing_types.as_deref(),
            opts.section_names.as_deref(),
        )?;
        if candidates.is_empty() {
            debug!(ticker, query, "no semantic candidates; skipping lexical rerank");
            return Ok(Vec::new());
        }

        // Fresh per-call index over exactly this candidate batch.
        let mut bm25 = Bm25Searcher::new(self.preprocessor.clone());
        let documents: Vec<IndexDocument> = candidates
            .iter()
            .map(|c| IndexDocument {
                id: c.id.clone(),
                content: c.content.clone(),
            })
            .collect();
        bm25.index_documents(&documents);

        let hits = bm25.search(query, documents.len());
        let max_lexical = hits.iter().map(|h| h.score).fold(0.0f32, f32::max);
        let keyword_scores: HashMap<ChunkId, f32> = if max_lexical > 0.0 {
            hits.into_iter()
                .map(|h| (h.id, h.score / max_lexical))
                .collect()
        } else {
            HashMap::new()
        };

        let mut results: Vec<RetrievalResult> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let keyword_score = keyword_scores.get(&candidate.id).copied().unwrap_or(0.0);
            let combined_score = self.config.semantic_weight * candidate.similarity
                + self.config.keyword_weight * keyword_score;
            if combined_score >= self.config.min_score_threshold {
                results.push(RetrievalResult {
                    chunk_id: candidate.id,
                    content: candidate.content,
                    section_name: candidate.section_name,
                    filing_type: candidate.filing_type,
                    filing_date: candidate.filing_date,
                    ticker: ticker.to_string(),
                    semantic_score: candidate.similarity,
                    keyword_score,
                    combined_score,
                    metadata: Meta::new(),
                });
            }
        }
        results.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(max_results);
        debug!(ticker, returned = results.len(), "hybrid retrieval complete");
        Ok(results)
    }

    /// Multi-aspect retrieval for safety analysis.
    ///
    /// Runs one retrieval per aspect over periodic filings and risk-relevant
    /// sections, then merges by chunk id keeping the highest combined score,
    /// so broad coverage never duplicates evidence downstream.
    pub fn retrieve_for_safety_check(
        &self,
        ticker: &str,
        query_aspects: Option<&[String]>,
        max_results_per_aspect: usize,
    ) -> Result<Vec<RetrievalResult>> {
        let aspects: Vec<String> = match query_aspects {
            Some(aspects) => aspects.to_vec(),
            None => DEFAULT_RISK_ASPECTS.iter().map(|s| (*s).to_string()).collect(),
        };
        let opts = RetrieveOptions {
            filing_types: Some(SAFETY_FILING_TYPES.iter().map(|s| (*s).to_string()).collect()),
            section_names: Some(SAFETY_SECTION_NAMES.iter().map(|s| (*s).to_string()).collect()),
            max_results: Some(max_results_per_aspect),
            days_back: None,
        };

        let mut best: HashMap<ChunkId, RetrievalResult> = HashMap::new();
        for aspect in &aspects {
            for result in self.retrieve(aspect, ticker, &opts)? {
                match best.get(&result.chunk_id) {
                    Some(existing) if existing.combined_score >= result.combined_score => {}
                    _ => {
                        best.insert(result.chunk_id.clone(), result);
                    }
                }
            }
        }

        let mut merged: Vec<RetrievalResult> = best.into_values().collect();
        merged.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        debug!(ticker, aspects = aspects.len(), merged = merged.len(), "safety retrieval complete");
        Ok(merged)
    }

    /// Retrieve from one filing section.
    pub fn retrieve_by_section(
        &self,
        query: &str,
        ticker: &str,
        section_name: &str,
        filing_type: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<RetrievalResult>> {
        let opts = RetrieveOptions {
            filing_types: filing_type.map(|t| vec![t.to_string()]),
            section_names: Some(vec![section_name.to_string()]),
            max_results: Some(max_results),
            days_back: None,
        };
        self.retrieve(query, ticker, &opts)
    }

    /// Risk Factors only (10-K Item 1A).
    pub fn retrieve_risk_factors(
        &self,
        query: &str,
        ticker: &str,
        max_results: usize,
    ) -> Result<Vec<RetrievalResult>> {
        self.retrieve_by_section(query, ticker, "1A", Some("10-K"), max_results)
    }

    /// Management's discussion only. MD&A is Item 7 in a 10-K and Item 2 in
    /// a 10-Q.
    pub fn retrieve_mda(
        &self,
        query: &str,
        ticker: &str,
        filing_type: &str,
        max_results: usize,
    ) -> Result<Vec<RetrievalResult>> {
        let section = if filing_type == "10-K" { "7" } else { "2" };
        self.retrieve_by_section(query, ticker, section, Some(filing_type), max_results)
    }
}
