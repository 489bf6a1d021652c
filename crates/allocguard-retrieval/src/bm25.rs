//! Ephemeral Okapi BM25 scorer.
//!
//! The index is scoped to exactly the current retrieval candidate set and is
//! rebuilt on every `index_documents` call. Idf values are corpus-relative to
//! that small batch and are never carried across retrieval calls; this is a
//! rerank-only scorer, not a persistent search index.

use crate::preprocess::QueryPreprocessor;
use allocguard_core::types::ChunkId;
use std::collections::HashMap;

const K1: f32 = 1.5;
const B: f32 = 0.75;
/// Floor factor applied to negative idf values, as a fraction of the mean idf.
const EPSILON: f32 = 0.25;

/// A document handed to the indexer.
#[derive(Debug, Clone)]
pub struct IndexDocument {
    pub id: ChunkId,
    pub content: String,
}

/// One scored hit, higher is better.
#[derive(Debug, Clone)]
pub struct Bm25Hit {
    pub id: ChunkId,
    pub score: f32,
}

pub struct Bm25Searcher {
    preprocessor: QueryPreprocessor,
    ids: Vec<ChunkId>,
    term_freqs: Vec<HashMap<String, f32>>,
    doc_len: Vec<f32>,
    avgdl: f32,
    idf: HashMap<String, f32>,
}

impl Bm25Searcher {
    pub fn new(preprocessor: QueryPreprocessor) -> Self {
        Self {
            preprocessor,
            ids: Vec::new(),
            term_freqs: Vec::new(),
            doc_len: Vec::new(),
            avgdl: 0.0,
            idf: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Build a fresh index over exactly `documents`, discarding any prior
    /// corpus and recomputing idf from scratch.
    pub fn index_documents(&mut self, documents: &[IndexDocument]) {
        self.ids.clear();
        self.term_freqs.clear();
        self.doc_len.clear();
        self.idf.clear();
        self.avgdl = 0.0;

        let mut doc_counts: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0.0f32;
        for doc in documents {
            let tokens = self.preprocessor.tokenize(&doc.content);
            let mut freqs: HashMap<String, f32> = HashMap::new();
            for token in &tokens {
                *freqs.entry(token.clone()).or_insert(0.0) += 1.0;
            }
            for term in freqs.keys() {
                *doc_counts.entry(term.clone()).or_insert(0) += 1;
            }
            total_len += tokens.len() as f32;
            self.doc_len.push(tokens.len() as f32);
            self.term_freqs.push(freqs);
            self.ids.push(doc.id.clone());
        }
        if self.ids.is_empty() {
            return;
        }
        self.avgdl = total_len / self.ids.len() as f32;

        // Okapi idf with negative values floored to a fraction of the mean,
        // matching rank_bm25's BM25Okapi.
        let n = self.ids.len() as f32;
        let mut idf_sum = 0.0f32;
        let mut negative: Vec<String> = Vec::new();
        for (term, df) in &doc_counts {
            let df = *df as f32;
            let idf = (n - df + 0.5).ln() - (df + 0.5).ln();
            idf_sum += idf;
            if idf < 0.0 {
                negative.push(term.clone());
            }
            self.idf.insert(term.clone(), idf);
        }
        let average_idf = idf_sum / doc_counts.len() as f32;
        let floor = EPSILON * average_idf;
        for term in negative {
            self.idf.insert(term, floor);
        }
    }

    fn scores_for(&self, query_tokens: &[String]) -> Vec<f32> {
        let mut scores = vec![0.0f32; self.ids.len()];
        for (i, freqs) in self.term_freqs.iter().enumerate() {
            let dl = self.doc_len[i];
            let norm = K1 * (1.0 - B + B * dl / self.avgdl.max(f32::MIN_POSITIVE));
            for token in query_tokens {
                let Some(tf) = freqs.get(token) else { continue };
                let idf = self.idf.get(token).copied().unwrap_or(0.0);
                scores[i] += idf * (tf * (K1 + 1.0)) / (tf + norm);
            }
        }
        scores
    }

    /// Documents with score > 0, descending; ties keep insertion order.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<Bm25Hit> {
        if self.ids.is_empty() {
            return Vec::new();
        }
        let query_tokens = self.preprocessor.tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }
        let scores = self.scores_for(&query_tokens);
        let mut hits: Vec<Bm25Hit> = self
            .ids
            .iter()
            .zip(&scores)
            .filter(|(_, s)| **s > 0.0)
            .map(|(id, s)| Bm25Hit {
                id: id.clone(),
                score: *s,
            })
            .collect();
        // Stable sort: equal scores stay in insertion order.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        hits
    }

    /// Score a single indexed document; 0.0 for unknown ids or queries that
    /// tokenize to nothing.
    pub fn score(&self, query: &str, doc_id: &str) -> f32 {
        let Some(idx) = self.ids.iter().position(|id| id == doc_id) else {
            return 0.0;
        };
        let query_tokens = self.preprocessor.tokenize(query);
        if query_tokens.is_empty() {
            return 0.0;
        }
        self.scores_for(&query_tokens)[idx]
    }
}
