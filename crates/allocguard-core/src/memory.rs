//! In-memory reference adapters for the collaborator traits.
//!
//! These back the CLI demos and integration tests so the full pipeline runs
//! without network services. Production deployments wire real store, calendar,
//! and cache clients behind the same traits.

use crate::traits::{AuditSink, CacheStore, EarningsCalendar, Embedder, VectorStore};
use crate::types::{EarningsEntry, FilingChunk, SafetyLogRecord};
use anyhow::anyhow;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration as StdDuration, Instant};
use twox_hash::XxHash64;

/// Deterministic token-hash embedder. Identical input yields an identical
/// vector; empty input yields the zero vector.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 1e-6 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }
}

/// Cosine-ranked vector store over seeded chunks.
pub struct MemoryVectorStore {
    today: NaiveDate,
    entries: Vec<(FilingChunk, Vec<f32>)>,
}

impl MemoryVectorStore {
    /// `today` anchors the `days_back` date window.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, chunk: FilingChunk, embedding: Vec<f32>) {
        self.entries.push((chunk, embedding));
    }

    /// Insert a chunk, embedding its content with the given embedder.
    pub fn insert_embedded(
        &mut self,
        chunk: FilingChunk,
        embedder: &dyn Embedder,
    ) -> anyhow::Result<()> {
        let embedding = embedder.embed_query(&chunk.content)?;
        self.entries.push((chunk, embedding));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na <= 1e-6 || nb <= 1e-6 {
        0.0
    } else {
        dot / (na * nb)
    }
}

impl VectorStore for MemoryVectorStore {
    fn vector_search(
        &self,
        query_embedding: &[f32],
        ticker: &str,
        match_count: usize,
        days_back: u32,
        filing_types: Option<&[String]>,
        section_names: Option<&[String]>,
    ) -> anyhow::Result<Vec<FilingChunk>> {
        let cutoff = self.today - Duration::days(i64::from(days_back));
        let mut hits: Vec<FilingChunk> = self
            .entries
            .iter()
            .filter(|(c, _)| c.ticker == ticker && c.filing_date >= cutoff)
            .filter(|(c, _)| {
                filing_types.map_or(true, |ts| ts.iter().any(|t| *t == c.filing_type))
            })
            .filter(|(c, _)| {
                section_names.map_or(true, |ss| ss.iter().any(|s| *s == c.section_name))
            })
            .map(|(c, e)| {
                let mut hit = c.clone();
                hit.similarity = cosine(query_embedding, e);
                hit
            })
            .collect();
        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(match_count);
        Ok(hits)
    }
}

/// TTL-aware key-value cache.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("cache mutex poisoned"))?;
        match entries.get(key) {
            Some((value, expires_at)) if Instant::now() < *expires_at => {
                Ok(Some(value.clone()))
            }
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl_hours: u32) -> anyhow::Result<()> {
        let expires_at = Instant::now() + StdDuration::from_secs(u64::from(ttl_hours) * 3600);
        self.entries
            .lock()
            .map_err(|_| anyhow!("cache mutex poisoned"))?
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }
}

/// Static earnings calendar.
#[derive(Default)]
pub struct MemoryEarningsCalendar {
    entries: Vec<EarningsEntry>,
}

impl MemoryEarningsCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: EarningsEntry) {
        self.entries.push(entry);
    }
}

impl EarningsCalendar for MemoryEarningsCalendar {
    fn next_earnings(
        &self,
        ticker: &str,
        after: NaiveDate,
    ) -> anyhow::Result<Option<EarningsEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.ticker == ticker && e.earnings_date >= after)
            .min_by_key(|e| e.earnings_date)
            .cloned())
    }
}

/// Collecting audit sink.
#[derive(Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<SafetyLogRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SafetyLogRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, record: &SafetyLogRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .map_err(|_| anyhow!("audit mutex poisoned"))?
            .push(record.clone());
        Ok(())
    }
}
