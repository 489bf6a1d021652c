//! Decision cache keying and TTL policy.

use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

/// Allocations are coalesced into 5-point buckets before hashing, so two
/// requests differing by at most 2.5 points share one cache entry.
const ALLOCATION_BUCKET_PCT: f32 = 5.0;

/// Stable cache key for a (ticker, allocation) pair.
pub fn key(ticker: &str, allocation_pct: f32) -> String {
    let bucket = (allocation_pct / ALLOCATION_BUCKET_PCT).round() * ALLOCATION_BUCKET_PCT;
    let mut hasher = XxHash64::with_seed(0);
    format!("{ticker}:{bucket:.1}").hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Riskier conclusions are trusted for less wall-clock time, since the
/// underlying disclosures may be updated sooner.
pub fn ttl_hours(risk_score: f32) -> u32 {
    if risk_score >= 8.0 {
        1
    } else if risk_score >= 6.0 {
        4
    } else {
        24
    }
}
