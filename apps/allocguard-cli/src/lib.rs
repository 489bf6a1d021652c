#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! Demo wiring for the command-line binaries.
//!
//! Seeds the in-memory store and calendar with a small filing corpus so the
//! full pipeline runs without external services. Production deployments swap
//! these for real store, calendar, cache, and audit clients.

use allocguard_core::config::AppConfig;
use allocguard_core::memory::{
    HashEmbedder, MemoryAuditLog, MemoryCache, MemoryEarningsCalendar, MemoryVectorStore,
};
use allocguard_core::types::{EarningsEntry, FilingChunk};
use allocguard_retrieval::HybridRetriever;
use allocguard_safety::{EarningsChecker, KeywordRiskScorer, SafetyChecker};
use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};

const EMBED_DIM: usize = 384;

/// Seeded filings: (ticker, section, filing type, days ago, content).
const DEMO_FILINGS: &[(&str, &str, &str, i64, &str)] = &[
    (
        "AAPL", "1A", "10-K", 120,
        "Demand for consumer hardware is seasonal and sensitive to macroeconomic conditions. \
         Component supply chain concentration in a small number of vendors could delay product launches.",
    ),
    (
        "AAPL", "7", "10-K", 120,
        "Net revenue increased driven by services growth. Gross margin expanded on a favorable product mix \
         and operating cash flow remained strong across all geographic segments.",
    ),
    (
        "AAPL", "7A", "10-Q", 40,
        "Foreign currency exposure is hedged with forward contracts. Interest rate changes on the \
         investment portfolio are not expected to be material to earnings.",
    ),
    (
        "TSLA", "1A", "10-K", 90,
        "We are subject to ongoing litigation and a regulatory investigation into our driver assistance \
         marketing claims. An adverse outcome could result in a significant penalty, a consent decree \
         for the alleged violation, and further lawsuits.",
    ),
    (
        "TSLA", "7", "10-K", 90,
        "Automotive revenue declined on lower deliveries and pricing actions. Restructuring charges, \
         a contract breach settlement, and litigation accruals reduced operating margin versus the prior year.",
    ),
    (
        "TSLA", "7A", "10-Q", 30,
        "Commodity price exposure for lithium and nickel remains unhedged. A sustained increase in raw \
         material costs would compress vehicle margins.",
    ),
    (
        "WCOM", "1A", "10-K", 60,
        "The audit identified a material weakness in internal controls over revenue recognition. \
         Management has concluded there is substantial doubt about the company's ability to continue \
         as a going concern within twelve months.",
    ),
    (
        "WCOM", "7", "10-Q", 25,
        "The company is in default on its senior secured notes and has engaged advisors to evaluate a \
         bankruptcy filing. Lenders have issued acceleration notices.",
    ),
];

/// Earnings announcements relative to today: (ticker, days ahead, time of day).
const DEMO_EARNINGS: &[(&str, i64, &str)] = &[
    ("AAPL", 2, "AMC"),
    ("TSLA", 9, "AMC"),
    ("WCOM", 15, "BMO"),
];

pub fn demo_store(today: NaiveDate) -> Result<MemoryVectorStore> {
    let embedder = HashEmbedder::new(EMBED_DIM);
    let mut store = MemoryVectorStore::new(today);
    for (i, (ticker, section, filing_type, days_ago, content)) in DEMO_FILINGS.iter().enumerate() {
        store.insert_embedded(
            FilingChunk {
                id: format!("{ticker}-{filing_type}-{section}-{i}"),
                content: (*content).to_string(),
                section_name: (*section).to_string(),
                filing_type: (*filing_type).to_string(),
                filing_date: today - Duration::days(*days_ago),
                ticker: (*ticker).to_string(),
                similarity: 0.0,
            },
            &embedder,
        )?;
    }
    Ok(store)
}

pub fn demo_calendar(today: NaiveDate) -> MemoryEarningsCalendar {
    let mut calendar = MemoryEarningsCalendar::new();
    for (ticker, days_ahead, time_of_day) in DEMO_EARNINGS {
        calendar.push(EarningsEntry {
            ticker: (*ticker).to_string(),
            earnings_date: today + Duration::days(*days_ahead),
            time_of_day: (*time_of_day).to_string(),
            fiscal_quarter: None,
            source: "demo".to_string(),
        });
    }
    calendar
}

pub fn demo_retriever(today: NaiveDate) -> Result<HybridRetriever<MemoryVectorStore>> {
    let config = AppConfig::load()?;
    Ok(HybridRetriever::new(
        demo_store(today)?,
        Box::new(HashEmbedder::new(EMBED_DIM)),
        config.retrieval,
    ))
}

pub fn demo_checker(today: NaiveDate) -> Result<SafetyChecker<MemoryVectorStore>> {
    let config = AppConfig::load()?;
    let retriever = HybridRetriever::new(
        demo_store(today)?,
        Box::new(HashEmbedder::new(EMBED_DIM)),
        config.retrieval,
    );
    let earnings = EarningsChecker::new(
        Box::new(demo_calendar(today)),
        config.safety.earnings_warning_days,
    );
    Ok(SafetyChecker::new(
        retriever,
        earnings,
        Box::new(KeywordRiskScorer::new()),
        Box::new(MemoryCache::new()),
        Box::new(MemoryAuditLog::new()),
        config.safety,
    )?)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
