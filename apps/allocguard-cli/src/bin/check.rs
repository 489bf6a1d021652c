use allocguard_cli::{demo_checker, today};
use chrono::NaiveDate;
use std::env;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <ticker> <allocation_pct> [--date YYYY-MM-DD] [--no-cache] [--json]", args[0]);
        eprintln!("Example: {} TSLA 20 --date 2024-06-01", args[0]);
        std::process::exit(1);
    }
    let ticker = args[1].to_uppercase();
    let allocation_pct: f32 = match args[2].parse() {
        Ok(pct) => pct,
        Err(_) => {
            eprintln!("Error: allocation_pct must be a number, got '{}'", args[2]);
            std::process::exit(1);
        }
    };
    if !(0.0..=100.0).contains(&allocation_pct) {
        eprintln!("Error: allocation_pct must be between 0 and 100, got {allocation_pct}");
        std::process::exit(1);
    }
    let mut reference_date = today();
    let mut use_cache = true;
    let mut as_json = false;
    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--date" => {
                let Some(raw) = args.get(i + 1) else {
                    eprintln!("Error: --date requires a YYYY-MM-DD value");
                    std::process::exit(1);
                };
                match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                    Ok(date) => {
                        reference_date = date;
                        i += 1;
                    }
                    Err(_) => {
                        eprintln!("Error: invalid date '{raw}', expected YYYY-MM-DD");
                        std::process::exit(1);
                    }
                }
            }
            "--no-cache" => use_cache = false,
            "--json" => as_json = true,
            other => {
                eprintln!("Error: unknown flag '{other}'");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let checker = demo_checker(reference_date)?;
    let result = checker.check_safety(&ticker, allocation_pct, Some(reference_date), use_cache)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("🛡️ allocguard-check\n===================");
    println!("Ticker: {}  Allocation: {:.1}%  As of: {}", ticker, allocation_pct, reference_date);
    let badge = match result.decision {
        allocguard_core::types::SafetyDecision::Proceed => "✅",
        allocguard_core::types::SafetyDecision::Reduce => "⚠️",
        allocguard_core::types::SafetyDecision::Veto => "⛔",
    };
    println!("\n{} Decision: {}  (risk score {:.1}{})",
        badge, result.decision, result.risk_score,
        if result.cache_hit { ", cached" } else { "" });
    println!("   Reasoning: {}", result.reasoning);
    if let Some(warning) = &result.earnings_warning {
        println!("   📅 {}", warning);
    }
    if let Some(warning) = &result.allocation_warning {
        println!("   📈 {}", warning);
    }
    if let Some(events) = &result.critical_events {
        println!("\n⛔ Critical events:");
        for event in events {
            println!("   - {}", event);
        }
    }
    if let Some(chunks) = &result.retrieved_chunks {
        if !chunks.is_empty() {
            println!("\n📄 Evidence ({} chunks):", chunks.len());
            for (i, chunk) in chunks.iter().enumerate() {
                println!("\n  {}. score={:.4}  {} item {}", i + 1, chunk.score, chunk.filing_type, chunk.section_name);
                println!("     📝 {}", chunk.content);
            }
        }
    }
    Ok(())
}
