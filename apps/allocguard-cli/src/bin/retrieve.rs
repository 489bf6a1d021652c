use allocguard_cli::{demo_retriever, today};
use allocguard_retrieval::RetrieveOptions;
use std::env;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <query> <ticker> [--limit N] [--section ITEM] [--filing-type TYPE]", args[0]);
        eprintln!("Example: {} 'litigation and regulatory risks' TSLA --limit 5 --section 1A", args[0]);
        std::process::exit(1);
    }
    let query = &args[1];
    let ticker = args[2].to_uppercase();
    let mut opts = RetrieveOptions::default();
    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" => {
                match args.get(i + 1).and_then(|raw| raw.parse::<usize>().ok()) {
                    Some(limit) => {
                        opts.max_results = Some(limit);
                        i += 1;
                    }
                    None => {
                        eprintln!("Error: --limit requires a number");
                        std::process::exit(1);
                    }
                }
            }
            "--section" => {
                let Some(section) = args.get(i + 1) else {
                    eprintln!("Error: --section requires an item name, e.g. 1A");
                    std::process::exit(1);
                };
                opts.section_names = Some(vec![section.to_string()]);
                i += 1;
            }
            "--filing-type" => {
                let Some(filing_type) = args.get(i + 1) else {
                    eprintln!("Error: --filing-type requires a value, e.g. 10-K");
                    std::process::exit(1);
                };
                opts.filing_types = Some(vec![filing_type.to_string()]);
                i += 1;
            }
            other => {
                eprintln!("Error: unknown flag '{other}'");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let retriever = demo_retriever(today())?;
    let results = retriever.retrieve(query, &ticker, &opts)?;

    println!("🔍 allocguard-retrieve\n======================");
    println!("Query: {}  Ticker: {}", query, ticker);
    println!("\n🔍 Found {} results for: \"{}\"", results.len(), query);
    for (i, result) in results.iter().enumerate() {
        println!(
            "\n  {}. combined={:.4}  semantic={:.4}  keyword={:.4}  {} item {}  filed {}",
            i + 1,
            result.combined_score,
            result.semantic_score,
            result.keyword_score,
            result.filing_type,
            result.section_name,
            result.filing_date
        );
        println!("     📝 {}", result.content);
    }
    Ok(())
}
