//! Seeds a fresh store, inserts a couple of records, then pages through
//! everything — a quick smoke test for running by hand.
//!
//! ```text
//! cargo run --example seed_and_query
//! ```

use logdex::{Config, Engine};
use serde_json::json;
use std::env;

fn main() -> logdex::Result<()> {
    tracing_subscriber::fmt::init();

    let dir = env::temp_dir().join("logdex-demo");
    let config = Config::new(&dir).with_seed_count(5);
    let mut engine = Engine::open(config)?;

    println!("opened store at {} with {} records", dir.display(), engine.len());

    let mut fields = serde_json::Map::new();
    fields.insert("name".to_string(), json!("ada lovelace"));
    fields.insert("email".to_string(), json!("ada@example.com"));
    let inserted = engine.insert(fields)?;
    println!(
        "inserted {} in {:.3}ms",
        inserted.value.id().unwrap_or("?"),
        inserted.elapsed_ms
    );

    let page = engine.page(1)?;
    println!("page {} has {} records:", page.value.page, page.value.records.len());
    for record in &page.value.records {
        println!("  {}", record.body);
    }

    Ok(())
}
