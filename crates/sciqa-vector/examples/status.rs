use std::path::PathBuf;

use sciqa_core::traits::VectorStore;
use sciqa_vector::LanceStore;

fn main() -> anyhow::Result<()> {
    let db_path = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("vectorstore"));
    let store = LanceStore::open(&db_path, "scientific", 384)?;
    println!("{}: exists={} chunks={}", store.table_name(), store.exists()?, store.count()?);
    Ok(())
}
