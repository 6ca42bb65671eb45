use sciqa_embed::{get_default_embedder, DEFAULT_MAX_LEN};

fn main() -> anyhow::Result<()> {
    let embedder = get_default_embedder(None, DEFAULT_MAX_LEN)?;
    let texts = vec!["hello world".to_string(), "Preserve $E=mc^2$ exactly".to_string()];
    let embs = embedder.embed_batch(&texts)?;
    println!("B={} dim={}", embs.len(), embedder.dim());
    Ok(())
}
