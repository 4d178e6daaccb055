#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = redator_rust::run().await {
        eprintln!("redator-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
