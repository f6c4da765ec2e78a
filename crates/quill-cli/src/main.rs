use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    quill_cli::run().await
}
