#[tokio::main]
async fn main() -> anyhow::Result<()> {
    authgate::cli::app::run().await
}
