use anyhow::Result;
use rsvp::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
