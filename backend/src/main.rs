use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  bounty_lib::run(bounty_lib::cli::Cli::parse()).await
}
