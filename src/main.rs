use clap::Parser;
use factflow::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    cli::run(args).await
}
