use clap::Parser;
use coadd_harvester::cli::{run, Cli};
use coadd_harvester::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
