use crate::cli::args::{Cli, Commands, RunArgs};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::processors::Pipeline;
use crate::writers::FitsInspector;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run_pipeline(&args, cli.quiet).await,
        Commands::Inspect { file, extension } => inspect(&file, &extension),
    }
}

/// `RUST_LOG` wins; otherwise info, or debug for this crate with --verbose
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "info,coadd_harvester=debug"
    } else {
        "info"
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // a second init (tests) keeps the first subscriber
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_pipeline(args: &RunArgs, quiet: bool) -> Result<()> {
    let mut config = PipelineConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    println!("Harvesting spectra...");
    println!("Input file: {}", config.input.display());
    println!(
        "Outputs: {}, {}",
        config.csv_output.display(),
        config.fits_output.display()
    );
    println!(
        "Workers: {}, Extension: {}, Columns: {}",
        config.max_workers,
        config.extension,
        config.columns.join(", ")
    );

    let pipeline = Pipeline::new(config)?;
    let outcome = pipeline.run(quiet).await?;

    println!("\n{}", outcome.summary());
    println!("The fits file has been created");

    match &outcome.verification {
        Ok(summary) => println!("\n{}", summary),
        Err(e) => error!(
            "Could not inspect {}: {}",
            outcome.fits_output.display(),
            e
        ),
    }

    info!("Processing complete!");
    Ok(())
}

fn inspect(file: &Path, extension: &str) -> Result<()> {
    let summary = FitsInspector::new().inspect(file, extension)?;
    println!("{}", summary);
    Ok(())
}
