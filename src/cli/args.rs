use crate::config::PipelineConfig;
use crate::utils::constants::DEFAULT_EXTENSION;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coadd-harvester")]
#[command(about = "Download SDSS spectra and combine their COADD flux/model columns")]
#[command(version)]
pub struct Cli {
    /// Defaults to `run` with built-in settings
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide the progress bar")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every URL in the input dump and write the combined CSV and FITS files
    Run(RunArgs),

    /// Print the HDU layout and column descriptors of a FITS file
    Inspect {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = DEFAULT_EXTENSION)]
        extension: String,
    },
}

/// Overrides layered on top of defaults, config file and environment
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    #[arg(long, help = "Config file (TOML, YAML or JSON)")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "CSV dump with a url column [default: skyserver-dump.csv]")]
    pub input: Option<PathBuf>,

    #[arg(long, help = "CSV output path [default: final_output.csv]")]
    pub csv_output: Option<PathBuf>,

    #[arg(long, help = "FITS output path [default: final_output.fits]")]
    pub fits_output: Option<PathBuf>,

    #[arg(long, help = "Concurrent downloads [default: 8]")]
    pub max_workers: Option<usize>,

    #[arg(long, help = "FITS extension to read [default: COADD]")]
    pub extension: Option<String>,

    #[arg(long, value_delimiter = ',', help = "Columns to keep [default: flux,model]")]
    pub columns: Option<Vec<String>>,

    #[arg(long, help = "Input column holding the URLs [default: url]")]
    pub url_column: Option<String>,

    #[arg(long, help = "Per-request timeout in seconds [default: 60]")]
    pub timeout_secs: Option<u64>,

    #[arg(long, help = "Write column names as the first CSV line")]
    pub csv_header: bool,

    #[arg(long, help = "Stack tables in download completion order")]
    pub completion_order: bool,
}

impl RunArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(path) = &self.csv_output {
            config.csv_output = path.clone();
        }
        if let Some(path) = &self.fits_output {
            config.fits_output = path.clone();
        }
        if let Some(max_workers) = self.max_workers {
            config.max_workers = max_workers;
        }
        if let Some(extension) = &self.extension {
            config.extension = extension.clone();
        }
        if let Some(columns) = &self.columns {
            config.columns = columns.clone();
        }
        if let Some(url_column) = &self.url_column {
            config.url_column = url_column.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if self.csv_header {
            config.csv_header = true;
        }
        if self.completion_order {
            config.completion_order = true;
        }
    }
}
