/// File names
pub const DEFAULT_INPUT_FILE: &str = "skyserver-dump.csv";
pub const DEFAULT_CSV_OUTPUT: &str = "final_output.csv";
pub const DEFAULT_FITS_OUTPUT: &str = "final_output.fits";

/// Input CSV column holding the download URLs
pub const DEFAULT_URL_COLUMN: &str = "url";

/// FITS extension and columns to extract
pub const DEFAULT_EXTENSION: &str = "COADD";
pub const DEFAULT_COLUMNS: [&str; 2] = ["flux", "model"];

/// Processing defaults
pub const DEFAULT_MAX_WORKERS: usize = 8;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "COADD";

/// Name reported for HDU 0 when it has no EXTNAME
pub const PRIMARY_HDU_NAME: &str = "PRIMARY";
