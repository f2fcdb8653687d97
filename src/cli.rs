use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sqlc-gen-queries")]
#[command(version, about = "SQLC Queries Generator")]
pub struct Cli {
    /// Path to the sqlc configuration file
    #[arg(long, env = "SQLC_CONFIG_FILE", default_value = "sqlc.yaml")]
    pub config_file: PathBuf,

    /// Path to the catalog file
    #[arg(long, env = "SQLC_CATALOG_FILE", default_value = "schema.json")]
    pub catalog_file: PathBuf,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
