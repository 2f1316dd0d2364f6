use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tf-latest-version",
    about = "Update provider and Helm chart versions in Terraform files to their latest releases",
    version,
    author
)]
pub struct Cli {
    /// Directory (or single .tf file) to scan, defaults to the current directory
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Configuration file (defaults to .tf-latest-version.toml in the scanned directory)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the latest versions and rewrite them in place
    Update(SelectionArgs),

    /// Resolve the latest versions and report them without touching any file
    Check(SelectionArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Only update these provider sources (e.g. "hashicorp/azurerm"), others are reported as ignored
    #[arg(long = "provider", value_name = "SOURCE", value_delimiter = ',')]
    pub providers: Vec<String>,

    /// Only update these Helm charts (e.g. "ingress-nginx"), others are reported as ignored
    #[arg(long = "chart", value_name = "NAME", value_delimiter = ',')]
    pub charts: Vec<String>,

    /// Base URL of the Terraform provider registry
    #[arg(long, value_name = "URL")]
    pub registry_url: Option<String>,

    /// Timeout in seconds for each registry or chart index request
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}
