use std::path::PathBuf;

use clap::Parser;

use crate::policy::PolicyKind;

#[derive(Parser, Debug, Clone)]
#[command(name = "sim")]
#[command(about = "Headless batched surface-vessel simulation", long_about = None)]
pub struct Args {
    /// TOML config; builtin Heron setup when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of physics steps to run
    #[arg(long, default_value_t = 2000)]
    pub steps: u64,
    /// Override the run seed from the config
    #[arg(long)]
    pub seed: Option<u64>,
    /// Write a binary episode log of the recorded env here
    #[arg(long)]
    pub record: Option<PathBuf>,
    /// Controller producing the thruster commands
    #[arg(long, value_enum, default_value_t = PolicyKind::Seek)]
    pub policy: PolicyKind,
}
