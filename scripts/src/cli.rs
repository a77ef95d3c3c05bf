//! Definitions of CLI arguments and commands for deploy scripts

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{list, plan, run},
    constants::{DEFAULT_DEPLOYMENTS_PATH, DEFAULT_MANIFEST_PATH},
    errors::ScriptError,
};

/// Deploy the units declared in a manifest, in dependency order
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the deployment manifest
    #[arg(short, long, env = "DEPLOY_MANIFEST", default_value = DEFAULT_MANIFEST_PATH)]
    pub manifest: PathBuf,

    /// Path to the file in which deployed addresses are recorded
    #[arg(
        short,
        long = "deployments",
        env = "DEPLOYMENTS_PATH",
        default_value = DEFAULT_DEPLOYMENTS_PATH
    )]
    pub deployments_path: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The deploy script commands
#[derive(Subcommand)]
pub enum Command {
    /// Print the execution order without deploying anything
    Plan(PlanArgs),
    /// Deploy & configure units
    Run(RunArgs),
    /// Print the recorded deployments
    List,
}

impl Command {
    /// Run the command against the given manifest & deployments file
    pub async fn run(
        self,
        manifest_path: &Path,
        deployments_path: &Path,
    ) -> Result<(), ScriptError> {
        match self {
            Command::Plan(args) => plan(args, manifest_path, deployments_path),
            Command::Run(args) => run(args, manifest_path, deployments_path).await,
            Command::List => list(deployments_path),
        }
    }
}

/// Print the execution order of the selected units
#[derive(Args)]
pub struct PlanArgs {
    /// Only the units carrying one of these tags, plus their dependencies
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

/// Deploy & configure the selected units
#[derive(Args)]
pub struct RunArgs {
    /// Only the units carrying one of these tags, plus their dependencies
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Deploy every unit again, even if it is recorded in the deployments file
    #[arg(long)]
    pub redeploy: bool,
}
