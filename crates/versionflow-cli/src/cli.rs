//! Command-line arguments for the versionflow binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "versionflow",
    version,
    about = "Drive the version publishing pipeline from JSON files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full creation wizard and publish the result.
    Run(RunArgs),

    /// Edit one stage of a published version.
    Edit(EditArgs),

    /// List the registered stages in wizard order.
    Stages,
}

#[derive(Parser)]
pub struct RunArgs {
    /// JSON array of stage inputs, one per wizard stage.
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Project type whose loader whitelist applies.
    #[arg(long = "project-type", default_value = "mod")]
    pub project_type: String,
}

#[derive(Parser)]
pub struct EditArgs {
    /// Identifier of the published version.
    pub id: String,

    /// Stage to edit (loaders, targets or environment).
    pub stage: String,

    /// JSON file holding a single stage input.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Project type whose loader whitelist applies.
    #[arg(long = "project-type", default_value = "mod")]
    pub project_type: String,
}
