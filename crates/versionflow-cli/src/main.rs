//! Versionflow command-line driver
//!
//! Runs wizard scripts and single-stage edits against a file store.

use anyhow::{Context, bail};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use versionflow::{StageInput, StageKey, StageRegistry, VersionId};
use versionflow_publisher::{
    FileStore, Publisher, PublisherConfig, StaticWhitelist, TracingSink, WhitelistSource,
};

mod cli;

use cli::{Cli, Command, EditArgs, RunArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "versionflow=info,versionflow_publisher=info".to_string()
        }))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Stages => print_stages(),
        Command::Run(args) => {
            let config = PublisherConfig::from_env()?;
            run(&config, args).await
        }
        Command::Edit(args) => {
            let config = PublisherConfig::from_env()?;
            edit(&config, args).await
        }
    }
}

fn print_stages() -> anyhow::Result<()> {
    for def in StageRegistry::global().definitions() {
        println!(
            "{:>2}  {:<13} {:<10} {}",
            def.ordinal,
            def.key.as_str(),
            if def.is_skippable() { "skippable" } else { "required" },
            if def.has_from_details_variant() {
                "editable standalone"
            } else {
                "wizard only"
            }
        );
    }
    Ok(())
}

async fn build_publisher(config: &PublisherConfig) -> anyhow::Result<Publisher> {
    let whitelist: Arc<dyn WhitelistSource> = match &config.whitelist_path {
        Some(path) => Arc::new(
            StaticWhitelist::from_json_file(path)
                .await
                .with_context(|| format!("reading whitelist {}", path.display()))?,
        ),
        None => Arc::new(StaticWhitelist::builtin()),
    };
    info!(store = %config.store_dir.display(), "using file store");

    Ok(Publisher::new(
        Arc::new(FileStore::new(&config.store_dir)),
        whitelist,
        Arc::new(TracingSink),
    )
    .with_notify_group(config.notify_group.clone()))
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

async fn run(config: &PublisherConfig, args: RunArgs) -> anyhow::Result<()> {
    let inputs: Vec<StageInput> = read_json(&args.script).await?;
    let publisher = build_publisher(config).await?;
    let auth = config.auth_context();

    let mut session = publisher.begin_wizard(&args.project_type)?;
    for input in inputs {
        let stage = input.key();
        publisher
            .submit(&mut session, input, &auth)
            .await
            .with_context(|| format!("stage '{stage}' rejected"))?;
    }

    let published = publisher.finish(session).await?;
    println!("{}", serde_json::to_string_pretty(&published)?);
    Ok(())
}

async fn edit(config: &PublisherConfig, args: EditArgs) -> anyhow::Result<()> {
    let stage: StageKey = args.stage.parse()?;
    let input: StageInput = read_json(&args.input).await?;
    if input.key() != stage {
        bail!("input is for stage '{}', not '{}'", input.key(), stage);
    }

    let publisher = build_publisher(config).await?;
    let auth = config.auth_context();
    let id = VersionId::from(args.id);

    let mut session = publisher
        .begin_edit(&id, stage, &args.project_type)
        .await?;
    publisher.submit(&mut session, input, &auth).await?;
    let edited = publisher.finish_edit(session).await?;
    println!("{}", serde_json::to_string_pretty(&edited)?);
    Ok(())
}
