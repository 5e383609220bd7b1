mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod server;
mod services;
mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::config::{AppConfig, BucketStrategy};
use crate::context::AppContext;
use crate::domain::composer::TaskComposer;
use crate::error::{AppError, AppResult};
use crate::infra::asana::AsanaClient;
use crate::infra::buckets::{CachedSectionResolver, StaticBucketResolver};
use crate::services::BucketResolver;

#[derive(Parser)]
#[command(
    name = "intake",
    author,
    version,
    about = "Relay form submissions into a task tracker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for webhook submissions and file them as tasks.
    Serve(ServeArgs),
    /// Print the task a submission would produce, without creating it.
    Compose(ComposeArgs),
    /// Manage configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[derive(Args)]
struct ComposeArgs {
    /// JSON submission file; reads stdin when omitted.
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("intake=info,tower_http=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Compose(args) => {
            let config = AppConfig::load()?;
            if config.project_id.is_none() {
                tracing::warn!("project id not configured; composed task has an empty project");
            }
            let project_id = config.project_id.clone().unwrap_or_default();
            let composer = build_composer(&config, project_id);
            println!("{}", cmd::compose::run(&composer, args.file)?);
            Ok(())
        }
        Commands::Serve(args) => {
            let ctx = build_context(AppConfig::load()?)?;
            cmd::serve::run(ctx, args.bind).await
        }
    }
}

fn build_composer(config: &AppConfig, project_id: String) -> TaskComposer {
    TaskComposer::new(
        config.categories.clone(),
        config.priorities.clone(),
        project_id,
    )
}

fn build_context(config: AppConfig) -> AppResult<AppContext> {
    let project_id = config
        .project_id
        .clone()
        .ok_or_else(|| AppError::Configuration("no destination project configured".to_string()))?;
    if config.tracker_token.is_none() {
        return Err(AppError::Configuration(
            "tracker token not configured".to_string(),
        ));
    }

    for (category, bucket) in config.non_id_static_buckets() {
        tracing::warn!(
            category,
            bucket,
            "static bucket strategy expects section ids; tasks may land in the default section"
        );
    }

    let tracker = Arc::new(AsanaClient::new(
        config.tracker_base_url.clone(),
        config.tracker_token.clone(),
        config.priority_field_id.clone(),
    ));
    let bucket_resolver: Arc<dyn BucketResolver> = match config.bucket_strategy {
        BucketStrategy::Static => Arc::new(StaticBucketResolver),
        BucketStrategy::Lookup => Arc::new(CachedSectionResolver::new(tracker.clone())),
    };
    tracing::info!(
        project_id = %project_id,
        bucket_strategy = config.bucket_strategy.as_str(),
        "tracker client ready"
    );

    let composer = build_composer(&config, project_id);
    Ok(AppContext::new(config, composer, tracker, bucket_resolver))
}
