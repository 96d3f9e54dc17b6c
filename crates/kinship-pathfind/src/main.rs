//! CLI entry point for the kinship graph tool.
//!
//! Commands write a JSON result to stdout; logs go to stderr.

use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use kinship_core::config::Settings;
use kinship_core::{Batch, ExecutionContext};
use kinship_graph::{GraphClient, GraphConfig, GraphStore, MemoryStore};
use kinship_pathfind::types::{PathReport, SearchStatus};
use kinship_pathfind::{demo, PathFinder, PathfindEngine};

#[derive(Parser)]
#[command(name = "kinship")]
#[command(about = "Idempotent people-graph upserts and path queries")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: kinship).
    #[arg(short, long, default_value = "kinship", global = true)]
    config: String,

    /// Run against a fresh in-process store instead of Neo4j. Nothing outlives
    /// the process, so queries only see data committed by the same command
    /// (see `demo`).
    #[arg(long, global = true)]
    in_memory: bool,

    /// Budget for the whole invocation; overrides `pathfind.timeout_ms`.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Commit a batch of entities and relations (reads JSON from stdin).
    Commit,
    /// Commit the ten-person demo dataset.
    SeedDemo,
    /// Seed the demo dataset, then list friends and query both paths.
    Demo {
        #[arg(long, default_value = "Alice")]
        from: String,
        #[arg(long, default_value = "Diana")]
        to: String,
    },
    /// List direct friends of a person.
    Friends {
        #[arg(long)]
        name: String,
    },
    /// Shortest path between two people.
    Shortest {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Longest simple path between two people.
    Longest {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;

    let timeout = cli
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| settings.pathfind.timeout());
    let ctx = ExecutionContext::with_timeout(timeout);
    let finder = PathFinder::from(&settings.pathfind);

    if cli.in_memory {
        let engine = PathfindEngine::new(MemoryStore::new()).with_finder(finder);
        return run(&engine, cli.command, &ctx).await;
    }

    let graph_config = GraphConfig::from(settings.neo4j.clone());
    let client = ctx.run(GraphClient::connect(&graph_config)).await?;
    ctx.run(client.ensure_schema()).await?;

    let engine = PathfindEngine::new(client).with_finder(finder);
    run(&engine, cli.command, &ctx).await
}

async fn run<S: GraphStore>(
    engine: &PathfindEngine<S>,
    command: Command,
    ctx: &ExecutionContext,
) -> anyhow::Result<()> {
    match command {
        Command::Commit => {
            let input = std::io::read_to_string(std::io::stdin())?;
            let batch: Batch = serde_json::from_str(&input)?;
            let report = engine.commit(&batch, ctx).await?;
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::SeedDemo => {
            let report = engine.commit(&demo::people(), ctx).await?;
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::Demo { ref from, ref to } => {
            let report = demo::run(engine, from, to, ctx).await?;
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::Friends { ref name } => {
            let friends = engine.friends_of(name, ctx).await?;
            println!("{}", serde_json::to_string(&friends)?);
        }
        Command::Shortest { ref from, ref to } => {
            let start = Instant::now();
            let path = engine.shortest_path(from, to, ctx).await?;
            let report = PathReport::new(
                from,
                to,
                path,
                SearchStatus::Complete,
                start.elapsed().as_millis() as u64,
            );
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::Longest { ref from, ref to } => {
            let start = Instant::now();
            let longest = engine.longest_path(from, to, ctx).await?;
            let report = PathReport::new(
                from,
                to,
                longest.path,
                longest.status,
                start.elapsed().as_millis() as u64,
            );
            println!("{}", serde_json::to_string(&report)?);
        }
    }

    Ok(())
}
