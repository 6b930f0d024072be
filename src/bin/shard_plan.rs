use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use shardplan::{
    PlacementKind, ShardDistributionPolicy, ShardLayoutConfig, candidate_layouts,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shard-plan")]
#[command(about = "Inspect explicit shard distributions for a cluster shape")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print which shards every node hosts
    Show {
        #[command(flatten)]
        layout: LayoutArgs,
        #[arg(long)]
        json: bool,
    },
    /// Report whether a layout is placeable
    Check {
        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// List every placeable node count for a shard count and replication factor
    Candidates {
        #[arg(long)]
        shards: i32,
        #[arg(long)]
        replicas: i32,
        #[arg(long, default_value_t = 1024)]
        max_nodes: i32,
    },
}

#[derive(Args)]
struct LayoutArgs {
    /// JSON layout file or a shardplan:// URL
    #[arg(long, conflicts_with_all = ["shards", "replicas", "nodes"])]
    config: Option<String>,
    #[arg(long)]
    shards: Option<i32>,
    #[arg(long)]
    replicas: Option<i32>,
    #[arg(long)]
    nodes: Option<i32>,
    #[arg(long)]
    placement: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Show { layout, json } => show(&layout.resolve()?, json),
        Command::Check { layout } => check(&layout.resolve()?),
        Command::Candidates {
            shards,
            replicas,
            max_nodes,
        } => {
            candidates(shards, replicas, max_nodes);
            Ok(())
        }
    }
}

impl LayoutArgs {
    fn resolve(&self) -> Result<ShardLayoutConfig> {
        let mut config = match &self.config {
            Some(source) if source.starts_with("shardplan://") => {
                ShardLayoutConfig::from_url(source)?
            }
            Some(path) => ShardLayoutConfig::from_file(PathBuf::from(path))
                .with_context(|| format!("Failed to load layout config '{}'", path))?,
            None => {
                let (Some(shards), Some(replicas), Some(nodes)) =
                    (self.shards, self.replicas, self.nodes)
                else {
                    return Err(anyhow!(
                        "Provide --config <file|url> or all of --shards, --replicas and --nodes"
                    ));
                };
                ShardLayoutConfig::new(shards, replicas, nodes)
            }
        };

        if let Some(placement) = &self.placement {
            let kind = PlacementKind::parse(placement)
                .ok_or_else(|| anyhow!("Unknown placement '{}'", placement))?;
            config = config.placement(kind);
        }
        Ok(config)
    }
}

fn build(config: &ShardLayoutConfig) -> Result<ShardDistributionPolicy> {
    ShardDistributionPolicy::with_strategy(config.layout(), config.placement.strategy())
        .with_context(|| format!("Placement failed for '{}'", config.to_url()))
}

fn show(config: &ShardLayoutConfig, json: bool) -> Result<()> {
    let policy = build(config)?;

    if json {
        let rendered = serde_json::to_string_pretty(&policy.snapshot())
            .context("Failed to render assignment as JSON")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Layout: {}", policy.layout());
    println!("Placement: {}", policy.strategy_name());
    let Some(assignment) = policy.assignment() else {
        if let Some(issue) = policy.issue() {
            println!("Invalid: {}", issue);
        }
        return Ok(());
    };

    println!(
        "Shards per node: {}",
        policy.shards_per_node().unwrap_or_default()
    );
    for (node, shards) in assignment.nodes() {
        println!("- node {}: {:?}", node, shards);
    }
    Ok(())
}

fn check(config: &ShardLayoutConfig) -> Result<()> {
    let policy = build(config)?;
    println!("Layout: {}", policy.layout());

    if policy.is_valid() {
        println!("Valid: OK");
        return Ok(());
    }

    match policy.issue() {
        Some(issue) => {
            let kind = if issue.is_degenerate() {
                "degenerate parameters"
            } else {
                "unplaceable shape"
            };
            Err(anyhow!("Invalid ({}): {}", kind, issue))
        }
        None => Err(anyhow!("Invalid: placement was rejected")),
    }
}

fn candidates(shards: i32, replicas: i32, max_nodes: i32) {
    let layouts = candidate_layouts(shards, replicas, max_nodes);
    if layouts.is_empty() {
        println!(
            "No placeable node count up to {} for {} shards x {} replicas",
            max_nodes, shards, replicas
        );
        return;
    }

    println!("Placeable node counts (up to {}):", max_nodes);
    for layout in layouts {
        println!(
            "- {} nodes: {} shards per node",
            layout.node_count,
            layout.shards_per_node().unwrap_or_default()
        );
    }
}
