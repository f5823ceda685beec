use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use routeviz_cli::commands::nearest::handle_nearest_command;
use routeviz_cli::commands::route::handle_route_command;
use routeviz_cli::output::{print_footer, print_logo};
use routeviz_cli::{NearestArgs, OutputFormat, RouteArgs};
use routeviz_lib::load_dataset;

#[derive(Parser, Debug)]
#[command(author, version, about = "Animated shortest-path search over road graphs")]
struct Cli {
    /// Graph document (JSON nodes, ways and optional places).
    #[arg(long, global = true)]
    graph: Option<PathBuf>,

    /// Output format for command results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Suppress the banner and timing footer.
    #[arg(long, global = true)]
    no_logo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search between two points and play the animation back headlessly.
    Route(RouteArgs),
    /// Snap a point to the closest road nodes.
    Nearest(NearestArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let started = Instant::now();
    let decorate = !cli.no_logo && cli.format == OutputFormat::Text;
    if decorate {
        print_logo();
    }

    let path = cli
        .graph
        .context("--graph is required: pass the path of a graph document")?;
    let dataset = load_dataset(&path)
        .with_context(|| format!("failed to load graph document from {}", path.display()))?;

    match &cli.command {
        Command::Route(args) => handle_route_command(dataset, args, cli.format).await?,
        Command::Nearest(args) => handle_nearest_command(&dataset, args, cli.format)?,
    }

    if decorate {
        print_footer(started.elapsed());
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
