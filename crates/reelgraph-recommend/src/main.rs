//! CLI entry point for the reelgraph movie service.
//!
//! Designed for subprocess invocation from an agent runtime: `call <tool>`
//! reads the tool's JSON arguments from stdin and writes the JSON result to
//! stdout. Logs go to stderr.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use reelgraph_core::{schema, Settings};
use reelgraph_recommend::tools::{self, ToolCall};
use reelgraph_recommend::MovieService;

#[derive(Parser)]
#[command(name = "reelgraph")]
#[command(about = "Movie search and recommendations over a Neo4j knowledge graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: reelgraph).
    #[arg(short, long, default_value = "reelgraph", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Run one tool (reads JSON arguments from stdin).
    Call {
        /// Tool name, e.g. `recommend_by_genre`.
        tool: String,
    },
    /// List the available tools.
    Tools,
    /// Print the graph schema description.
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(tools::TOOLS)?);
        }
        Command::Schema => {
            print!("{}", schema::describe());
        }
        Command::Call { ref tool } => {
            let input = std::io::read_to_string(std::io::stdin())?;
            let args = if input.trim().is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_str(&input)?
            };
            let call = ToolCall::parse(tool, args)?;

            // Connect to Neo4j.
            let settings = Settings::load(&cli.config)?;
            let service = MovieService::connect(&settings).await?;
            tracing::info!(tool = %tool, "Dispatching tool call");

            let result = tools::dispatch(&service, call).await;
            service.close().await;
            println!("{}", serde_json::to_string(&result?)?);
        }
    }

    Ok(())
}
