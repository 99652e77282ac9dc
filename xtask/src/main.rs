//! See <https://github.com/matklad/cargo-xtask/>
//!
//! This binary defines various auxiliary commands, which are not
//! expressible with just `cargo`.
//!
//! Run it with `cargo run -p xtask -- <command>`.

use clap::Parser;

mod dynamodb;
mod prelude;

/// Development tasks for the ddbkit repository
#[derive(Debug, Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for ddbkit", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: Global,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Silence the command output
    #[clap(long, global = true)]
    pub silent: bool,

    /// Enable verbose output
    #[clap(long, global = true)]
    pub verbose: bool,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Manage DynamoDB tables
    Dynamodb(dynamodb::DynamodbCommand),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.global.is_verbose() {
        "ddbkit=debug,xtask=debug"
    } else {
        "ddbkit=warn"
    };
    ddbkit::telemetry::init_tracing_with_default(default_filter)?;

    match cli.command {
        Commands::Dynamodb(dynamodb_cmd) => {
            dynamodb::run(dynamodb_cmd, cli.global).await?;
        }
    }

    Ok(())
}
