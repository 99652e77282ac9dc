//! DynamoDB table management commands.

mod config;
mod error;
mod seed;

pub use error::{DynamodbError, Result};

use std::sync::Arc;

use crate::prelude::*;
use config::{KeySpec, TableConfig};
use ddbkit::{DynamoDbStore, Item, StoreConfig, StoreError, Table};
use dialoguer::Confirm;
use tokio_stream::StreamExt;

/// DynamoDB table management commands.
#[derive(Debug, clap::Parser)]
pub struct DynamodbCommand {
    #[command(subcommand)]
    pub action: DynamodbAction,
}

/// Available DynamoDB actions.
#[derive(Debug, clap::Subcommand)]
pub enum DynamodbAction {
    /// Create or destroy a table.
    Deploy(DeployCommand),

    /// Delete a table (if present) and create it again empty.
    Recreate(RecreateCommand),

    /// Print every item of a table.
    Scan(ScanCommand),

    /// Insert generated sample items.
    Seed(SeedCommand),
}

/// Table name and key schema shared by every action.
#[derive(Debug, clap::Args)]
pub struct TableArgs {
    /// Table name to use.
    #[arg(long, env = "DDBKIT_TABLE_NAME")]
    pub table_name: String,

    /// Partition key as `name[:S|N|B]` (type defaults to S).
    #[arg(long, value_name = "NAME[:TYPE]")]
    pub partition_key: KeySpec,

    /// Optional sort key as `name[:S|N|B]`.
    #[arg(long, value_name = "NAME[:TYPE]")]
    pub sort_key: Option<KeySpec>,
}

impl TableArgs {
    fn config(&self) -> TableConfig {
        TableConfig::new(
            &self.table_name,
            self.partition_key.clone(),
            self.sort_key.clone(),
        )
    }
}

/// Create or destroy a table.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Create or destroy a DynamoDB table.

By default, this command creates an on-demand (PAY_PER_REQUEST) table with
the given key schema and waits until it is active.

Environment variables:
  AWS_ENDPOINT_URL    - Use local DynamoDB (e.g., http://localhost:8000)
  AWS_REGION          - AWS region (defaults to us-east-1)
  AWS_PROFILE         - AWS profile to use for credentials")]
pub struct DeployCommand {
    #[command(flatten)]
    pub table: TableArgs,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,

    /// Destroy the table instead of creating it.
    #[arg(long)]
    pub destroy: bool,
}

/// Delete and create a table.
#[derive(Debug, clap::Parser)]
pub struct RecreateCommand {
    #[command(flatten)]
    pub table: TableArgs,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,
}

/// Print every item of a table.
#[derive(Debug, clap::Parser)]
pub struct ScanCommand {
    #[command(flatten)]
    pub table: TableArgs,

    /// Maximum number of items evaluated per page.
    #[arg(long)]
    pub limit: Option<i32>,
}

/// Insert generated sample items.
#[derive(Debug, clap::Parser)]
pub struct SeedCommand {
    #[command(flatten)]
    pub table: TableArgs,

    /// Number of items to generate.
    #[arg(long, default_value = "15")]
    pub count: u32,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,
}

/// Main entry point for dynamodb command.
pub async fn run(command: DynamodbCommand, global: crate::Global) -> Result<()> {
    let store_config = StoreConfig::from_env();

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), store_config.target_display());
        aprintln!();
    }

    let store = Arc::new(DynamoDbStore::from_config(&store_config).await);

    match command.action {
        DynamodbAction::Deploy(cmd) => run_deploy(cmd, store, &global).await,
        DynamodbAction::Recreate(cmd) => run_recreate(cmd, store, &global).await,
        DynamodbAction::Scan(cmd) => run_scan(cmd, store, &global).await,
        DynamodbAction::Seed(cmd) => run_seed(cmd, store, &global).await,
    }
}

fn confirm(prompt: &str, default: bool) -> Result<()> {
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| DynamodbError::Prompt(e.to_string()))?;

    if confirmed {
        Ok(())
    } else {
        Err(DynamodbError::UserCancelled)
    }
}

fn print_plan(title: &str, config: &TableConfig, global: &crate::Global) {
    if global.is_silent() {
        return;
    }
    aprintln!("{}", p_c(title));
    for line in config::format_table_config(config) {
        aprintln!("  {}", line);
    }
    aprintln!();
}

async fn run_deploy(
    cmd: DeployCommand,
    store: Arc<DynamoDbStore>,
    global: &crate::Global,
) -> Result<()> {
    let config = cmd.table.config();
    let table = Table::new(store, config.definition());

    if cmd.destroy {
        print_plan("Destroy Plan:", &config, global);

        if !cmd.force {
            confirm(
                "Are you sure you want to delete this table? ALL DATA WILL BE LOST",
                false,
            )?;
        }

        match table.delete_table().await {
            Ok(()) => {
                if !global.is_silent() {
                    aprintln!("{}", p_g("Table destroyed successfully."));
                }
            }
            Err(StoreError::ResourceNotFound(_)) => {
                if !global.is_silent() {
                    aprintln!("{}", p_g("Nothing to destroy."));
                }
            }
            Err(err) => return Err(err.into()),
        }
    } else {
        print_plan("Deploy Plan:", &config, global);

        if !cmd.force {
            confirm("Create this table?", true)?;
        }

        if !global.is_silent() {
            aprintln!("{}", p_b("Creating table..."));
        }

        table.create().await?;

        if !global.is_silent() {
            aprintln!("{}", p_g("Table deployed successfully."));
        }
    }

    Ok(())
}

async fn run_recreate(
    cmd: RecreateCommand,
    store: Arc<DynamoDbStore>,
    global: &crate::Global,
) -> Result<()> {
    let config = cmd.table.config();
    print_plan("Recreate Plan:", &config, global);

    if !cmd.force {
        confirm(
            "Recreate this table? ALL DATA WILL BE LOST",
            false,
        )?;
    }

    Table::new(store, config.definition()).recreate().await?;

    if !global.is_silent() {
        aprintln!("{}", p_g("Table recreated successfully."));
    }

    Ok(())
}

async fn run_scan(
    cmd: ScanCommand,
    store: Arc<DynamoDbStore>,
    global: &crate::Global,
) -> Result<()> {
    let table = Table::new(store, cmd.table.config().definition());
    let limit = cmd.limit;

    let items = table.scan(|s| {
        if let Some(limit) = limit {
            s.limit(limit);
        }
    });
    tokio::pin!(items);

    let mut count = 0usize;
    while let Some(item) = items.next().await {
        let item: Item = item?;
        aprintln!("{}", config::format_item(&item));
        count += 1;
    }

    if !global.is_silent() {
        aprintln!();
        aprintln!("{} {} items.", p_g("Scanned:"), count);
    }

    Ok(())
}

async fn run_seed(
    cmd: SeedCommand,
    store: Arc<DynamoDbStore>,
    global: &crate::Global,
) -> Result<()> {
    let config = cmd.table.config();
    let items = seed::generate_seed_items(&config, cmd.count);

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Table:"), config.table_name);
        aprintln!("{}", p_c("Items to create:"));
        for item in items.iter().take(5) {
            aprintln!("  {}", config::format_item(item));
        }
        if items.len() > 5 {
            aprintln!("  ... and {} more", items.len() - 5);
        }
        aprintln!();
    }

    if !cmd.force {
        confirm(&format!("Insert {} items?", items.len()), true)?;
    }

    let table = Table::new(store, config.definition());
    for item in &items {
        table.put(item).await?;
    }

    if !global.is_silent() {
        aprintln!("{} {} items inserted.", p_g("Success:"), items.len());
    }

    Ok(())
}
