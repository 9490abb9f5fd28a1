use anyhow::Context;
use berth_db::storage::{Storage, mongodb::MongoDBStorage};
use clap::{Parser, Subcommand};

use crate::commands::CreateUserParams;

mod commands;

#[derive(Parser)]
#[command(name = "berthctl", version, about = "Operator tooling for berth")]
pub struct Args {
    #[clap(subcommand)]
    command: Command,

    #[clap(
        short = 'D',
        long,
        env = "BERTH_API_DB_URL",
        default_value = "mongodb://localhost:27017/berth"
    )]
    db_url: String,
}

#[derive(Clone, Subcommand)]
pub enum Command {
    /// Create a user and print its API token.
    #[command(name = "create-user")]
    CreateUser(CreateUserParams),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let stg = MongoDBStorage::new(&args.db_url)
        .await
        .context("Failed to connect to MongoDB")?;

    let result = match args.command {
        Command::CreateUser(params) => commands::create_user(&stg, params)
            .await
            .context("Failed to create user"),
    };

    stg.shutdown().await?;
    result
}
