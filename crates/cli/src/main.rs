//! Hearth Bakery CLI - database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! hearth-cli migrate
//!
//! # Create a staff account
//! hearth-cli admin create -e owner@hearthbakery.shop -n "Owner" -r super_admin -p '<password>'
//!
//! # Load categories and products from YAML
//! hearth-cli seed catalog -f seed/catalog.yaml
//!
//! # Write default site settings if none are stored
//! hearth-cli seed settings
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hearth-cli")]
#[command(author, version, about = "Hearth Bakery CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage staff accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Load starter data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a staff account with a password
    Create {
        /// Staff email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`super_admin`, `admin`, `editor`, `viewer`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Initial password
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert categories and products from a YAML file
    Catalog {
        /// Path to the catalog file
        #[arg(short, long, default_value = "seed/catalog.yaml")]
        file: String,
    },
    /// Store default site settings when none exist
    Settings,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearth_cli=info,hearth_admin=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::admin::create_user(&email, &name, &role, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file } => commands::seed::catalog(&file).await?,
            SeedTarget::Settings => commands::seed::settings().await?,
        },
    }
    Ok(())
}
