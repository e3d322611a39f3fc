pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "admin")]
#[command(about = "CRUD admin CLI - browse and edit backend resources from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "List registered resources")]
    Resources,

    #[command(about = "List one page of a resource")]
    List(commands::data::ListArgs),

    #[command(about = "Show a single record")]
    Show {
        #[arg(help = "Resource endpoint, e.g. product-category")]
        resource: String,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create a record from --data or stdin")]
    Create {
        #[arg(help = "Resource endpoint")]
        resource: String,
        #[arg(long, help = "JSON object with the record fields (reads stdin if omitted)")]
        data: Option<String>,
    },

    #[command(about = "Update a record from --data or stdin")]
    Update {
        #[arg(help = "Resource endpoint")]
        resource: String,
        #[arg(help = "Record ID")]
        id: String,
        #[arg(long, help = "JSON object with the changed fields (reads stdin if omitted)")]
        data: Option<String>,
    },

    #[command(about = "Delete a record after confirmation")]
    Delete {
        #[arg(help = "Resource endpoint")]
        resource: String,
        #[arg(help = "Record ID")]
        id: String,
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Open an admin path (e.g. /admin/product-category/edit/5) through the guard")]
    Open {
        #[arg(help = "Admin path, query form accepted")]
        path: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Resources => commands::data::resources(output_format),
        Commands::List(args) => commands::data::list(args, output_format).await,
        Commands::Show { resource, id } => commands::data::show(&resource, &id, output_format).await,
        Commands::Create { resource, data } => commands::data::create(&resource, data, output_format).await,
        Commands::Update { resource, id, data } => {
            commands::data::update(&resource, &id, data, output_format).await
        }
        Commands::Delete { resource, id, yes } => commands::data::delete(&resource, &id, yes, output_format).await,
        Commands::Open { path } => commands::route::open(&path, output_format).await,
    }
}
