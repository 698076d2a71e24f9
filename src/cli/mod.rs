pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "feteer")]
#[command(about = "Feteer CLI - take orders and watch the kitchen queue from a terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Server URL (defaults to the saved session, then SYNC_BASE_URL)")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in and save the session")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, env = "FETEER_PASSWORD", help = "Password")]
        password: String,
    },

    #[command(about = "Sign out and forget the saved session")]
    Logout,

    #[command(about = "Show the signed-in user")]
    Whoami,

    #[command(about = "Order intake and the kitchen queue")]
    Orders {
        #[command(subcommand)]
        cmd: commands::orders::OrderCommands,
    },

    #[command(about = "Browse the menu")]
    Menu {
        #[command(subcommand)]
        cmd: commands::menu::MenuCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
    let server = cli.server;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(server, &username, &password, output_format).await
        }
        Commands::Logout => commands::auth::logout(output_format).await,
        Commands::Whoami => commands::auth::whoami(server, output_format).await,
        Commands::Orders { cmd } => commands::orders::handle(cmd, server, output_format).await,
        Commands::Menu { cmd } => commands::menu::handle(cmd, server, output_format).await,
    }
}
