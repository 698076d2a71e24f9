use clap::Subcommand;

use crate::cli::config;
use crate::cli::utils::{menu_line, output_list};
use crate::cli::OutputFormat;
use crate::types::MenuKind;

#[derive(Subcommand)]
pub enum MenuCommands {
    #[command(about = "List menu items")]
    List {
        #[arg(long, value_parser = parse_kind, help = "feteer, sweet or meat")]
        kind: Option<MenuKind>,
    },
}

fn parse_kind(raw: &str) -> Result<MenuKind, String> {
    MenuKind::try_from(raw.to_lowercase())
}

pub async fn handle(cmd: MenuCommands, server: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = config::client(server)?;

    match cmd {
        MenuCommands::List { kind } => {
            let items = client.list_menu(kind).await?;
            output_list(output_format, &items, "The menu is empty", menu_line)
        }
    }
}
