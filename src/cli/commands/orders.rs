use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;

use crate::cli::config;
use crate::cli::utils::{order_line, output_list, output_success};
use crate::cli::OutputFormat;
use crate::sync::{ApiClient, OrderApi, OrderSync, SyncSettings, SyncSnapshot};
use crate::types::{ItemType, OrderDraft};

#[derive(Subcommand)]
pub enum OrderCommands {
    #[command(about = "List orders, newest first")]
    List {
        #[arg(long, help = "Only orders with this status")]
        status: Option<String>,
    },

    #[command(about = "Take a new order")]
    Create {
        #[arg(help = "Customer name")]
        customer: String,
        #[arg(long, help = "Feteer type (makes this a feteer order)")]
        feteer: Option<String>,
        #[arg(long, help = "Meat added to a feteer")]
        meat: Option<String>,
        #[arg(long, help = "Single sweet (makes this a sweet order)")]
        sweet: Option<String>,
        #[arg(long = "sweets", help = "Sweet selections as JSON, e.g. '{\"Konafa\":2}'")]
        sweet_selections: Option<String>,
        #[arg(long, help = "Override the menu price")]
        price: Option<f64>,
        #[arg(long, help = "Kitchen notes")]
        notes: Option<String>,
    },

    #[command(about = "Move an order to another status")]
    Status {
        #[arg(help = "Order id")]
        id: i64,
        #[arg(help = "New status")]
        status: String,
    },

    #[command(about = "Mark an order as completed")]
    Complete {
        #[arg(help = "Order id")]
        id: i64,
    },

    #[command(about = "Delete an order")]
    Delete {
        #[arg(help = "Order id")]
        id: i64,
    },

    #[command(about = "Follow the kitchen queue until Ctrl-C")]
    Watch,
}

/// Decide the item type from which product flags were given
pub fn build_draft(
    customer: String,
    feteer: Option<String>,
    meat: Option<String>,
    sweet: Option<String>,
    sweet_selections: Option<String>,
    price: Option<f64>,
    notes: Option<String>,
) -> anyhow::Result<OrderDraft> {
    let item_type = match (feteer.is_some(), sweet.is_some() || sweet_selections.is_some()) {
        (true, false) => ItemType::Feteer,
        (false, true) => ItemType::Sweet,
        (true, true) => anyhow::bail!("an order is either a feteer or sweets, not both"),
        (false, false) => anyhow::bail!("pass --feteer <type>, --sweet <name> or --sweets <json>"),
    };

    Ok(OrderDraft {
        customer_name: customer,
        item_type: Some(item_type),
        feteer_type: feteer,
        sweet_type: sweet,
        sweet_selections,
        meat_selection: meat,
        price,
        notes,
    })
}

pub async fn handle(cmd: OrderCommands, server: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = config::client(server)?;
    let orders_config = &crate::config::config().orders;

    match cmd {
        OrderCommands::List { status } => {
            let orders = client.list_orders(status.as_deref()).await?;
            output_list(output_format, &orders, "No orders", order_line)
        }
        OrderCommands::Create {
            customer,
            feteer,
            meat,
            sweet,
            sweet_selections,
            price,
            notes,
        } => {
            let draft = build_draft(customer, feteer, meat, sweet, sweet_selections, price, notes)?;
            let order = client.create_order(&draft).await?;
            output_success(
                output_format,
                &format!("Order #{} for {}: {} ({:.2})", order.id, order.customer_name, order.summary(), order.price),
                Some(json!({ "order": order })),
            )
        }
        OrderCommands::Status { id, status } => {
            client.update_order_status(id, &status).await?;
            output_success(output_format, &format!("Order #{} is now {}", id, status), None)
        }
        OrderCommands::Complete { id } => {
            client.update_order_status(id, &orders_config.completed_status).await?;
            output_success(output_format, &format!("Order #{} completed", id), None)
        }
        OrderCommands::Delete { id } => {
            client.delete_order(id).await?;
            output_success(output_format, &format!("Order #{} deleted", id), None)
        }
        OrderCommands::Watch => watch(Arc::new(client), output_format).await,
    }
}

fn print_queue(snapshot: &SyncSnapshot, output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&json!({
                    "queue": snapshot.ordered_orders(),
                    "completed": snapshot.completed_orders().len(),
                    "online": snapshot.is_online,
                    "error": snapshot.error,
                    "last_updated": snapshot.last_updated,
                }))?
            );
        }
        OutputFormat::Text => {
            let queue = snapshot.ordered_orders();
            let stamp = snapshot
                .last_updated
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "── queue: {} · completed: {} · {} · updated {}",
                queue.len(),
                snapshot.completed_orders().len(),
                if snapshot.is_online { "online" } else { "OFFLINE" },
                stamp
            );
            if let Some(error) = &snapshot.error {
                println!("   ! {}", error);
            }
            for order in queue {
                println!("   {}", order_line(order));
            }
        }
    }
    Ok(())
}

async fn watch(client: Arc<ApiClient>, output_format: OutputFormat) -> anyhow::Result<()> {
    let sync_config = &crate::config::config().sync;
    let domain = crate::config::config().orders.status_domain();
    let settings = SyncSettings::from_config(sync_config);
    let sync = OrderSync::new(client.clone(), domain, settings);
    let mut updates = sync.subscribe();
    sync.start();

    // A terminal has no connectivity events; ping /health while offline
    let mut reconnect = tokio::time::interval(settings.poll_interval);
    reconnect.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if !snapshot.loading {
                    print_queue(&snapshot, output_format)?;
                }
            }
            _ = reconnect.tick() => {
                if !sync.snapshot().is_online {
                    match client.ping().await {
                        Ok(()) => sync.handle_online(),
                        Err(e) => tracing::debug!("Still offline: {}", e),
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    sync.dispose();
    Ok(())
}
