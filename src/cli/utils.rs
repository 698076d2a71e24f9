use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::types::{MenuItem, Order};

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a collection as a JSON array or as one line per item
pub fn output_list<T, F>(output_format: OutputFormat, items: &[T], empty_message: &str, line: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(items)?),
        OutputFormat::Text if items.is_empty() => println!("{}", empty_message),
        OutputFormat::Text => {
            for item in items {
                println!("{}", line(item));
            }
        }
    }
    Ok(())
}

pub fn order_line(order: &Order) -> String {
    let mut line = format!(
        "#{:<5} {:<10} {:<20} {:<30} {:>8.2}  {}",
        order.id,
        order.status,
        truncate(&order.customer_name, 20),
        truncate(&order.summary(), 30),
        order.price,
        order.created_at.format("%H:%M")
    );
    if let Some(notes) = order.notes.as_deref().filter(|n| !n.is_empty()) {
        line.push_str(&format!("  ({})", notes));
    }
    line
}

pub fn menu_line(item: &MenuItem) -> String {
    format!(
        "{:<7} {:<25} {:>8.2}{}",
        item.kind.as_str(),
        item.name,
        item.price,
        if item.available { "" } else { "  (unavailable)" }
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_text_to_width() {
        assert_eq!(truncate("Konafa", 10), "Konafa");
        let short = truncate("A very long customer name indeed", 10);
        assert_eq!(short.chars().count(), 10);
        assert!(short.ends_with('…'));
    }
}
