//! Validation and pricing of incoming order drafts.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::config::OrderConfig;
use crate::database::OrderStore;
use crate::error::ApiError;
use crate::types::{parse_sweet_selections, ItemType, MenuKind, NewOrder, OrderDraft};

const MAX_CUSTOMER_NAME: usize = 100;

/// A draft whose shape has been checked; price may still need the menu
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedDraft {
    pub customer_name: String,
    pub item_type: ItemType,
    pub feteer_type: Option<String>,
    pub sweet_type: Option<String>,
    pub sweets: BTreeMap<String, u32>,
    pub meat_selection: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Shape checks that need no database access
pub fn check_draft(draft: &OrderDraft) -> Result<CheckedDraft, ApiError> {
    let customer_name = draft.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(ApiError::invalid_field("customer_name", "Customer name is required"));
    }
    if customer_name.chars().count() > MAX_CUSTOMER_NAME {
        return Err(ApiError::invalid_field(
            "customer_name",
            format!("Customer name must be at most {} characters", MAX_CUSTOMER_NAME),
        ));
    }

    let item_type = draft
        .item_type
        .ok_or_else(|| ApiError::invalid_field("item_type", "Item type must be 'feteer' or 'sweet'"))?;

    if let Some(price) = draft.price {
        if !price.is_finite() || price < 0.0 {
            return Err(ApiError::invalid_field("price", "Price must be a non-negative number"));
        }
    }

    let notes = non_empty(&draft.notes);

    match item_type {
        ItemType::Feteer => {
            let feteer_type = non_empty(&draft.feteer_type)
                .ok_or_else(|| ApiError::invalid_field("feteer_type", "Feteer orders need a feteer type"))?;
            Ok(CheckedDraft {
                customer_name,
                item_type,
                feteer_type: Some(feteer_type),
                sweet_type: None,
                sweets: BTreeMap::new(),
                meat_selection: non_empty(&draft.meat_selection),
                price: draft.price,
                notes,
            })
        }
        ItemType::Sweet => {
            let sweets = match non_empty(&draft.sweet_selections) {
                Some(raw) => {
                    let parsed = parse_sweet_selections(&raw).map_err(|_| {
                        ApiError::invalid_field("sweet_selections", "Sweet selections must be a JSON object of name to quantity")
                    })?;
                    parsed.into_iter().filter(|(_, qty)| *qty > 0).collect()
                }
                None => BTreeMap::new(),
            };
            let sweet_type = non_empty(&draft.sweet_type);
            if sweet_type.is_none() && sweets.is_empty() {
                return Err(ApiError::invalid_field(
                    "sweet_type",
                    "Sweet orders need a sweet type or at least one selection",
                ));
            }
            Ok(CheckedDraft {
                customer_name,
                item_type,
                feteer_type: None,
                sweet_type,
                sweets,
                meat_selection: None,
                price: draft.price,
                notes,
            })
        }
    }
}

async fn menu_price(store: &dyn OrderStore, kind: MenuKind, name: &str, field: &str) -> Result<f64, ApiError> {
    match store.find_menu_item(kind, name).await? {
        Some(item) if item.available => Ok(item.price),
        Some(_) => Err(ApiError::invalid_field(field, format!("'{}' is not available right now", name))),
        None => Err(ApiError::invalid_field(
            field,
            format!("No {} named '{}' on the menu; send a price explicitly", kind.as_str(), name),
        )),
    }
}

/// Price from the menu when the draft does not carry one
async fn resolve_price(store: &dyn OrderStore, draft: &CheckedDraft) -> Result<f64, ApiError> {
    if let Some(price) = draft.price {
        return Ok(price);
    }

    match draft.item_type {
        ItemType::Feteer => {
            let feteer = draft.feteer_type.as_deref().unwrap_or_default();
            let mut total = menu_price(store, MenuKind::Feteer, feteer, "feteer_type").await?;
            if let Some(meat) = draft.meat_selection.as_deref() {
                // Free-text meat notes that are not on the menu cost nothing extra
                if let Some(item) = store.find_menu_item(MenuKind::Meat, meat).await? {
                    total += item.price;
                }
            }
            Ok(total)
        }
        ItemType::Sweet if !draft.sweets.is_empty() => {
            let mut total = 0.0;
            for (name, qty) in &draft.sweets {
                total += menu_price(store, MenuKind::Sweet, name, "sweet_selections").await? * f64::from(*qty);
            }
            Ok(total)
        }
        ItemType::Sweet => {
            let sweet = draft.sweet_type.as_deref().unwrap_or_default();
            menu_price(store, MenuKind::Sweet, sweet, "sweet_type").await
        }
    }
}

/// Validate, price and stamp a draft so it can be inserted
pub async fn prepare_order(
    store: &dyn OrderStore,
    orders: &OrderConfig,
    draft: &OrderDraft,
) -> Result<NewOrder, ApiError> {
    let checked = check_draft(draft)?;
    let price = resolve_price(store, &checked).await?;

    let sweet_selections = if checked.sweets.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&checked.sweets).map_err(|e| {
            tracing::error!("Failed to encode sweet selections: {}", e);
            ApiError::internal_server_error("Failed to encode sweet selections")
        })?)
    };

    Ok(NewOrder {
        customer_name: checked.customer_name,
        item_type: checked.item_type,
        feteer_type: checked.feteer_type,
        sweet_type: checked.sweet_type,
        sweet_selections,
        meat_selection: checked.meat_selection,
        status: orders.queue_status.clone(),
        price,
        created_at: Utc::now(),
        notes: checked.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteOrderStore;
    use crate::types::NewMenuItem;

    fn feteer_draft() -> OrderDraft {
        OrderDraft {
            customer_name: "  Jane ".to_string(),
            item_type: Some(ItemType::Feteer),
            feteer_type: Some("Plain".to_string()),
            ..Default::default()
        }
    }

    async fn menu_store() -> SqliteOrderStore {
        let store = SqliteOrderStore::in_memory().await.unwrap();
        for (kind, name, price, available) in [
            (MenuKind::Feteer, "Plain", 6.0, true),
            (MenuKind::Meat, "Sausage", 2.5, true),
            (MenuKind::Sweet, "Basbousa", 3.0, true),
            (MenuKind::Sweet, "Konafa", 4.0, true),
            (MenuKind::Sweet, "Qatayef", 5.0, false),
        ] {
            store
                .create_menu_item(&NewMenuItem { kind, name: name.to_string(), price, available })
                .await
                .unwrap();
        }
        store
    }

    #[test]
    fn trims_and_requires_customer_name() {
        let checked = check_draft(&feteer_draft()).unwrap();
        assert_eq!(checked.customer_name, "Jane");

        let blank = OrderDraft { customer_name: "   ".to_string(), ..feteer_draft() };
        assert!(check_draft(&blank).is_err());
    }

    #[test]
    fn feteer_needs_a_type() {
        let draft = OrderDraft { feteer_type: Some(" ".to_string()), ..feteer_draft() };
        let err = check_draft(&draft).unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["feteer_type"], "Feteer orders need a feteer type");
    }

    #[test]
    fn sweet_needs_type_or_selections() {
        let draft = OrderDraft {
            customer_name: "Omar".to_string(),
            item_type: Some(ItemType::Sweet),
            sweet_selections: Some(r#"{"Konafa":0}"#.to_string()),
            ..Default::default()
        };
        assert!(check_draft(&draft).is_err());

        let bad_json = OrderDraft { sweet_selections: Some("[1,2]".to_string()), ..draft.clone() };
        assert!(check_draft(&bad_json).is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        let draft = OrderDraft { price: Some(-1.0), ..feteer_draft() };
        assert!(check_draft(&draft).is_err());
    }

    #[tokio::test]
    async fn prices_feteer_with_meat_from_menu() {
        let store = menu_store().await;
        let draft = OrderDraft { meat_selection: Some("Sausage".to_string()), ..feteer_draft() };
        let order = prepare_order(&store, &OrderConfig::default(), &draft).await.unwrap();
        assert_eq!(order.price, 8.5);
        assert_eq!(order.status, "ordered");
        assert_eq!(order.meat_selection.as_deref(), Some("Sausage"));
    }

    #[tokio::test]
    async fn prices_sweet_selections_by_quantity() {
        let store = menu_store().await;
        let draft = OrderDraft {
            customer_name: "Omar".to_string(),
            item_type: Some(ItemType::Sweet),
            sweet_selections: Some(r#"{"Konafa":2,"Basbousa":1,"Ignored":0}"#.to_string()),
            ..Default::default()
        };
        let order = prepare_order(&store, &OrderConfig::default(), &draft).await.unwrap();
        assert_eq!(order.price, 11.0);
        assert_eq!(order.sweet_selections.as_deref(), Some(r#"{"Basbousa":1,"Konafa":2}"#));
    }

    #[tokio::test]
    async fn unknown_or_unavailable_items_need_explicit_price() {
        let store = menu_store().await;
        let unknown = OrderDraft { feteer_type: Some("Mystery".to_string()), ..feteer_draft() };
        assert!(prepare_order(&store, &OrderConfig::default(), &unknown).await.is_err());

        let priced = OrderDraft { price: Some(9.0), ..unknown };
        let order = prepare_order(&store, &OrderConfig::default(), &priced).await.unwrap();
        assert_eq!(order.price, 9.0);

        let sold_out = OrderDraft {
            customer_name: "Omar".to_string(),
            item_type: Some(ItemType::Sweet),
            sweet_type: Some("Qatayef".to_string()),
            ..Default::default()
        };
        assert!(prepare_order(&store, &OrderConfig::default(), &sold_out).await.is_err());
    }
}
