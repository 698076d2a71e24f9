/// Shared types used across the server, the store and the sync client

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of product an order is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Feteer,
    Sweet,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Feteer => "feteer",
            ItemType::Sweet => "sweet",
        }
    }
}

impl TryFrom<String> for ItemType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "feteer" => Ok(ItemType::Feteer),
            "sweet" => Ok(ItemType::Sweet),
            other => Err(format!("unknown item type '{}'", other)),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order as stored by the server and cached by the sync layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    #[sqlx(try_from = "String")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feteer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweet_type: Option<String>,
    /// JSON-encoded map of sweet name to quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweet_selections: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meat_selection: Option<String>,
    pub status: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Order {
    /// Decoded sweet selections; malformed or absent selections decode as empty
    pub fn sweet_quantities(&self) -> BTreeMap<String, u32> {
        self.sweet_selections
            .as_deref()
            .and_then(|raw| parse_sweet_selections(raw).ok())
            .unwrap_or_default()
    }

    /// Short human-readable description of what was ordered
    pub fn summary(&self) -> String {
        match self.item_type {
            ItemType::Feteer => {
                let base = self.feteer_type.as_deref().unwrap_or("feteer");
                match self.meat_selection.as_deref() {
                    Some(meat) if !meat.is_empty() => format!("{} + {}", base, meat),
                    _ => base.to_string(),
                }
            }
            ItemType::Sweet => {
                let selections = self.sweet_quantities();
                if selections.is_empty() {
                    self.sweet_type.clone().unwrap_or_else(|| "sweets".to_string())
                } else {
                    selections
                        .iter()
                        .map(|(name, qty)| format!("{}x {}", qty, name))
                        .collect::<Vec<_>>()
                        .join(", ")
                }
            }
        }
    }
}

/// Parse the JSON-encoded `name -> quantity` map carried by sweet orders
pub fn parse_sweet_selections(raw: &str) -> Result<BTreeMap<String, u32>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Order as submitted by a client, before the server assigns id/status/timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer_name: String,
    pub item_type: Option<ItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feteer_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweet_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweet_selections: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meat_selection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fully validated order ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    pub item_type: ItemType,
    pub feteer_type: Option<String>,
    pub sweet_type: Option<String>,
    pub sweet_selections: Option<String>,
    pub meat_selection: Option<String>,
    pub status: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// The two statuses the sync layer splits its views on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDomain {
    /// Orders waiting in the kitchen queue
    pub queue: String,
    /// Orders that have been handed over
    pub completed: String,
}

impl Default for StatusDomain {
    fn default() -> Self {
        Self {
            queue: "ordered".to_string(),
            completed: "completed".to_string(),
        }
    }
}

/// User roles known to the route guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account stored in the users table
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Menu sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuKind {
    Feteer,
    Sweet,
    Meat,
}

impl MenuKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuKind::Feteer => "feteer",
            MenuKind::Sweet => "sweet",
            MenuKind::Meat => "meat",
        }
    }
}

impl TryFrom<String> for MenuKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "feteer" => Ok(MenuKind::Feteer),
            "sweet" => Ok(MenuKind::Sweet),
            "meat" => Ok(MenuKind::Meat),
            other => Err(format!("unknown menu kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MenuItem {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub kind: MenuKind,
    pub name: String,
    pub price: f64,
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuItem {
    pub kind: MenuKind,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuItemPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub available: Option<bool>,
}
