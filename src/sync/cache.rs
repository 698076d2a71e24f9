use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::types::{Order, StatusDomain};

/// Everything a consumer of the sync layer can observe at one instant
///
/// `orders` is replaced wholesale on every change, never edited in place,
/// so a receiver always sees one fully-formed list.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSnapshot {
    pub orders: Arc<Vec<Order>>,
    pub loading: bool,
    pub error: Option<String>,
    pub is_online: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub domain: Arc<StatusDomain>,
}

impl SyncSnapshot {
    /// Loading, empty, assumed online
    pub fn initial(domain: StatusDomain) -> Self {
        Self {
            orders: Arc::new(Vec::new()),
            loading: true,
            error: None,
            is_online: true,
            last_updated: None,
            domain: Arc::new(domain),
        }
    }

    pub fn all_orders(&self) -> &[Order] {
        &self.orders
    }

    /// Orders waiting in the kitchen queue
    pub fn ordered_orders(&self) -> Vec<&Order> {
        self.with_status(&self.domain.queue)
    }

    pub fn completed_orders(&self) -> Vec<&Order> {
        self.with_status(&self.domain.completed)
    }

    fn with_status(&self, status: &str) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.status == status).collect()
    }

    pub fn find(&self, id: i64) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }
}

/// Copy of `orders` with order `id` moved to `status`
pub fn set_status(orders: &[Order], id: i64, status: &str) -> Vec<Order> {
    orders
        .iter()
        .map(|order| {
            if order.id == id {
                Order {
                    status: status.to_string(),
                    ..order.clone()
                }
            } else {
                order.clone()
            }
        })
        .collect()
}

/// Copy of `orders` without order `id`
pub fn remove(orders: &[Order], id: i64) -> Vec<Order> {
    orders.iter().filter(|o| o.id != id).cloned().collect()
}

/// `order` first, followed by every other order (an older copy of it is dropped)
pub fn prepend(orders: &[Order], order: Order) -> Vec<Order> {
    let mut next = Vec::with_capacity(orders.len() + 1);
    let id = order.id;
    next.push(order);
    next.extend(orders.iter().filter(|o| o.id != id).cloned());
    next
}
