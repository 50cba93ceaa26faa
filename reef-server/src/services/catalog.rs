//! Menu catalog lookup
//!
//! The catalog is an external collaborator: the engine consults it at
//! order-creation time only, capturing name and unit price into the
//! order's line items so later catalog edits never affect existing
//! orders.

use parking_lot::RwLock;
use shared::order::MenuItem;
use std::collections::HashMap;

/// Catalog lookup consumed by the fulfillment engine
pub trait MenuCatalog: Send + Sync {
    /// Resolve a menu item by id
    fn get_menu_item(&self, menu_item_id: &str) -> Option<MenuItem>;
}

/// In-memory catalog backed by a map
///
/// Stands in for the resort's menu service; the back-office CRUD that
/// maintains the real catalog lives outside this system.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: RwLock<HashMap<String, MenuItem>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<MenuItem>) -> Self {
        let catalog = Self::new();
        for item in items {
            catalog.insert(item);
        }
        catalog
    }

    /// Small built-in menu for development runs
    pub fn with_default_menu() -> Self {
        Self::with_items(vec![
            MenuItem {
                id: "club-sandwich".to_string(),
                name: "Club Sandwich".to_string(),
                unit_price: 12.5,
            },
            MenuItem {
                id: "grilled-octopus".to_string(),
                name: "Grilled Octopus".to_string(),
                unit_price: 18.0,
            },
            MenuItem {
                id: "mango-smoothie".to_string(),
                name: "Mango Smoothie".to_string(),
                unit_price: 6.0,
            },
        ])
    }

    pub fn insert(&self, item: MenuItem) {
        self.items.write().insert(item.id.clone(), item);
    }
}

impl MenuCatalog for InMemoryCatalog {
    fn get_menu_item(&self, menu_item_id: &str) -> Option<MenuItem> {
        self.items.read().get(menu_item_id).cloned()
    }
}
