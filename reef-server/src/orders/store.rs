//! redb-based storage layer for orders
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | JSON `Order` | One row per order |
//! | `active_orders` | `order_id` | `()` | Active order index |
//! | `counters` | name | `u64` | Order number + event sequence |
//!
//! # Concurrency
//!
//! redb serializes write transactions, so a read-validate-write sequence
//! inside one transaction is the storage-level conditional update that
//! gates every status transition. An in-process mutex would not survive
//! multiple engine instances sharing the database file; the transaction
//! does.
//!
//! # Durability
//!
//! Commits are persistent as soon as `commit()` returns (copy-on-write
//! with atomic pointer swap), so the order number counter and the rows
//! themselves survive power loss.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::order::Order;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for tracking active orders: key = order_id, value = empty (existence check)
const ACTIVE_ORDERS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("active_orders");

/// Table for counters: key = "order_number" or "seq", value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_NUMBER_KEY: &str = "order_number";
const SEQUENCE_KEY: &str = "seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Order storage backed by redb
#[derive(Clone)]
pub struct OrderStore {
    db: Arc<Database>,
}

impl OrderStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let _ = txn.open_table(ORDERS_TABLE)?;
            let _ = txn.open_table(ACTIVE_ORDERS_TABLE)?;

            let mut counters = txn.open_table(COUNTERS_TABLE)?;
            if counters.get(ORDER_NUMBER_KEY)?.is_none() {
                counters.insert(ORDER_NUMBER_KEY, 0u64)?;
            }
            if counters.get(SEQUENCE_KEY)?.is_none() {
                counters.insert(SEQUENCE_KEY, 0u64)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    ///
    /// Write transactions are serialized by redb; every command composes
    /// its read-validate-write inside one.
    pub fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Transaction-scoped operations ==========

    /// Load an order inside a write transaction
    pub fn get_order_txn(&self, txn: &WriteTransaction, order_id: &str) -> StoreResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        let Some(guard) = table.get(order_id)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(guard.value())?))
    }

    /// Write an order row inside a write transaction
    pub fn put_order_txn(&self, txn: &WriteTransaction, order: &Order) -> StoreResult<()> {
        let bytes = serde_json::to_vec(order)?;
        let mut table = txn.open_table(ORDERS_TABLE)?;
        table.insert(order.order_id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Add an order to the active index
    pub fn mark_order_active(&self, txn: &WriteTransaction, order_id: &str) -> StoreResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.insert(order_id, ())?;
        Ok(())
    }

    /// Remove an order from the active index
    pub fn mark_order_inactive(&self, txn: &WriteTransaction, order_id: &str) -> StoreResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// Increment and return the event sequence inside a write transaction
    ///
    /// Allocated before commit, so per-order sequence order equals commit
    /// order.
    pub fn next_sequence(&self, txn: &WriteTransaction) -> StoreResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table.get(SEQUENCE_KEY)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(SEQUENCE_KEY, next)?;
        Ok(next)
    }

    // ========== Order number counter ==========

    /// Get and increment the order number atomically (crash-safe)
    ///
    /// Returns the NEW number after increment.
    pub fn next_order_number(&self) -> StoreResult<u64> {
        let txn = self.db.begin_write()?;
        let next = {
            let mut table = txn.open_table(COUNTERS_TABLE)?;
            let current = table.get(ORDER_NUMBER_KEY)?.map(|g| g.value()).unwrap_or(0);
            let next = current + 1;
            table.insert(ORDER_NUMBER_KEY, next)?;
            next
        };
        txn.commit()?;
        Ok(next)
    }

    // ========== Read operations ==========

    /// Get an order by id
    pub fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ORDERS_TABLE)?;
        let Some(guard) = table.get(order_id)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(guard.value())?))
    }

    /// All orders in a non-terminal status, ordered by order number
    pub fn list_active(&self) -> StoreResult<Vec<Order>> {
        let txn = self.db.begin_read()?;
        let index = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let orders_table = txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for entry in index.iter()? {
            let (key, _) = entry?;
            if let Some(guard) = orders_table.get(key.value())? {
                orders.push(serde_json::from_slice::<Order>(guard.value())?);
            }
        }
        orders.sort_by_key(|o| o.order_number);
        Ok(orders)
    }

    /// Orders matching a guest contact (room number or phone), newest first
    pub fn list_by_guest_contact(&self, contact: &str) -> StoreResult<Vec<Order>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let order: Order = serde_json::from_slice(value.value())?;
            if order.room_number == contact || order.phone.as_deref() == Some(contact) {
                orders.push(order);
            }
        }
        orders.sort_by_key(|o| std::cmp::Reverse(o.order_number));
        Ok(orders)
    }

    /// Current event sequence (read-only)
    pub fn current_sequence(&self) -> StoreResult<u64> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(COUNTERS_TABLE)?;
        Ok(table.get(SEQUENCE_KEY)?.map(|g| g.value()).unwrap_or(0))
    }
}
