//! Customs Clearance Storage Layer
//!
//! Implements the `CustomsStore` trait on SQLite.
//!
//! # Architecture
//!
//! - Every write runs in a `BEGIN IMMEDIATE` transaction, so writers are
//!   serialized and invariants are checked against committed state
//! - A declaration write and the folder status refresh share one transaction
//! - `UNIQUE` constraints back up the engine's own uniqueness checks and are
//!   translated into conflicts
//! - File databases use WAL so readers keep a consistent snapshot while a
//!   writer is active
//!
//! # Examples
//!
//! ```no_run
//! use customs_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for customer, folder and declaration operations
//! ```

#![warn(missing_docs)]

mod config;
mod credentials;
mod customers;
mod declarations;
mod documents;
mod expenses;
mod folders;
mod queries;
mod rows;

pub use config::StoreConfig;
pub use credentials::Sha256Credentials;
pub use documents::FsDocumentStore;

use customs_domain::traits::CustomsStore;
use customs_domain::{
    Capability, Customer, CustomerId, CustomerQuery, CustomerUpdate, CustomsError, Declaration,
    DeclarationFiling, Expense, Folder, FolderId, FolderQuery, FolderRow, Liquidation, Page,
    PersonId, Receipt, ReleaseOrder,
};
use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// An engine invariant rejected the write
    #[error(transparent)]
    Rejected(#[from] CustomsError),
}

impl From<StoreError> for CustomsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(e) => e,
            StoreError::Database(e) => match unique_violation(&e) {
                Some(column) => CustomsError::conflict(column, "(recorded concurrently)"),
                None => CustomsError::Storage(e.to_string()),
            },
            other => CustomsError::Storage(other.to_string()),
        }
    }
}

/// Column named by a `UNIQUE` constraint violation, e.g. `declarations.number`
pub(crate) fn unique_violation(err: &rusqlite::Error) -> Option<String> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            msg.strip_prefix("UNIQUE constraint failed: ")
                .map(|column| column.to_string())
        }
        _ => None,
    }
}

/// Translate a constraint violation raised by a write into a conflict on
/// the matching field
///
/// `candidates` pairs a `table.column` with the field name and value that
/// the write tried to store there.
pub(crate) fn backstop(err: rusqlite::Error, candidates: &[(&str, &str, &str)]) -> StoreError {
    if let Some(column) = unique_violation(&err) {
        if let Some((_, field, value)) = candidates.iter().find(|(c, _, _)| *c == column) {
            tracing::warn!(%column, value, "unique constraint rejected a concurrent write");
            return StoreError::Rejected(CustomsError::conflict(*field, *value));
        }
    }
    StoreError::Database(err)
}

/// SQLite-based implementation of CustomsStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should open its own
/// SqliteStore on the same database file; writes are serialized by SQLite.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a store with the default configuration
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open(path, &StoreConfig::default())
    }

    /// Open a store with an explicit configuration
    pub fn open<P: AsRef<Path>>(path: P, config: &StoreConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", true)?;
        if config.wal {
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            tracing::debug!(path = %path.as_ref().display(), %mode, "journal mode set");
        }

        let mut store = Self { conn };
        store.register_functions()?;
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        tracing::debug!("schema initialized");
        Ok(())
    }

    /// Register `casefold(text)`, a Unicode-aware lowercase used by search
    ///
    /// SQLite's own `lower()` and `LIKE` only fold ASCII.
    fn register_functions(&self) -> Result<(), StoreError> {
        self.conn.create_scalar_function(
            "casefold",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let value: Option<String> = ctx.get(0)?;
                Ok(value.map(|v| v.to_lowercase()))
            },
        )?;
        Ok(())
    }
}

impl CustomsStore for SqliteStore {
    fn insert_customer(
        &mut self,
        customer: &Customer,
        credential_hash: &str,
        grants: &[Capability],
    ) -> customs_domain::Result<()> {
        Ok(self.insert_customer_tx(customer, credential_hash, grants)?)
    }

    fn update_customer(
        &mut self,
        id: CustomerId,
        update: &CustomerUpdate,
        credential_hash: Option<&str>,
    ) -> customs_domain::Result<Customer> {
        Ok(self.update_customer_tx(id, update, credential_hash)?)
    }

    fn set_customer_active(&mut self, id: CustomerId, active: bool) -> customs_domain::Result<Customer> {
        Ok(self.set_customer_active_tx(id, active)?)
    }

    fn get_customer(&self, id: CustomerId) -> customs_domain::Result<Option<Customer>> {
        Ok(customers::load_customer(&self.conn, id)?)
    }

    fn granted_capabilities(&self, person_id: PersonId) -> customs_domain::Result<Vec<Capability>> {
        Ok(customers::load_capabilities(&self.conn, person_id)?)
    }

    fn credential_hash(&self, person_id: PersonId) -> customs_domain::Result<Option<String>> {
        Ok(customers::load_credential_hash(&self.conn, person_id)?)
    }

    fn insert_folder(&mut self, folder: &Folder) -> customs_domain::Result<()> {
        Ok(self.insert_folder_tx(folder)?)
    }

    fn get_folder(&self, id: FolderId) -> customs_domain::Result<Option<Folder>> {
        Ok(folders::load_folder(&self.conn, id)?)
    }

    fn file_declaration(
        &mut self,
        folder_id: FolderId,
        filing: &DeclarationFiling,
        now: DateTime<Utc>,
    ) -> customs_domain::Result<Declaration> {
        Ok(self.file_declaration_tx(folder_id, filing, now)?)
    }

    fn record_liquidation(
        &mut self,
        folder_id: FolderId,
        liquidation: &Liquidation,
        now: DateTime<Utc>,
    ) -> customs_domain::Result<Declaration> {
        Ok(self.record_liquidation_tx(folder_id, liquidation, now)?)
    }

    fn record_receipt(
        &mut self,
        folder_id: FolderId,
        receipt: &Receipt,
        now: DateTime<Utc>,
    ) -> customs_domain::Result<Declaration> {
        Ok(self.record_receipt_tx(folder_id, receipt, now)?)
    }

    fn record_release_order(
        &mut self,
        folder_id: FolderId,
        order: &ReleaseOrder,
        now: DateTime<Utc>,
    ) -> customs_domain::Result<Declaration> {
        Ok(self.record_release_order_tx(folder_id, order, now)?)
    }

    fn get_declaration(&self, folder_id: FolderId) -> customs_domain::Result<Option<Declaration>> {
        Ok(declarations::load_declaration(&self.conn, folder_id)?)
    }

    fn insert_expense(&mut self, expense: &Expense) -> customs_domain::Result<()> {
        Ok(self.insert_expense_tx(expense)?)
    }

    fn list_expenses(&self, folder_id: FolderId) -> customs_domain::Result<Vec<Expense>> {
        Ok(expenses::load_expenses(&self.conn, folder_id)?)
    }

    fn query_folders(&self, query: &FolderQuery) -> customs_domain::Result<Page<FolderRow>> {
        Ok(self.query_folders_snapshot(query)?)
    }

    fn query_customers(&self, query: &CustomerQuery) -> customs_domain::Result<Page<Customer>> {
        Ok(self.query_customers_snapshot(query)?)
    }
}
