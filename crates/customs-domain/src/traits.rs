//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the lifecycle engine and the
//! platform around it. Infrastructure implementations live in other crates.

use crate::error::Result;
use crate::{
    Actor, Capability, Customer, CustomerId, CustomerQuery, CustomerUpdate, Declaration,
    DeclarationFiling, DocumentRef, Expense, Folder, FolderId, FolderQuery, FolderRow,
    Liquidation, Page, PersonId, Receipt, ReleaseOrder,
};
use chrono::{DateTime, Utc};

/// Persistence of customers, folders and declarations
///
/// Implemented by the infrastructure layer (customs-store). Every `&mut self`
/// method is one atomic unit: it either applies all of its effects or none.
/// Invariant checks run inside that unit, against committed state.
pub trait CustomsStore {
    /// Persist a new customer, its person profile, the hashed credential and
    /// the capabilities granted on creation
    ///
    /// Fails with a conflict when the regulatory id, phone or e-mail is taken.
    fn insert_customer(
        &mut self,
        customer: &Customer,
        credential_hash: &str,
        grants: &[Capability],
    ) -> Result<()>;

    /// Apply an update to an existing customer
    ///
    /// Uniqueness checks ignore the customer's own current values. The
    /// credential hash is replaced only when one is given.
    fn update_customer(
        &mut self,
        id: CustomerId,
        update: &CustomerUpdate,
        credential_hash: Option<&str>,
    ) -> Result<Customer>;

    /// Activate or deactivate a customer
    fn set_customer_active(&mut self, id: CustomerId, active: bool) -> Result<Customer>;

    /// Get a customer by ID
    fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// Capabilities granted to a person
    fn granted_capabilities(&self, person_id: PersonId) -> Result<Vec<Capability>>;

    /// Stored credential hash of a person
    fn credential_hash(&self, person_id: PersonId) -> Result<Option<String>>;

    /// Persist a new folder for an existing, active customer
    fn insert_folder(&mut self, folder: &Folder) -> Result<()>;

    /// Get a folder by ID
    fn get_folder(&self, id: FolderId) -> Result<Option<Folder>>;

    /// Create the declaration of a folder (stage 1) and refresh its status
    fn file_declaration(
        &mut self,
        folder_id: FolderId,
        filing: &DeclarationFiling,
        now: DateTime<Utc>,
    ) -> Result<Declaration>;

    /// Record stage 2 and refresh the folder status
    fn record_liquidation(
        &mut self,
        folder_id: FolderId,
        liquidation: &Liquidation,
        now: DateTime<Utc>,
    ) -> Result<Declaration>;

    /// Record stage 3 and refresh the folder status
    fn record_receipt(
        &mut self,
        folder_id: FolderId,
        receipt: &Receipt,
        now: DateTime<Utc>,
    ) -> Result<Declaration>;

    /// Record stage 4 and refresh the folder status
    fn record_release_order(
        &mut self,
        folder_id: FolderId,
        order: &ReleaseOrder,
        now: DateTime<Utc>,
    ) -> Result<Declaration>;

    /// Get the declaration of a folder
    fn get_declaration(&self, folder_id: FolderId) -> Result<Option<Declaration>>;

    /// Persist an expense; `NotFound` when its folder does not exist
    fn insert_expense(&mut self, expense: &Expense) -> Result<()>;

    /// Expenses of a folder, oldest first
    fn list_expenses(&self, folder_id: FolderId) -> Result<Vec<Expense>>;

    /// Folder listing over Folder ⋈ Customer ⋈ Declaration
    fn query_folders(&self, query: &FolderQuery) -> Result<Page<FolderRow>>;

    /// Customer listing
    fn query_customers(&self, query: &CustomerQuery) -> Result<Page<Customer>>;
}

/// Yes/no capability check provided by the platform
pub trait Authorizer {
    /// Whether `actor` holds `capability`
    fn authorize(&self, capability: Capability, actor: &Actor) -> bool;
}

/// Credential hashing provided by the platform
///
/// The engine never stores or compares raw secrets.
pub trait CredentialStore {
    /// Hash a secret for storage
    fn hash(&self, secret: &str) -> Result<String>;

    /// Check a secret against a stored hash
    fn verify(&self, secret: &str, hash: &str) -> bool;
}

/// File storage for scanned milestone documents
pub trait DocumentStore {
    /// Store a document and return its reference
    fn store(&self, file_name: &str, contents: &[u8]) -> Result<DocumentRef>;
}

/// Outcome reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation was applied
    Success,
    /// The operation was rejected
    Failure,
}

/// Fire-and-forget message about an operation's outcome
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    /// Success or failure
    pub outcome: Outcome,
    /// Message for the caller
    pub message: String,
}

/// Delivery of success/failure messages; not required for correctness
pub trait Notifier {
    /// Deliver a notice; must not fail
    fn notify(&self, notice: &Notice);
}
