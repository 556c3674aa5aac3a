//! Customs Clearance Domain Layer
//!
//! This crate contains the core business logic and domain model of the
//! folder lifecycle engine. It depends only on `uuid`, `chrono` and
//! `thiserror`, and defines the value objects, the pure status derivation,
//! the error taxonomy and the trait interfaces that all other layers depend
//! upon.
//!
//! ## Key Concepts
//!
//! - **Customer**: an agency client, identified by its regulatory id (NIF)
//! - **Folder**: one customs-clearance case for one shipment
//! - **Declaration**: the four-stage milestone record attached to a folder
//! - **FolderStatus**: derived from the declaration, never set by hand
//!   (open → declared → liquidated → receipted → released)
//!
//! ## Architecture
//!
//! - Pure business logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capability;
pub mod customer;
pub mod declaration;
pub mod document;
pub mod error;
pub mod expense;
pub mod folder;
pub mod id;
pub mod query;
pub mod status;
pub mod traits;
pub mod validation;

// Re-exports for convenience
pub use capability::{Actor, Capability, ONBOARDING_CAPABILITIES};
pub use customer::{Customer, CustomerUpdate, NewCustomer, PersonFields, PersonPatch, PersonProfile};
pub use declaration::{Declaration, DeclarationFiling, Liquidation, Receipt, ReleaseOrder};
pub use document::DocumentRef;
pub use error::{CustomsError, ErrorKind, Result};
pub use expense::{Expense, NewExpense};
pub use folder::{Folder, NewFolder};
pub use id::{CustomerId, DeclarationId, ExpenseId, FolderId, PersonId};
pub use query::{
    CustomerQuery, CustomerSort, FolderQuery, FolderRow, FolderSort, Page, PageRequest,
    SortDirection,
};
pub use status::{FolderStatus, Stage};
