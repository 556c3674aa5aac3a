//! Customs Clearance Engine
//!
//! Drives customers, folders and their declaration milestones through a
//! [`CustomsStore`](customs_domain::traits::CustomsStore), checking the
//! caller's capabilities and validating input before anything is written.
//!
//! The engine provides:
//! - Customer onboarding with atomic capability grants
//! - Folder creation scoped to the calling customer
//! - The four-stage milestone ledger with ordering and uniqueness checks
//! - Staff and customer folder listings
//!
//! # Examples
//!
//! ```no_run
//! use customs_domain::Actor;
//! use customs_engine::{ClearanceEngine, Collaborators, StaticAuthorizer};
//! use customs_store::{Sha256Credentials, SqliteStore};
//!
//! let store = SqliteStore::new("customs.db").unwrap();
//! let authz = StaticAuthorizer::new().grant_all("admin");
//! let mut engine = ClearanceEngine::new(store, Collaborators::new(authz, Sha256Credentials));
//!
//! let admin = Actor::staff("admin");
//! // engine.identity().create_customer(&admin, request)?;
//! ```

#![warn(missing_docs)]

mod authz;
mod config;
mod engine;
mod folders;
mod identity;
mod ledger;
mod notify;
mod query;

pub use authz::StaticAuthorizer;
pub use config::EngineConfig;
pub use engine::{ClearanceEngine, Collaborators};
pub use folders::{FolderDetail, FolderLifecycle};
pub use identity::IdentityRegistry;
pub use ledger::MilestoneLedger;
pub use notify::{SilentNotifier, TracingNotifier};
pub use query::QueryView;
