//! Command implementations.

pub mod customer;
pub mod declaration;
pub mod folder;

pub use self::customer::execute_customer;
pub use self::declaration::execute_declaration;
pub use self::folder::execute_folder;

use crate::cli::{Command, PageArgs};
use crate::error::Result;
use crate::output::Formatter;
use customs_domain::{Actor, PageRequest};
use customs_engine::ClearanceEngine;
use customs_store::SqliteStore;
use std::path::PathBuf;

/// Everything a command needs to run.
pub struct Session {
    /// Engine over the configured database
    pub engine: ClearanceEngine<SqliteStore>,
    /// Who the command runs as
    pub actor: Actor,
    /// Output formatter
    pub formatter: Formatter,
    /// Where attached documents are copied
    pub documents_dir: PathBuf,
}

impl Session {
    /// Page request for a listing, using the configured page size when
    /// `--per-page` is absent.
    pub(crate) fn page_request(&self, args: &PageArgs) -> PageRequest {
        let per_page = args
            .per_page
            .unwrap_or(self.engine.config().default_per_page);
        PageRequest::new(args.page, per_page)
    }
}

/// Dispatch a parsed command.
pub fn execute(command: Command, session: &mut Session) -> Result<()> {
    match command {
        Command::Customer { action } => execute_customer(action, session),
        Command::Folder { action } => execute_folder(action, session),
        Command::Declaration { action } => execute_declaration(action, session),
    }
}
