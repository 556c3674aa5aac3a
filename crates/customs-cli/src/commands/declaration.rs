//! Declaration command implementation.

use super::Session;
use crate::cli::{DeclarationAction, FileDeclarationArgs};
use crate::error::{CliError, Result};
use chrono::{Local, NaiveDate};
use customs_domain::traits::DocumentStore;
use customs_domain::{Declaration, DeclarationFiling, DocumentRef, Liquidation, Receipt, ReleaseOrder};
use customs_store::FsDocumentStore;
use std::fs;
use std::path::Path;

/// Execute a declaration command.
pub fn execute_declaration(action: DeclarationAction, session: &mut Session) -> Result<()> {
    let declaration = match action {
        DeclarationAction::File(args) => file(args, session)?,
        DeclarationAction::Liquidate(args) => {
            let liquidation = Liquidation {
                bulletin: args.reference.clone(),
                date: stage_date(args.date),
                document_ref: attach(args.document.as_deref(), session)?,
            };
            session
                .engine
                .ledger()
                .record_liquidation(&session.actor, args.folder, liquidation)?
        }
        DeclarationAction::Receipt(args) => {
            let receipt = Receipt {
                number: args.reference.clone(),
                date: stage_date(args.date),
                document_ref: attach(args.document.as_deref(), session)?,
            };
            session
                .engine
                .ledger()
                .record_receipt(&session.actor, args.folder, receipt)?
        }
        DeclarationAction::Release(args) => {
            let order = ReleaseOrder {
                number: args.reference.clone(),
                date: stage_date(args.date),
                document_ref: attach(args.document.as_deref(), session)?,
            };
            session
                .engine
                .ledger()
                .record_release_order(&session.actor, args.folder, order)?
        }
        DeclarationAction::Show { folder } => {
            session.engine.ledger().get_by_folder(&session.actor, folder)?
        }
    };

    println!("{}", session.formatter.format_declaration(&declaration)?);
    Ok(())
}

fn file(args: FileDeclarationArgs, session: &mut Session) -> Result<Declaration> {
    let filing = DeclarationFiling {
        number: args.number,
        date: stage_date(args.date),
        destination_office: args.office,
        verifier: args.verifier,
        document_ref: attach(args.document.as_deref(), session)?,
    };
    Ok(session
        .engine
        .ledger()
        .file_declaration(&session.actor, args.folder, filing)?)
}

fn stage_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Copy a scanned document into the document store.
///
/// Documents are stored before the milestone is recorded, so a rejected
/// milestone can leave an unreferenced file behind.
fn attach(path: Option<&Path>, session: &Session) -> Result<Option<DocumentRef>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::InvalidInput(format!("Invalid document path: {}", path.display())))?;
    let contents = fs::read(path)?;

    let store = FsDocumentStore::new(&session.documents_dir)?;
    let reference = store.store(file_name, &contents)?;
    tracing::debug!(document = %reference, source = %path.display(), "document attached");
    Ok(Some(reference))
}
