//! Declarations and their milestone stages
//!
//! Each stage write loads the current record inside an immediate
//! transaction, lets the domain decide whether the stage may be recorded,
//! then writes the stage columns and the folder status together.

use crate::folders::{load_folder, refresh_status};
use crate::rows::{document_column, id_column, taken};
use crate::{backstop, SqliteStore, StoreError};
use chrono::{DateTime, NaiveDate, Utc};
use customs_domain::{
    CustomsError, Declaration, DeclarationFiling, DeclarationId, DocumentRef, FolderId,
    Liquidation, Receipt, ReleaseOrder, Stage,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const DECLARATION_COLUMNS: &str = "id, folder_id, number, date, destination_office, verifier, \
     file_path, liquidation_bulletin, liquidation_date, liquidation_file_path, receipt_number, \
     receipt_date, receipt_file_path, bon_number, bon_date, bon_file_path, created_at, updated_at";

/// A stage is present when both its key and its date are stored
fn stage_columns(
    row: &Row<'_>,
    key: usize,
) -> rusqlite::Result<Option<(String, NaiveDate, Option<DocumentRef>)>> {
    let reference: Option<String> = row.get(key)?;
    let date: Option<NaiveDate> = row.get(key + 1)?;
    let document = document_column(row, key + 2)?;
    Ok(reference.zip(date).map(|(reference, date)| (reference, date, document)))
}

fn declaration_from_row(row: &Row<'_>) -> rusqlite::Result<Declaration> {
    Ok(Declaration {
        id: id_column(row, 0, DeclarationId::from_bytes)?,
        folder_id: id_column(row, 1, FolderId::from_bytes)?,
        filing: DeclarationFiling {
            number: row.get(2)?,
            date: row.get(3)?,
            destination_office: row.get(4)?,
            verifier: row.get(5)?,
            document_ref: document_column(row, 6)?,
        },
        liquidation: stage_columns(row, 7)?.map(|(bulletin, date, document_ref)| Liquidation {
            bulletin,
            date,
            document_ref,
        }),
        receipt: stage_columns(row, 10)?.map(|(number, date, document_ref)| Receipt {
            number,
            date,
            document_ref,
        }),
        release_order: stage_columns(row, 13)?.map(|(number, date, document_ref)| ReleaseOrder {
            number,
            date,
            document_ref,
        }),
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

pub(crate) fn load_declaration(
    conn: &Connection,
    folder_id: FolderId,
) -> Result<Option<Declaration>, StoreError> {
    let declaration = conn
        .query_row(
            &format!("SELECT {DECLARATION_COLUMNS} FROM declarations WHERE folder_id = ?1"),
            params![folder_id.to_bytes().to_vec()],
            declaration_from_row,
        )
        .optional()?;
    Ok(declaration)
}

fn document_text(document: Option<&DocumentRef>) -> Option<&str> {
    document.map(DocumentRef::as_str)
}

/// Write stages 2 to 4 of a declaration back to its row
fn persist_stages(tx: &Transaction<'_>, declaration: &Declaration) -> rusqlite::Result<usize> {
    let liquidation = declaration.liquidation.as_ref();
    let receipt = declaration.receipt.as_ref();
    let order = declaration.release_order.as_ref();
    tx.execute(
        "UPDATE declarations SET
             liquidation_bulletin = ?1, liquidation_date = ?2, liquidation_file_path = ?3,
             receipt_number = ?4, receipt_date = ?5, receipt_file_path = ?6,
             bon_number = ?7, bon_date = ?8, bon_file_path = ?9,
             updated_at = ?10
         WHERE id = ?11",
        params![
            liquidation.map(|l| l.bulletin.as_str()),
            liquidation.map(|l| l.date),
            liquidation.and_then(|l| document_text(l.document_ref.as_ref())),
            receipt.map(|r| r.number.as_str()),
            receipt.map(|r| r.date),
            receipt.and_then(|r| document_text(r.document_ref.as_ref())),
            order.map(|b| b.number.as_str()),
            order.map(|b| b.date),
            order.and_then(|b| document_text(b.document_ref.as_ref())),
            declaration.updated_at,
            declaration.id.to_bytes().to_vec(),
        ],
    )
}

/// Globally unique key a stage write has to claim
struct UniqueKey<'a> {
    column: &'static str,
    field: &'static str,
    value: &'a str,
}

impl SqliteStore {
    pub(crate) fn file_declaration_tx(
        &mut self,
        folder_id: FolderId,
        filing: &DeclarationFiling,
        now: DateTime<Utc>,
    ) -> Result<Declaration, StoreError> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let folder =
            load_folder(&tx, folder_id)?.ok_or_else(|| CustomsError::not_found("folder", folder_id))?;
        if let Some(existing) = load_declaration(&tx, folder_id)? {
            return Err(CustomsError::Validation(format!(
                "folder {} already has declaration {}",
                folder.number, existing.filing.number
            ))
            .into());
        }
        if taken(&tx, "declarations", "number", &filing.number, None)? {
            return Err(CustomsError::conflict("number", &filing.number).into());
        }

        let declaration = Declaration::file(folder_id, filing.clone(), now);
        tx.execute(
            &format!(
                "INSERT INTO declarations ({DECLARATION_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, ?8, ?9)"
            ),
            params![
                declaration.id.to_bytes().to_vec(),
                folder_id.to_bytes().to_vec(),
                &filing.number,
                filing.date,
                &filing.destination_office,
                &filing.verifier,
                document_text(filing.document_ref.as_ref()),
                declaration.created_at,
                declaration.updated_at,
            ],
        )
        .map_err(|e| backstop(e, &[("declarations.number", "number", &filing.number)]))?;

        refresh_status(&tx, folder_id, declaration.status())?;
        tx.commit()?;

        tracing::info!(folder = %folder.number, number = %filing.number, "declaration filed");
        Ok(declaration)
    }

    pub(crate) fn record_liquidation_tx(
        &mut self,
        folder_id: FolderId,
        liquidation: &Liquidation,
        now: DateTime<Utc>,
    ) -> Result<Declaration, StoreError> {
        self.write_stage(folder_id, Stage::Liquidation, None, |declaration| {
            declaration.record_liquidation(liquidation.clone(), now)
        })
    }

    pub(crate) fn record_receipt_tx(
        &mut self,
        folder_id: FolderId,
        receipt: &Receipt,
        now: DateTime<Utc>,
    ) -> Result<Declaration, StoreError> {
        let key = UniqueKey {
            column: "declarations.receipt_number",
            field: "receipt_number",
            value: &receipt.number,
        };
        self.write_stage(folder_id, Stage::Receipt, Some(key), |declaration| {
            declaration.record_receipt(receipt.clone(), now)
        })
    }

    pub(crate) fn record_release_order_tx(
        &mut self,
        folder_id: FolderId,
        order: &ReleaseOrder,
        now: DateTime<Utc>,
    ) -> Result<Declaration, StoreError> {
        let key = UniqueKey {
            column: "declarations.bon_number",
            field: "bon_number",
            value: &order.number,
        };
        self.write_stage(folder_id, Stage::ReleaseOrder, Some(key), |declaration| {
            declaration.record_release_order(order.clone(), now)
        })
    }

    /// Record one stage of a folder's declaration
    ///
    /// Checks run in this order: folder exists, previous stage complete,
    /// stage not yet recorded, key not used by another declaration.
    fn write_stage<F>(
        &mut self,
        folder_id: FolderId,
        stage: Stage,
        key: Option<UniqueKey<'_>>,
        record: F,
    ) -> Result<Declaration, StoreError>
    where
        F: FnOnce(&mut Declaration) -> customs_domain::Result<()>,
    {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let folder =
            load_folder(&tx, folder_id)?.ok_or_else(|| CustomsError::not_found("folder", folder_id))?;
        let mut declaration =
            load_declaration(&tx, folder_id)?.ok_or_else(|| stage.missing_predecessor())?;
        declaration.check_recordable(stage)?;

        if let Some(key) = &key {
            let column = key.column.trim_start_matches("declarations.");
            if taken(&tx, "declarations", column, key.value, None)? {
                return Err(CustomsError::conflict(key.field, key.value).into());
            }
        }

        record(&mut declaration)?;
        let candidates: Vec<(&str, &str, &str)> = key
            .iter()
            .map(|k| (k.column, k.field, k.value))
            .collect();
        persist_stages(&tx, &declaration).map_err(|e| backstop(e, &candidates))?;

        refresh_status(&tx, folder_id, declaration.status())?;
        tx.commit()?;

        tracing::info!(
            folder = %folder.number,
            %stage,
            reference = %declaration.stage_reference(stage).unwrap_or_default(),
            status = %declaration.status(),
            "milestone recorded"
        );
        Ok(declaration)
    }
}
