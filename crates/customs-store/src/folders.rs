//! Folders

use crate::customers::load_customer;
use crate::rows::{id_column, status_column, taken};
use crate::{backstop, SqliteStore, StoreError};
use customs_domain::{CustomerId, CustomsError, Folder, FolderId, FolderStatus};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

/// Columns decoded by [`folder_from_row`]
pub(crate) const FOLDER_COLUMNS: &str =
    "f.id, f.number, f.weight, f.harbor, f.container_number, f.customer_id, f.status, f.created_at";

/// Number of columns in [`FOLDER_COLUMNS`]
pub(crate) const FOLDER_COLUMN_COUNT: usize = 8;

pub(crate) fn folder_from_row(row: &Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: id_column(row, 0, FolderId::from_bytes)?,
        number: row.get(1)?,
        weight: row.get(2)?,
        harbor: row.get(3)?,
        container_number: row.get(4)?,
        customer_id: id_column(row, 5, CustomerId::from_bytes)?,
        status: status_column(row, 6)?,
        created_at: row.get(7)?,
    })
}

pub(crate) fn load_folder(conn: &Connection, id: FolderId) -> Result<Option<Folder>, StoreError> {
    let folder = conn
        .query_row(
            &format!("SELECT {FOLDER_COLUMNS} FROM folders f WHERE f.id = ?1"),
            params![id.to_bytes().to_vec()],
            folder_from_row,
        )
        .optional()?;
    Ok(folder)
}

/// Write the derived status cache of a folder
///
/// Only called from inside a declaration write transaction. The
/// `folders_status_forward_only` trigger refuses regressions.
pub(crate) fn refresh_status(
    conn: &Connection,
    id: FolderId,
    status: FolderStatus,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE folders SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.to_bytes().to_vec()],
    )?;
    Ok(())
}

impl SqliteStore {
    pub(crate) fn insert_folder_tx(&mut self, folder: &Folder) -> Result<(), StoreError> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let customer = load_customer(&tx, folder.customer_id)?
            .ok_or_else(|| CustomsError::not_found("customer", folder.customer_id))?;
        if !customer.active {
            return Err(CustomsError::Validation(format!(
                "customer {} is deactivated and cannot receive new folders",
                customer.regulatory_id
            ))
            .into());
        }
        if taken(&tx, "folders", "number", &folder.number, None)? {
            return Err(CustomsError::conflict("number", &folder.number).into());
        }

        tx.execute(
            "INSERT INTO folders (id, number, weight, harbor, container_number, customer_id, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                folder.id.to_bytes().to_vec(),
                &folder.number,
                folder.weight,
                &folder.harbor,
                &folder.container_number,
                folder.customer_id.to_bytes().to_vec(),
                folder.status.as_str(),
                folder.created_at,
            ],
        )
        .map_err(|e| backstop(e, &[("folders.number", "number", &folder.number)]))?;

        tx.commit()?;
        Ok(())
    }
}
