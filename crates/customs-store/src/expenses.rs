//! Expenses

use crate::rows::{exists, id_column};
use crate::{SqliteStore, StoreError};
use customs_domain::{CustomsError, Expense, ExpenseId, FolderId};
use rusqlite::{params, Connection, Row, TransactionBehavior};

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: id_column(row, 0, ExpenseId::from_bytes)?,
        folder_id: id_column(row, 1, FolderId::from_bytes)?,
        kind: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) fn load_expenses(conn: &Connection, folder_id: FolderId) -> Result<Vec<Expense>, StoreError> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, folder_id, type, amount, description, created_at
         FROM expenses WHERE folder_id = ?1 ORDER BY created_at, id",
    )?;
    let expenses = stmt
        .query_map(params![folder_id.to_bytes().to_vec()], expense_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(expenses)
}

impl SqliteStore {
    pub(crate) fn insert_expense_tx(&mut self, expense: &Expense) -> Result<(), StoreError> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let folder = expense.folder_id.to_bytes().to_vec();
        if !exists(&tx, "SELECT 1 FROM folders WHERE id = ?1", params![folder])? {
            return Err(CustomsError::not_found("folder", expense.folder_id).into());
        }

        tx.execute(
            "INSERT INTO expenses (id, folder_id, type, amount, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                expense.id.to_bytes().to_vec(),
                folder,
                &expense.kind,
                expense.amount,
                &expense.description,
                expense.created_at,
            ],
        )?;

        tx.commit()?;
        tracing::info!(
            folder = %expense.folder_id,
            expense = %expense.id,
            kind = %expense.kind,
            "expense recorded"
        );
        Ok(())
    }
}
