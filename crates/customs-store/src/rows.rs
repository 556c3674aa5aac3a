//! Row decoding helpers shared by the table modules

use customs_domain::{DocumentRef, FolderStatus};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row, ToSql};

/// Decode a 16-byte BLOB id column
pub(crate) fn id_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&[u8]) -> Result<T, String>,
) -> rusqlite::Result<T> {
    let bytes: Vec<u8> = row.get(idx)?;
    parse(&bytes).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Blob, e.into()))
}

/// Decode a status column
pub(crate) fn status_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<FolderStatus> {
    let text: String = row.get(idx)?;
    FolderStatus::parse(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("Unknown folder status: {}", text).into(),
        )
    })
}

/// Decode an optional document reference column
pub(crate) fn document_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DocumentRef>> {
    let value: Option<String> = row.get(idx)?;
    Ok(value.map(DocumentRef::new))
}

/// Whether a single-parameter lookup query returns a row
pub(crate) fn exists(conn: &Connection, sql: &str, args: &[&dyn ToSql]) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare_cached(sql)?;
    stmt.exists(args)
}

/// Whether `value` is already taken in `table.column`, ignoring the row whose
/// primary key is `except`
pub(crate) fn taken(
    conn: &Connection,
    table: &str,
    column: &str,
    value: &str,
    except: Option<&[u8]>,
) -> rusqlite::Result<bool> {
    match except {
        Some(id) => exists(
            conn,
            &format!("SELECT 1 FROM {table} WHERE {column} = ?1 AND id <> ?2"),
            params![value, id],
        ),
        None => exists(
            conn,
            &format!("SELECT 1 FROM {table} WHERE {column} = ?1"),
            params![value],
        ),
    }
}

/// Whether an e-mail is already taken, compared after Unicode case folding
pub(crate) fn email_taken(conn: &Connection, email: &str, except: Option<&[u8]>) -> rusqlite::Result<bool> {
    let folded = email.to_lowercase();
    match except {
        Some(id) => exists(
            conn,
            "SELECT 1 FROM persons WHERE casefold(email) = ?1 AND id <> ?2",
            params![folded, id],
        ),
        None => exists(
            conn,
            "SELECT 1 FROM persons WHERE casefold(email) = ?1",
            params![folded],
        ),
    }
}
