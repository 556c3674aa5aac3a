//! Read-side listings
//!
//! Both listings run their count and page queries inside one read
//! transaction so the total and the rows come from the same snapshot.

use crate::customers::{customer_from_row, CUSTOMER_COLUMNS};
use crate::folders::{folder_from_row, FOLDER_COLUMNS, FOLDER_COLUMN_COUNT};
use crate::{SqliteStore, StoreError};
use customs_domain::{
    Customer, CustomerQuery, CustomerSort, FolderQuery, FolderRow, FolderSort, Page, PageRequest,
};
use rusqlite::{Connection, ToSql};

const STATUS_RANK: &str = "CASE f.status WHEN 'OPEN' THEN 0 WHEN 'DECLARED' THEN 1 \
     WHEN 'LIQUIDATED' THEN 2 WHEN 'RECEIPTED' THEN 3 WHEN 'RELEASED' THEN 4 END";

const FOLDERS_FROM: &str = " FROM folders f
     JOIN customers c ON c.id = f.customer_id
     JOIN persons p ON p.id = c.person_id
     LEFT JOIN declarations d ON d.folder_id = f.id
     WHERE 1=1";

const CUSTOMERS_FROM: &str = " FROM customers c JOIN persons p ON p.id = c.person_id WHERE 1=1";

/// Filter clauses and their parameters, built up in order
#[derive(Default)]
struct Filter {
    sql: String,
    params: Vec<Box<dyn ToSql>>,
}

impl Filter {
    fn push(&mut self, clause: &str, value: impl ToSql + 'static) {
        self.sql.push_str(clause);
        self.params.push(Box::new(value));
    }

    /// Case-insensitive substring match of `needle` over any of `columns`
    fn search(&mut self, needle: &str, columns: &[&str]) {
        let needle = needle.to_lowercase();
        let clauses: Vec<String> = columns
            .iter()
            .map(|column| format!("instr(casefold({column}), ?) > 0"))
            .collect();
        self.sql.push_str(&format!(" AND ({})", clauses.join(" OR ")));
        for _ in columns {
            self.params.push(Box::new(needle.clone()));
        }
    }

    fn refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

fn count(conn: &Connection, from: &str, filter: &Filter) -> Result<u64, StoreError> {
    let sql = format!("SELECT COUNT(*){from}{}", filter.sql);
    let total: i64 = conn.query_row(&sql, &filter.refs()[..], |row| row.get(0))?;
    Ok(u64::try_from(total).unwrap_or_default())
}

fn page_clause(page: PageRequest) -> String {
    format!(" LIMIT {} OFFSET {}", page.per_page, page.offset())
}

fn folder_order(query: &FolderQuery) -> String {
    let column = match query.sort {
        FolderSort::Number => "f.number",
        FolderSort::ContainerNumber => "f.container_number",
        FolderSort::Weight => "f.weight",
        FolderSort::Harbor => "f.harbor",
        FolderSort::Status => STATUS_RANK,
        FolderSort::CreatedAt => "f.created_at",
        FolderSort::Customer => "c.regulatory_id",
    };
    let direction = query.direction.as_sql();
    format!(" ORDER BY {column} {direction}, f.id {direction}")
}

fn customer_order(query: &CustomerQuery) -> String {
    let direction = query.direction.as_sql();
    let columns = match query.sort {
        CustomerSort::RegulatoryId => format!("c.regulatory_id {direction}"),
        CustomerSort::Name => format!("p.last_name {direction}, p.first_name {direction}"),
        CustomerSort::Phone => format!("p.phone {direction}"),
        CustomerSort::Email => format!("p.email {direction}"),
        CustomerSort::Active => format!("p.active {direction}"),
        CustomerSort::CreatedAt => format!("c.created_at {direction}"),
    };
    format!(" ORDER BY {columns}, c.id {direction}")
}

impl SqliteStore {
    pub(crate) fn query_folders_snapshot(
        &self,
        query: &FolderQuery,
    ) -> Result<Page<FolderRow>, StoreError> {
        let mut filter = Filter::default();
        if let Some(status) = query.status {
            filter.push(" AND f.status = ?", status.as_str());
        }
        if let Some(customer_id) = query.customer_id {
            filter.push(" AND f.customer_id = ?", customer_id.to_bytes().to_vec());
        }
        if let Some(needle) = query.search_text() {
            filter.search(
                needle,
                &["f.number", "f.harbor", "f.container_number", "c.regulatory_id"],
            );
        }

        let tx = self.conn.unchecked_transaction()?;
        let total = count(&tx, FOLDERS_FROM, &filter)?;

        let sql = format!(
            "SELECT {FOLDER_COLUMNS}, c.regulatory_id, p.first_name, p.last_name, d.number{FOLDERS_FROM}{}{}{}",
            filter.sql,
            folder_order(query),
            page_clause(query.page),
        );
        let mut stmt = tx.prepare(&sql)?;
        let items = stmt
            .query_map(&filter.refs()[..], |row| {
                let n = FOLDER_COLUMN_COUNT;
                let first_name: String = row.get(n + 1)?;
                let last_name: String = row.get(n + 2)?;
                Ok(FolderRow {
                    folder: folder_from_row(row)?,
                    customer_regulatory_id: row.get(n)?,
                    customer_name: format!("{} {}", first_name, last_name),
                    declaration_number: row.get(n + 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        tx.commit()?;

        tracing::debug!(total, returned = items.len(), "folder listing");
        Ok(Page {
            items,
            total,
            page: query.page.page,
            per_page: query.page.per_page,
        })
    }

    pub(crate) fn query_customers_snapshot(
        &self,
        query: &CustomerQuery,
    ) -> Result<Page<Customer>, StoreError> {
        let mut filter = Filter::default();
        if let Some(active) = query.active {
            filter.push(" AND p.active = ?", active);
        }
        if let Some(needle) = query.search_text() {
            filter.search(
                needle,
                &["c.regulatory_id", "p.first_name", "p.last_name", "p.phone", "p.email"],
            );
        }

        let tx = self.conn.unchecked_transaction()?;
        let total = count(&tx, CUSTOMERS_FROM, &filter)?;

        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS}{CUSTOMERS_FROM}{}{}{}",
            filter.sql,
            customer_order(query),
            page_clause(query.page),
        );
        let mut stmt = tx.prepare(&sql)?;
        let items = stmt
            .query_map(&filter.refs()[..], customer_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        tx.commit()?;

        Ok(Page {
            items,
            total,
            page: query.page.page,
            per_page: query.page.per_page,
        })
    }
}
