//! Customers and their person profiles

use crate::rows::{email_taken, id_column, taken};
use crate::{backstop, SqliteStore, StoreError};
use customs_domain::{
    Capability, Customer, CustomerId, CustomerUpdate, CustomsError, PersonId, PersonProfile,
};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

/// Columns decoded by [`customer_from_row`]
pub(crate) const CUSTOMER_COLUMNS: &str = "c.id, c.regulatory_id, c.created_at, p.id, p.first_name, \
     p.last_name, p.phone, p.email, p.address, p.active";

pub(crate) fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: id_column(row, 0, CustomerId::from_bytes)?,
        regulatory_id: row.get(1)?,
        created_at: row.get(2)?,
        person: PersonProfile {
            id: id_column(row, 3, PersonId::from_bytes)?,
            first_name: row.get(4)?,
            last_name: row.get(5)?,
            phone: row.get(6)?,
            email: row.get(7)?,
            address: row.get(8)?,
        },
        active: row.get(9)?,
    })
}

pub(crate) fn load_customer(conn: &Connection, id: CustomerId) -> Result<Option<Customer>, StoreError> {
    let customer = conn
        .query_row(
            &format!(
                "SELECT {CUSTOMER_COLUMNS} FROM customers c JOIN persons p ON p.id = c.person_id
                 WHERE c.id = ?1"
            ),
            params![id.to_bytes().to_vec()],
            customer_from_row,
        )
        .optional()?;
    Ok(customer)
}

pub(crate) fn load_capabilities(
    conn: &Connection,
    person_id: PersonId,
) -> Result<Vec<Capability>, StoreError> {
    let mut stmt = conn.prepare_cached(
        "SELECT capability FROM person_capabilities WHERE person_id = ?1 ORDER BY capability",
    )?;
    let names = stmt
        .query_map(params![person_id.to_bytes().to_vec()], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    names
        .iter()
        .map(|name| {
            Capability::parse(name)
                .ok_or_else(|| StoreError::InvalidData(format!("Unknown capability: {}", name)))
        })
        .collect()
}

pub(crate) fn load_credential_hash(
    conn: &Connection,
    person_id: PersonId,
) -> Result<Option<String>, StoreError> {
    let hash = conn
        .query_row(
            "SELECT credential_hash FROM persons WHERE id = ?1",
            params![person_id.to_bytes().to_vec()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hash)
}

/// Reject values already held by another customer or person
///
/// `own` carries the customer's and person's ids on updates so that the
/// record never conflicts with itself.
fn check_identity_unique(
    conn: &Connection,
    customer: &Customer,
    own: Option<(&[u8], &[u8])>,
) -> Result<(), StoreError> {
    let (own_customer, own_person) = match own {
        Some((c, p)) => (Some(c), Some(p)),
        None => (None, None),
    };
    if taken(conn, "customers", "regulatory_id", &customer.regulatory_id, own_customer)? {
        return Err(CustomsError::conflict("regulatory_id", &customer.regulatory_id).into());
    }
    if taken(conn, "persons", "phone", &customer.person.phone, own_person)? {
        return Err(CustomsError::conflict("phone", &customer.person.phone).into());
    }
    if email_taken(conn, &customer.person.email, own_person)? {
        return Err(CustomsError::conflict("email", &customer.person.email).into());
    }
    Ok(())
}

fn identity_candidates(customer: &Customer) -> [(&str, &str, &str); 3] {
    [
        ("customers.regulatory_id", "regulatory_id", customer.regulatory_id.as_str()),
        ("persons.phone", "phone", customer.person.phone.as_str()),
        ("persons.email", "email", customer.person.email.as_str()),
    ]
}

impl SqliteStore {
    pub(crate) fn insert_customer_tx(
        &mut self,
        customer: &Customer,
        credential_hash: &str,
        grants: &[Capability],
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        check_identity_unique(&tx, customer, None)?;

        let person_key = customer.person.id.to_bytes().to_vec();
        let candidates = identity_candidates(customer);
        tx.execute(
            "INSERT INTO persons (id, first_name, last_name, phone, email, address, credential_hash, active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &person_key,
                &customer.person.first_name,
                &customer.person.last_name,
                &customer.person.phone,
                &customer.person.email,
                &customer.person.address,
                credential_hash,
                customer.active,
                customer.created_at,
            ],
        )
        .map_err(|e| backstop(e, &candidates))?;

        tx.execute(
            "INSERT INTO customers (id, regulatory_id, person_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                customer.id.to_bytes().to_vec(),
                &customer.regulatory_id,
                &person_key,
                customer.created_at,
            ],
        )
        .map_err(|e| backstop(e, &candidates))?;

        // Granted once, here; updates never touch person_capabilities
        for capability in grants {
            tx.execute(
                "INSERT OR IGNORE INTO person_capabilities (person_id, capability, granted_at)
                 VALUES (?1, ?2, ?3)",
                params![&person_key, capability.as_str(), customer.created_at],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub(crate) fn update_customer_tx(
        &mut self,
        id: CustomerId,
        update: &CustomerUpdate,
        credential_hash: Option<&str>,
    ) -> Result<Customer, StoreError> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing =
            load_customer(&tx, id)?.ok_or_else(|| CustomsError::not_found("customer", id))?;
        let updated = existing.apply(update)?;

        let customer_key = id.to_bytes().to_vec();
        let person_key = existing.person.id.to_bytes().to_vec();
        check_identity_unique(
            &tx,
            &updated,
            Some((customer_key.as_slice(), person_key.as_slice())),
        )?;

        let candidates = identity_candidates(&updated);
        tx.execute(
            "UPDATE persons SET first_name = ?1, last_name = ?2, phone = ?3, email = ?4, address = ?5
             WHERE id = ?6",
            params![
                &updated.person.first_name,
                &updated.person.last_name,
                &updated.person.phone,
                &updated.person.email,
                &updated.person.address,
                &person_key,
            ],
        )
        .map_err(|e| backstop(e, &candidates))?;

        if let Some(hash) = credential_hash {
            tx.execute(
                "UPDATE persons SET credential_hash = ?1 WHERE id = ?2",
                params![hash, &person_key],
            )?;
        }

        tx.execute(
            "UPDATE customers SET regulatory_id = ?1 WHERE id = ?2",
            params![&updated.regulatory_id, &customer_key],
        )
        .map_err(|e| backstop(e, &candidates))?;

        tx.commit()?;
        Ok(updated)
    }

    pub(crate) fn set_customer_active_tx(
        &mut self,
        id: CustomerId,
        active: bool,
    ) -> Result<Customer, StoreError> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut customer =
            load_customer(&tx, id)?.ok_or_else(|| CustomsError::not_found("customer", id))?;

        tx.execute(
            "UPDATE persons SET active = ?1 WHERE id = ?2",
            params![active, customer.person.id.to_bytes().to_vec()],
        )?;
        tx.commit()?;

        customer.active = active;
        tracing::debug!(customer = %id, active, "customer activity changed");
        Ok(customer)
    }
}
