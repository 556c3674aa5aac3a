//! Customer module - the identity records folders belong to

use crate::error::Result;
use crate::validation::{self, REFERENCE_MAX, TEXT_MAX};
use crate::{CustomerId, PersonId};
use chrono::{DateTime, Utc};

/// Contact profile of the person behind a customer account
///
/// Phone and e-mail are globally unique across all persons.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonProfile {
    /// Unique identifier
    pub id: PersonId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Phone number (globally unique)
    pub phone: String,
    /// E-mail address (globally unique, case-insensitive)
    pub email: String,
    /// Postal address
    pub address: Option<String>,
}

impl PersonProfile {
    /// "First Last", as shown in listings
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A customer of the agency, identified by its regulatory id (NIF)
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    /// Unique identifier
    pub id: CustomerId,
    /// Externally issued taxpayer/customs identifier (globally unique)
    pub regulatory_id: String,
    /// Linked person profile, always present
    pub person: PersonProfile,
    /// Soft lifecycle flag; customers are never deleted
    pub active: bool,
    /// When the customer was onboarded
    pub created_at: DateTime<Utc>,
}

/// Person fields supplied at onboarding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonFields {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Phone number
    pub phone: String,
    /// E-mail address
    pub email: String,
    /// Postal address
    pub address: Option<String>,
}

impl PersonFields {
    fn validate(&self) -> Result<Self> {
        Ok(Self {
            first_name: validation::required("first_name", &self.first_name, TEXT_MAX)?,
            last_name: validation::required("last_name", &self.last_name, TEXT_MAX)?,
            phone: validation::required("phone", &self.phone, REFERENCE_MAX)?,
            email: validation::email("email", &self.email)?,
            address: validation::optional("address", self.address.as_deref(), TEXT_MAX)?,
        })
    }
}

/// Onboarding request for a new customer
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    /// Regulatory identifier (NIF)
    pub regulatory_id: String,
    /// Person profile fields
    pub person: PersonFields,
    /// Initial credential; hashed before it reaches storage
    pub credential: String,
}

impl NewCustomer {
    /// Check and normalize the request's identity fields
    ///
    /// The credential is left untouched; its policy belongs to the engine.
    pub fn validate(&self) -> Result<Self> {
        Ok(Self {
            regulatory_id: validation::required(
                "regulatory_id",
                &self.regulatory_id,
                REFERENCE_MAX,
            )?,
            person: self.person.validate()?,
            credential: self.credential.clone(),
        })
    }

    /// Build the customer record for an already validated request
    pub fn into_customer(self, created_at: DateTime<Utc>) -> Customer {
        Customer {
            id: CustomerId::new(),
            regulatory_id: self.regulatory_id,
            person: PersonProfile {
                id: PersonId::new(),
                first_name: self.person.first_name,
                last_name: self.person.last_name,
                phone: self.person.phone,
                email: self.person.email,
                address: self.person.address,
            },
            active: true,
            created_at,
        }
    }
}

/// Partial update of a person profile; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonPatch {
    /// New given name
    pub first_name: Option<String>,
    /// New family name
    pub last_name: Option<String>,
    /// New phone number
    pub phone: Option<String>,
    /// New e-mail address
    pub email: Option<String>,
    /// New address; `Some(None)` clears it
    pub address: Option<Option<String>>,
}

/// Edit request for an existing customer
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    /// New regulatory identifier
    pub regulatory_id: Option<String>,
    /// Person profile changes
    pub person: PersonPatch,
    /// Replacement credential, applied only when non-empty
    pub credential: Option<String>,
}

impl CustomerUpdate {
    /// The replacement credential, if one was actually supplied
    pub fn new_credential(&self) -> Option<&str> {
        self.credential.as_deref().filter(|c| !c.is_empty())
    }
}

impl Customer {
    /// Apply an update, returning the validated new state
    ///
    /// Identity, activity flag and creation time are never changed here.
    pub fn apply(&self, update: &CustomerUpdate) -> Result<Customer> {
        let patch = &update.person;
        let fields = PersonFields {
            first_name: patch
                .first_name
                .clone()
                .unwrap_or_else(|| self.person.first_name.clone()),
            last_name: patch
                .last_name
                .clone()
                .unwrap_or_else(|| self.person.last_name.clone()),
            phone: patch.phone.clone().unwrap_or_else(|| self.person.phone.clone()),
            email: patch.email.clone().unwrap_or_else(|| self.person.email.clone()),
            address: match &patch.address {
                Some(address) => address.clone(),
                None => self.person.address.clone(),
            },
        }
        .validate()?;

        let regulatory_id = match &update.regulatory_id {
            Some(nif) => validation::required("regulatory_id", nif, REFERENCE_MAX)?,
            None => self.regulatory_id.clone(),
        };

        Ok(Customer {
            id: self.id,
            regulatory_id,
            person: PersonProfile {
                id: self.person.id,
                first_name: fields.first_name,
                last_name: fields.last_name,
                phone: fields.phone,
                email: fields.email,
                address: fields.address,
            },
            active: self.active,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NewCustomer {
        NewCustomer {
            regulatory_id: " C-001 ".to_string(),
            person: PersonFields {
                first_name: "Awa".to_string(),
                last_name: "Diop".to_string(),
                phone: "+221 77 000 00 01".to_string(),
                email: "awa@transit.sn".to_string(),
                address: Some(" ".to_string()),
            },
            credential: "s3cret-pass".to_string(),
        }
    }

    #[test]
    fn test_validate_normalizes() {
        let valid = request().validate().unwrap();
        assert_eq!(valid.regulatory_id, "C-001");
        assert_eq!(valid.person.address, None);
        assert_eq!(valid.credential, "s3cret-pass");
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let mut req = request();
        req.person.last_name = String::new();
        assert!(req.validate().is_err());

        let mut req = request();
        req.regulatory_id = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_into_customer_is_active() {
        let customer = request().validate().unwrap().into_customer(Utc::now());
        assert!(customer.active);
        assert_eq!(customer.person.full_name(), "Awa Diop");
    }

    #[test]
    fn test_apply_patch_keeps_identity() {
        let customer = request().validate().unwrap().into_customer(Utc::now());
        let update = CustomerUpdate {
            regulatory_id: None,
            person: PersonPatch {
                phone: Some("+221 77 000 00 02".to_string()),
                address: Some(Some("Dakar".to_string())),
                ..Default::default()
            },
            credential: Some(String::new()),
        };

        let updated = customer.apply(&update).unwrap();
        assert_eq!(updated.id, customer.id);
        assert_eq!(updated.person.id, customer.person.id);
        assert_eq!(updated.regulatory_id, "C-001");
        assert_eq!(updated.person.phone, "+221 77 000 00 02");
        assert_eq!(updated.person.address.as_deref(), Some("Dakar"));
        assert_eq!(update.new_credential(), None);
    }

    #[test]
    fn test_apply_rejects_invalid_email() {
        let customer = request().validate().unwrap().into_customer(Utc::now());
        let update = CustomerUpdate {
            person: PersonPatch {
                email: Some("not-an-email".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(customer.apply(&update).is_err());
    }
}
