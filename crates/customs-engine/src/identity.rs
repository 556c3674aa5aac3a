//! Customer onboarding and maintenance

use crate::ClearanceEngine;
use chrono::Utc;
use customs_domain::traits::CustomsStore;
use customs_domain::{
    Actor, Capability, Customer, CustomerId, CustomerUpdate, CustomsError, NewCustomer, Result,
    ONBOARDING_CAPABILITIES,
};

/// Customers, their person profiles and credentials
pub struct IdentityRegistry<'e, S: CustomsStore> {
    pub(crate) engine: &'e mut ClearanceEngine<S>,
}

impl<S: CustomsStore> IdentityRegistry<'_, S> {
    /// Onboard a customer
    ///
    /// The customer, its person profile, the hashed credential and the
    /// onboarding capability grants are written in one transaction.
    pub fn create_customer(&mut self, actor: &Actor, request: NewCustomer) -> Result<Customer> {
        let result = self.try_create(actor, request);
        self.engine
            .announce(result, |c| format!("Customer {} created", c.regulatory_id))
    }

    fn try_create(&mut self, actor: &Actor, request: NewCustomer) -> Result<Customer> {
        self.engine.require(Capability::CreateCustomer, actor)?;
        let request = request.validate()?;
        self.check_credential(&request.credential)?;

        let hash = self.engine.services.credentials.hash(&request.credential)?;
        let customer = request.into_customer(Utc::now());
        self.engine
            .store
            .insert_customer(&customer, &hash, &ONBOARDING_CAPABILITIES)?;

        tracing::info!(
            customer = %customer.id,
            regulatory_id = %customer.regulatory_id,
            by = %actor.principal,
            "customer created"
        );
        Ok(customer)
    }

    /// Edit a customer's identity fields and optionally its credential
    ///
    /// Capability grants are never touched.
    pub fn update_customer(
        &mut self,
        actor: &Actor,
        id: CustomerId,
        update: CustomerUpdate,
    ) -> Result<Customer> {
        let result = self.try_update(actor, id, update);
        self.engine
            .announce(result, |c| format!("Customer {} updated", c.regulatory_id))
    }

    fn try_update(&mut self, actor: &Actor, id: CustomerId, update: CustomerUpdate) -> Result<Customer> {
        self.engine.require(Capability::EditCustomer, actor)?;

        let hash = match update.new_credential() {
            Some(secret) => {
                self.check_credential(secret)?;
                Some(self.engine.services.credentials.hash(secret)?)
            }
            None => None,
        };
        let customer = self
            .engine
            .store
            .update_customer(id, &update, hash.as_deref())?;

        tracing::info!(
            customer = %id,
            credential_changed = hash.is_some(),
            by = %actor.principal,
            "customer updated"
        );
        Ok(customer)
    }

    /// Deactivate or reactivate a customer
    ///
    /// Deactivated customers keep their folders but cannot receive new ones.
    pub fn set_customer_active(&mut self, actor: &Actor, id: CustomerId, active: bool) -> Result<Customer> {
        let result = self
            .engine
            .require(Capability::EditCustomer, actor)
            .and_then(|_| self.engine.store.set_customer_active(id, active));
        self.engine.announce(result, |c| {
            let state = if c.active { "reactivated" } else { "deactivated" };
            format!("Customer {} {}", c.regulatory_id, state)
        })
    }

    /// Read one customer
    ///
    /// Needs `view-customer`, except that a customer actor may always read
    /// its own record.
    pub fn find_by_id(&self, actor: &Actor, id: CustomerId) -> Result<Customer> {
        self.check_view(actor, id)?;
        self.engine
            .store
            .get_customer(id)?
            .ok_or_else(|| CustomsError::not_found("customer", id))
    }

    /// Capabilities granted to the customer's person
    pub fn granted_capabilities(&self, actor: &Actor, id: CustomerId) -> Result<Vec<Capability>> {
        let customer = self.find_by_id(actor, id)?;
        self.engine.store.granted_capabilities(customer.person.id)
    }

    /// Check a secret against the customer's stored credential
    pub fn verify_credential(&self, actor: &Actor, id: CustomerId, secret: &str) -> Result<bool> {
        let customer = self.find_by_id(actor, id)?;
        let hash = self.engine.store.credential_hash(customer.person.id)?;
        Ok(hash.is_some_and(|hash| self.engine.services.credentials.verify(secret, &hash)))
    }

    fn check_view(&self, actor: &Actor, id: CustomerId) -> Result<()> {
        if actor.customer_id == Some(id) {
            return Ok(());
        }
        self.engine.require(Capability::ViewCustomer, actor)
    }

    fn check_credential(&self, secret: &str) -> Result<()> {
        let min = self.engine.config.min_credential_length;
        if secret.chars().count() < min {
            return Err(CustomsError::Validation(format!(
                "credential must be at least {} characters",
                min
            )));
        }
        Ok(())
    }
}
