//! Read-only listings

use crate::ClearanceEngine;
use customs_domain::traits::CustomsStore;
use customs_domain::{
    Actor, Capability, Customer, CustomerQuery, CustomsError, FolderQuery, FolderRow, Page, Result,
};

/// Paginated folder and customer listings
pub struct QueryView<'e, S: CustomsStore> {
    pub(crate) engine: &'e ClearanceEngine<S>,
}

impl<S: CustomsStore> QueryView<'_, S> {
    /// Back-office folder listing
    pub fn staff_view(&self, actor: &Actor, query: FolderQuery) -> Result<Page<FolderRow>> {
        self.engine.require(Capability::ViewFolder, actor)?;
        if actor.is_customer() {
            return Err(forbidden(Capability::ViewFolder));
        }
        self.folders(query)
    }

    /// Folder listing of the actor's own customer
    ///
    /// Any customer filter in the query is replaced by the actor's customer.
    pub fn customer_view(&self, actor: &Actor, mut query: FolderQuery) -> Result<Page<FolderRow>> {
        self.engine.require(Capability::ViewFolder, actor)?;
        let Some(own) = actor.customer_id else {
            return Err(forbidden(Capability::ViewFolder));
        };
        query.customer_id = Some(own);
        self.folders(query)
    }

    /// Customer listing
    pub fn customers(&self, actor: &Actor, mut query: CustomerQuery) -> Result<Page<Customer>> {
        self.engine.require(Capability::ViewCustomer, actor)?;
        if actor.is_customer() {
            return Err(forbidden(Capability::ViewCustomer));
        }
        query.page = query.page.clamped(self.engine.config.max_per_page);
        self.engine.store.query_customers(&query)
    }

    fn folders(&self, mut query: FolderQuery) -> Result<Page<FolderRow>> {
        query.page = query.page.clamped(self.engine.config.max_per_page);
        let page = self.engine.store.query_folders(&query)?;
        tracing::debug!(total = page.total, page = page.page, "folders listed");
        Ok(page)
    }
}

fn forbidden(capability: Capability) -> CustomsError {
    CustomsError::Forbidden {
        capability: capability.as_str().to_string(),
    }
}
