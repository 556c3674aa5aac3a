//! Folder creation and lifecycle status

use crate::ClearanceEngine;
use chrono::Utc;
use customs_domain::traits::CustomsStore;
use customs_domain::{
    Actor, Capability, Customer, CustomsError, Declaration, Expense, Folder, FolderId,
    FolderQuery, FolderRow, FolderStatus, NewExpense, NewFolder, Page, Result,
};

/// A folder with its customer and milestone record
#[derive(Debug, Clone, PartialEq)]
pub struct FolderDetail {
    /// The folder
    pub folder: Folder,
    /// Owning customer
    pub customer: Customer,
    /// Milestone record, once a declaration has been filed
    pub declaration: Option<Declaration>,
}

impl FolderDetail {
    /// Status derived from the milestone record
    pub fn status(&self) -> FolderStatus {
        FolderStatus::derive(self.declaration.as_ref())
    }
}

/// Folder creation, status and listings
pub struct FolderLifecycle<'e, S: CustomsStore> {
    pub(crate) engine: &'e mut ClearanceEngine<S>,
}

impl<S: CustomsStore> FolderLifecycle<'_, S> {
    /// Open a folder for a customer
    ///
    /// Customer actors may only open folders for themselves.
    pub fn create_folder(&mut self, actor: &Actor, request: NewFolder) -> Result<Folder> {
        let result = self.try_create(actor, request);
        self.engine
            .announce(result, |f| format!("Folder {} opened", f.number))
    }

    fn try_create(&mut self, actor: &Actor, request: NewFolder) -> Result<Folder> {
        self.engine.require(Capability::CreateFolder, actor)?;
        if let Some(own) = actor.customer_id {
            if own != request.customer_id {
                tracing::debug!(principal = %actor.principal, "folder requested for another customer");
                return Err(CustomsError::Forbidden {
                    capability: Capability::CreateFolder.as_str().to_string(),
                });
            }
        }

        let folder = request.validate()?.into_folder(Utc::now());
        self.engine.store.insert_folder(&folder)?;

        tracing::info!(
            folder = %folder.id,
            number = %folder.number,
            customer = %folder.customer_id,
            by = %actor.principal,
            "folder created"
        );
        Ok(folder)
    }

    /// Current status, derived from the folder's milestone record
    ///
    /// Reads only; the cached status column is not consulted.
    pub fn get_status(&self, actor: &Actor, id: FolderId) -> Result<FolderStatus> {
        self.engine.require(Capability::ViewFolder, actor)?;
        let folder = self.engine.visible_folder(actor, id)?;
        let declaration = self.engine.store.get_declaration(folder.id)?;
        Ok(FolderStatus::derive(declaration.as_ref()))
    }

    /// Folder with its customer and milestone record
    pub fn get_folder(&self, actor: &Actor, id: FolderId) -> Result<FolderDetail> {
        self.engine.require(Capability::ViewFolder, actor)?;
        let folder = self.engine.visible_folder(actor, id)?;
        let customer = self
            .engine
            .store
            .get_customer(folder.customer_id)?
            .ok_or_else(|| CustomsError::not_found("customer", folder.customer_id))?;
        let declaration = self.engine.store.get_declaration(folder.id)?;
        Ok(FolderDetail {
            folder,
            customer,
            declaration,
        })
    }

    /// Book an expense against a folder
    ///
    /// Needs `record-clearance`; customer actors only reach their own folders.
    pub fn record_expense(
        &mut self,
        actor: &Actor,
        folder_id: FolderId,
        request: NewExpense,
    ) -> Result<Expense> {
        let result = self.try_record_expense(actor, folder_id, request);
        self.engine.announce(result, |e| {
            format!("Expense '{}' recorded on folder {}", e.kind, folder_id)
        })
    }

    fn try_record_expense(
        &mut self,
        actor: &Actor,
        folder_id: FolderId,
        request: NewExpense,
    ) -> Result<Expense> {
        self.engine.require(Capability::RecordClearance, actor)?;
        let folder = self.engine.visible_folder(actor, folder_id)?;
        let expense = request.validate()?.into_expense(folder.id, Utc::now());
        self.engine.store.insert_expense(&expense)?;
        Ok(expense)
    }

    /// Expenses of a folder, oldest first
    pub fn list_expenses(&self, actor: &Actor, folder_id: FolderId) -> Result<Vec<Expense>> {
        self.engine.require(Capability::ViewFolder, actor)?;
        let folder = self.engine.visible_folder(actor, folder_id)?;
        self.engine.store.list_expenses(folder.id)
    }

    /// Folder listing; customer actors only ever see their own folders
    pub fn list_folders(&self, actor: &Actor, query: FolderQuery) -> Result<Page<FolderRow>> {
        let view = self.engine.query();
        if actor.is_customer() {
            view.customer_view(actor, query)
        } else {
            view.staff_view(actor, query)
        }
    }
}
