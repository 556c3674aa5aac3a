//! Declaration milestones
//!
//! Writes follow the stage order declaration → liquidation → receipt →
//! release order. For every write the checks run in the same order: the
//! folder exists, the input is well formed, the previous stage is complete,
//! the stage itself is not yet recorded, and its key is not used elsewhere.
//! The last three are evaluated by the store inside the write transaction.

use crate::ClearanceEngine;
use chrono::Utc;
use customs_domain::traits::CustomsStore;
use customs_domain::{
    Actor, Capability, CustomsError, Declaration, DeclarationFiling, Folder, FolderId,
    Liquidation, Receipt, ReleaseOrder, Result, Stage,
};

/// The four-stage milestone record of each folder
pub struct MilestoneLedger<'e, S: CustomsStore> {
    pub(crate) engine: &'e mut ClearanceEngine<S>,
}

impl<S: CustomsStore> MilestoneLedger<'_, S> {
    /// File the customs declaration of a folder (stage 1)
    pub fn file_declaration(
        &mut self,
        actor: &Actor,
        folder_id: FolderId,
        filing: DeclarationFiling,
    ) -> Result<Declaration> {
        let result = self.writable_folder(actor, folder_id).and_then(|_| {
            let filing = filing.validate()?;
            self.engine
                .store
                .file_declaration(folder_id, &filing, Utc::now())
        });
        self.announce(Stage::Declaration, result)
    }

    /// Record the duty liquidation (stage 2)
    pub fn record_liquidation(
        &mut self,
        actor: &Actor,
        folder_id: FolderId,
        liquidation: Liquidation,
    ) -> Result<Declaration> {
        let result = self.writable_folder(actor, folder_id).and_then(|_| {
            let liquidation = liquidation.validate()?;
            self.engine
                .store
                .record_liquidation(folder_id, &liquidation, Utc::now())
        });
        self.announce(Stage::Liquidation, result)
    }

    /// Record the payment receipt (stage 3)
    pub fn record_receipt(
        &mut self,
        actor: &Actor,
        folder_id: FolderId,
        receipt: Receipt,
    ) -> Result<Declaration> {
        let result = self.writable_folder(actor, folder_id).and_then(|_| {
            let receipt = receipt.validate()?;
            self.engine
                .store
                .record_receipt(folder_id, &receipt, Utc::now())
        });
        self.announce(Stage::Receipt, result)
    }

    /// Record the release order (stage 4)
    pub fn record_release_order(
        &mut self,
        actor: &Actor,
        folder_id: FolderId,
        order: ReleaseOrder,
    ) -> Result<Declaration> {
        let result = self.writable_folder(actor, folder_id).and_then(|_| {
            let order = order.validate()?;
            self.engine
                .store
                .record_release_order(folder_id, &order, Utc::now())
        });
        self.announce(Stage::ReleaseOrder, result)
    }

    /// Milestone record of a folder
    pub fn get_by_folder(&self, actor: &Actor, folder_id: FolderId) -> Result<Declaration> {
        self.engine.require(Capability::ViewFolder, actor)?;
        let folder = self.engine.visible_folder(actor, folder_id)?;
        self.engine
            .store
            .get_declaration(folder.id)?
            .ok_or_else(|| CustomsError::not_found("declaration", folder.number))
    }

    fn writable_folder(&self, actor: &Actor, folder_id: FolderId) -> Result<Folder> {
        self.engine.require(Capability::RecordClearance, actor)?;
        self.engine.visible_folder(actor, folder_id)
    }

    fn announce(&self, stage: Stage, result: Result<Declaration>) -> Result<Declaration> {
        self.engine.announce(result, |d| {
            let reference = d.stage_reference(stage).unwrap_or_default();
            format!("{} {} recorded, folder is now {}", capitalize(stage.as_str()), reference, d.status())
        })
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
