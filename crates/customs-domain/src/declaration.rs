//! Declaration module - the four-stage milestone record of a folder
//!
//! A declaration is created when the customs declaration is filed and then
//! filled in stage by stage as paperwork arrives from the regulatory bodies:
//!
//! | Stage | Key field | Unique |
//! |-------|-----------|--------|
//! | Declaration | `number` | yes |
//! | Liquidation | `bulletin` | no (amended bulletins reuse it) |
//! | Receipt | `number` | yes |
//! | Release order | `number` | yes |
//!
//! Stage N can only be recorded once stage N-1 is complete, and a complete
//! stage is never rewritten.

use crate::error::{CustomsError, Result};
use crate::validation::{self, BULLETIN_MAX, REFERENCE_MAX, TEXT_MAX};
use crate::{DeclarationId, DocumentRef, FolderId, FolderStatus, Stage};
use chrono::{DateTime, NaiveDate, Utc};

/// Stage 1: the filed customs declaration
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationFiling {
    /// Declaration number (globally unique)
    pub number: String,
    /// Filing date
    pub date: NaiveDate,
    /// Customs office of destination
    pub destination_office: String,
    /// Customs verifier assigned to the declaration
    pub verifier: String,
    /// Scan of the declaration
    pub document_ref: Option<DocumentRef>,
}

impl DeclarationFiling {
    /// Check and normalize the stage fields
    pub fn validate(&self) -> Result<Self> {
        Ok(Self {
            number: validation::required("number", &self.number, REFERENCE_MAX)?,
            date: self.date,
            destination_office: validation::required(
                "destination_office",
                &self.destination_office,
                TEXT_MAX,
            )?,
            verifier: validation::required("verifier", &self.verifier, REFERENCE_MAX)?,
            document_ref: self.document_ref.clone(),
        })
    }
}

/// Stage 2: duty liquidation
#[derive(Debug, Clone, PartialEq)]
pub struct Liquidation {
    /// Liquidation bulletin reference (indexed, not unique)
    pub bulletin: String,
    /// Liquidation date
    pub date: NaiveDate,
    /// Scan of the bulletin
    pub document_ref: Option<DocumentRef>,
}

impl Liquidation {
    /// Check and normalize the stage fields
    pub fn validate(&self) -> Result<Self> {
        Ok(Self {
            bulletin: validation::required("liquidation_bulletin", &self.bulletin, BULLETIN_MAX)?,
            date: self.date,
            document_ref: self.document_ref.clone(),
        })
    }
}

/// Stage 3: payment receipt
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    /// Receipt number (globally unique)
    pub number: String,
    /// Receipt date
    pub date: NaiveDate,
    /// Scan of the receipt
    pub document_ref: Option<DocumentRef>,
}

impl Receipt {
    /// Check and normalize the stage fields
    pub fn validate(&self) -> Result<Self> {
        Ok(Self {
            number: validation::required("receipt_number", &self.number, REFERENCE_MAX)?,
            date: self.date,
            document_ref: self.document_ref.clone(),
        })
    }
}

/// Stage 4: release order ("bon")
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOrder {
    /// Bon number (globally unique)
    pub number: String,
    /// Release date
    pub date: NaiveDate,
    /// Scan of the release order
    pub document_ref: Option<DocumentRef>,
}

impl ReleaseOrder {
    /// Check and normalize the stage fields
    pub fn validate(&self) -> Result<Self> {
        Ok(Self {
            number: validation::required("bon_number", &self.number, REFERENCE_MAX)?,
            date: self.date,
            document_ref: self.document_ref.clone(),
        })
    }
}

/// Milestone record attached to exactly one folder
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Unique identifier
    pub id: DeclarationId,
    /// Owning folder (at most one declaration per folder)
    pub folder_id: FolderId,
    /// Stage 1, present from creation
    pub filing: DeclarationFiling,
    /// Stage 2
    pub liquidation: Option<Liquidation>,
    /// Stage 3
    pub receipt: Option<Receipt>,
    /// Stage 4
    pub release_order: Option<ReleaseOrder>,
    /// When the declaration was filed
    pub created_at: DateTime<Utc>,
    /// When the last stage was recorded
    pub updated_at: DateTime<Utc>,
}

impl Declaration {
    /// Open the milestone record of a folder with its stage-1 data
    pub fn file(folder_id: FolderId, filing: DeclarationFiling, now: DateTime<Utc>) -> Self {
        Self {
            id: DeclarationId::new(),
            folder_id,
            filing,
            liquidation: None,
            receipt: None,
            release_order: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given stage's required fields are populated
    pub fn is_complete(&self, stage: Stage) -> bool {
        match stage {
            Stage::Declaration => true,
            Stage::Liquidation => self.liquidation.is_some(),
            Stage::Receipt => self.receipt.is_some(),
            Stage::ReleaseOrder => self.release_order.is_some(),
        }
    }

    /// Highest stage reached
    pub fn stage(&self) -> Stage {
        Stage::ALL
            .into_iter()
            .take_while(|stage| self.is_complete(*stage))
            .last()
            .unwrap_or(Stage::Declaration)
    }

    /// Status of the owning folder
    pub fn status(&self) -> FolderStatus {
        FolderStatus::derive(Some(self))
    }

    /// Record stage 2
    pub fn record_liquidation(&mut self, liquidation: Liquidation, now: DateTime<Utc>) -> Result<()> {
        self.check_recordable(Stage::Liquidation)?;
        self.liquidation = Some(liquidation);
        self.updated_at = now;
        Ok(())
    }

    /// Record stage 3
    pub fn record_receipt(&mut self, receipt: Receipt, now: DateTime<Utc>) -> Result<()> {
        self.check_recordable(Stage::Receipt)?;
        self.receipt = Some(receipt);
        self.updated_at = now;
        Ok(())
    }

    /// Record stage 4
    pub fn record_release_order(&mut self, order: ReleaseOrder, now: DateTime<Utc>) -> Result<()> {
        self.check_recordable(Stage::ReleaseOrder)?;
        self.release_order = Some(order);
        self.updated_at = now;
        Ok(())
    }

    /// Check that `stage` may be written now: its predecessor is complete and
    /// the stage itself is not
    ///
    /// The predecessor check runs first so that out-of-order writes report
    /// the missing stage rather than a conflict.
    pub fn check_recordable(&self, stage: Stage) -> Result<()> {
        if let Some(previous) = stage.predecessor() {
            if !self.is_complete(previous) {
                return Err(stage.missing_predecessor());
            }
        }
        if self.is_complete(stage) {
            return Err(CustomsError::conflict(
                format!("{} stage", stage),
                self.stage_reference(stage).unwrap_or_default(),
            ));
        }
        Ok(())
    }

    /// Key reference of a recorded stage
    pub fn stage_reference(&self, stage: Stage) -> Option<String> {
        match stage {
            Stage::Declaration => Some(self.filing.number.clone()),
            Stage::Liquidation => self.liquidation.as_ref().map(|l| l.bulletin.clone()),
            Stage::Receipt => self.receipt.as_ref().map(|r| r.number.clone()),
            Stage::ReleaseOrder => self.release_order.as_ref().map(|b| b.number.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    pub(crate) fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    pub(crate) fn filing(number: &str) -> DeclarationFiling {
        DeclarationFiling {
            number: number.to_string(),
            date: date(1),
            destination_office: "Dakar Port".to_string(),
            verifier: "V-12".to_string(),
            document_ref: None,
        }
    }

    fn liquidation(bulletin: &str) -> Liquidation {
        Liquidation {
            bulletin: bulletin.to_string(),
            date: date(3),
            document_ref: None,
        }
    }

    fn receipt(number: &str) -> Receipt {
        Receipt {
            number: number.to_string(),
            date: date(5),
            document_ref: Some(DocumentRef::new("receipts/r-1.pdf")),
        }
    }

    fn release(number: &str) -> ReleaseOrder {
        ReleaseOrder {
            number: number.to_string(),
            date: date(7),
            document_ref: None,
        }
    }

    #[test]
    fn test_stages_advance_status() {
        let now = Utc::now();
        let mut decl = Declaration::file(FolderId::new(), filing("D-1"), now);
        assert_eq!(decl.status(), FolderStatus::Declared);
        assert_eq!(decl.stage(), Stage::Declaration);

        decl.record_liquidation(liquidation("L-1"), now).unwrap();
        assert_eq!(decl.status(), FolderStatus::Liquidated);

        decl.record_receipt(receipt("R-1"), now).unwrap();
        assert_eq!(decl.status(), FolderStatus::Receipted);

        decl.record_release_order(release("B-1"), now).unwrap();
        assert_eq!(decl.status(), FolderStatus::Released);
        assert_eq!(decl.stage(), Stage::ReleaseOrder);
    }

    #[test]
    fn test_out_of_order_is_precondition_error() {
        let now = Utc::now();
        let mut decl = Declaration::file(FolderId::new(), filing("D-1"), now);

        let err = decl.record_receipt(receipt("R-1"), now).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);

        let err = decl.record_release_order(release("B-1"), now).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);

        assert_eq!(decl.status(), FolderStatus::Declared);
    }

    #[test]
    fn test_rerecording_a_stage_conflicts() {
        let now = Utc::now();
        let mut decl = Declaration::file(FolderId::new(), filing("D-1"), now);
        decl.record_liquidation(liquidation("L-1"), now).unwrap();
        decl.record_receipt(receipt("R-1"), now).unwrap();

        let err = decl.record_receipt(receipt("R-2"), now).unwrap_err();
        assert_eq!(err, CustomsError::conflict("receipt stage", "R-1"));
        assert_eq!(decl.receipt.as_ref().unwrap().number, "R-1");
    }

    #[test]
    fn test_stage_validation() {
        assert!(filing(" ").validate().is_err());
        assert_eq!(filing(" D-1 ").validate().unwrap().number, "D-1");
        assert!(liquidation(&"L".repeat(21)).validate().is_err());
        assert!(receipt("").validate().is_err());
        assert!(release("B-1").validate().is_ok());
    }
}

#[cfg(test)]
mod proptests {
    use super::tests::filing;
    use super::*;
    use proptest::prelude::*;

    /// One attempted ledger write; `None` declaration means no stage 1 yet
    fn apply(decl: &mut Option<Declaration>, op: u8, n: usize) -> Result<()> {
        let now = Utc::now();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        if op == 0 {
            if decl.is_some() {
                return Err(CustomsError::Validation("already filed".into()));
            }
            *decl = Some(Declaration::file(FolderId::new(), filing(&format!("D-{}", n)), now));
            return Ok(());
        }
        let Some(d) = decl.as_mut() else {
            return Err(CustomsError::Precondition("no declaration".into()));
        };
        match op {
            1 => d.record_liquidation(
                Liquidation { bulletin: format!("L-{}", n), date: day, document_ref: None },
                now,
            ),
            2 => d.record_receipt(
                Receipt { number: format!("R-{}", n), date: day, document_ref: None },
                now,
            ),
            _ => d.record_release_order(
                ReleaseOrder { number: format!("B-{}", n), date: day, document_ref: None },
                now,
            ),
        }
    }

    proptest! {
        /// Property: status never regresses under any sequence of writes
        #[test]
        fn test_status_is_monotonic(ops in proptest::collection::vec(0u8..4, 0..24)) {
            let mut decl: Option<Declaration> = None;
            let mut previous = FolderStatus::derive(None);

            for (n, op) in ops.into_iter().enumerate() {
                let before = decl.clone();
                let result = apply(&mut decl, op, n);
                let status = FolderStatus::derive(decl.as_ref());

                prop_assert!(status >= previous);
                if result.is_err() {
                    // Rejected writes leave the record untouched
                    prop_assert_eq!(&decl, &before);
                    prop_assert_eq!(status, previous);
                }
                previous = status;
            }
        }

        /// Property: derived status never exceeds the populated stages
        #[test]
        fn test_status_bounded_by_populated_stages(ops in proptest::collection::vec(0u8..4, 0..24)) {
            let mut decl: Option<Declaration> = None;
            for (n, op) in ops.into_iter().enumerate() {
                let _ = apply(&mut decl, op, n);
            }

            let status = FolderStatus::derive(decl.as_ref());
            let populated = match &decl {
                None => 0,
                Some(d) => 1
                    + d.liquidation.is_some() as u8
                    + d.receipt.is_some() as u8
                    + d.release_order.is_some() as u8,
            };
            prop_assert_eq!(status.rank(), populated);
        }
    }
}
