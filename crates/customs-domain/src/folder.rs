//! Folder module - one customs-clearance case for one shipment

use crate::error::{CustomsError, Result};
use crate::validation::{self, REFERENCE_MAX, TEXT_MAX};
use crate::{CustomerId, FolderId, FolderStatus};
use chrono::{DateTime, Utc};

/// A customs-clearance folder
///
/// The folder number is assigned once and never reused. The status is a
/// cache of [`FolderStatus::derive`] over the folder's declaration and is
/// only ever written by milestone writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    /// Unique identifier
    pub id: FolderId,
    /// Folder number (globally unique, immutable)
    pub number: String,
    /// Total weight in kilograms
    pub weight: f64,
    /// Harbor of arrival
    pub harbor: String,
    /// Container number
    pub container_number: Option<String>,
    /// Owning customer
    pub customer_id: CustomerId,
    /// Derived lifecycle status
    pub status: FolderStatus,
    /// When the folder was opened
    pub created_at: DateTime<Utc>,
}

/// Request to open a folder
#[derive(Debug, Clone, PartialEq)]
pub struct NewFolder {
    /// Folder number
    pub number: String,
    /// Total weight in kilograms
    pub weight: f64,
    /// Harbor of arrival
    pub harbor: String,
    /// Container number
    pub container_number: Option<String>,
    /// Owning customer
    pub customer_id: CustomerId,
}

impl NewFolder {
    /// Check and normalize the request
    pub fn validate(&self) -> Result<Self> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(CustomsError::Validation(format!(
                "weight must be a non-negative number (got {})",
                self.weight
            )));
        }
        Ok(Self {
            number: validation::required("number", &self.number, REFERENCE_MAX)?,
            weight: self.weight,
            harbor: validation::required("harbor", &self.harbor, TEXT_MAX)?,
            container_number: validation::optional(
                "container_number",
                self.container_number.as_deref(),
                REFERENCE_MAX,
            )?,
            customer_id: self.customer_id,
        })
    }

    /// Build the folder record for an already validated request
    pub fn into_folder(self, created_at: DateTime<Utc>) -> Folder {
        Folder {
            id: FolderId::new(),
            number: self.number,
            weight: self.weight,
            harbor: self.harbor,
            container_number: self.container_number,
            customer_id: self.customer_id,
            status: FolderStatus::Open,
            created_at,
        }
    }
}
