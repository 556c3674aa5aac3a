//! Folder status - the lifecycle position derived from milestone data

use crate::Declaration;
use crate::error::CustomsError;

/// Milestone stage of a declaration record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Customs declaration filed
    Declaration,
    /// Duties liquidated
    Liquidation,
    /// Payment receipt issued
    Receipt,
    /// Release order ("bon") issued
    ReleaseOrder,
}

impl Stage {
    /// All stages in filing order
    pub const ALL: [Stage; 4] = [
        Stage::Declaration,
        Stage::Liquidation,
        Stage::Receipt,
        Stage::ReleaseOrder,
    ];

    /// Human-readable stage name
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Declaration => "declaration",
            Stage::Liquidation => "liquidation",
            Stage::Receipt => "receipt",
            Stage::ReleaseOrder => "release order",
        }
    }

    /// Stage that has to be complete before this one can be recorded
    pub fn predecessor(&self) -> Option<Stage> {
        match self {
            Stage::Declaration => None,
            Stage::Liquidation => Some(Stage::Declaration),
            Stage::Receipt => Some(Stage::Liquidation),
            Stage::ReleaseOrder => Some(Stage::Receipt),
        }
    }

    /// Status a folder reaches once this stage is complete
    pub fn status(&self) -> FolderStatus {
        match self {
            Stage::Declaration => FolderStatus::Declared,
            Stage::Liquidation => FolderStatus::Liquidated,
            Stage::Receipt => FolderStatus::Receipted,
            Stage::ReleaseOrder => FolderStatus::Released,
        }
    }

    /// Error for an attempt to record this stage before its predecessor
    pub fn missing_predecessor(&self) -> CustomsError {
        match self.predecessor() {
            Some(previous) => CustomsError::Precondition(format!(
                "the {} stage must be recorded before the {} stage",
                previous.as_str(),
                self.as_str()
            )),
            None => CustomsError::Precondition(format!(
                "the {} stage has no predecessor",
                self.as_str()
            )),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a folder
///
/// Folders only move forward:
/// - Open: no declaration filed yet
/// - Declared: stage 1 complete
/// - Liquidated: stage 2 complete
/// - Receipted: stage 3 complete
/// - Released: stage 4 complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FolderStatus {
    /// No declaration yet
    Open,
    /// Declaration filed
    Declared,
    /// Duties liquidated
    Liquidated,
    /// Payment receipted
    Receipted,
    /// Goods released
    Released,
}

impl FolderStatus {
    /// All statuses in lifecycle order
    pub const ALL: [FolderStatus; 5] = [
        FolderStatus::Open,
        FolderStatus::Declared,
        FolderStatus::Liquidated,
        FolderStatus::Receipted,
        FolderStatus::Released,
    ];

    /// Derive the status from a folder's declaration record
    ///
    /// Pure: the result depends only on which stages are populated. Walks the
    /// stages in order and stops at the first incomplete one.
    pub fn derive(declaration: Option<&Declaration>) -> FolderStatus {
        let Some(declaration) = declaration else {
            return FolderStatus::Open;
        };
        Stage::ALL
            .into_iter()
            .take_while(|stage| declaration.is_complete(*stage))
            .last()
            .map(|stage| stage.status())
            .unwrap_or(FolderStatus::Open)
    }

    /// Get the status name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderStatus::Open => "OPEN",
            FolderStatus::Declared => "DECLARED",
            FolderStatus::Liquidated => "LIQUIDATED",
            FolderStatus::Receipted => "RECEIPTED",
            FolderStatus::Released => "RELEASED",
        }
    }

    /// Parse a status from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Some(FolderStatus::Open),
            "DECLARED" => Some(FolderStatus::Declared),
            "LIQUIDATED" => Some(FolderStatus::Liquidated),
            "RECEIPTED" => Some(FolderStatus::Receipted),
            "RELEASED" => Some(FolderStatus::Released),
            _ => None,
        }
    }

    /// Position in the lifecycle, starting at 0 for Open
    pub fn rank(&self) -> u8 {
        match self {
            FolderStatus::Open => 0,
            FolderStatus::Declared => 1,
            FolderStatus::Liquidated => 2,
            FolderStatus::Receipted => 3,
            FolderStatus::Released => 4,
        }
    }

}

impl std::str::FromStr for FolderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid folder status: {}", s))
    }
}

impl std::fmt::Display for FolderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_matches_ordering() {
        for pair in FolderStatus::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].rank() + 1, pair[1].rank());
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(FolderStatus::parse("released"), Some(FolderStatus::Released));
        assert_eq!("Declared".parse::<FolderStatus>().unwrap(), FolderStatus::Declared);
        assert!(FolderStatus::parse("archived").is_none());
    }

    #[test]
    fn test_no_declaration_is_open() {
        assert_eq!(FolderStatus::derive(None), FolderStatus::Open);
    }

    #[test]
    fn test_stage_predecessors() {
        assert_eq!(Stage::Declaration.predecessor(), None);
        assert_eq!(Stage::Receipt.predecessor(), Some(Stage::Liquidation));
        let err = Stage::ReleaseOrder.missing_predecessor();
        assert!(err.to_string().contains("receipt stage must be recorded before"));
    }
}
