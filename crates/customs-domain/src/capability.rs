//! Capabilities and the request-scoped actor

use crate::CustomerId;

/// A permission checked before an operation proceeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Onboard new customers
    CreateCustomer,
    /// Edit or (de)activate customers
    EditCustomer,
    /// Read customer records
    ViewCustomer,
    /// Open new folders
    CreateFolder,
    /// Read folders and their milestones
    ViewFolder,
    /// Write declaration milestones
    RecordClearance,
}

/// Capabilities granted to a customer's person when the customer is created
pub const ONBOARDING_CAPABILITIES: [Capability; 2] =
    [Capability::CreateFolder, Capability::ViewFolder];

impl Capability {
    /// All capabilities, in declaration order
    pub const ALL: [Capability; 6] = [
        Capability::CreateCustomer,
        Capability::EditCustomer,
        Capability::ViewCustomer,
        Capability::CreateFolder,
        Capability::ViewFolder,
        Capability::RecordClearance,
    ];

    /// Get the capability name as stored and configured
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CreateCustomer => "create-customer",
            Capability::EditCustomer => "edit-customer",
            Capability::ViewCustomer => "view-customer",
            Capability::CreateFolder => "create-folder",
            Capability::ViewFolder => "view-folder",
            Capability::RecordClearance => "record-clearance",
        }
    }

    /// Parse a capability name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_lowercase())
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid capability: {}", s))
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller of an operation
///
/// Built per request by the presentation layer and passed by reference into
/// every operation. An actor linked to a customer only ever sees that
/// customer's folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Principal name handed to the authorizer
    pub principal: String,

    /// Customer this actor acts for, if it is a customer account
    pub customer_id: Option<CustomerId>,
}

impl Actor {
    /// A back-office staff member
    pub fn staff(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            customer_id: None,
        }
    }

    /// A customer account
    pub fn customer(principal: impl Into<String>, customer_id: CustomerId) -> Self {
        Self {
            principal: principal.into(),
            customer_id: Some(customer_id),
        }
    }

    /// Whether this actor is restricted to one customer's data
    pub fn is_customer(&self) -> bool {
        self.customer_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for capability in Capability::ALL {
            assert_eq!(Capability::parse(capability.as_str()), Some(capability));
        }
        assert_eq!(Capability::parse(" View-Folder "), Some(Capability::ViewFolder));
        assert!("approve-folder".parse::<Capability>().is_err());
    }

    #[test]
    fn test_onboarding_grants() {
        assert_eq!(
            ONBOARDING_CAPABILITIES,
            [Capability::CreateFolder, Capability::ViewFolder]
        );
    }

    #[test]
    fn test_actor_kinds() {
        assert!(!Actor::staff("agent").is_customer());
        assert!(Actor::customer("c-001", CustomerId::new()).is_customer());
    }
}
