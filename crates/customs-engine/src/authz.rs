//! Capability table authorizer

use customs_domain::traits::Authorizer;
use customs_domain::{Actor, Capability};
use std::collections::{HashMap, HashSet};

/// [`Authorizer`] backed by a fixed principal → capabilities table
///
/// # Examples
///
/// ```
/// use customs_domain::{Actor, Capability};
/// use customs_domain::traits::Authorizer;
/// use customs_engine::StaticAuthorizer;
///
/// let authz = StaticAuthorizer::new().grant("clerk", [Capability::ViewFolder]);
/// assert!(authz.authorize(Capability::ViewFolder, &Actor::staff("clerk")));
/// assert!(!authz.authorize(Capability::RecordClearance, &Actor::staff("clerk")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorizer {
    grants: HashMap<String, HashSet<Capability>>,
}

impl StaticAuthorizer {
    /// An authorizer that denies everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Add capabilities for a principal
    pub fn grant(
        mut self,
        principal: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        self.grants
            .entry(principal.into())
            .or_default()
            .extend(capabilities);
        self
    }

    /// Give a principal every capability
    pub fn grant_all(self, principal: impl Into<String>) -> Self {
        self.grant(principal, Capability::ALL)
    }

    /// Capabilities held by a principal, sorted
    pub fn capabilities_of(&self, principal: &str) -> Vec<Capability> {
        let mut held: Vec<_> = self
            .grants
            .get(principal)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        held.sort_by_key(|c| c.as_str());
        held
    }
}

impl Authorizer for StaticAuthorizer {
    fn authorize(&self, capability: Capability, actor: &Actor) -> bool {
        self.grants
            .get(&actor.principal)
            .is_some_and(|held| held.contains(&capability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_principal_is_denied() {
        let authz = StaticAuthorizer::new().grant_all("admin");
        assert!(authz.authorize(Capability::CreateCustomer, &Actor::staff("admin")));
        assert!(!authz.authorize(Capability::CreateCustomer, &Actor::staff("guest")));
    }

    #[test]
    fn test_grants_accumulate() {
        let authz = StaticAuthorizer::new()
            .grant("clerk", [Capability::ViewFolder])
            .grant("clerk", [Capability::CreateFolder]);
        assert_eq!(
            authz.capabilities_of("clerk"),
            vec![Capability::CreateFolder, Capability::ViewFolder]
        );
    }
}
