//! The engine and the checks every component shares

use crate::{
    EngineConfig, FolderLifecycle, IdentityRegistry, MilestoneLedger, QueryView, SilentNotifier,
};
use customs_domain::traits::{Authorizer, CredentialStore, CustomsStore, Notice, Notifier, Outcome};
use customs_domain::{Actor, Capability, CustomsError, Folder, FolderId, Result};

/// Platform services the engine calls out to
pub struct Collaborators {
    /// Capability checks
    pub authorizer: Box<dyn Authorizer>,
    /// Credential hashing
    pub credentials: Box<dyn CredentialStore>,
    /// Outcome messages
    pub notifier: Box<dyn Notifier>,
}

impl Collaborators {
    /// Services with notices discarded
    pub fn new(
        authorizer: impl Authorizer + 'static,
        credentials: impl CredentialStore + 'static,
    ) -> Self {
        Self {
            authorizer: Box::new(authorizer),
            credentials: Box::new(credentials),
            notifier: Box::new(SilentNotifier),
        }
    }

    /// Replace the notifier
    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }
}

/// Customs clearance engine
///
/// Owns a store and the platform collaborators and hands out the four
/// components as borrowed views:
///
/// - [`identity`](Self::identity): customers and their person profiles
/// - [`folders`](Self::folders): folder creation and status
/// - [`ledger`](Self::ledger): the four declaration milestones
/// - [`query`](Self::query): paginated listings
///
/// Every operation takes the calling [`Actor`] and checks its capability
/// before touching the store.
pub struct ClearanceEngine<S: CustomsStore> {
    pub(crate) store: S,
    pub(crate) services: Collaborators,
    pub(crate) config: EngineConfig,
}

impl<S: CustomsStore> ClearanceEngine<S> {
    /// Create an engine with the default configuration
    pub fn new(store: S, services: Collaborators) -> Self {
        Self::with_config(store, services, EngineConfig::default())
    }

    /// Create an engine with an explicit configuration
    pub fn with_config(store: S, services: Collaborators, config: EngineConfig) -> Self {
        Self {
            store,
            services,
            config,
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Customer onboarding and maintenance
    pub fn identity(&mut self) -> IdentityRegistry<'_, S> {
        IdentityRegistry { engine: self }
    }

    /// Declaration milestones
    pub fn ledger(&mut self) -> MilestoneLedger<'_, S> {
        MilestoneLedger { engine: self }
    }

    /// Folder creation and status
    pub fn folders(&mut self) -> FolderLifecycle<'_, S> {
        FolderLifecycle { engine: self }
    }

    /// Read-only listings
    pub fn query(&self) -> QueryView<'_, S> {
        QueryView { engine: self }
    }

    /// Fail with `Forbidden` unless the actor holds `capability`
    pub(crate) fn require(&self, capability: Capability, actor: &Actor) -> Result<()> {
        if self.services.authorizer.authorize(capability, actor) {
            return Ok(());
        }
        tracing::debug!(principal = %actor.principal, %capability, "capability denied");
        Err(CustomsError::Forbidden {
            capability: capability.as_str().to_string(),
        })
    }

    /// Load a folder the actor is allowed to see
    ///
    /// Customer actors get `NotFound` for other customers' folders.
    pub(crate) fn visible_folder(&self, actor: &Actor, id: FolderId) -> Result<Folder> {
        let folder = self
            .store
            .get_folder(id)?
            .ok_or_else(|| CustomsError::not_found("folder", id))?;
        match actor.customer_id {
            Some(own) if own != folder.customer_id => {
                tracing::debug!(principal = %actor.principal, folder = %id, "folder outside actor scope");
                Err(CustomsError::not_found("folder", id))
            }
            _ => Ok(folder),
        }
    }

    /// Report the outcome of a mutation to the notifier and pass it through
    pub(crate) fn announce<T>(
        &self,
        result: Result<T>,
        describe: impl FnOnce(&T) -> String,
    ) -> Result<T> {
        let notice = match &result {
            Ok(value) => Notice {
                outcome: Outcome::Success,
                message: describe(value),
            },
            Err(err) => {
                tracing::debug!(error = %err, kind = ?err.kind(), "operation rejected");
                Notice {
                    outcome: Outcome::Failure,
                    message: err.to_string(),
                }
            }
        };
        self.services.notifier.notify(&notice);
        result
    }
}
