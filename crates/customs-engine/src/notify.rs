//! Notice delivery

use customs_domain::traits::{Notifier, Notice, Outcome};

/// [`Notifier`] that writes notices to the `tracing` log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.outcome {
            Outcome::Success => tracing::info!(target: "customs::notice", "{}", notice.message),
            Outcome::Failure => tracing::warn!(target: "customs::notice", "{}", notice.message),
        }
    }
}

/// [`Notifier`] that drops every notice
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notice: &Notice) {}
}
