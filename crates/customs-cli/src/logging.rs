//! Log and notice output for the CLI.

use crate::output::Formatter;
use customs_domain::traits::{Notice, Notifier, Outcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr log subscriber; `RUST_LOG` overrides the level.
pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("customs=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("customs=info"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

/// Prints successful outcomes to stdout; failures are reported by `main`.
pub struct ConsoleNotifier {
    formatter: Formatter,
}

impl ConsoleNotifier {
    /// Create a notifier that prints through `formatter`.
    pub fn new(formatter: Formatter) -> Self {
        Self { formatter }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.outcome {
            Outcome::Success => println!("{}", self.formatter.success(&notice.message)),
            Outcome::Failure => tracing::debug!(message = %notice.message, "operation failed"),
        }
    }
}
