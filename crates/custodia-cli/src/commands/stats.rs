//! Stats command implementation.

use clap::Parser;
use tracing::Instrument;

use crate::app::App;
use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::print_output;

/// Show register statistics
#[derive(Debug, Parser)]
pub struct StatsCommand {
    /// Exit with an error when statistics cannot be computed
    #[arg(long)]
    pub strict: bool,
}

impl StatsCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<(), CliError> {
        let app = App::open(ctx)?;
        let span = app.span();
        let snapshot = app.store.stats(&app.session).instrument(span).await;
        app.shutdown().await;

        print_output(ctx, &snapshot)?;
        if self.strict && !snapshot.is_available() {
            return Err(CliError::Backend {
                message: "Statistics are unavailable".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}
