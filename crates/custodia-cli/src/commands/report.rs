//! Report command implementation.

use clap::Parser;
use custodia_privacy::RatReportOptions;
use tracing::Instrument;

use crate::app::App;
use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::print_output;

/// Show the record of processing activities (RAT)
#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[command(flatten)]
    pub options: RatArgs,
}

/// Scope of a RAT report
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RatArgs {
    /// Only activities of this department (case-insensitive)
    #[arg(short, long)]
    pub department: Option<String>,

    /// Leave out activities still under review
    #[arg(long)]
    pub active_only: bool,
}

impl RatArgs {
    pub fn to_options(&self) -> RatReportOptions {
        let mut options = RatReportOptions::default();
        if let Some(department) = &self.department {
            options = options.department(department.clone());
        }
        if self.active_only {
            options = options.active_only();
        }
        options
    }
}

impl ReportCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<(), CliError> {
        let app = App::open(ctx)?;
        let span = app.span();
        let result = app
            .store
            .rat_report(&app.session, &self.options.to_options())
            .instrument(span)
            .await;
        app.shutdown().await;

        print_output(ctx, &result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_include_under_review() {
        let options = RatArgs::default().to_options();
        assert!(options.include_under_review);
        assert_eq!(options.department, None);
    }

    #[test]
    fn test_active_only_and_department() {
        let args = RatArgs {
            department: Some("RH".into()),
            active_only: true,
        };
        let options = args.to_options();
        assert!(!options.include_under_review);
        assert_eq!(options.department.as_deref(), Some("RH"));
    }
}
