//! Activity command implementation.

use std::collections::BTreeSet;

use clap::{Args, Parser, Subcommand, ValueEnum};
use custodia_common_core::{ActivityId, Timestamp};
use custodia_privacy::{
    ActivityPatch, LegalBasis, NewActivity, ProcessingPurpose, ReviewDecision,
};
use tracing::Instrument;

use crate::app::App;
use crate::args::{
    parse_activity_id, parse_date, parse_legal_basis, parse_list, parse_purpose, FilterArgs,
    PaginationArgs,
};
use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, ActivityList, AssessmentView, StatusOutput};

/// Manage processing activities
#[derive(Debug, Parser)]
pub struct ActivityCommand {
    #[command(subcommand)]
    pub action: ActivityAction,
}

#[derive(Debug, Subcommand)]
pub enum ActivityAction {
    /// List activities, newest first
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one activity
    Show {
        #[arg(value_parser = parse_activity_id)]
        id: ActivityId,
    },

    /// Register a new activity (starts under review)
    Create(CreateArgs),

    /// Change descriptive and classification fields
    Update(UpdateArgs),

    /// Suspend an active activity
    Suspend {
        #[arg(value_parser = parse_activity_id)]
        id: ActivityId,
        /// Why the activity is suspended
        #[arg(short, long)]
        reason: String,
    },

    /// Return a suspended activity to active
    Reactivate {
        #[arg(value_parser = parse_activity_id)]
        id: ActivityId,
    },

    /// Approve or reject an activity under review
    Review {
        #[command(subcommand)]
        decision: ReviewAction,
    },

    /// Record a compliance validation
    Validate {
        #[arg(value_parser = parse_activity_id)]
        id: ActivityId,
        /// Validation result
        #[arg(value_enum)]
        result: Compliance,
        /// Validation notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Evaluate whether an impact report (RIPD) is required
    Dpia {
        #[arg(value_parser = parse_activity_id)]
        id: ActivityId,
    },

    /// List active activities whose periodic review is due
    Due {
        /// Reference date (defaults to today)
        #[arg(long, value_parser = parse_date)]
        at: Option<Timestamp>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReviewAction {
    /// Approve; the activity becomes active and the next review is scheduled
    Approve {
        #[arg(value_parser = parse_activity_id)]
        id: ActivityId,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Reject; the activity is suspended with the notes as reason
    Reject {
        #[arg(value_parser = parse_activity_id)]
        id: ActivityId,
        #[arg(long)]
        notes: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Compliance {
    Compliant,
    NonCompliant,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(flatten)]
    pub page: PaginationArgs,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Activity name
    #[arg(long)]
    pub name: String,

    /// What is done with the data
    #[arg(long)]
    pub description: String,

    /// Processing purpose
    #[arg(short, long, value_parser = parse_purpose)]
    pub purpose: ProcessingPurpose,

    #[arg(short, long)]
    pub department: Option<String>,

    /// Controller name
    #[arg(long)]
    pub controller: Option<String>,

    /// Processor name
    #[arg(long)]
    pub processor: Option<String>,

    #[arg(short = 'b', long, value_parser = parse_legal_basis)]
    pub legal_basis: Option<LegalBasis>,

    /// Data categories, comma separated (e.g. name,cpf,health)
    #[arg(long, value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Data subjects, comma separated (e.g. employees,minors)
    #[arg(long, value_delimiter = ',')]
    pub subjects: Vec<String>,

    /// Flag the activity as high risk
    #[arg(long)]
    pub high_risk: bool,

    /// Data is transferred outside Brazil
    #[arg(long)]
    pub international_transfer: bool,
}

impl CreateArgs {
    fn into_new_activity(self) -> NewActivity {
        let mut input = NewActivity::new(self.name, self.description, self.purpose)
            .high_risk(self.high_risk)
            .international_transfer(self.international_transfer);
        input.department = self.department;
        input.controller_name = self.controller;
        input.processor_name = self.processor;
        input.legal_basis = self.legal_basis;
        input.data_categories = to_set(&self.categories);
        input.data_subjects = to_set(&self.subjects);
        input
    }
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[arg(value_parser = parse_activity_id)]
    pub id: ActivityId,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(short, long, value_parser = parse_purpose)]
    pub purpose: Option<ProcessingPurpose>,

    /// New department; an empty value clears it
    #[arg(short, long)]
    pub department: Option<String>,

    /// New controller; an empty value clears it
    #[arg(long)]
    pub controller: Option<String>,

    /// New processor; an empty value clears it
    #[arg(long)]
    pub processor: Option<String>,

    #[arg(short = 'b', long, value_parser = parse_legal_basis, conflicts_with = "clear_legal_basis")]
    pub legal_basis: Option<LegalBasis>,

    /// Remove the legal basis
    #[arg(long)]
    pub clear_legal_basis: bool,

    /// Replace data categories, comma separated
    #[arg(long)]
    pub categories: Option<String>,

    /// Replace data subjects, comma separated
    #[arg(long)]
    pub subjects: Option<String>,

    #[arg(long)]
    pub high_risk: Option<bool>,

    #[arg(long)]
    pub international_transfer: Option<bool>,
}

impl UpdateArgs {
    fn to_patch(&self) -> ActivityPatch {
        let legal_basis = if self.clear_legal_basis {
            Some(None)
        } else {
            self.legal_basis.map(Some)
        };

        ActivityPatch {
            name: self.name.clone(),
            description: self.description.clone(),
            department: self.department.clone().map(Some),
            controller_name: self.controller.clone().map(Some),
            processor_name: self.processor.clone().map(Some),
            purpose: self.purpose,
            legal_basis,
            data_categories: self.categories.as_deref().map(|s| to_set(&parse_list(s))),
            data_subjects: self.subjects.as_deref().map(|s| to_set(&parse_list(s))),
            is_high_risk: self.high_risk,
            has_international_transfer: self.international_transfer,
        }
    }
}

fn to_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl ActivityCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<(), CliError> {
        let app = App::open(ctx)?;
        let span = app.span();
        let result = self.action.run(ctx, &app).instrument(span).await;
        app.shutdown().await;
        result
    }
}

impl ActivityAction {
    async fn run(self, ctx: &CommandContext, app: &App) -> Result<(), CliError> {
        let store = &app.store;
        let session = &app.session;

        match self {
            Self::List(args) => {
                let filter = args.filter.to_filter();
                let total = store.count(session, &filter).await?;
                let page = filter.page(args.page.offset as usize, Some(args.page.limit as usize));
                let activities = store.fetch(session, &page).await?;
                print_output(ctx, &ActivityList { total, activities })
            }
            Self::Show { id } => {
                let activity = store.get(session, id).await?;
                print_output(ctx, &activity)
            }
            Self::Create(args) => {
                let id = store.create(session, args.into_new_activity()).await?;
                print_output(ctx, &StatusOutput::success("Atividade registrada").with_id(id))
            }
            Self::Update(args) => {
                store.update(session, args.id, args.to_patch()).await?;
                print_output(ctx, &StatusOutput::success("Atividade atualizada").with_id(args.id))
            }
            Self::Suspend { id, reason } => {
                store.suspend(session, id, &reason).await?;
                print_output(ctx, &StatusOutput::success("Atividade suspensa").with_id(id))
            }
            Self::Reactivate { id } => {
                store.reactivate(session, id).await?;
                print_output(ctx, &StatusOutput::success("Atividade reativada").with_id(id))
            }
            Self::Review { decision } => {
                let (id, decision, notes, message) = match decision {
                    ReviewAction::Approve { id, notes } => {
                        (id, ReviewDecision::Approve, notes, "Atividade aprovada")
                    }
                    ReviewAction::Reject { id, notes } => {
                        (id, ReviewDecision::Reject, Some(notes), "Atividade rejeitada")
                    }
                };
                store.review(session, id, decision, notes.as_deref()).await?;
                print_output(ctx, &StatusOutput::success(message).with_id(id))
            }
            Self::Validate { id, result, notes } => {
                let compliant = result == Compliance::Compliant;
                store.validate(session, id, compliant, notes.as_deref()).await?;
                let message = if compliant {
                    "Atividade validada como conforme"
                } else {
                    "Atividade validada como não conforme"
                };
                print_output(ctx, &StatusOutput::success(message).with_id(id))
            }
            Self::Dpia { id } => {
                let assessment = store.evaluate_dpia(session, id).await?;
                print_output(
                    ctx,
                    &AssessmentView {
                        activity_id: id,
                        assessment,
                    },
                )
            }
            Self::Due { at } => {
                let activities = store
                    .due_for_review(session, at.unwrap_or_else(Timestamp::now))
                    .await?;
                let total = activities.len() as u64;
                print_output(ctx, &ActivityList { total, activities })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(subcommand)]
        action: ActivityAction,
    }

    fn parse(args: &[&str]) -> ActivityAction {
        let mut argv = vec!["activity"];
        argv.extend_from_slice(args);
        Harness::try_parse_from(argv).unwrap().action
    }

    #[test]
    fn test_create_args_build_input() {
        let ActivityAction::Create(args) = parse(&[
            "create",
            "--name",
            "Folha",
            "--description",
            "Pagamento de salários",
            "--purpose",
            "payroll",
            "--categories",
            "name, cpf",
            "--subjects",
            "employees",
            "--legal-basis",
            "legal-obligation",
        ]) else {
            panic!("expected create");
        };

        let input = args.into_new_activity();
        assert_eq!(input.purpose, ProcessingPurpose::Payroll);
        assert_eq!(input.legal_basis, Some(LegalBasis::LegalObligation));
        assert!(input.data_categories.contains("cpf"));
        assert!(input.data_subjects.contains("employees"));
        assert!(!input.is_high_risk);
    }

    #[test]
    fn test_update_args_patch() {
        let ActivityAction::Update(args) = parse(&[
            "update",
            "act_6f1c2a52-6d8e-4b57-9d0f-0c4f6a1d2e3b",
            "--department",
            "",
            "--clear-legal-basis",
            "--high-risk",
            "true",
        ]) else {
            panic!("expected update");
        };

        let patch = args.to_patch();
        assert_eq!(patch.department, Some(Some(String::new())));
        assert_eq!(patch.legal_basis, Some(None));
        assert_eq!(patch.is_high_risk, Some(true));
        assert_eq!(patch.name, None);
    }

    #[test]
    fn test_update_without_fields_is_empty_patch() {
        let ActivityAction::Update(args) =
            parse(&["update", "6f1c2a52-6d8e-4b57-9d0f-0c4f6a1d2e3b"])
        else {
            panic!("expected update");
        };
        assert!(args.to_patch().is_empty());
    }

    #[test]
    fn test_reject_requires_notes() {
        let argv = ["activity", "review", "reject", "6f1c2a52-6d8e-4b57-9d0f-0c4f6a1d2e3b"];
        assert!(Harness::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_validate_result() {
        let action = parse(&[
            "validate",
            "6f1c2a52-6d8e-4b57-9d0f-0c4f6a1d2e3b",
            "non-compliant",
        ]);
        assert!(matches!(
            action,
            ActivityAction::Validate {
                result: Compliance::NonCompliant,
                ..
            }
        ));
    }
}
