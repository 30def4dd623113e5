//! Argument parsing utilities and common argument types.

mod parsers;

pub use parsers::*;

use chrono::Duration;
use clap::Args;
use custodia_common_core::Timestamp;
use custodia_privacy::{ActivityFilter, ActivityStatus, ProcessingPurpose};

/// Pagination arguments
#[derive(Debug, Clone, Args)]
pub struct PaginationArgs {
    /// Maximum number of items to return
    #[arg(
        short = 'l',
        long,
        default_value = "25",
        value_parser = clap::value_parser!(u32).range(1..=1000),
        help = "Maximum items to return"
    )]
    pub limit: u32,

    /// Number of items to skip
    #[arg(
        short = 's',
        long,
        default_value = "0",
        help = "Number of items to skip"
    )]
    pub offset: u32,
}

/// Activity filter arguments
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Filter by status
    #[arg(long, value_parser = parse_status, help = "Filter by status")]
    pub status: Option<ActivityStatus>,

    /// Filter by department (exact match)
    #[arg(short = 'd', long, help = "Filter by department")]
    pub department: Option<String>,

    /// Filter by purpose
    #[arg(short = 'p', long, value_parser = parse_purpose, help = "Filter by purpose")]
    pub purpose: Option<ProcessingPurpose>,

    /// Case-insensitive search in name, description and department
    #[arg(short = 'n', long, help = "Search name, description and department")]
    pub search: Option<String>,

    /// Only activities flagged as high risk
    #[arg(long, help = "Only high risk activities")]
    pub high_risk: bool,

    /// Only activities with international transfer
    #[arg(long, help = "Only activities with international transfer")]
    pub international_transfer: bool,

    /// Created on or after this date
    #[arg(long, value_parser = parse_date, help = "Created on or after (YYYY-MM-DD)")]
    pub from: Option<Timestamp>,

    /// Created on or before this date
    #[arg(long, value_parser = parse_date, help = "Created on or before (YYYY-MM-DD)")]
    pub to: Option<Timestamp>,
}

impl FilterArgs {
    /// Build the register filter, without paging.
    pub fn to_filter(&self) -> ActivityFilter {
        let mut filter = ActivityFilter::new();
        if let Some(status) = self.status {
            filter = filter.status(status);
        }
        if let Some(department) = &self.department {
            filter = filter.department(department.clone());
        }
        if let Some(purpose) = self.purpose {
            filter = filter.purpose(purpose);
        }
        if let Some(search) = &self.search {
            filter = filter.search(search.clone());
        }
        if self.high_risk {
            filter = filter.high_risk(true);
        }
        if self.international_transfer {
            filter = filter.international_transfer(true);
        }
        // `--to` covers the whole day, up to the last instant before midnight
        let to = self.to.map(|t| {
            Timestamp::from_datetime(t.plus_days(1).as_datetime() - Duration::nanoseconds(1))
        });
        filter.created_between(self.from, to)
    }
}
