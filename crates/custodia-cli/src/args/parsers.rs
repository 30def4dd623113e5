//! Custom value parsers for CLI arguments.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use custodia_common_core::{ActivityId, TenantId, Timestamp};
use custodia_export::ExportFormat;
use custodia_privacy::{ActivityStatus, LegalBasis, ProcessingPurpose};

fn parse_choice<T>(s: &str, all: impl Iterator<Item = T>) -> Result<T, String>
where
    T: FromStr + Display,
{
    let normalized = s.trim().to_lowercase().replace('-', "_");
    normalized.parse().map_err(|_| {
        let expected: Vec<String> = all.map(|v| v.to_string()).collect();
        format!("Invalid value: {s} (expected one of: {})", expected.join(", "))
    })
}

/// Parse an activity identifier, with or without the `act_` prefix
pub fn parse_activity_id(s: &str) -> Result<ActivityId, String> {
    ActivityId::parse(s).map_err(|_| format!("Invalid activity id: {s}"))
}

/// Parse a tenant identifier, with or without the `tnt_` prefix
pub fn parse_tenant_id(s: &str) -> Result<TenantId, String> {
    TenantId::parse(s).map_err(|_| format!("Invalid tenant id: {s}"))
}

/// Parse a processing purpose (e.g. `marketing`, `access-control`)
pub fn parse_purpose(s: &str) -> Result<ProcessingPurpose, String> {
    parse_choice(s, ProcessingPurpose::all())
}

/// Parse a legal basis (e.g. `consent`, `legal_obligation`)
pub fn parse_legal_basis(s: &str) -> Result<LegalBasis, String> {
    parse_choice(s, LegalBasis::all())
}

/// Parse an activity status (`active`, `suspended`, `under_review`)
pub fn parse_status(s: &str) -> Result<ActivityStatus, String> {
    parse_choice(s, ActivityStatus::all())
}

/// Parse an export format (`csv`, `html`, `json_lines`)
pub fn parse_export_format(s: &str) -> Result<ExportFormat, String> {
    let normalized = s.trim().replace('-', "_");
    ExportFormat::from_str(&normalized)
        .map_err(|_| format!("Invalid export format: {s} (expected csv, html or json_lines)"))
}

/// Parse a calendar date as `YYYY-MM-DD` or `dd/mm/yyyy`, at midnight UTC
pub fn parse_date(s: &str) -> Result<Timestamp, String> {
    let s = s.trim();
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .map_err(|_| format!("Invalid date: {s} (expected YYYY-MM-DD or dd/mm/yyyy)"))?;
    Ok(Timestamp::from_datetime(
        date.and_time(NaiveTime::MIN).and_utc(),
    ))
}

/// Parse a comma separated list, dropping empty items
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
