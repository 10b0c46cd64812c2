//! In-memory list filters used by the screens.
//!
//! A filter combines a free-text query, matched case-insensitively as a
//! substring of a per-kind text projection, with exact facet matches.
//! Empty criteria match everything.

use crate::domain::{
    Identity, ModerationStatus, OperationalState, Point, PointStatus, Report, Role, ScheduleEntry,
    Severity,
};
use std::collections::BTreeSet;

fn matches_query(query: &str, fields: &[&str]) -> bool {
    // ---
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn matches_text_facet(wanted: Option<&str>, actual: &str) -> bool {
    match wanted.map(str::trim) {
        None | Some("") => true,
        Some(wanted) => wanted.eq_ignore_ascii_case(actual.trim()),
    }
}

fn matches_facet<T: PartialEq>(wanted: Option<T>, actual: T) -> bool {
    wanted.map_or(true, |wanted| wanted == actual)
}

/// Something that belongs to a neighbourhood.
pub trait Neighbourhood {
    fn neighbourhood(&self) -> &str;
}

impl Neighbourhood for Report {
    fn neighbourhood(&self) -> &str {
        &self.neighbourhood
    }
}

impl Neighbourhood for Point {
    fn neighbourhood(&self) -> &str {
        &self.neighbourhood
    }
}

impl Neighbourhood for ScheduleEntry {
    fn neighbourhood(&self) -> &str {
        &self.neighbourhood
    }
}

/// Distinct non-empty neighbourhoods of `items`, sorted.
pub fn neighbourhoods<T: Neighbourhood>(items: &[T]) -> Vec<String> {
    // ---
    items
        .iter()
        .map(|item| item.neighbourhood().trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ============================================================================
// Reports
// ============================================================================

/// The single state selector of the reports table.
///
/// It filters either on moderation or on operational progress. Reports
/// without operational state never match an operational filter, and the
/// initial `abierto` state is not offered as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    Moderation(ModerationStatus),
    Operational(OperationalState),
}

impl StateFilter {
    fn matches(&self, report: &Report) -> bool {
        match self {
            StateFilter::Moderation(status) => report.status == *status,
            StateFilter::Operational(OperationalState::Open) => false,
            StateFilter::Operational(state) => report.operational == Some(*state),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub query: String,
    pub neighbourhood: Option<String>,
    pub severity: Option<Severity>,
    pub state: Option<StateFilter>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        // ---
        let code = report.code.as_deref().unwrap_or_default();
        matches_query(
            &self.query,
            &[
                report.id.as_str(),
                code,
                report.title.as_str(),
                report.description.as_str(),
                report.address.as_str(),
                report.neighbourhood.as_str(),
            ],
        ) && matches_text_facet(self.neighbourhood.as_deref(), &report.neighbourhood)
            && self
                .severity
                .map_or(true, |severity| report.severity == Some(severity))
            && self.state.map_or(true, |state| state.matches(report))
    }

    pub fn apply<'a>(&self, reports: &'a [Report]) -> Vec<&'a Report> {
        reports.iter().filter(|report| self.matches(report)).collect()
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub query: String,
    pub role: Option<Role>,
}

impl UserFilter {
    pub fn matches(&self, user: &Identity) -> bool {
        // ---
        matches_query(
            &self.query,
            &[
                user.id.as_str(),
                user.name.as_deref().unwrap_or_default(),
                user.email.as_deref().unwrap_or_default(),
                user.role.as_str(),
            ],
        ) && matches_facet(self.role, user.role)
    }

    pub fn apply<'a>(&self, users: &'a [Identity]) -> Vec<&'a Identity> {
        users.iter().filter(|user| self.matches(user)).collect()
    }
}

// ============================================================================
// Points
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct PointFilter {
    pub query: String,
    pub neighbourhood: Option<String>,
    pub status: Option<PointStatus>,
}

impl PointFilter {
    pub fn matches(&self, point: &Point) -> bool {
        // ---
        let materials = point.materials.join(" ");
        matches_query(
            &self.query,
            &[
                point.id.as_str(),
                point.name.as_str(),
                point.neighbourhood.as_str(),
                materials.as_str(),
            ],
        ) && matches_text_facet(self.neighbourhood.as_deref(), &point.neighbourhood)
            && matches_facet(self.status, point.status)
    }

    pub fn apply<'a>(&self, points: &'a [Point]) -> Vec<&'a Point> {
        points.iter().filter(|point| self.matches(point)).collect()
    }
}

// ============================================================================
// Schedule
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
    pub query: String,
    pub neighbourhood: Option<String>,
}

impl ScheduleFilter {
    pub fn matches(&self, entry: &ScheduleEntry) -> bool {
        // ---
        let days = entry.days.join(" ");
        matches_query(
            &self.query,
            &[
                entry.neighbourhood.as_str(),
                days.as_str(),
                entry.first_window.as_deref().unwrap_or_default(),
                entry.second_window.as_deref().unwrap_or_default(),
            ],
        ) && matches_text_facet(self.neighbourhood.as_deref(), &entry.neighbourhood)
    }

    pub fn apply<'a>(&self, entries: &'a [ScheduleEntry]) -> Vec<&'a ScheduleEntry> {
        entries.iter().filter(|entry| self.matches(entry)).collect()
    }
}
