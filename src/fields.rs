//! Enumerations and field types for dashboard tasks.
//!
//! This module defines the structured values used to partition and classify tasks:
//! department sections, task status, priority, the sponsorship pipeline stages and
//! the kanban columns that tie status and stage together. Serialized values are the
//! human-readable labels ("Not Started", "Finance and Legal", ...); command-line
//! values are the kebab-case names clap derives.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ParseFieldError;

/// Department sections of the dashboard.
///
/// `DashboardSummary` is the navigation entry for the summary view; it never holds tasks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    #[serde(rename = "Dashboard Summary")]
    #[value(alias = "summary")]
    DashboardSummary,
    #[serde(rename = "Marketing Communication")]
    #[value(alias = "marketing")]
    MarketingCommunication,
    #[serde(rename = "Merchandise")]
    #[value(alias = "merch")]
    Merchandise,
    #[serde(rename = "Finance and Legal")]
    #[value(alias = "finance")]
    FinanceAndLegal,
    #[serde(rename = "School Relationships")]
    #[value(alias = "schools")]
    SchoolRelationships,
    #[serde(rename = "Sponsorship")]
    Sponsorship,
}

impl Section {
    /// The five sections that own a task board, in display order.
    pub const BOARDS: [Section; 5] = [
        Section::MarketingCommunication,
        Section::Merchandise,
        Section::FinanceAndLegal,
        Section::SchoolRelationships,
        Section::Sponsorship,
    ];

    pub fn is_board(self) -> bool {
        self != Section::DashboardSummary
    }

    /// Sponsorship boards are organised by pipeline stage instead of status.
    pub fn uses_pipeline(self) -> bool {
        self == Section::Sponsorship
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::DashboardSummary => "Dashboard Summary",
            Section::MarketingCommunication => "Marketing Communication",
            Section::Merchandise => "Merchandise",
            Section::FinanceAndLegal => "Finance and Legal",
            Section::SchoolRelationships => "School Relationships",
            Section::Sponsorship => "Sponsorship",
        }
    }
}

/// Task workflow status, used as the kanban columns of non-sponsorship boards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Status {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Blocked")]
    Blocked,
    #[serde(rename = "Completed")]
    Completed,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::NotStarted, Status::InProgress, Status::Blocked, Status::Completed];

    pub fn label(self) -> &'static str {
        match self {
            Status::NotStarted => "Not Started",
            Status::InProgress => "In Progress",
            Status::Blocked => "Blocked",
            Status::Completed => "Completed",
        }
    }
}

/// Task importance. Ordering follows rank: `Critical > High > Medium > Low`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Critical];

    /// Numeric rank used by the summary ranking (Critical = 4 ... Low = 1).
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Critical => 4,
        }
    }

    pub fn is_high(self) -> bool {
        self >= Priority::High
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

/// Sponsorship funnel, in pipeline order, with `Lost` as the terminal failure state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PipelineStage {
    #[default]
    Identified,
    Contacted,
    #[serde(rename = "Followed Up")]
    FollowedUp,
    #[serde(rename = "Call Scheduled")]
    CallScheduled,
    #[serde(rename = "Proposal Sent")]
    ProposalSent,
    Negotiating,
    Confirmed,
    Lost,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 8] = [
        PipelineStage::Identified,
        PipelineStage::Contacted,
        PipelineStage::FollowedUp,
        PipelineStage::CallScheduled,
        PipelineStage::ProposalSent,
        PipelineStage::Negotiating,
        PipelineStage::Confirmed,
        PipelineStage::Lost,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::Identified => "Identified",
            PipelineStage::Contacted => "Contacted",
            PipelineStage::FollowedUp => "Followed Up",
            PipelineStage::CallScheduled => "Call Scheduled",
            PipelineStage::ProposalSent => "Proposal Sent",
            PipelineStage::Negotiating => "Negotiating",
            PipelineStage::Confirmed => "Confirmed",
            PipelineStage::Lost => "Lost",
        }
    }
}

/// A kanban column: a status on regular boards, a pipeline stage on the sponsorship board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Status(Status),
    Stage(PipelineStage),
}

impl Column {
    /// Interpret a column label in the context of `section`.
    ///
    /// Accepts either the display label ("Call Scheduled") or the kebab-case
    /// name ("call-scheduled"), case-insensitively.
    pub fn parse_for(section: Section, input: &str) -> Result<Column, ParseFieldError> {
        if section.uses_pipeline() {
            parse_label(input, &PipelineStage::ALL, |s: PipelineStage| s.label()).map(Column::Stage)
        } else {
            parse_label(input, &Status::ALL, |s: Status| s.label()).map(Column::Status)
        }
    }

    /// All columns of a section's board, in display order.
    pub fn for_section(section: Section) -> Vec<Column> {
        if section.uses_pipeline() {
            PipelineStage::ALL.iter().copied().map(Column::Stage).collect()
        } else {
            Status::ALL.iter().copied().map(Column::Status).collect()
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Column::Status(s) => s.label(),
            Column::Stage(s) => s.label(),
        }
    }
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortKey {
    Deadline,
    Priority,
    Id,
    Updated,
}

/// Filtering options for tasks based on deadlines.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DeadlineFilter {
    Today,
    ThisWeek,
    Overdue,
    None,
}

fn normalise_label(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .collect()
}

fn parse_label<T: Copy>(input: &str, all: &[T], label: impl Fn(T) -> &'static str) -> Result<T, ParseFieldError> {
    let wanted = normalise_label(input);
    all.iter()
        .copied()
        .find(|v| normalise_label(label(*v)) == wanted)
        .ok_or_else(|| ParseFieldError::new(input))
}

macro_rules! labelled {
    ($($ty:ty => $all:expr),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }

            impl FromStr for $ty {
                type Err = ParseFieldError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    parse_label(s, &$all, |v: $ty| v.label())
                }
            }
        )*
    };
}

labelled! {
    Section => [
        Section::DashboardSummary,
        Section::MarketingCommunication,
        Section::Merchandise,
        Section::FinanceAndLegal,
        Section::SchoolRelationships,
        Section::Sponsorship,
    ],
    Status => Status::ALL,
    Priority => Priority::ALL,
    PipelineStage => PipelineStage::ALL,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
