//! Board views: kanban columns and filtered, sorted task lists.

use chrono::{Datelike, Duration, NaiveDate};

use crate::fields::*;
use crate::store::SectionStore;
use crate::task::Task;

/// One kanban column with the tasks currently in it, in board order.
#[derive(Debug)]
pub struct BoardColumn<'a> {
    pub column: Column,
    pub tasks: Vec<&'a Task>,
}

/// Group a section's tasks into its kanban columns.
pub fn kanban(store: &SectionStore, section: Section) -> Vec<BoardColumn<'_>> {
    Column::for_section(section)
        .into_iter()
        .map(|column| BoardColumn {
            column,
            tasks: store.tasks(section).iter().filter(|t| t.column() == column).collect(),
        })
        .collect()
}

/// Criteria for the task list. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub section: Option<Section>,
    pub status: Option<Status>,
    pub stage: Option<PipelineStage>,
    pub priority: Option<Priority>,
    pub owner: Option<String>,
    pub deadline: Option<DeadlineFilter>,
    /// Include completed tasks.
    pub all: bool,
}

/// Calculate the start and end dates of the ISO week (Monday to Sunday) containing `today`.
pub fn start_end_of_this_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = today - Duration::days(weekday);
    (start, start + Duration::days(6))
}

impl TaskFilter {
    pub fn matches(&self, t: &Task, today: NaiveDate) -> bool {
        if !self.all && t.status == Status::Completed {
            return false;
        }
        if self.section.is_some_and(|s| s != t.section) {
            return false;
        }
        if self.status.is_some_and(|s| s != t.status) {
            return false;
        }
        if let Some(stage) = self.stage {
            if t.sponsorship.as_ref().map(|s| s.pipeline_stage) != Some(stage) {
                return false;
            }
        }
        if self.priority.is_some_and(|p| p != t.priority) {
            return false;
        }
        if let Some(owner) = &self.owner {
            let matches = t
                .owner
                .as_deref()
                .is_some_and(|o| o.eq_ignore_ascii_case(owner.trim()));
            if !matches {
                return false;
            }
        }
        if let Some(df) = self.deadline {
            let due = t.deadline_at().map(|d| d.date_naive());
            let (week_start, week_end) = start_end_of_this_week(today);
            let ok = match (df, due) {
                (DeadlineFilter::None, due) => due.is_none(),
                (_, None) => false,
                (DeadlineFilter::Today, Some(d)) => d == today,
                (DeadlineFilter::ThisWeek, Some(d)) => d >= week_start && d <= week_end,
                (DeadlineFilter::Overdue, Some(d)) => d < today,
            };
            if !ok {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, store: &'a SectionStore, today: NaiveDate) -> Vec<&'a Task> {
        store.iter().filter(|t| self.matches(t, today)).collect()
    }
}

/// Sort a task list in place. Ties keep board order.
pub fn sort_tasks(tasks: &mut [&Task], key: SortKey) {
    match key {
        SortKey::Deadline => tasks.sort_by_key(|t| (t.deadline_at().is_none(), t.deadline_at())),
        SortKey::Priority => tasks.sort_by(|a, b| b.priority.cmp(&a.priority)),
        SortKey::Id => tasks.sort_by_key(|t| t.id),
        SortKey::Updated => tasks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
    }
}
