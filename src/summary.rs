//! Dashboard summary figures derived from the task store.
//!
//! Nothing here is cached: `summarize` recomputes every figure from a store snapshot,
//! the settings and an explicit `now`, so the same inputs always give the same summary.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::fields::*;
use crate::settings::Settings;
use crate::store::SectionStore;
use crate::task::Task;

/// Days ahead covered by the upcoming-deadline list.
pub const DEADLINE_WINDOW_DAYS: i64 = 14;
/// Length of the upcoming-deadline and high-priority lists.
pub const LIST_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_sponsors_confirmed: usize,
    /// Confirmed deal value plus the manual adjustment from settings.
    pub revenue_secured: f64,
    pub revenue_target: f64,
    /// Expected revenue summed over the whole pipeline, Confirmed and Lost included.
    pub pipeline_expected_revenue: f64,
    pub upcoming_deadlines: Vec<Task>,
    pub high_priority_tasks: Vec<Task>,
}

impl Summary {
    /// Secured revenue as a percentage of target, capped at 100.
    pub fn secured_progress(&self) -> f64 {
        progress(self.revenue_secured, self.revenue_target)
    }

    /// Pipeline expected revenue as a percentage of target, capped at 100.
    pub fn pipeline_progress(&self) -> f64 {
        progress(self.pipeline_expected_revenue, self.revenue_target)
    }
}

fn progress(value: f64, target: f64) -> f64 {
    if target > 0.0 {
        (value / target * 100.0).min(100.0)
    } else {
        0.0
    }
}

fn is_confirmed(task: &Task) -> bool {
    task.sponsorship
        .as_ref()
        .is_some_and(|s| s.pipeline_stage == PipelineStage::Confirmed)
}

/// Compare optional deadlines with missing deadlines sorting last.
fn deadline_order(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn summarize(store: &SectionStore, settings: &Settings, now: DateTime<Utc>) -> Summary {
    let sponsorship = store.tasks(Section::Sponsorship);

    let confirmed: Vec<&Task> = sponsorship.iter().filter(|t| is_confirmed(t)).collect();
    let confirmed_value: f64 = confirmed
        .iter()
        .filter_map(|t| t.sponsorship.as_ref())
        .map(|s| s.deal_value)
        .sum();

    let pipeline_expected_revenue = sponsorship
        .iter()
        .filter_map(|t| t.sponsorship.as_ref())
        .map(|s| s.expected_or_derived())
        .sum();

    let horizon = now + Duration::days(DEADLINE_WINDOW_DAYS);
    let mut upcoming: Vec<&Task> = store
        .iter()
        .filter(|t| t.deadline_at().is_some_and(|d| d >= now && d <= horizon))
        .collect();
    upcoming.sort_by_key(|t| t.deadline_at());
    upcoming.truncate(LIST_LIMIT);

    let mut urgent: Vec<&Task> = store.iter().filter(|t| t.priority.is_high()).collect();
    urgent.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then_with(|| deadline_order(a.deadline_at(), b.deadline_at()))
    });
    urgent.truncate(LIST_LIMIT);

    Summary {
        total_sponsors_confirmed: confirmed.len(),
        revenue_secured: confirmed_value + settings.manual_revenue_adjustment,
        revenue_target: settings.revenue_target,
        pipeline_expected_revenue,
        upcoming_deadlines: upcoming.into_iter().cloned().collect(),
        high_priority_tasks: urgent.into_iter().cloned().collect(),
    }
}
