//! Section-partitioned task storage.
//!
//! `SectionStore` keeps one ordered collection per board section. Every operation is
//! scoped to the single collection named by its section: an upsert for Merchandise never
//! looks at, or touches, the Sponsorship collection. Collections keep insertion order;
//! replacing a task keeps its position.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::fields::*;
use crate::task::{Sponsorship, Task};

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Replaced,
}

/// In-memory task collections keyed by board section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionStore {
    sections: BTreeMap<Section, Vec<Task>>,
}

/// Next modification stamp: `now`, pushed past `after` when the clock has not moved beyond it.
pub fn next_stamp(now: DateTime<Utc>, after: DateTime<Utc>) -> DateTime<Utc> {
    if now > after {
        now
    } else {
        after + Duration::microseconds(1)
    }
}

impl SectionStore {
    pub fn new() -> Self {
        let sections = Section::BOARDS.iter().map(|s| (*s, Vec::new())).collect();
        SectionStore { sections }
    }

    /// Tasks of one section in board order. The summary section is always empty.
    pub fn tasks(&self, section: Section) -> &[Task] {
        self.sections.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All tasks across the boards, section by section in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        Section::BOARDS.iter().flat_map(move |s| self.tasks(*s).iter())
    }

    pub fn len(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look a task up within one section.
    pub fn get(&self, section: Section, id: u64) -> Option<&Task> {
        self.tasks(section).iter().find(|t| t.id == id)
    }

    /// Look a task up across every section.
    pub fn find(&self, id: u64) -> Option<&Task> {
        self.iter().find(|t| t.id == id)
    }

    /// Generate the next id, unique across all sections.
    pub fn next_id(&self) -> u64 {
        self.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    fn board_mut(&mut self, section: Section) -> Result<&mut Vec<Task>, StoreError> {
        if !section.is_board() {
            return Err(StoreError::NotABoardSection(section));
        }
        Ok(self.sections.entry(section).or_default())
    }

    /// Insert `task` into its section, or replace the task with the same id in place.
    ///
    /// Sponsorship tasks get their expected revenue recomputed and missing pipeline data
    /// defaulted. `updated_at` is stamped with `now` (kept strictly increasing).
    pub fn upsert(&mut self, mut task: Task, now: DateTime<Utc>) -> Result<Upserted, StoreError> {
        let section = task.section;
        match (section.uses_pipeline(), task.sponsorship.as_mut()) {
            (true, Some(s)) => s.recompute_expected_revenue(),
            (true, None) => task.sponsorship = Some(Sponsorship::default()),
            (false, Some(_)) => return Err(StoreError::DetailsMismatch { id: task.id, section }),
            (false, None) => {}
        }

        let board = self.board_mut(section)?;
        match board.iter().position(|t| t.id == task.id) {
            Some(idx) => {
                task.updated_at = next_stamp(now.max(task.created_at), board[idx].updated_at);
                tracing::debug!(id = task.id, section = %section, "replaced task");
                board[idx] = task;
                Ok(Upserted::Replaced)
            }
            None => {
                task.updated_at = now.max(task.created_at);
                tracing::debug!(id = task.id, section = %section, "inserted task");
                board.push(task);
                Ok(Upserted::Inserted)
            }
        }
    }

    /// Remove the task with `id` from `section`. Returns `false` when nothing matched.
    pub fn delete(&mut self, section: Section, id: u64) -> bool {
        let Some(board) = self.sections.get_mut(&section) else {
            return false;
        };
        let before = board.len();
        board.retain(|t| t.id != id);
        let removed = board.len() != before;
        if removed {
            tracing::debug!(id, section = %section, "deleted task");
        }
        removed
    }

    /// Move a task to another kanban column of its board.
    ///
    /// Only the status (or pipeline stage) and `updated_at` change. Returns `Ok(false)` when
    /// the task is not in `section`.
    pub fn move_to(
        &mut self,
        section: Section,
        id: u64,
        column: Column,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let board = self.board_mut(section)?;
        match (section.uses_pipeline(), column) {
            (true, Column::Stage(_)) | (false, Column::Status(_)) => {}
            _ => {
                return Err(StoreError::ColumnMismatch {
                    column: column.label().to_string(),
                    section,
                })
            }
        }

        let Some(task) = board.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        match column {
            Column::Stage(stage) => {
                task.sponsorship.get_or_insert_with(Sponsorship::default).pipeline_stage = stage;
            }
            Column::Status(status) => task.status = status,
        }
        task.updated_at = next_stamp(now, task.updated_at);
        tracing::debug!(id, section = %section, column = %column, "moved task");
        Ok(true)
    }
}

/// The starter cards a new dashboard is seeded with.
pub fn sample_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let mut email = Task::new(1, Section::MarketingCommunication, "Finalize MBAT email campaign", now);
    email.description = Some("Send final schedule and logistics email to all participants.".into());
    email.owner = Some("Comms Team".into());
    email.status = Status::InProgress;
    email.priority = Priority::High;

    let mut renewal = Task::new(2, Section::Sponsorship, "Secure renewal with Main Sponsor", now);
    renewal.status = Status::InProgress;
    renewal.priority = Priority::Critical;
    renewal.sponsorship = Some(Sponsorship {
        pipeline_stage: PipelineStage::Negotiating,
        deal_value: 50_000.0,
        probability: 70.0,
        company: "ACME Corp".into(),
        contact_name: "Jane Doe".into(),
        next_follow_up: Some(Some(now + Duration::days(3))),
        ..Sponsorship::default()
    });

    let mut lead = Task::new(3, Section::Sponsorship, "New lead: TechCo", now);
    lead.status = Status::InProgress;
    lead.priority = Priority::High;
    lead.sponsorship = Some(Sponsorship {
        pipeline_stage: PipelineStage::Contacted,
        deal_value: 30_000.0,
        probability: 40.0,
        company: "TechCo".into(),
        contact_name: "John Smith".into(),
        ..Sponsorship::default()
    });

    vec![email, renewal, lead]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn upsert_appends_then_replaces_in_place() {
        let mut store = SectionStore::new();
        for id in 1..=3 {
            let task = Task::new(id, Section::Merchandise, format!("item {id}"), t0());
            assert_eq!(store.upsert(task, t0()).unwrap(), Upserted::Inserted);
        }
        let mut edited = store.get(Section::Merchandise, 2).unwrap().clone();
        edited.title = "renamed".into();
        assert_eq!(store.upsert(edited, t0()).unwrap(), Upserted::Replaced);

        let titles: Vec<_> = store.tasks(Section::Merchandise).iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["item 1", "renamed", "item 3"]);
    }

    #[test]
    fn updated_at_strictly_increases_under_a_frozen_clock() {
        let mut store = SectionStore::new();
        store.upsert(Task::new(1, Section::Merchandise, "a", t0()), t0()).unwrap();
        let first = store.get(Section::Merchandise, 1).unwrap().updated_at;
        store
            .move_to(Section::Merchandise, 1, Column::Status(Status::Blocked), t0())
            .unwrap();
        let second = store.get(Section::Merchandise, 1).unwrap().updated_at;
        assert!(second > first);
    }

    #[test]
    fn summary_section_is_rejected() {
        let mut store = SectionStore::new();
        let task = Task::new(1, Section::DashboardSummary, "nope", t0());
        assert_eq!(
            store.upsert(task, t0()),
            Err(StoreError::NotABoardSection(Section::DashboardSummary))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn pipeline_data_on_a_status_board_is_rejected() {
        let mut store = SectionStore::new();
        let mut task = Task::new(1, Section::Merchandise, "mixed", t0());
        task.sponsorship = Some(Sponsorship::default());
        assert!(matches!(store.upsert(task, t0()), Err(StoreError::DetailsMismatch { .. })));
    }

    #[test]
    fn caller_supplied_expected_revenue_is_ignored() {
        let mut store = SectionStore::new();
        let mut task = Task::new(1, Section::Sponsorship, "Acme", t0());
        task.sponsorship = Some(Sponsorship {
            deal_value: 10_000.0,
            probability: 50.0,
            expected_revenue: Some(999_999.0),
            ..Sponsorship::default()
        });
        store.upsert(task, t0()).unwrap();
        let saved = store.get(Section::Sponsorship, 1).unwrap();
        assert_eq!(saved.sponsorship.as_ref().unwrap().expected_revenue, Some(5_000.0));
    }

    #[test]
    fn delete_is_scoped_and_idempotent() {
        let mut store = SectionStore::new();
        store.upsert(Task::new(1, Section::Merchandise, "a", t0()), t0()).unwrap();
        store.upsert(Task::new(2, Section::FinanceAndLegal, "b", t0()), t0()).unwrap();

        assert!(!store.delete(Section::FinanceAndLegal, 1));
        assert_eq!(store.len(), 2);
        assert!(store.delete(Section::Merchandise, 1));
        let once = store.clone();
        assert!(!store.delete(Section::Merchandise, 1));
        assert_eq!(store, once);
    }

    #[test]
    fn move_rejects_wrong_column_kind_and_ignores_missing_tasks() {
        let mut store = SectionStore::new();
        store.upsert(Task::new(1, Section::Sponsorship, "Acme", t0()), t0()).unwrap();

        let err = store
            .move_to(Section::Sponsorship, 1, Column::Status(Status::Completed), t0())
            .unwrap_err();
        assert!(matches!(err, StoreError::ColumnMismatch { .. }));

        let moved = store
            .move_to(Section::Sponsorship, 42, Column::Stage(PipelineStage::Lost), t0())
            .unwrap();
        assert!(!moved);

        let moved = store
            .move_to(Section::Sponsorship, 1, Column::Stage(PipelineStage::Confirmed), t0())
            .unwrap();
        assert!(moved);
        assert_eq!(
            store.get(Section::Sponsorship, 1).unwrap().column(),
            Column::Stage(PipelineStage::Confirmed)
        );
    }

    #[test]
    fn next_id_spans_all_sections() {
        let mut store = SectionStore::new();
        store.upsert(Task::new(4, Section::Merchandise, "a", t0()), t0()).unwrap();
        store.upsert(Task::new(9, Section::Sponsorship, "b", t0()), t0()).unwrap();
        assert_eq!(store.next_id(), 10);
        assert_eq!(store.find(9).unwrap().section, Section::Sponsorship);
    }

    #[test]
    fn store_serialises_as_a_section_map() {
        let mut store = SectionStore::new();
        store.upsert(Task::new(1, Section::SchoolRelationships, "Visit", t0()), t0()).unwrap();
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["School Relationships"][0]["title"], "Visit");
        let back: SectionStore = serde_json::from_value(json).unwrap();
        assert_eq!(back, store);
    }
}
