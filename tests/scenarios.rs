use chrono::{DateTime, Duration, TimeZone, Utc};

use ops_dashboard::error::DraftField;
use ops_dashboard::fields::{Column, PipelineStage, Priority, Section, Status};
use ops_dashboard::{Dashboard, DashboardError, SectionStore, Settings, TaskDraft};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

fn dashboard() -> Dashboard<fn() -> DateTime<Utc>> {
    Dashboard::with_clock(SectionStore::new(), Settings::default(), now as fn() -> DateTime<Utc>)
}

fn acme() -> TaskDraft {
    let mut draft = TaskDraft::new(Section::Sponsorship, "Acme");
    let s = draft.sponsorship.as_mut().unwrap();
    s.company = "Acme".into();
    s.deal_value = "50000".into();
    s.probability = "70".into();
    draft
}

#[test]
fn new_deal_counts_toward_pipeline_only() {
    let mut d = dashboard();
    let saved = d.create_or_update_task(acme()).unwrap();

    let task = d.store().get(Section::Sponsorship, saved.id).unwrap();
    let s = task.sponsorship.as_ref().unwrap();
    assert_eq!(s.expected_revenue, Some(35_000.0));
    assert_eq!(s.pipeline_stage, PipelineStage::Identified);

    let summary = d.summary();
    assert_eq!(summary.pipeline_expected_revenue, 35_000.0);
    assert_eq!(summary.total_sponsors_confirmed, 0);
    assert_eq!(summary.revenue_secured, 0.0);
}

#[test]
fn confirming_a_deal_secures_its_value_plus_adjustment() {
    let mut d = dashboard();
    d.set_manual_adjustment(2_500.0);
    let saved = d.create_or_update_task(acme()).unwrap();

    let moved = d
        .move_task(saved.id, Section::Sponsorship, Column::Stage(PipelineStage::Confirmed))
        .unwrap();
    assert!(moved);

    let summary = d.summary();
    assert_eq!(summary.total_sponsors_confirmed, 1);
    assert_eq!(summary.revenue_secured, 52_500.0);
    assert_eq!(summary.revenue_target, 850_000.0);
}

#[test]
fn critical_task_due_soon_shows_in_both_lists() {
    let mut d = dashboard();
    let mut draft = TaskDraft::new(Section::FinanceAndLegal, "Sign venue contract");
    draft.priority = Priority::Critical;
    draft.deadline = Some(now() + Duration::days(5));
    let saved = d.create_or_update_task(draft).unwrap();

    let summary = d.summary();
    assert!(summary.upcoming_deadlines.iter().any(|t| t.id == saved.id));
    assert!(summary.high_priority_tasks.iter().any(|t| t.id == saved.id));
}

#[test]
fn out_of_range_probability_is_rejected_without_side_effects() {
    let mut d = dashboard();
    d.create_or_update_task(acme()).unwrap();
    let before = d.store().clone();

    let mut draft = acme();
    draft.sponsorship.as_mut().unwrap().probability = "150".into();
    let err = d.create_or_update_task(draft).unwrap_err();

    let DashboardError::Validation(errors) = err else {
        panic!("expected a validation error");
    };
    assert_eq!(errors.get(DraftField::Probability), Some("Probability must be between 0 and 100."));
    assert_eq!(d.store(), &before);
}

#[test]
fn ids_are_unique_across_sections() {
    let mut d = dashboard();
    let a = d.create_or_update_task(TaskDraft::new(Section::Merchandise, "Hoodies")).unwrap();
    let b = d.create_or_update_task(TaskDraft::new(Section::SchoolRelationships, "Visit")).unwrap();
    let c = d.create_or_update_task(acme()).unwrap();
    assert_eq!([a.id, b.id, c.id], [1, 2, 3]);
}

#[test]
fn delete_and_move_of_unknown_ids_are_no_ops() {
    let mut d = dashboard();
    let saved = d.create_or_update_task(TaskDraft::new(Section::Merchandise, "Hoodies")).unwrap();
    let before = d.store().clone();

    assert!(!d.delete_task(99, Section::Merchandise));
    assert!(!d.delete_task(saved.id, Section::Sponsorship));
    assert!(!d.move_task(99, Section::Merchandise, Column::Status(Status::Completed)).unwrap());
    assert_eq!(d.store(), &before);
}

#[test]
fn moving_with_the_wrong_column_kind_is_a_caller_error() {
    let mut d = dashboard();
    let saved = d.create_or_update_task(TaskDraft::new(Section::Merchandise, "Hoodies")).unwrap();
    let err = d
        .move_task(saved.id, Section::Merchandise, Column::Stage(PipelineStage::Confirmed))
        .unwrap_err();
    assert!(matches!(err, DashboardError::Store(_)));
}

#[test]
fn zero_target_reports_zero_progress() {
    let mut d = dashboard();
    d.set_revenue_target(0.0);
    d.create_or_update_task(acme()).unwrap();
    let summary = d.summary();
    assert_eq!(summary.secured_progress(), 0.0);
    assert_eq!(summary.pipeline_progress(), 0.0);
}
