//! Command implementations for the CLI interface.
//!
//! Each handler works on a loaded `Dashboard` and saves it through the `Database` when it
//! changes state. Handlers return `anyhow::Result`; `main` reports the error and exits.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc};
use clap::{Args, Subcommand};
use clap_complete::{generate, Shell};

use crate::access::is_email_allowed;
use crate::board::{kanban, sort_tasks, TaskFilter};
use crate::config::Config;
use crate::dashboard::{Clock, Dashboard};
use crate::db::*;
use crate::fields::*;
use crate::store::{sample_tasks, SectionStore};
use crate::settings::Settings;
use crate::summary::Summary;
use crate::task::{SponsorshipDraft, Task, TaskDraft};

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory, optionally seeded with sample tasks.
    Init {
        /// Seed the boards with the starter tasks.
        #[arg(long)]
        sample: bool,
        /// Overwrite existing tasks and settings.
        #[arg(long)]
        force: bool,
    },

    /// Add a new task to a board.
    Add {
        /// Board: marketing-communication | merchandise | finance-and-legal | school-relationships | sponsorship.
        #[arg(value_enum)]
        section: Section,
        /// Short title for the task.
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },

    /// Update an existing task. The task's board never changes.
    Update {
        /// Task ID.
        id: u64,
        /// New title.
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },

    /// Move a task to another column of its board (a status, or a pipeline stage on Sponsorship).
    Move {
        /// Task ID.
        id: u64,
        /// Target column, e.g. "in-progress" or "proposal-sent".
        column: String,
        /// Board to look in. Defaults to the task's own board.
        #[arg(long, value_enum)]
        section: Option<Section>,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: u64,
        /// Board to delete from. Defaults to the task's own board.
        #[arg(long, value_enum)]
        section: Option<Section>,
    },

    /// List tasks with optional filters.
    List {
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
        #[arg(long, value_enum)]
        section: Option<Section>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Pipeline stage (sponsorship tasks only).
        #[arg(long, value_enum)]
        stage: Option<PipelineStage>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        owner: Option<String>,
        /// Deadline filter: today | this-week | overdue | none.
        #[arg(long, value_enum)]
        deadline: Option<DeadlineFilter>,
        #[arg(long, value_enum, default_value_t = SortKey::Deadline)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// View a single task.
    View {
        /// Task ID.
        id: u64,
    },

    /// Show a board as kanban columns.
    Board {
        #[arg(value_enum)]
        section: Section,
    },

    /// Show the dashboard summary.
    Summary {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Revenue settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Team roster used for task owners.
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },

    /// Access checks.
    Access {
        #[command(subcommand)]
        action: AccessAction,
    },

    /// Export tasks to CSV.
    Export {
        /// Output file path.
        #[arg(long, short)]
        output: Option<String>,
        /// Only export one board.
        #[arg(long, value_enum)]
        section: Option<Section>,
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
    },

    /// Create a timestamped backup of the data files.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show current settings.
    Show,
    /// Set the revenue target. Non-numeric input sets 0.
    Target {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Set the manual revenue adjustment added to secured revenue. Non-numeric input sets 0.
    Adjust {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

#[derive(Subcommand)]
pub enum TeamAction {
    /// List team members.
    List,
    /// Add a team member.
    Add {
        name: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Rename a team member.
    Rename { id: u64, name: String },
    /// Remove a team member. Tasks keep their owner text.
    Remove { id: u64 },
}

#[derive(Subcommand)]
pub enum AccessAction {
    /// Check whether an e-mail address is on an allowed domain.
    CheckEmail { email: String },
}

/// Task fields shared by `add` and `update`.
#[derive(Args, Debug, Default, Clone)]
pub struct TaskFields {
    /// Longer description.
    #[arg(long)]
    pub desc: Option<String>,
    /// Owner, usually a team member name.
    #[arg(long)]
    pub owner: Option<String>,
    /// Deadline: YYYY-MM-DD, "today", "tomorrow", "in Nd", "in Nw", a weekday, or "none".
    #[arg(long)]
    pub deadline: Option<String>,
    /// Status: not-started | in-progress | blocked | completed.
    #[arg(long, value_enum)]
    pub status: Option<Status>,
    /// Priority: low | medium | high | critical.
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Pipeline stage (sponsorship only).
    #[arg(long, value_enum)]
    pub stage: Option<PipelineStage>,
    /// Sponsor company (sponsorship only).
    #[arg(long)]
    pub company: Option<String>,
    /// Sponsor contact name (sponsorship only).
    #[arg(long)]
    pub contact: Option<String>,
    /// Deal value in euros (sponsorship only).
    #[arg(long, allow_hyphen_values = true)]
    pub deal_value: Option<String>,
    /// Close probability, 0-100 (sponsorship only).
    #[arg(long, allow_hyphen_values = true)]
    pub probability: Option<String>,
    /// Date of last contact (sponsorship only).
    #[arg(long)]
    pub last_contacted: Option<String>,
    /// Date of next follow-up (sponsorship only).
    #[arg(long)]
    pub next_follow_up: Option<String>,
    /// Lead source (sponsorship only).
    #[arg(long)]
    pub source: Option<String>,
    /// Notes on the current stage (sponsorship only).
    #[arg(long)]
    pub stage_notes: Option<String>,
}

impl TaskFields {
    fn has_sponsorship_fields(&self) -> bool {
        self.stage.is_some()
            || self.company.is_some()
            || self.contact.is_some()
            || self.deal_value.is_some()
            || self.probability.is_some()
            || self.last_contacted.is_some()
            || self.next_follow_up.is_some()
            || self.source.is_some()
            || self.stage_notes.is_some()
    }

    /// Overlay the given flags onto a draft.
    pub fn apply(self, draft: &mut TaskDraft, today: NaiveDate) -> Result<()> {
        if self.has_sponsorship_fields() && !draft.section.uses_pipeline() {
            bail!("sponsorship fields only apply to the {} board", Section::Sponsorship);
        }
        if let Some(v) = self.desc {
            draft.description = v;
        }
        if let Some(v) = self.owner {
            draft.owner = v;
        }
        if let Some(v) = self.deadline {
            draft.deadline = parse_date_flag(&v, today)?;
        }
        if let Some(v) = self.status {
            draft.status = v;
        }
        if let Some(v) = self.priority {
            draft.priority = v;
        }
        if let Some(v) = self.notes {
            draft.notes = v;
        }
        if draft.section.uses_pipeline() {
            let s = draft.sponsorship.get_or_insert_with(SponsorshipDraft::default);
            if let Some(v) = self.stage {
                s.pipeline_stage = v;
            }
            if let Some(v) = self.company {
                s.company = v;
            }
            if let Some(v) = self.contact {
                s.contact_name = v;
            }
            if let Some(v) = self.deal_value {
                s.deal_value = v;
            }
            if let Some(v) = self.probability {
                s.probability = v;
            }
            if let Some(v) = self.last_contacted {
                s.last_contacted = parse_date_flag(&v, today)?;
            }
            if let Some(v) = self.next_follow_up {
                s.next_follow_up = parse_date_flag(&v, today)?;
            }
            if let Some(v) = self.source {
                s.source = v;
            }
            if let Some(v) = self.stage_notes {
                s.stage_notes = v;
            }
        }
        Ok(())
    }
}

/// Parse human-readable date input.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday" ... "sunday" (this week's occurrence, or today), "next monday", ...
/// - "end of week" / "eow", "end of month" / "eom"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD"
pub fn parse_date_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let (_, end) = crate::board::start_end_of_this_week(today);
            return Some(end);
        }
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            return NaiveDate::from_ymd_opt(year, month, 1).map(|d| d - Duration::days(1));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(n) = rest.strip_suffix('d').and_then(|n| n.trim().parse::<i64>().ok()) {
            return Some(today + Duration::days(n));
        }
        if let Some(n) = rest.strip_suffix('w').and_then(|n| n.trim().parse::<i64>().ok()) {
            return Some(today + Duration::weeks(n));
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current = today.weekday().num_days_from_monday() as i64;
    for (name, target) in weekdays {
        let days_ahead = (target + 7 - current) % 7;
        if s == name || s == format!("this {name}") {
            return Some(today + Duration::days(days_ahead));
        }
        if s == format!("next {name}") {
            let days = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Parse a date flag into a UTC midnight timestamp. "none" or "" clears the date.
pub fn parse_date_flag(s: &str, today: NaiveDate) -> Result<Option<DateTime<Utc>>> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    let date = parse_date_input(trimmed, today).with_context(|| format!("unrecognised date '{trimmed}'"))?;
    Ok(date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive)))
}

fn save<C: Clock>(db: &Database, dashboard: &Dashboard<C>) -> Result<()> {
    db.save_dashboard(dashboard).context("failed to save dashboard")
}

fn require_task<'a, C: Clock>(dashboard: &'a Dashboard<C>, id: u64) -> Result<&'a Task> {
    dashboard
        .store()
        .find(id)
        .with_context(|| format!("task {id} not found"))
}

/// Create the data directory and its documents.
pub fn cmd_init(db: &Database, config: &Config, sample: bool, force: bool) -> Result<()> {
    if !force && (db.exists(TASKS_FILE) || db.exists(SETTINGS_FILE)) {
        println!("Already initialised: {} (use --force to reset)", db.dir().display());
        return Ok(());
    }
    let mut dashboard = Dashboard::new(SectionStore::new(), Settings::with_revenue_target(config.default_revenue_target));
    if sample {
        seed_samples(&mut dashboard)?;
    }
    save(db, &dashboard)?;
    println!("Initialised {} with {} task(s)", db.dir().display(), dashboard.store().len());
    Ok(())
}

/// Save the starter cards through the dashboard, stamped with its clock.
pub fn seed_samples<C: Clock>(dashboard: &mut Dashboard<C>) -> Result<usize> {
    let samples = sample_tasks(dashboard.now());
    for task in &samples {
        dashboard.create_or_update_task(TaskDraft::from_task(task))?;
    }
    Ok(samples.len())
}

/// Add a new task to a board.
pub fn cmd_add<C: Clock>(
    db: &Database,
    dashboard: &mut Dashboard<C>,
    section: Section,
    title: String,
    fields: TaskFields,
) -> Result<()> {
    let mut draft = TaskDraft::new(section, title);
    fields.apply(&mut draft, dashboard.now().date_naive())?;
    let saved = dashboard.create_or_update_task(draft)?;
    save(db, dashboard)?;
    println!("Added task {} to {}", saved.id, saved.section);
    Ok(())
}

/// Update an existing task's fields.
pub fn cmd_update<C: Clock>(
    db: &Database,
    dashboard: &mut Dashboard<C>,
    id: u64,
    title: Option<String>,
    fields: TaskFields,
) -> Result<()> {
    let mut draft = TaskDraft::from_task(require_task(dashboard, id)?);
    if let Some(title) = title {
        draft.title = title;
    }
    fields.apply(&mut draft, dashboard.now().date_naive())?;
    let saved = dashboard.create_or_update_task(draft)?;
    save(db, dashboard)?;
    println!("Updated task {}", saved.id);
    Ok(())
}

/// Move a task to a kanban column.
pub fn cmd_move<C: Clock>(
    db: &Database,
    dashboard: &mut Dashboard<C>,
    id: u64,
    column: &str,
    section: Option<Section>,
) -> Result<()> {
    let section = section.or_else(|| dashboard.store().find(id).map(|t| t.section));
    let Some(section) = section else {
        println!("No task {id}; nothing moved.");
        return Ok(());
    };
    let column = Column::parse_for(section, column)
        .with_context(|| format!("'{column}' is not a column of the {section} board"))?;
    if dashboard.move_task(id, section, column)? {
        save(db, dashboard)?;
        println!("Moved task {id} to {column}");
    } else {
        println!("No task {id} on the {section} board; nothing moved.");
    }
    Ok(())
}

/// Delete a task.
pub fn cmd_delete<C: Clock>(
    db: &Database,
    dashboard: &mut Dashboard<C>,
    id: u64,
    section: Option<Section>,
) -> Result<()> {
    let section = section.or_else(|| dashboard.store().find(id).map(|t| t.section));
    let Some(section) = section else {
        println!("No task {id}; nothing deleted.");
        return Ok(());
    };
    if dashboard.delete_task(id, section) {
        save(db, dashboard)?;
        println!("Deleted task {id}");
    } else {
        println!("No task {id} on the {section} board; nothing deleted.");
    }
    Ok(())
}

/// List tasks with optional filtering and sorting.
pub fn cmd_list<C: Clock>(
    dashboard: &Dashboard<C>,
    filter: TaskFilter,
    sort: SortKey,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut tasks = filter.apply(dashboard.store(), dashboard.now().date_naive());
    sort_tasks(&mut tasks, sort);
    if let Some(n) = limit {
        tasks.truncate(n);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        print_table(&tasks, dashboard.now().date_naive());
    }
    Ok(())
}

/// View detailed information about a specific task.
pub fn cmd_view<C: Clock>(dashboard: &Dashboard<C>, id: u64) -> Result<()> {
    let task = require_task(dashboard, id)?;
    let today = dashboard.now().date_naive();
    let dash = |v: Option<&str>| v.unwrap_or("-").to_string();
    let date = |d: Option<DateTime<Utc>>| match d {
        Some(d) => format!("{} ({})", d.date_naive(), format_deadline_relative(Some(d), today)),
        None => "-".into(),
    };

    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Section:      {}", task.section);
    println!("Status:       {}", task.status);
    println!("Priority:     {}", task.priority);
    println!("Owner:        {}", dash(task.owner.as_deref()));
    println!("Deadline:     {}", date(task.deadline_at()));
    if let Some(s) = &task.sponsorship {
        println!("Stage:        {}", s.pipeline_stage);
        println!("Company:      {}", if s.company.is_empty() { "-" } else { &s.company });
        println!("Contact:      {}", if s.contact_name.is_empty() { "-" } else { &s.contact_name });
        println!("Deal value:   {}", format_money(s.deal_value));
        println!("Probability:  {}%", s.probability);
        println!("Expected:     {}", format_money(s.expected_or_derived()));
        println!("Last contact: {}", date(s.last_contacted.flatten()));
        println!("Follow-up:    {}", date(s.next_follow_up.flatten()));
        println!("Source:       {}", dash(s.source.as_deref()));
        println!("Stage notes:  {}", dash(s.stage_notes.as_deref()));
    }
    println!("Created UTC:  {}", task.created_at.to_rfc3339());
    println!("Updated UTC:  {}", task.updated_at.to_rfc3339());
    println!("Description:\n{}\n", dash(task.description.as_deref()));
    println!("Notes:\n{}", dash(task.notes.as_deref()));
    Ok(())
}

/// Print a board as kanban columns.
pub fn cmd_board<C: Clock>(dashboard: &Dashboard<C>, section: Section) -> Result<()> {
    if !section.is_board() {
        bail!("{section} has no board; use `opsdash summary`");
    }
    let today = dashboard.now().date_naive();
    println!("{section}");
    for col in kanban(dashboard.store(), section) {
        println!("\n== {} ({}) ==", col.column, col.tasks.len());
        for t in col.tasks {
            let mut line = format!("  #{:<4} {} [{}]", t.id, truncate(&t.title, 40), t.priority);
            if let Some(s) = &t.sponsorship {
                if !s.company.is_empty() {
                    line.push_str(&format!(" {}", s.company));
                }
                line.push_str(&format!(" {} @ {}%", format_money(s.deal_value), s.probability));
            }
            if t.deadline_at().is_some() {
                line.push_str(&format!(" due {}", format_deadline_relative(t.deadline_at(), today)));
            }
            println!("{line}");
        }
    }
    Ok(())
}

fn print_summary(summary: &Summary, today: NaiveDate) {
    println!("Dashboard Summary");
    println!();
    println!("Sponsors confirmed:   {}", summary.total_sponsors_confirmed);
    println!(
        "Revenue secured:      {} of {} ({:.0}%)",
        format_money(summary.revenue_secured),
        format_money(summary.revenue_target),
        summary.secured_progress()
    );
    println!(
        "Pipeline expected:    {} ({:.0}% of target)",
        format_money(summary.pipeline_expected_revenue),
        summary.pipeline_progress()
    );

    println!("\nUpcoming deadlines (next 14 days):");
    if summary.upcoming_deadlines.is_empty() {
        println!("  -");
    }
    for t in &summary.upcoming_deadlines {
        println!(
            "  #{:<4} {:<12} {} ({})",
            t.id,
            format_deadline_relative(t.deadline_at(), today),
            t.title,
            t.section
        );
    }

    println!("\nHigh priority:");
    if summary.high_priority_tasks.is_empty() {
        println!("  -");
    }
    for t in &summary.high_priority_tasks {
        println!("  #{:<4} {:<9} {} ({})", t.id, t.priority, t.title, t.section);
    }
}

/// Show the dashboard summary.
pub fn cmd_summary<C: Clock>(dashboard: &Dashboard<C>, json: bool) -> Result<()> {
    let summary = dashboard.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, dashboard.now().date_naive());
    }
    Ok(())
}

pub fn cmd_settings<C: Clock>(db: &Database, dashboard: &mut Dashboard<C>, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => {
            let s = dashboard.settings();
            println!("Revenue target:      {}", format_money(s.revenue_target));
            println!("Manual adjustment:   {}", format_money(s.manual_revenue_adjustment));
            println!("Team members:        {}", s.team_members.len());
            return Ok(());
        }
        SettingsAction::Target { value } => {
            dashboard.set_revenue_target_input(&value);
            println!("Revenue target set to {}", format_money(dashboard.settings().revenue_target));
        }
        SettingsAction::Adjust { value } => {
            dashboard.set_manual_adjustment_input(&value);
            println!(
                "Manual adjustment set to {}",
                format_money(dashboard.settings().manual_revenue_adjustment)
            );
        }
    }
    save(db, dashboard)
}

pub fn cmd_team<C: Clock>(db: &Database, dashboard: &mut Dashboard<C>, action: TeamAction) -> Result<()> {
    match action {
        TeamAction::List => {
            println!("{:<5} {:<24} {}", "ID", "Name", "Email");
            for m in &dashboard.settings().team_members {
                println!("{:<5} {:<24} {}", m.id, truncate(&m.name, 24), m.email.as_deref().unwrap_or("-"));
            }
            return Ok(());
        }
        TeamAction::Add { name, email } => {
            let id = dashboard.add_team_member(&name, email.as_deref())?;
            println!("Added team member {id}");
        }
        TeamAction::Rename { id, name } => {
            if !dashboard.rename_team_member(id, &name)? {
                println!("No team member {id}; nothing renamed.");
                return Ok(());
            }
            println!("Renamed team member {id}");
        }
        TeamAction::Remove { id } => {
            if !dashboard.remove_team_member(id) {
                println!("No team member {id}; nothing removed.");
                return Ok(());
            }
            println!("Removed team member {id}");
        }
    }
    save(db, dashboard)
}

pub fn cmd_access(config: &Config, action: AccessAction) -> Result<()> {
    match action {
        AccessAction::CheckEmail { email } => {
            if is_email_allowed(&email, &config.access.allowed_domains) {
                println!("allowed");
                Ok(())
            } else {
                bail!("{} is not on an allowed domain", email.trim())
            }
        }
    }
}

/// Export tasks to CSV.
pub fn cmd_export<C: Clock>(
    dashboard: &Dashboard<C>,
    output: Option<String>,
    section: Option<Section>,
    all: bool,
) -> Result<()> {
    let output_path = output.unwrap_or_else(|| "tasks.csv".to_string());
    let filter = TaskFilter { section, all, ..TaskFilter::default() };
    let tasks = filter.apply(dashboard.store(), dashboard.now().date_naive());
    std::fs::write(&output_path, tasks_to_csv(&tasks))
        .with_context(|| format!("failed to write {output_path}"))?;
    println!("Exported {} task(s) to {}", tasks.len(), output_path);
    Ok(())
}

pub fn cmd_backup(db: &Database) -> Result<()> {
    for path in db.backup(Local::now())? {
        println!("Backup created: {}", path.display());
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Resolve the data directory: explicit path, else `$HOME/.opsdash`.
pub fn resolve_data_dir(dir: Option<&Path>) -> std::path::PathBuf {
    match dir {
        Some(d) => d.to_path_buf(),
        None => {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            Path::new(&home).join(".opsdash")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    #[test]
    fn natural_dates() {
        let today = wednesday();
        assert_eq!(parse_date_input("today", today), Some(today));
        assert_eq!(parse_date_input("in 3d", today), NaiveDate::from_ymd_opt(2026, 10, 17));
        assert_eq!(parse_date_input("in 2w", today), NaiveDate::from_ymd_opt(2026, 10, 28));
        assert_eq!(parse_date_input("friday", today), NaiveDate::from_ymd_opt(2026, 10, 16));
        assert_eq!(parse_date_input("next wed", today), NaiveDate::from_ymd_opt(2026, 10, 21));
        assert_eq!(parse_date_input("eow", today), NaiveDate::from_ymd_opt(2026, 10, 18));
        assert_eq!(parse_date_input("eom", today), NaiveDate::from_ymd_opt(2026, 10, 31));
        assert_eq!(parse_date_input("2026-12-01", today), NaiveDate::from_ymd_opt(2026, 12, 1));
        assert_eq!(parse_date_input("someday", today), None);
    }

    #[test]
    fn date_flags_become_utc_midnight_or_clear() {
        let today = wednesday();
        let dt = parse_date_flag("tomorrow", today).unwrap().unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-10-15T00:00:00+00:00");
        assert_eq!(parse_date_flag("none", today).unwrap(), None);
        assert!(parse_date_flag("whenever", today).is_err());
    }

    #[test]
    fn samples_are_seeded_with_the_dashboard_clock() {
        fn fixed() -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap()
        }
        let mut dashboard =
            Dashboard::with_clock(SectionStore::new(), Settings::default(), fixed as fn() -> DateTime<Utc>);
        assert_eq!(seed_samples(&mut dashboard).unwrap(), 3);

        let ids: Vec<u64> = dashboard.store().iter().map(|t| t.id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert!(dashboard.store().iter().all(|t| t.created_at == fixed() && t.updated_at == fixed()));
        assert_eq!(dashboard.summary().pipeline_expected_revenue, 47_000.0);
    }

    #[test]
    fn sponsorship_flags_rejected_on_other_boards() {
        let mut draft = TaskDraft::new(Section::Merchandise, "Mugs");
        let fields = TaskFields { deal_value: Some("100".into()), ..TaskFields::default() };
        assert!(fields.apply(&mut draft, wednesday()).is_err());
    }

    #[test]
    fn flags_overlay_a_sponsorship_draft() {
        let mut draft = TaskDraft::new(Section::Sponsorship, "Acme");
        let fields = TaskFields {
            stage: Some(PipelineStage::ProposalSent),
            probability: Some("60".into()),
            deal_value: Some("20000".into()),
            priority: Some(Priority::High),
            ..TaskFields::default()
        };
        fields.apply(&mut draft, wednesday()).unwrap();
        let s = draft.sponsorship.as_ref().unwrap();
        assert_eq!(s.pipeline_stage, PipelineStage::ProposalSent);
        assert_eq!(s.probability, "60");
        assert_eq!(draft.priority, Priority::High);
    }
}
