use std::collections::HashMap;

use chrono::NaiveDate;
use imgui::{StyleColor, TableBgTarget, TableFlags, Ui};

use crate::api::ApiClient;
use crate::grid::{
    build_submission, fmt_cell, fmt_hours, fmt_pair, grand_total, row_total, rows_from_timesheet,
    week_bounds, week_days, CellEntry, GridRow,
};
use crate::gui::list::{contains_ci, draw_filter, draw_pager, ListView};
use crate::gui::toast::Toasts;
use crate::gui::widgets::{parse_date, poll_options};
use crate::gui::{Route, Section};
use crate::model::{
    Assignment, ProjectId, ResourceId, Task, Timesheet, TimesheetId, TimesheetSummary,
    STATUS_NEW, STATUS_SUBMITTED,
};
use crate::remote::Remote;

/// How the grid editor was reached. A fresh timesheet picks its own week;
/// a loaded one is pinned to the week it was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(TimesheetId),
    View(TimesheetId),
}

// ---------------------------------------------------------------------------
// Timesheet list

pub struct TimesheetList {
    pub view: ListView<TimesheetSummary>,
}

impl TimesheetList {
    pub fn new() -> Self {
        TimesheetList {
            view: ListView::new(),
        }
    }

    pub fn enter(&mut self, api: &ApiClient, token: &str, resource_id: ResourceId) {
        let api = api.clone();
        let token = token.to_string();
        self.view
            .refetch(move || api.timesheets_by_resource(&token, resource_id));
    }

    pub fn draw(&mut self, ui: &Ui, toasts: &mut Toasts, nav: &mut Option<Route>) {
        if let Some(err) = self.view.poll() {
            toasts.error(format!("Failed to load timesheets: {}", err));
        }
        ui.text("Timesheets");
        ui.separator();
        draw_filter(ui, &mut self.view.filter, &mut self.view.page);
        ui.same_line();
        if ui.button("Add New Timesheet") {
            *nav = Some(Route::Section(Section::Timesheet(EditorMode::Create)));
        }

        let (rows, pages) = self.view.visible(|t, f| {
            contains_ci(
                &[
                    t.resource_name.as_str(),
                    &t.week_start_date.to_string(),
                    t.status_name.as_str(),
                ],
                f,
            )
        });
        if let Some(_table) =
            ui.begin_table_with_flags("##timesheets", 6, TableFlags::BORDERS | TableFlags::ROW_BG)
        {
            ui.table_setup_column("Resource");
            ui.table_setup_column("Week Start");
            ui.table_setup_column("Week End");
            ui.table_setup_column("Total Hours");
            ui.table_setup_column("Status");
            ui.table_setup_column("##actions");
            ui.table_headers_row();
            for sheet in rows {
                ui.table_next_row();
                ui.table_next_column();
                ui.text(&sheet.resource_name);
                ui.table_next_column();
                ui.text(sheet.week_start_date.to_string());
                ui.table_next_column();
                ui.text(sheet.week_end_date.to_string());
                ui.table_next_column();
                ui.text(fmt_hours(sheet.total_hours));
                ui.table_next_column();
                ui.text(&sheet.status_name);
                ui.table_next_column();
                // Only an unsubmitted sheet may still be edited.
                if sheet.status_name == "New" {
                    if ui.button(format!("Edit##sheet{}", sheet.timesheet_id)) {
                        *nav = Some(Route::Section(Section::Timesheet(EditorMode::Edit(
                            sheet.timesheet_id,
                        ))));
                    }
                } else if ui.button(format!("View##sheet{}", sheet.timesheet_id)) {
                    *nav = Some(Route::Section(Section::Timesheet(EditorMode::View(
                        sheet.timesheet_id,
                    ))));
                }
            }
        }
        draw_pager(ui, &mut self.view.page, pages);
        if self.view.is_loading() {
            ui.text_disabled("Loading...");
        }
    }
}

// ---------------------------------------------------------------------------
// Grid editor

struct CellEdit {
    row: usize,
    day: NaiveDate,
    billable: String,
    non_billable: String,
    notes: String,
}

enum CellAction {
    None,
    Save,
    Cancel,
}

pub struct GridEditor {
    mode: EditorMode,
    resource_id: ResourceId,
    week_input: String,
    week: Option<(NaiveDate, NaiveDate)>,
    rows: Vec<GridRow>,
    timesheet_id: Option<TimesheetId>,
    assignments: Remote<Vec<Assignment>>,
    task_cache: HashMap<ProjectId, Vec<Task>>,
    task_fetches: HashMap<ProjectId, Remote<Vec<Task>>>,
    exists: Remote<bool>,
    week_taken: bool,
    load: Remote<Timesheet>,
    save: Remote<()>,
    cell_edit: Option<CellEdit>,
    open_cell_popup: bool,
}

impl GridEditor {
    pub fn new() -> Self {
        GridEditor {
            mode: EditorMode::Create,
            resource_id: 0,
            week_input: String::new(),
            week: None,
            rows: Vec::new(),
            timesheet_id: None,
            assignments: Remote::new(),
            task_cache: HashMap::new(),
            task_fetches: HashMap::new(),
            exists: Remote::new(),
            week_taken: false,
            load: Remote::new(),
            save: Remote::new(),
            cell_edit: None,
            open_cell_popup: false,
        }
    }

    pub fn enter(&mut self, mode: EditorMode, api: &ApiClient, token: &str, resource_id: ResourceId) {
        *self = GridEditor::new();
        self.mode = mode;
        self.resource_id = resource_id;
        {
            let api = api.clone();
            let token = token.to_string();
            self.assignments
                .start(move || api.assignments_by_resource(&token, resource_id));
        }
        match mode {
            EditorMode::Create => {}
            EditorMode::Edit(id) | EditorMode::View(id) => {
                let api = api.clone();
                let token = token.to_string();
                self.load.start(move || api.timesheet(&token, id));
            }
        }
    }

    fn read_only(&self) -> bool {
        matches!(self.mode, EditorMode::View(_))
    }

    fn ensure_tasks(&mut self, project_id: ProjectId, api: &ApiClient, token: &str) {
        if self.task_cache.contains_key(&project_id) || self.task_fetches.contains_key(&project_id)
        {
            return;
        }
        let mut remote = Remote::new();
        {
            let api = api.clone();
            let token = token.to_string();
            remote.start(move || api.tasks_by_project(&token, project_id));
        }
        self.task_fetches.insert(project_id, remote);
    }

    fn apply_loaded(&mut self, sheet: Timesheet, api: &ApiClient, token: &str) {
        self.week = Some((sheet.week_start_date, sheet.week_end_date));
        self.week_input = sheet.week_start_date.to_string();
        self.rows = rows_from_timesheet(&sheet);
        self.timesheet_id = sheet.timesheet_id.or(match self.mode {
            EditorMode::Edit(id) | EditorMode::View(id) => Some(id),
            EditorMode::Create => None,
        });
        let referenced: Vec<ProjectId> = self.rows.iter().filter_map(|row| row.project_id).collect();
        for project_id in referenced {
            self.ensure_tasks(project_id, api, token);
        }
    }

    fn apply_week_pick(&mut self, picked: NaiveDate, api: &ApiClient, token: &str) {
        let bounds = week_bounds(picked);
        if self.week == Some(bounds) {
            return;
        }
        self.week = Some(bounds);
        self.rows = vec![GridRow::default()];
        self.week_taken = false;
        let (start, end) = bounds;
        let api = api.clone();
        let token = token.to_string();
        let resource_id = self.resource_id;
        self.exists
            .start(move || api.timesheet_exists(&token, resource_id, start, end));
    }

    fn poll(&mut self, api: &ApiClient, token: &str, toasts: &mut Toasts, nav: &mut Option<Route>) {
        poll_options(&mut self.assignments, "assignments", toasts);

        self.load.poll();
        if let Some(sheet) = self.load.take_ready() {
            self.apply_loaded(sheet, api, token);
        }
        if let Some(err) = self.load.take_failed() {
            toasts.error(format!("Failed to load timesheet: {}", err));
        }

        let finished: Vec<ProjectId> = self.task_fetches.keys().copied().collect();
        for project_id in finished {
            let done = {
                let remote = match self.task_fetches.get_mut(&project_id) {
                    Some(remote) => remote,
                    None => continue,
                };
                remote.poll();
                if let Some(tasks) = remote.take_ready() {
                    Some(Ok(tasks))
                } else {
                    remote.take_failed().map(Err)
                }
            };
            match done {
                Some(Ok(tasks)) => {
                    self.task_cache.insert(project_id, tasks);
                    self.task_fetches.remove(&project_id);
                }
                Some(Err(err)) => {
                    toasts.error(format!("Failed to load tasks: {}", err));
                    self.task_fetches.remove(&project_id);
                }
                None => {}
            }
        }

        self.exists.poll();
        if let Some(taken) = self.exists.take_ready() {
            self.week_taken = taken;
            if taken {
                toasts.error("A timesheet already exists for this week");
            }
        }
        if let Some(err) = self.exists.take_failed() {
            toasts.error(format!("Failed to check for an existing timesheet: {}", err));
        }

        self.save.poll();
        if self.save.take_ready().is_some() {
            toasts.success("Timesheet saved");
            *nav = Some(Route::Section(Section::Timesheets));
        }
        if let Some(err) = self.save.take_failed() {
            // The backend's own wording when it sent one.
            toasts.error(err.to_string());
        }
    }

    pub fn draw(
        &mut self,
        ui: &Ui,
        api: &ApiClient,
        token: &str,
        toasts: &mut Toasts,
        nav: &mut Option<Route>,
    ) {
        self.poll(api, token, toasts, nav);

        ui.text(match self.mode {
            EditorMode::Create => "New Timesheet",
            EditorMode::Edit(_) => "Edit Timesheet",
            EditorMode::View(_) => "View Timesheet",
        });
        ui.separator();

        self.draw_week_picker(ui, api, token, toasts);

        let week_start = match self.week {
            Some((start, _)) => start,
            None => {
                if self.mode == EditorMode::Create {
                    ui.text_disabled("Pick any date of the week to start.");
                } else {
                    ui.text_disabled("Loading timesheet...");
                }
                return;
            }
        };
        if self.week_taken {
            ui.text_colored(
                [0.75, 0.1, 0.1, 1.0],
                "A timesheet already exists for this week; it cannot be saved again.",
            );
        }

        self.draw_grid(ui, api, token, week_start);

        if !self.read_only() {
            if ui.button("Add Row") {
                self.rows.push(GridRow::default());
            }
        }

        let total = grand_total(&self.rows);
        ui.text(format!(
            "Week total: {}  (combined {})",
            fmt_pair(total),
            fmt_hours(total.combined())
        ));

        self.draw_actions(ui, api, token, toasts, nav);
        self.draw_cell_popup(ui);
    }

    fn draw_week_picker(&mut self, ui: &Ui, api: &ApiClient, token: &str, toasts: &mut Toasts) {
        match self.week {
            // Week is immutable once a timesheet has been loaded for
            // edit/view, and fixed after creation too.
            Some((start, end)) if self.mode != EditorMode::Create => {
                ui.text(format!("Week: {} - {}", start, end));
            }
            None if self.mode != EditorMode::Create => {}
            _ => {
                ui.set_next_item_width(160.0);
                let entered = ui
                    .input_text("##week_date", &mut self.week_input)
                    .hint("YYYY-MM-DD")
                    .enter_returns_true(true)
                    .build();
                ui.same_line();
                let clicked = ui.button("Set Week");
                if entered || clicked {
                    match parse_date(&self.week_input) {
                        Some(picked) => self.apply_week_pick(picked, api, token),
                        None => toasts.error("Enter a date as YYYY-MM-DD"),
                    }
                }
                if let Some((start, end)) = self.week {
                    ui.same_line();
                    ui.text(format!("Week: {} - {}", start, end));
                }
            }
        }
    }

    fn project_options(&self) -> Vec<(ProjectId, String)> {
        let mut seen = Vec::new();
        let mut options = Vec::new();
        for assignment in self.assignments.value().map(Vec::as_slice).unwrap_or(&[]) {
            if seen.contains(&assignment.project_id) {
                continue;
            }
            seen.push(assignment.project_id);
            let name = assignment
                .project_name
                .clone()
                .unwrap_or_else(|| format!("Project #{}", assignment.project_id));
            options.push((assignment.project_id, name));
        }
        options
    }

    fn task_options(&self, project_id: ProjectId) -> Vec<(i64, String)> {
        self.task_cache
            .get(&project_id)
            .map(|tasks| {
                tasks
                    .iter()
                    .filter_map(|t| t.task_id.map(|id| (id, t.task_name.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn draw_grid(&mut self, ui: &Ui, api: &ApiClient, token: &str, week_start: NaiveDate) {
        let days = week_days(week_start);
        let read_only = self.read_only();
        let projects = self.project_options();

        let flags = TableFlags::BORDERS | TableFlags::ROW_BG | TableFlags::SIZING_STRETCH_PROP;
        let table = match ui.begin_table_with_flags("##grid", days.len() + 3, flags) {
            Some(table) => table,
            None => return,
        };
        ui.table_setup_column("Project");
        ui.table_setup_column("Task");
        for day in &days {
            ui.table_setup_column(day.format("%a %m/%d").to_string());
        }
        ui.table_setup_column("Total");
        ui.table_headers_row();

        for row_index in 0..self.rows.len() {
            let _row_id = ui.push_id_usize(row_index);
            ui.table_next_row();

            ui.table_next_column();
            let current_project = self.rows[row_index].project_id;
            let preview = current_project
                .map(|id| {
                    projects
                        .iter()
                        .find(|(pid, _)| *pid == id)
                        .map(|(_, name)| name.clone())
                        .unwrap_or_else(|| format!("Project #{}", id))
                })
                .unwrap_or_else(|| "Select project".to_string());
            ui.set_next_item_width(-1.0);
            if read_only {
                ui.text(&preview);
            } else if let Some(_combo) = ui.begin_combo("##project", &preview) {
                for (id, name) in &projects {
                    let selected = current_project == Some(*id);
                    if ui
                        .selectable_config(format!("{}##{}", name, id))
                        .selected(selected)
                        .build()
                        && !selected
                    {
                        self.rows[row_index].project_id = Some(*id);
                        // The task belongs to the old project; drop it.
                        self.rows[row_index].task_id = None;
                        self.ensure_tasks(*id, api, token);
                    }
                }
            }

            ui.table_next_column();
            let current_project = self.rows[row_index].project_id;
            let current_task = self.rows[row_index].task_id;
            let tasks = current_project
                .map(|pid| self.task_options(pid))
                .unwrap_or_default();
            let preview = current_task
                .and_then(|id| {
                    tasks
                        .iter()
                        .find(|(tid, _)| *tid == id)
                        .map(|(_, name)| name.clone())
                })
                .unwrap_or_else(|| "Select task".to_string());
            ui.set_next_item_width(-1.0);
            if read_only {
                ui.text(&preview);
            } else if let Some(_combo) = ui.begin_combo("##task", &preview) {
                for (id, name) in &tasks {
                    let selected = current_task == Some(*id);
                    if ui
                        .selectable_config(format!("{}##{}", name, id))
                        .selected(selected)
                        .build()
                        && !selected
                    {
                        self.rows[row_index].task_id = Some(*id);
                    }
                }
            }

            for (day_index, day) in days.iter().enumerate() {
                ui.table_next_column();
                if is_weekend(*day) {
                    let bg_color = ui.style_color(StyleColor::TableHeaderBg);
                    ui.table_set_bg_color(TableBgTarget::CELL_BG, bg_color);
                }
                let label = fmt_cell(self.rows[row_index].cell(*day));
                if read_only {
                    ui.text(&label);
                } else if ui.button(format!("{}##cell{}", label, day_index)) {
                    let cell = self.rows[row_index].cell(*day).cloned().unwrap_or_default();
                    self.cell_edit = Some(CellEdit {
                        row: row_index,
                        day: *day,
                        billable: fmt_hours(cell.billable),
                        non_billable: fmt_hours(cell.non_billable),
                        notes: cell.notes,
                    });
                    self.open_cell_popup = true;
                }
            }

            ui.table_next_column();
            ui.text(fmt_pair(row_total(&self.rows[row_index])));
        }
        table.end();
    }

    fn draw_actions(
        &mut self,
        ui: &Ui,
        api: &ApiClient,
        token: &str,
        toasts: &mut Toasts,
        nav: &mut Option<Route>,
    ) {
        if self.read_only() {
            if ui.button("Back") {
                *nav = Some(Route::Section(Section::Timesheets));
            }
            return;
        }
        let blocked = self.week_taken || self.save.is_loading();
        {
            let _disabled = ui.begin_disabled(blocked);
            if ui.button("Save") {
                self.submit(STATUS_NEW, api, token, toasts);
            }
            ui.same_line();
            if ui.button("Submit") {
                self.submit(STATUS_SUBMITTED, api, token, toasts);
            }
        }
        ui.same_line();
        if ui.button("Cancel") {
            *nav = Some(Route::Section(Section::Timesheets));
        }
    }

    fn submit(&mut self, status_id: i64, api: &ApiClient, token: &str, toasts: &mut Toasts) {
        let (start, end) = match self.week {
            Some(bounds) => bounds,
            None => return,
        };
        match build_submission(
            self.timesheet_id,
            self.resource_id,
            start,
            end,
            status_id,
            &self.rows,
        ) {
            Ok(sheet) => {
                let api = api.clone();
                let token = token.to_string();
                self.save.start(move || api.submit_timesheet(&token, &sheet));
            }
            Err(message) => toasts.error(message),
        }
    }

    fn draw_cell_popup(&mut self, ui: &Ui) {
        if self.open_cell_popup {
            ui.open_popup("Log Hours");
            self.open_cell_popup = false;
        }
        let mut action = CellAction::None;
        if let Some(edit) = self.cell_edit.as_mut() {
            let _ = ui.modal_popup("Log Hours", || {
                ui.text(edit.day.format("%A, %Y-%m-%d").to_string());
                ui.separator();
                ui.set_next_item_width(120.0);
                ui.input_text("Billable hours", &mut edit.billable).build();
                ui.set_next_item_width(120.0);
                ui.input_text("Non-billable hours", &mut edit.non_billable)
                    .build();
                ui.set_next_item_width(260.0);
                ui.input_text("Notes", &mut edit.notes).build();

                let can_save = !edit.billable.trim().is_empty()
                    && !edit.notes.trim().is_empty()
                    && edit.billable.trim().parse::<f64>().is_ok()
                    && parse_hours(&edit.non_billable).is_some();
                {
                    let _disabled = ui.begin_disabled(!can_save);
                    if ui.button("Save") {
                        action = CellAction::Save;
                        ui.close_current_popup();
                    }
                }
                ui.same_line();
                if ui.button("Cancel") {
                    action = CellAction::Cancel;
                    ui.close_current_popup();
                }
            });
        }
        match action {
            CellAction::Save => {
                if let Some(edit) = self.cell_edit.take() {
                    let entry = CellEntry {
                        billable: edit.billable.trim().parse().unwrap_or(0.0),
                        non_billable: parse_hours(&edit.non_billable).unwrap_or(0.0),
                        notes: edit.notes.trim().to_string(),
                    };
                    if let Some(row) = self.rows.get_mut(edit.row) {
                        row.set_cell(edit.day, entry);
                    }
                }
            }
            CellAction::Cancel => {
                self.cell_edit = None;
            }
            CellAction::None => {}
        }
    }
}

fn is_weekend(day: NaiveDate) -> bool {
    use chrono::Datelike;
    matches!(day.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}

/// Non-billable hours may be left empty, which counts as zero.
fn parse_hours(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_non_billable_input_counts_as_zero() {
        assert_eq!(parse_hours(""), Some(0.0));
        assert_eq!(parse_hours("  "), Some(0.0));
        assert_eq!(parse_hours("2.5"), Some(2.5));
        assert_eq!(parse_hours("x"), None);
    }

    #[test]
    fn weekends_are_saturday_and_sunday() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        assert!(!is_weekend(monday));
        assert!(is_weekend(saturday));
        assert!(is_weekend(sunday));
    }
}
