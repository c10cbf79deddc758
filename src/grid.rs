use std::collections::BTreeMap;
use std::ops::Add;

use chrono::{Datelike, Duration, NaiveDate};

use crate::model::{
    ProjectId, ResourceId, TaskId, Timesheet, TimesheetHour, TimesheetId, TimesheetLine,
};

/// Monday on or before `date` through the following Sunday. Picking a
/// Monday yields that same Monday as the start.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

/// The seven calendar days of the week starting at `week_start`.
pub fn week_days(week_start: NaiveDate) -> Vec<NaiveDate> {
    (0..7).map(|i| week_start + Duration::days(i)).collect()
}

/// One day's entry in a grid cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellEntry {
    pub billable: f64,
    pub non_billable: f64,
    pub notes: String,
}

impl CellEntry {
    /// Blank cells render as `0 | 0` and never reach the submission payload.
    pub fn is_blank(&self) -> bool {
        self.billable <= 0.0 && self.non_billable <= 0.0 && self.notes.is_empty()
    }
}

/// One editable row of the grid: a (project, task) selection plus the
/// entered cells, keyed by calendar day. Row order in the containing vector
/// is display order.
#[derive(Debug, Clone, Default)]
pub struct GridRow {
    pub project_id: Option<ProjectId>,
    pub task_id: Option<TaskId>,
    pub cells: BTreeMap<NaiveDate, CellEntry>,
}

impl GridRow {
    pub fn cell(&self, day: NaiveDate) -> Option<&CellEntry> {
        self.cells.get(&day)
    }

    pub fn set_cell(&mut self, day: NaiveDate, entry: CellEntry) {
        self.cells.insert(day, entry);
    }

    fn has_content(&self) -> bool {
        self.cells.values().any(|cell| !cell.is_blank())
    }
}

/// Billable/non-billable hour pair used by row and grand totals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HourTotals {
    pub billable: f64,
    pub non_billable: f64,
}

impl Add for HourTotals {
    type Output = HourTotals;

    fn add(self, other: HourTotals) -> HourTotals {
        HourTotals {
            billable: self.billable + other.billable,
            non_billable: self.non_billable + other.non_billable,
        }
    }
}

impl HourTotals {
    pub fn combined(&self) -> f64 {
        self.billable + self.non_billable
    }
}

/// Totals are recomputed from scratch on every call; the grid never exceeds
/// seven days by a handful of rows.
pub fn row_total(row: &GridRow) -> HourTotals {
    row.cells
        .values()
        .filter(|cell| !cell.is_blank())
        .fold(HourTotals::default(), |acc, cell| {
            acc + HourTotals {
                billable: cell.billable,
                non_billable: cell.non_billable,
            }
        })
}

pub fn grand_total(rows: &[GridRow]) -> HourTotals {
    rows.iter()
        .fold(HourTotals::default(), |acc, row| acc + row_total(row))
}

/// Integral hours print without a fractional tail, so a fresh cell reads
/// `0 | 0` and four billable hours read `4`.
pub fn fmt_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{}", hours)
    }
}

pub fn fmt_pair(totals: HourTotals) -> String {
    format!(
        "{} | {}",
        fmt_hours(totals.billable),
        fmt_hours(totals.non_billable)
    )
}

pub fn fmt_cell(cell: Option<&CellEntry>) -> String {
    match cell {
        Some(cell) => format!(
            "{} | {}",
            fmt_hours(cell.billable),
            fmt_hours(cell.non_billable)
        ),
        None => "0 | 0".to_string(),
    }
}

/// Serializes the grid into timesheet lines. Rows missing a project or task
/// selection are skipped, as are rows whose every cell is blank; surviving
/// rows contribute only their non-blank day entries.
pub fn build_lines(rows: &[GridRow]) -> Vec<TimesheetLine> {
    rows.iter()
        .filter_map(|row| {
            let project_id = row.project_id?;
            let task_id = row.task_id?;
            if !row.has_content() {
                return None;
            }
            let hours = row
                .cells
                .iter()
                .filter(|(_, cell)| !cell.is_blank())
                .map(|(day, cell)| TimesheetHour {
                    week_date: *day,
                    working_hours_billable: cell.billable,
                    working_hours_not_billable: cell.non_billable,
                    notes: cell.notes.clone(),
                })
                .collect();
            Some(TimesheetLine {
                project_id,
                task_id,
                hours,
            })
        })
        .collect()
}

/// Builds the submission payload, or rejects it locally when no line would
/// survive. No network call happens on rejection.
pub fn build_submission(
    timesheet_id: Option<TimesheetId>,
    resource_id: ResourceId,
    week_start: NaiveDate,
    week_end: NaiveDate,
    status_id: i64,
    rows: &[GridRow],
) -> Result<Timesheet, String> {
    let lines = build_lines(rows);
    if lines.is_empty() {
        return Err("There is nothing to save for this week".to_string());
    }
    Ok(Timesheet {
        timesheet_id,
        resource_id,
        week_start_date: week_start,
        week_end_date: week_end,
        status_id,
        lines,
    })
}

/// Inverse of `build_lines`: reconstructs grid rows from a fetched
/// timesheet, one row per line, preserving line order.
pub fn rows_from_timesheet(timesheet: &Timesheet) -> Vec<GridRow> {
    timesheet
        .lines
        .iter()
        .map(|line| {
            let cells = line
                .hours
                .iter()
                .map(|hour| {
                    (
                        hour.week_date,
                        CellEntry {
                            billable: hour.working_hours_billable,
                            non_billable: hour.working_hours_not_billable,
                            notes: hour.notes.clone(),
                        },
                    )
                })
                .collect();
            GridRow {
                project_id: Some(line.project_id),
                task_id: Some(line.task_id),
                cells,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::STATUS_NEW;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_bounds_always_span_monday_to_sunday() {
        // Every day of a sample week maps to the same bounds.
        for offset in 0..7 {
            let picked = day(2024, 6, 3) + Duration::days(offset);
            let (start, end) = week_bounds(picked);
            assert_eq!(start, day(2024, 6, 3));
            assert_eq!(end, day(2024, 6, 9));
            assert_eq!(start.weekday(), chrono::Weekday::Mon);
            assert_eq!(end.weekday(), chrono::Weekday::Sun);
            assert_eq!((end - start).num_days(), 6);
        }
    }

    #[test]
    fn picking_a_monday_starts_on_that_monday() {
        let monday = day(2024, 6, 3);
        let (start, _) = week_bounds(monday);
        assert_eq!(start, monday);
    }

    #[test]
    fn week_bounds_cross_month_and_year_edges() {
        let (start, end) = week_bounds(day(2024, 1, 1));
        assert_eq!(start, day(2024, 1, 1));
        assert_eq!(end, day(2024, 1, 7));

        let (start, end) = week_bounds(day(2023, 1, 1));
        assert_eq!(start, day(2022, 12, 26));
        assert_eq!(end, day(2023, 1, 1));
    }

    #[test]
    fn week_days_enumerates_all_seven() {
        let days = week_days(day(2024, 6, 3));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], day(2024, 6, 3));
        assert_eq!(days[6], day(2024, 6, 9));
    }

    fn row(project: Option<i64>, task: Option<i64>, cells: &[(NaiveDate, f64, f64, &str)]) -> GridRow {
        let mut grid_row = GridRow {
            project_id: project,
            task_id: task,
            ..GridRow::default()
        };
        for (date, billable, non_billable, notes) in cells {
            grid_row.set_cell(
                *date,
                CellEntry {
                    billable: *billable,
                    non_billable: *non_billable,
                    notes: notes.to_string(),
                },
            );
        }
        grid_row
    }

    #[test]
    fn totals_agree_per_row_per_cell_and_grand() {
        let rows = vec![
            row(
                Some(1),
                Some(2),
                &[
                    (day(2024, 6, 3), 4.0, 1.0, "a"),
                    (day(2024, 6, 4), 2.5, 0.0, "b"),
                ],
            ),
            row(
                Some(1),
                Some(3),
                &[(day(2024, 6, 5), 0.0, 3.0, "support")],
            ),
        ];
        let first = row_total(&rows[0]);
        assert_eq!(first.billable, 6.5);
        assert_eq!(first.non_billable, 1.0);

        let total = grand_total(&rows);
        assert_eq!(total, row_total(&rows[0]) + row_total(&rows[1]));
        assert_eq!(total.billable, 6.5);
        assert_eq!(total.non_billable, 4.0);
        assert_eq!(total.combined(), 10.5);
    }

    #[test]
    fn blank_cells_do_not_count() {
        let rows = vec![row(
            Some(1),
            Some(2),
            &[
                (day(2024, 6, 3), 0.0, 0.0, ""),
                (day(2024, 6, 4), 8.0, 0.0, "work"),
            ],
        )];
        assert_eq!(grand_total(&rows).billable, 8.0);
    }

    #[test]
    fn submission_skips_incomplete_and_empty_rows() {
        let rows = vec![
            // No task selected.
            row(Some(1), None, &[(day(2024, 6, 3), 4.0, 0.0, "lost")]),
            // No project selected.
            row(None, Some(2), &[(day(2024, 6, 3), 4.0, 0.0, "lost")]),
            // Every cell blank.
            row(Some(1), Some(2), &[(day(2024, 6, 3), 0.0, 0.0, "")]),
            // Survivor with one blank day that must be dropped.
            row(
                Some(3),
                Some(4),
                &[
                    (day(2024, 6, 4), 6.0, 0.0, "feature"),
                    (day(2024, 6, 5), 0.0, 0.0, ""),
                ],
            ),
        ];
        let lines = build_lines(&rows);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].project_id, 3);
        assert_eq!(lines[0].task_id, 4);
        assert_eq!(lines[0].hours.len(), 1);
        assert_eq!(lines[0].hours[0].week_date, day(2024, 6, 4));
    }

    #[test]
    fn notes_alone_keep_a_cell() {
        let rows = vec![row(
            Some(1),
            Some(2),
            &[(day(2024, 6, 3), 0.0, 0.0, "on-call, no hours logged")],
        )];
        let lines = build_lines(&rows);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].hours[0].notes, "on-call, no hours logged");
    }

    #[test]
    fn empty_submission_is_rejected_locally() {
        let rows = vec![row(Some(1), None, &[(day(2024, 6, 3), 4.0, 0.0, "x")])];
        let result = build_submission(
            None,
            7,
            day(2024, 6, 3),
            day(2024, 6, 9),
            STATUS_NEW,
            &rows,
        );
        assert!(result.is_err());
    }

    #[test]
    fn single_cell_week_builds_the_documented_payload() {
        // Week starting Monday 2024-06-03, one row, Tuesday cell only.
        let (start, end) = week_bounds(day(2024, 6, 3));
        let rows = vec![row(
            Some(1),
            Some(2),
            &[(day(2024, 6, 4), 4.0, 0.0, "design")],
        )];
        let sheet =
            build_submission(None, 9, start, end, STATUS_NEW, &rows).unwrap();
        assert_eq!(sheet.lines.len(), 1);
        let line = &sheet.lines[0];
        assert_eq!((line.project_id, line.task_id), (1, 2));
        assert_eq!(line.hours.len(), 1);
        let hour = &line.hours[0];
        assert_eq!(hour.week_date, day(2024, 6, 4));
        assert_eq!(hour.working_hours_billable, 4.0);
        assert_eq!(hour.working_hours_not_billable, 0.0);
        assert_eq!(hour.notes, "design");

        assert_eq!(fmt_pair(grand_total(&rows)), "4 | 0");
    }

    #[test]
    fn loading_a_timesheet_reconstructs_its_rows() {
        let rows = vec![
            row(
                Some(1),
                Some(2),
                &[
                    (day(2024, 6, 3), 4.0, 1.0, "a"),
                    (day(2024, 6, 6), 2.0, 0.5, "b"),
                ],
            ),
            row(Some(5), Some(6), &[(day(2024, 6, 7), 7.5, 0.0, "c")]),
        ];
        let sheet = build_submission(
            Some(11),
            9,
            day(2024, 6, 3),
            day(2024, 6, 9),
            STATUS_NEW,
            &rows,
        )
        .unwrap();

        let rebuilt = rows_from_timesheet(&sheet);
        assert_eq!(rebuilt.len(), rows.len());
        for (original, loaded) in rows.iter().zip(&rebuilt) {
            assert_eq!(original.project_id, loaded.project_id);
            assert_eq!(original.task_id, loaded.task_id);
            assert_eq!(original.cells, loaded.cells);
        }
    }

    #[test]
    fn hour_formatting_drops_integral_tails_only() {
        assert_eq!(fmt_hours(0.0), "0");
        assert_eq!(fmt_hours(4.0), "4");
        assert_eq!(fmt_hours(7.5), "7.5");
        assert_eq!(fmt_cell(None), "0 | 0");
    }
}
