//! Points heatmap: one row per driver, one column per race

use colored::Colorize;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Cell, Row, Table, Widget};
use std::fmt::Write;

use super::color::BLUES;
use super::terminal::buffer_to_ansi;
use crate::data::points::{PointsTable, RaceLabel};

const DRIVER_WIDTH: u16 = 6;
const CELL_WIDTH: u16 = 6;
const TOTAL_WIDTH: u16 = 8;

fn right(text: String) -> Cell<'static> {
    Cell::from(Line::from(text).alignment(Alignment::Right))
}

/// Race name cut to fit a column, leaving one space of padding
fn column_header(race: &RaceLabel) -> String {
    race.name.chars().take(usize::from(CELL_WIDTH) - 1).collect()
}

fn points_table(table: &PointsTable) -> Table<'static> {
    let max = table.max_cell();
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(table.races.iter().map(|race| right(column_header(race))))
            .chain(std::iter::once(right("Total".to_string()))),
    )
    .style(bold);

    let rows = table.rows.iter().map(|row| {
        let cells = table.races.iter().map(|race| match row.points_in(race.round) {
            Some(points) => {
                let bg = BLUES.map(points, 0.0, max);
                right(format_points(points)).style(
                    Style::default()
                        .fg(Color::from(bg.contrast_text()))
                        .bg(Color::from(bg)),
                )
            }
            None => Cell::from(""),
        });
        Row::new(
            std::iter::once(Cell::from(row.driver.clone()))
                .chain(cells)
                .chain(std::iter::once(right(format_points(row.total)).style(bold))),
        )
    });

    let widths = std::iter::once(Constraint::Length(DRIVER_WIDTH))
        .chain(table.races.iter().map(|_| Constraint::Length(CELL_WIDTH)))
        .chain(std::iter::once(Constraint::Length(TOTAL_WIDTH)));

    Table::new(rows.collect::<Vec<_>>(), widths.collect::<Vec<_>>())
        .header(header)
        .column_spacing(0)
}

/// Render the pivot as a coloured grid.
///
/// Cell background scales from 0 to the largest single-round score. Rounds a
/// driver did not take part in are left blank.
pub fn render_points_heatmap(table: &PointsTable, season: u16) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!("{} Championship points by race", season).yellow().bold()
    );

    if table.rows.is_empty() {
        let _ = writeln!(out, "{}", "No results available.".dimmed());
        return out;
    }

    let width = usize::from(DRIVER_WIDTH)
        + table.races.len() * usize::from(CELL_WIDTH)
        + usize::from(TOTAL_WIDTH);
    let height = table.rows.len() + 1;
    let area = Rect::new(
        0,
        0,
        u16::try_from(width).unwrap_or(u16::MAX),
        u16::try_from(height).unwrap_or(u16::MAX),
    );

    let mut buf = Buffer::empty(area);
    points_table(table).render(area, &mut buf);
    out.push_str(&buffer_to_ansi(&buf));
    out
}

/// Whole numbers without a decimal point, half points with one
fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{:.0}", points)
    } else {
        format!("{:.1}", points)
    }
}
