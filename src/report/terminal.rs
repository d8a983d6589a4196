//! Printing an off-screen ratatui buffer as ANSI text

use colored::{ColoredString, Colorize};
use ratatui::buffer::{Buffer, Cell};
use ratatui::style::{Color, Modifier};

/// Style of a run of cells
#[derive(Clone, Copy, PartialEq)]
struct RunStyle {
    fg: Color,
    bg: Color,
    bold: bool,
}

impl RunStyle {
    fn of(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            bold: cell.modifier.contains(Modifier::BOLD),
        }
    }

    fn paint(&self, text: &str) -> ColoredString {
        let mut out = text.normal();
        if let Color::Rgb(r, g, b) = self.fg {
            out = out.truecolor(r, g, b);
        }
        if let Color::Rgb(r, g, b) = self.bg {
            out = out.on_truecolor(r, g, b);
        }
        if self.bold {
            out = out.bold();
        }
        out
    }
}

fn is_blank(cell: &Cell) -> bool {
    cell.symbol().trim().is_empty() && !matches!(cell.bg, Color::Rgb(..))
}

/// One line per buffer row, trailing blank cells dropped. Only RGB colours
/// and bold are carried over.
pub(crate) fn buffer_to_ansi(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();

    for y in area.top()..area.bottom() {
        let cells: Vec<&Cell> = (area.left()..area.right())
            .filter_map(|x| buf.cell((x, y)))
            .collect();
        let used = cells.iter().rposition(|c| !is_blank(c)).map_or(0, |i| i + 1);

        let mut runs: Vec<(RunStyle, String)> = Vec::new();
        for cell in &cells[..used] {
            let style = RunStyle::of(cell);
            match runs.last_mut() {
                Some((last, text)) if *last == style => text.push_str(cell.symbol()),
                _ => runs.push((style, cell.symbol().to_string())),
            }
        }

        for (style, text) in &runs {
            out.push_str(&style.paint(text).to_string());
        }
        out.push('\n');
    }
    out
}
