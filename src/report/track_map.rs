//! Track outline coloured by speed

use colored::Colorize;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Points};
use ratatui::widgets::Widget;
use std::fmt::Write;

use super::color::PLASMA;
use super::terminal::buffer_to_ansi;
use crate::models::TelemetrySample;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 2.0;
const BLOCK: &str = "█";
/// Smallest world span of one column, so a single point still has bounds
const MIN_UNIT: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct TrackMapOptions {
    pub width: usize,
    pub height: usize,
    pub title: String,
}

impl Default for TrackMapOptions {
    fn default() -> Self {
        Self {
            width: 100,
            height: 40,
            title: String::new(),
        }
    }
}

/// Canvas bounds that keep the track's proportions on a `width` x `height`
/// cell grid, anchored at the top-left corner
fn canvas_bounds(samples: &[&TelemetrySample], width: u16, height: u16) -> ([f64; 2], [f64; 2]) {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for s in samples {
        min_x = min_x.min(s.x);
        max_x = max_x.max(s.x);
        min_y = min_y.min(s.y);
        max_y = max_y.max(s.y);
    }

    let cols = f64::from(width.saturating_sub(1).max(1));
    let rows = f64::from(height.saturating_sub(1).max(1));
    // World units per column; a row spans CELL_ASPECT columns
    let unit = ((max_x - min_x) / cols)
        .max((max_y - min_y) / (rows * CELL_ASPECT))
        .max(MIN_UNIT);

    (
        [min_x, (min_x + unit * cols).max(max_x)],
        [(max_y - unit * rows * CELL_ASPECT).min(min_y), max_y],
    )
}

/// Speed range of the samples, `None` when there is nothing to draw
fn speed_range(samples: &[&TelemetrySample]) -> Option<(f64, f64)> {
    samples.iter().map(|s| s.speed).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Draw consecutive samples as canvas lines. Each segment takes the colour of
/// its first sample's speed; later segments paint over earlier ones.
fn draw_track(samples: &[&TelemetrySample], width: u16, height: u16, speeds: (f64, f64)) -> Buffer {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    if width == 0 || height == 0 || samples.is_empty() {
        return buf;
    }

    let (x_bounds, y_bounds) = canvas_bounds(samples, width, height);
    let color = |speed: f64| Color::from(PLASMA.map(speed, speeds.0, speeds.1));

    Canvas::default()
        .marker(Marker::Block)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            if let [only] = samples {
                ctx.draw(&Points {
                    coords: &[(only.x, only.y)],
                    color: color(only.speed),
                });
            }
            for pair in samples.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].x,
                    y1: pair[0].y,
                    x2: pair[1].x,
                    y2: pair[1].y,
                    color: color(pair[0].speed),
                });
            }
        })
        .render(area, &mut buf);

    buf
}

/// Draw the lap as coloured blocks with a speed legend underneath
pub fn render_track_map(samples: &[TelemetrySample], options: &TrackMapOptions) -> String {
    let mut out = String::new();
    if !options.title.is_empty() {
        let _ = writeln!(out, "{}", options.title.as_str().yellow().bold());
    }

    let usable: Vec<&TelemetrySample> = samples
        .iter()
        .filter(|s| s.x.is_finite() && s.y.is_finite() && s.speed.is_finite())
        .collect();
    let Some((min_speed, max_speed)) = speed_range(&usable) else {
        let _ = writeln!(out, "{}", "No telemetry to draw.".dimmed());
        return out;
    };

    let width = u16::try_from(options.width).unwrap_or(u16::MAX);
    let height = u16::try_from(options.height).unwrap_or(u16::MAX);
    let buf = draw_track(&usable, width, height, (min_speed, max_speed));
    out.push_str(&buffer_to_ansi(&buf));

    let legend_width = options.width.clamp(10, 40);
    let bar: String = (0..legend_width)
        .map(|i| {
            let c = PLASMA.at(i as f64 / (legend_width - 1) as f64);
            BLOCK.truecolor(c.0, c.1, c.2).to_string()
        })
        .collect();
    let _ = writeln!(out);
    let _ = writeln!(out, "{:.0} {} {:.0} km/h", min_speed, bar, max_speed);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, y: f64, speed: f64) -> TelemetrySample {
        TelemetrySample { x, y, speed }
    }

    fn square() -> Vec<TelemetrySample> {
        vec![
            sample(0.0, 0.0, 100.0),
            sample(100.0, 0.0, 300.0),
            sample(100.0, 100.0, 200.0),
            sample(0.0, 100.0, 150.0),
            sample(0.0, 0.0, 100.0),
        ]
    }

    fn speed_color(speed: f64) -> Color {
        Color::from(PLASMA.map(speed, 100.0, 300.0))
    }

    #[test]
    fn test_bounds_keep_aspect() {
        let samples = square();
        let refs: Vec<&TelemetrySample> = samples.iter().collect();

        // 20 columns and 10 rows of two columns each cover the same span
        let (x, y) = canvas_bounds(&refs, 21, 11);
        assert_eq!(x, [0.0, 100.0]);
        assert_eq!(y, [0.0, 100.0]);

        // A wider grid leaves the extra columns to the right
        let (x, y) = canvas_bounds(&refs, 41, 11);
        assert_eq!(x, [0.0, 200.0]);
        assert_eq!(y, [0.0, 100.0]);
    }

    #[test]
    fn test_draw_square_outline() {
        let samples = square();
        let refs: Vec<&TelemetrySample> = samples.iter().collect();
        let buf = draw_track(&refs, 21, 11, (100.0, 300.0));

        // Bottom edge, right edge, top edge, left edge
        assert_eq!(buf[(10, 10)].fg, speed_color(100.0));
        assert_eq!(buf[(20, 5)].fg, speed_color(300.0));
        assert_eq!(buf[(10, 0)].fg, speed_color(200.0));
        assert_eq!(buf[(0, 5)].fg, speed_color(150.0));
        assert_eq!(buf[(10, 10)].symbol(), BLOCK);

        // Inside the outline nothing is drawn
        assert_eq!(buf[(10, 5)].symbol(), " ");
    }

    #[test]
    fn test_render_legend_and_dimensions() {
        colored::control::set_override(false);
        let options = TrackMapOptions {
            width: 21,
            height: 11,
            title: "2024 Monaco Q - LEC".to_string(),
        };

        let text = render_track_map(&square(), &options);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "2024 Monaco Q - LEC");
        assert_eq!(lines.len(), 1 + 11 + 2);
        assert_eq!(lines[1].chars().count(), 21);
        assert_eq!(lines[6].chars().filter(|c| *c == '█').count(), 2);
        assert!(lines[13].starts_with("100 "));
        assert!(lines[13].ends_with(" 300 km/h"));
    }

    #[test]
    fn test_render_skips_non_finite() {
        colored::control::set_override(false);
        let samples = vec![sample(f64::NAN, 0.0, 100.0), sample(0.0, 0.0, f64::INFINITY)];
        let text = render_track_map(&samples, &TrackMapOptions::default());
        assert!(text.contains("No telemetry to draw."));
    }

    #[test]
    fn test_single_sample() {
        let only = sample(5.0, 5.0, 250.0);
        let buf = draw_track(&[&only], 4, 4, (250.0, 250.0));
        let drawn = buf.content().iter().filter(|c| c.symbol() == BLOCK).count();
        assert_eq!(drawn, 1);
    }
}
