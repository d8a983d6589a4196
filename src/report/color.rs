//! Continuous colour scales

use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Piecewise-linear interpolation between evenly spaced stops
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    stops: &'static [Rgb],
}

/// Light to dark blue, for points
pub const BLUES: ColorScale = ColorScale {
    stops: &[
        Rgb(198, 219, 239),
        Rgb(107, 174, 214),
        Rgb(33, 113, 181),
        Rgb(8, 81, 156),
        Rgb(8, 48, 107),
    ],
};

/// Dark purple to yellow, for speed
pub const PLASMA: ColorScale = ColorScale {
    stops: &[
        Rgb(13, 8, 135),
        Rgb(126, 3, 168),
        Rgb(204, 71, 120),
        Rgb(248, 149, 64),
        Rgb(240, 249, 33),
    ],
};

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

impl ColorScale {
    /// Colour at `t` in [0, 1]; values outside are clamped, NaN maps to the low end
    pub fn at(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let last = self.stops.len() - 1;
        let pos = t * last as f64;
        let idx = (pos.floor() as usize).min(last.saturating_sub(1));
        let frac = pos - idx as f64;

        let (a, b) = (self.stops[idx], self.stops[(idx + 1).min(last)]);
        Rgb(lerp(a.0, b.0, frac), lerp(a.1, b.1, frac), lerp(a.2, b.2, frac))
    }

    /// Colour of `value` on the range `[min, max]`
    pub fn map(&self, value: f64, min: f64, max: f64) -> Rgb {
        if max <= min {
            return self.at(0.0);
        }
        self.at((value - min) / (max - min))
    }
}

impl Rgb {
    /// Black or white, whichever reads better on this background
    pub fn contrast_text(&self) -> Rgb {
        let luminance = 0.299 * self.0 as f64 + 0.587 * self.1 as f64 + 0.114 * self.2 as f64;
        if luminance > 140.0 {
            Rgb(0, 0, 0)
        } else {
            Rgb(255, 255, 255)
        }
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb(c.0, c.1, c.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(BLUES.at(0.0), Rgb(198, 219, 239));
        assert_eq!(BLUES.at(1.0), Rgb(8, 48, 107));
        assert_eq!(PLASMA.at(0.0), Rgb(13, 8, 135));
        assert_eq!(PLASMA.at(1.0), Rgb(240, 249, 33));
    }

    #[test]
    fn test_interior_stop_and_midpoint() {
        assert_eq!(BLUES.at(0.5), Rgb(33, 113, 181));
        assert_eq!(PLASMA.at(0.125), Rgb(70, 6, 152));
    }

    #[test]
    fn test_clamping() {
        assert_eq!(PLASMA.at(-3.0), PLASMA.at(0.0));
        assert_eq!(PLASMA.at(7.0), PLASMA.at(1.0));
        assert_eq!(PLASMA.at(f64::NAN), PLASMA.at(0.0));
    }

    #[test]
    fn test_map_degenerate_range() {
        assert_eq!(BLUES.map(5.0, 5.0, 5.0), BLUES.at(0.0));
        assert_eq!(BLUES.map(25.0, 0.0, 25.0), BLUES.at(1.0));
    }

    #[test]
    fn test_contrast_text() {
        assert_eq!(BLUES.at(0.0).contrast_text(), Rgb(0, 0, 0));
        assert_eq!(BLUES.at(1.0).contrast_text(), Rgb(255, 255, 255));
    }

    #[test]
    fn test_into_terminal_color() {
        assert_eq!(Color::from(Rgb(13, 8, 135)), Color::Rgb(13, 8, 135));
    }
}
