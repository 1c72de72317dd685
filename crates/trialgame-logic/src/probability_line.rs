//! Probability line for the expert summary reveal.
//!
//! Places each consultant's probability, the average and the roll on a
//! bounded 0–100 axis. Purely presentational: callers draw the markers
//! however they like, or use [`ProbabilityLine::render_text`].

/// Axis ticks, in percent.
pub const TICKS: [u8; 5] = [0, 25, 50, 75, 100];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerKind {
    /// Consultant number (1-based).
    Consultant(u32),
    Average,
    Roll,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    /// Value on the 0–100 scale, clamped.
    pub value: f64,
    /// Horizontal position in drawing units.
    pub x: f64,
}

/// Horizontal layout of the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineLayout {
    pub width: f64,
    pub padding: f64,
}

impl Default for LineLayout {
    fn default() -> Self {
        Self {
            width: 800.0,
            padding: 40.0,
        }
    }
}

impl LineLayout {
    /// Map a percentage to a position between the two paddings.
    pub fn scale_x(&self, percent: f64) -> f64 {
        let span = (self.width - 2.0 * self.padding).max(0.0);
        clamp_percent(percent) / 100.0 * span + self.padding
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityLine {
    pub markers: Vec<Marker>,
    /// Share of the axis at or below the average (success region), 0–100.
    pub success_region: f64,
}

impl ProbabilityLine {
    pub fn new(
        layout: &LineLayout,
        probabilities: &[u8],
        average: f64,
        roll: Option<u8>,
    ) -> Self {
        let mut markers: Vec<Marker> = probabilities
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let value = clamp_percent(p as f64);
                Marker {
                    kind: MarkerKind::Consultant(i as u32 + 1),
                    value,
                    x: layout.scale_x(value),
                }
            })
            .collect();
        let average = clamp_percent(average);
        markers.push(Marker {
            kind: MarkerKind::Average,
            value: average,
            x: layout.scale_x(average),
        });
        if let Some(roll) = roll {
            let value = clamp_percent(roll as f64);
            markers.push(Marker {
                kind: MarkerKind::Roll,
                value,
                x: layout.scale_x(value),
            });
        }
        Self {
            markers,
            success_region: average,
        }
    }

    pub fn marker(&self, kind: MarkerKind) -> Option<&Marker> {
        self.markers.iter().find(|m| m.kind == kind)
    }

    /// One-line text rendering, `columns` wide (at least 2). `=` marks the
    /// success region, `-` the failure region, `c` consultants, `A` the
    /// average and `R` the roll (drawn last, so it wins collisions).
    pub fn render_text(&self, columns: usize) -> String {
        let columns = columns.max(2);
        let col = |value: f64| ((value / 100.0) * (columns - 1) as f64).round() as usize;
        let cutoff = col(self.success_region);
        let mut cells: Vec<char> = (0..columns)
            .map(|i| if i <= cutoff { '=' } else { '-' })
            .collect();
        for marker in &self.markers {
            let glyph = match marker.kind {
                MarkerKind::Consultant(_) => 'c',
                MarkerKind::Average => 'A',
                MarkerKind::Roll => continue,
            };
            cells[col(marker.value)] = glyph;
        }
        if let Some(roll) = self.marker(MarkerKind::Roll) {
            cells[col(roll.value)] = 'R';
        }
        cells.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_x_bounds() {
        let layout = LineLayout::default();
        assert_eq!(layout.scale_x(0.0), 40.0);
        assert_eq!(layout.scale_x(100.0), 760.0);
        assert_eq!(layout.scale_x(50.0), 400.0);
        assert_eq!(layout.scale_x(-20.0), 40.0);
        assert_eq!(layout.scale_x(250.0), 760.0);
        assert_eq!(layout.scale_x(f64::NAN), 40.0);
    }

    #[test]
    fn test_markers() {
        let line = ProbabilityLine::new(&LineLayout::default(), &[20, 60], 40.0, Some(35));
        assert_eq!(line.markers.len(), 4);
        assert_eq!(line.marker(MarkerKind::Consultant(2)).unwrap().value, 60.0);
        assert!((line.marker(MarkerKind::Average).unwrap().x - 328.0).abs() < 1e-9);
        assert_eq!(line.marker(MarkerKind::Roll).unwrap().value, 35.0);
    }

    #[test]
    fn test_no_roll_marker_before_roll() {
        let line = ProbabilityLine::new(&LineLayout::default(), &[50], 50.0, None);
        assert!(line.marker(MarkerKind::Roll).is_none());
    }

    #[test]
    fn test_render_text() {
        let line = ProbabilityLine::new(&LineLayout::default(), &[0, 100], 50.0, Some(100));
        let text = line.render_text(11);
        assert_eq!(text.chars().count(), 11);
        assert_eq!(text, "c====A----R");
    }
}
