use std::collections::BTreeMap;

use crate::data::{Value, Values};

use super::{Channel, values_of};

/// How multiple series share one x position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarKind {
    /// Series stack on top of each other, positives up and negatives down.
    #[default]
    Stacked,
    /// Series sit side by side, each starting at the base.
    Grouped,
}

impl BarKind {
    /// Parse the wire name (`"stacked"` or `"grouped"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "stacked" => Some(Self::Stacked),
            "grouped" => Some(Self::Grouped),
            _ => None,
        }
    }
}

/// Bars options.
#[derive(Debug, Clone, PartialEq)]
pub struct BarsOptions {
    /// Stacking mode.
    pub kind: BarKind,
    /// Value bars grow from.
    pub base: f64,
    /// Band padding of the x scale, as a fraction of the step.
    pub padding: f64,
}

impl Default for BarsOptions {
    fn default() -> Self {
        Self {
            kind: BarKind::Stacked,
            base: 0.0,
            padding: 0.05,
        }
    }
}

/// One series' bar at an x position.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSegment {
    /// Series (row) index.
    pub series: usize,
    /// Raw value.
    pub value: f64,
    /// Bottom of the segment in data units.
    pub y0: f64,
    /// Top of the segment in data units.
    pub y1: f64,
    /// Series color value, when a color channel is set.
    pub color: Option<Value>,
}

/// All series at one x position.
#[derive(Debug, Clone, PartialEq)]
pub struct BarDatum {
    /// Index into the raw fields.
    pub index: usize,
    /// Horizontal value.
    pub x: Value,
    /// Segments in series order.
    pub segments: Vec<BarSegment>,
}

pub(super) fn build(fields: &BTreeMap<Channel, Values>, options: &BarsOptions) -> Vec<BarDatum> {
    let (Some(x), Some(y)) = (fields.get(&Channel::X), fields.get(&Channel::Y)) else {
        return Vec::new();
    };
    let rows = y.rows();
    let len = rows
        .iter()
        .map(|row| row.len())
        .min()
        .unwrap_or(0)
        .min(x.len());
    let color = fields.get(&Channel::Color);
    (0..len)
        .filter_map(|index| {
            let x = x.get(index)?;
            let mut positive = options.base;
            let mut negative = options.base;
            let segments = rows
                .iter()
                .enumerate()
                .filter(|(_, row)| row[index].is_finite())
                .map(|(series, row)| {
                    let value = row[index];
                    let (y0, y1) = match options.kind {
                        BarKind::Grouped => (options.base, value),
                        BarKind::Stacked if value >= 0.0 => {
                            let y0 = positive;
                            positive += value;
                            (y0, positive)
                        }
                        BarKind::Stacked => {
                            let y0 = negative;
                            negative += value;
                            (y0, negative)
                        }
                    };
                    BarSegment {
                        series,
                        value,
                        y0,
                        y1,
                        color: color.and_then(|values| values.get(series)),
                    }
                })
                .collect();
            Some(BarDatum { index, x, segments })
        })
        .collect()
}

pub(super) fn contributions(bars: &[BarDatum], options: &BarsOptions) -> BTreeMap<Channel, Values> {
    let mut out = BTreeMap::new();
    if bars.is_empty() {
        return out;
    }
    out.insert(Channel::X, values_of(bars.iter().map(|bar| &bar.x)));
    let mut heights = vec![options.base];
    heights.extend(
        bars.iter()
            .flat_map(|bar| bar.segments.iter().flat_map(|s| [s.y0, s.y1])),
    );
    out.insert(Channel::Y, Values::Numbers(heights));
    let colors: Vec<&Value> = bars
        .first()
        .map(|bar| bar.segments.iter().filter_map(|s| s.color.as_ref()).collect())
        .unwrap_or_default();
    if !colors.is_empty() {
        out.insert(Channel::Color, values_of(colors));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(y: Values) -> BTreeMap<Channel, Values> {
        let mut fields = BTreeMap::new();
        fields.insert(Channel::X, Values::from(vec!["a", "b"]));
        fields.insert(Channel::Y, y);
        fields
    }

    #[test]
    fn stacked_splits_positive_and_negative() {
        let fields = fields(Values::Nested(vec![vec![1.0, -1.0], vec![2.0, -3.0]]));
        let options = BarsOptions::default();
        let bars = build(&fields, &options);
        assert_eq!(bars[0].segments[1].y0, 1.0);
        assert_eq!(bars[0].segments[1].y1, 3.0);
        assert_eq!(bars[1].segments[1].y1, -4.0);

        let y = contributions(&bars, &options)[&Channel::Y].extent().unwrap();
        assert_eq!((y.min, y.max), (-4.0, 3.0));
    }

    #[test]
    fn grouped_starts_at_base() {
        let fields = fields(Values::Nested(vec![vec![1.0, 2.0], vec![4.0, 5.0]]));
        let options = BarsOptions {
            kind: BarKind::Grouped,
            base: 0.5,
            ..BarsOptions::default()
        };
        let bars = build(&fields, &options);
        assert!(bars[1].segments.iter().all(|s| s.y0 == 0.5));
        let y = contributions(&bars, &options)[&Channel::Y].extent().unwrap();
        assert_eq!((y.min, y.max), (0.5, 5.0));
    }

    #[test]
    fn truncates_to_shortest_series() {
        let fields = fields(Values::Nested(vec![vec![1.0, 2.0], vec![4.0]]));
        assert_eq!(build(&fields, &BarsOptions::default()).len(), 1);
    }
}
