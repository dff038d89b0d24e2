use std::collections::BTreeMap;

use crate::data::{Value, Values};

use super::{Channel, values_of};

/// Lines options.
#[derive(Debug, Clone, PartialEq)]
pub struct LinesOptions {
    /// Stroke width in pixels.
    pub stroke_width: f64,
}

impl Default for LinesOptions {
    fn default() -> Self {
        Self { stroke_width: 2.0 }
    }
}

/// One polyline. Non-finite `y` values break the line when drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDatum {
    /// Row index of the line.
    pub index: usize,
    /// `(x, y)` pairs.
    pub points: Vec<(Value, f64)>,
    /// Color value of the line, when a color channel is set.
    pub color: Option<Value>,
}

pub(super) fn build(fields: &BTreeMap<Channel, Values>) -> Vec<LineDatum> {
    let (Some(x), Some(y)) = (fields.get(&Channel::X), fields.get(&Channel::Y)) else {
        return Vec::new();
    };
    let color = fields.get(&Channel::Color);
    y.rows()
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let xs: Vec<Value> = match x {
                Values::Nested(rows) => rows
                    .get(index)
                    .or_else(|| rows.last())
                    .map(|row| row.iter().copied().map(Value::Number).collect())
                    .unwrap_or_default(),
                shared => (0..shared.len()).filter_map(|i| shared.get(i)).collect(),
            };
            let points = xs
                .into_iter()
                .zip(row.iter().copied())
                .collect();
            LineDatum {
                index,
                points,
                color: color.and_then(|values| values.get(index)),
            }
        })
        .filter(|line| !line.points.is_empty())
        .collect()
}

pub(super) fn contributions(lines: &[LineDatum]) -> BTreeMap<Channel, Values> {
    let mut out = BTreeMap::new();
    if lines.is_empty() {
        return out;
    }
    out.insert(
        Channel::X,
        values_of(lines.iter().flat_map(|line| line.points.iter().map(|(x, _)| x))),
    );
    out.insert(
        Channel::Y,
        Values::Numbers(
            lines
                .iter()
                .flat_map(|line| line.points.iter().map(|(_, y)| *y))
                .collect(),
        ),
    );
    let colors: Vec<&Value> = lines.iter().filter_map(|line| line.color.as_ref()).collect();
    if !colors.is_empty() {
        out.insert(Channel::Color, values_of(colors));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_x_for_multiple_lines() {
        let mut fields = BTreeMap::new();
        fields.insert(Channel::X, Values::Numbers(vec![0.0, 1.0, 2.0]));
        fields.insert(
            Channel::Y,
            Values::Nested(vec![vec![1.0, 2.0, 3.0], vec![5.0, 4.0]]),
        );
        let lines = build(&fields);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].points.len(), 3);
        assert_eq!(lines[1].points.len(), 2);

        let contributions = contributions(&lines);
        let y = contributions[&Channel::Y].extent().unwrap();
        assert_eq!((y.min, y.max), (1.0, 5.0));
    }

    #[test]
    fn nested_x_pairs_rows() {
        let mut fields = BTreeMap::new();
        fields.insert(Channel::X, Values::Nested(vec![vec![0.0, 1.0], vec![10.0, 11.0]]));
        fields.insert(Channel::Y, Values::Nested(vec![vec![1.0, 2.0], vec![3.0, 4.0]]));
        let lines = build(&fields);
        assert_eq!(lines[1].points[0], (Value::Number(10.0), 3.0));
    }
}
