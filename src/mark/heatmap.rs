use std::collections::BTreeMap;

use crate::data::{Value, Values};

use super::{Channel, values_of};

/// One heat map cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDatum {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub column: usize,
    /// Column coordinate.
    pub x: Value,
    /// Row coordinate.
    pub y: Value,
    /// Cell value mapped through the color scale.
    pub color: f64,
}

/// Expand a grid into cells. Row and column coordinates default to indices;
/// ragged rows truncate to the shortest one.
pub(super) fn build(fields: &BTreeMap<Channel, Values>) -> Vec<CellDatum> {
    let Some(Values::Nested(grid)) = fields.get(&Channel::Color) else {
        return Vec::new();
    };
    let coordinate = |channel: Channel, index: usize| match fields.get(&channel) {
        Some(values) if !values.is_empty() => values.get(index),
        _ => Some(Value::Number(index as f64)),
    };
    let limit = |channel: Channel, len: usize| match fields.get(&channel) {
        Some(values) if !values.is_empty() => len.min(values.len()),
        _ => len,
    };
    let rows = limit(Channel::Y, grid.len());
    let columns = limit(
        Channel::X,
        grid.iter().take(rows).map(Vec::len).min().unwrap_or(0),
    );
    let mut cells = Vec::with_capacity(rows * columns);
    for row in 0..rows {
        let Some(y) = coordinate(Channel::Y, row) else {
            continue;
        };
        for column in 0..columns {
            let Some(x) = coordinate(Channel::X, column) else {
                continue;
            };
            cells.push(CellDatum {
                row,
                column,
                x,
                y: y.clone(),
                color: grid[row][column],
            });
        }
    }
    cells
}

pub(super) fn contributions(cells: &[CellDatum]) -> BTreeMap<Channel, Values> {
    let mut out = BTreeMap::new();
    if cells.is_empty() {
        return out;
    }
    out.insert(
        Channel::X,
        values_of(cells.iter().filter(|cell| cell.row == 0).map(|cell| &cell.x)),
    );
    out.insert(
        Channel::Y,
        values_of(cells.iter().filter(|cell| cell.column == 0).map(|cell| &cell.y)),
    );
    out.insert(
        Channel::Color,
        Values::Numbers(cells.iter().map(|cell| cell.color).collect()),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_defaults_to_index_coordinates() {
        let mut fields = BTreeMap::new();
        fields.insert(
            Channel::Color,
            Values::Nested(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0]]),
        );
        let cells = build(&fields);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[3].x, Value::Number(1.0));
        assert_eq!(cells[3].y, Value::Number(1.0));

        let contributions = contributions(&cells);
        assert_eq!(contributions[&Channel::X], Values::Numbers(vec![0.0, 1.0]));
        let color = contributions[&Channel::Color].extent().unwrap();
        assert_eq!((color.min, color.max), (1.0, 5.0));
    }

    #[test]
    fn labelled_rows() {
        let mut fields = BTreeMap::new();
        fields.insert(Channel::Color, Values::Nested(vec![vec![1.0], vec![2.0]]));
        fields.insert(Channel::Y, Values::from(vec!["mon", "tue"]));
        let cells = build(&fields);
        let contributions = contributions(&cells);
        assert_eq!(contributions[&Channel::Y], Values::from(vec!["mon", "tue"]));
    }
}
