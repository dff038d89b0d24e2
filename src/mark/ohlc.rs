use std::collections::BTreeMap;

use crate::data::{Value, Values};

use super::{Channel, values_of};

/// OHLC options.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcOptions {
    /// Order of the price columns in each `y` row, e.g. `"ohlc"` or `"hl"`.
    pub format: String,
}

impl Default for OhlcOptions {
    fn default() -> Self {
        Self {
            format: "ohlc".to_string(),
        }
    }
}

impl OhlcOptions {
    fn column(&self, field: char) -> Option<usize> {
        self.format.chars().position(|c| c == field)
    }
}

/// One price glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcDatum {
    /// Index into the raw fields.
    pub index: usize,
    /// Horizontal value.
    pub x: Value,
    /// Opening price.
    pub open: Option<f64>,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: Option<f64>,
}

pub(super) fn build(fields: &BTreeMap<Channel, Values>, options: &OhlcOptions) -> Vec<OhlcDatum> {
    let (Some(x), Some(Values::Nested(rows))) = (fields.get(&Channel::X), fields.get(&Channel::Y))
    else {
        return Vec::new();
    };
    let columns = options.format.chars().count();
    let len = x.len().min(rows.len());
    (0..len)
        .filter_map(|index| {
            let row = rows[index].as_slice();
            if columns == 0 || row.len() < columns {
                return None;
            }
            let pick = |field: char| options.column(field).map(|column| row[column]);
            let finite = row[..columns].iter().copied().filter(|v| v.is_finite());
            let high = pick('h')
                .filter(|v| v.is_finite())
                .or_else(|| finite.clone().reduce(f64::max))?;
            let low = pick('l')
                .filter(|v| v.is_finite())
                .or_else(|| finite.reduce(f64::min))?;
            Some(OhlcDatum {
                index,
                x: x.get(index)?,
                open: pick('o'),
                high,
                low,
                close: pick('c'),
            })
        })
        .collect()
}

/// The y domain spans the lowest low and the highest high.
pub(super) fn contributions(glyphs: &[OhlcDatum]) -> BTreeMap<Channel, Values> {
    let mut out = BTreeMap::new();
    if glyphs.is_empty() {
        return out;
    }
    out.insert(Channel::X, values_of(glyphs.iter().map(|g| &g.x)));
    let low = glyphs.iter().map(|g| g.low).fold(f64::INFINITY, f64::min);
    let high = glyphs.iter().map(|g| g.high).fold(f64::NEG_INFINITY, f64::max);
    out.insert(Channel::Y, Values::Numbers(vec![low, high]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_domain_uses_price_extremes() {
        let mut fields = BTreeMap::new();
        fields.insert(Channel::X, Values::Numbers(vec![0.0, 1.0]));
        fields.insert(
            Channel::Y,
            Values::Nested(vec![vec![10.0, 12.0, 9.0, 11.0], vec![11.0, 15.0, 8.5, 14.0]]),
        );
        let glyphs = build(&fields, &OhlcOptions::default());
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[1].close, Some(14.0));
        let y = contributions(&glyphs)[&Channel::Y].extent().unwrap();
        assert_eq!((y.min, y.max), (8.5, 15.0));
    }

    #[test]
    fn short_rows_are_skipped() {
        let mut fields = BTreeMap::new();
        fields.insert(Channel::X, Values::Numbers(vec![0.0, 1.0]));
        fields.insert(Channel::Y, Values::Nested(vec![vec![1.0, 2.0], vec![1.0, 2.0, 0.5, 1.5]]));
        let glyphs = build(&fields, &OhlcOptions::default());
        assert_eq!(glyphs.len(), 1);
        assert_eq!(glyphs[0].index, 1);
    }
}
