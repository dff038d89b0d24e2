//! Raw channel values held by marks.
//!
//! Channels arrive from the host either as numbers (1-D or row-split 2-D) or
//! as string labels for ordinal data. Numbers fed to an ordinal scale are
//! formatted into labels so both representations share one label space.

use crate::domain::Extent;

/// A single channel value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Numeric value (dates are milliseconds since the Unix epoch).
    Number(f64),
    /// Categorical label.
    Label(String),
}

impl Value {
    /// Numeric value, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Label(_) => None,
        }
    }

    /// Label representation of the value.
    pub fn to_label(&self) -> String {
        match self {
            Self::Number(value) => format_label(*value),
            Self::Label(label) => label.clone(),
        }
    }
}

/// Values of one mark channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// One-dimensional numeric data.
    Numbers(Vec<f64>),
    /// Two-dimensional numeric data, split into rows.
    Nested(Vec<Vec<f64>>),
    /// Categorical data.
    Labels(Vec<String>),
}

impl Values {
    /// Number of entries along the first dimension.
    pub fn len(&self) -> usize {
        match self {
            Self::Numbers(values) => values.len(),
            Self::Nested(rows) => rows.len(),
            Self::Labels(labels) => labels.len(),
        }
    }

    /// Check whether the channel is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether the channel holds two-dimensional data.
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }

    /// Value at an index of a one-dimensional channel.
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Self::Numbers(values) => values.get(index).copied().map(Value::Number),
            Self::Labels(labels) => labels.get(index).cloned().map(Value::Label),
            Self::Nested(_) => None,
        }
    }

    /// Numeric value at an index of a one-dimensional channel.
    pub fn number(&self, index: usize) -> Option<f64> {
        match self {
            Self::Numbers(values) => values.get(index).copied(),
            _ => None,
        }
    }

    /// Rows of the channel; one-dimensional numeric data is a single row.
    pub fn rows(&self) -> Vec<&[f64]> {
        match self {
            Self::Numbers(values) => vec![values.as_slice()],
            Self::Nested(rows) => rows.iter().map(Vec::as_slice).collect(),
            Self::Labels(_) => Vec::new(),
        }
    }

    /// Copy truncated to at most `len` entries along the first dimension.
    pub fn truncated(&self, len: usize) -> Self {
        match self {
            Self::Numbers(values) => Self::Numbers(values.iter().take(len).copied().collect()),
            Self::Nested(rows) => Self::Nested(rows.iter().take(len).cloned().collect()),
            Self::Labels(labels) => Self::Labels(labels.iter().take(len).cloned().collect()),
        }
    }

    /// Minimum and maximum over all finite numbers, nested data flattened.
    pub fn extent(&self) -> Option<Extent> {
        let mut extent: Option<Extent> = None;
        let mut include = |value: f64| {
            if !value.is_finite() {
                return;
            }
            match extent.as_mut() {
                Some(existing) => existing.expand_to_include(value),
                None => extent = Some(Extent::new(value, value)),
            }
        };
        match self {
            Self::Numbers(values) => values.iter().copied().for_each(&mut include),
            Self::Nested(rows) => rows.iter().flatten().copied().for_each(&mut include),
            Self::Labels(_) => {}
        }
        extent
    }

    /// De-duplicated labels in first-seen order.
    pub fn unique_labels(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |label: String| {
            if !out.contains(&label) {
                out.push(label);
            }
        };
        match self {
            Self::Labels(labels) => labels.iter().cloned().for_each(&mut push),
            Self::Numbers(values) => values.iter().map(|v| format_label(*v)).for_each(&mut push),
            Self::Nested(rows) => rows
                .iter()
                .flatten()
                .map(|v| format_label(*v))
                .for_each(&mut push),
        }
        out
    }
}

impl From<Vec<f64>> for Values {
    fn from(values: Vec<f64>) -> Self {
        Self::Numbers(values)
    }
}

impl From<Vec<Vec<f64>>> for Values {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Self::Nested(rows)
    }
}

impl From<Vec<String>> for Values {
    fn from(labels: Vec<String>) -> Self {
        Self::Labels(labels)
    }
}

impl From<Vec<&str>> for Values {
    fn from(labels: Vec<&str>) -> Self {
        Self::Labels(labels.into_iter().map(str::to_string).collect())
    }
}

/// Format a number the way ordinal domains display it.
///
/// Integral values drop the fractional part so `3.0` and `3` share a label.
pub fn format_label(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Length all channels truncate to: the shortest non-empty channel.
pub(crate) fn common_length<'a>(channels: impl IntoIterator<Item = &'a Values>) -> usize {
    channels
        .into_iter()
        .map(Values::len)
        .filter(|len| *len > 0)
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_extent_ignores_nan() {
        let values = Values::Nested(vec![vec![3.0, f64::NAN], vec![-1.0, 7.5]]);
        let extent = values.extent().unwrap();
        assert_eq!(extent.min, -1.0);
        assert_eq!(extent.max, 7.5);
    }

    #[test]
    fn numbers_format_into_labels() {
        let values = Values::Numbers(vec![1.0, 2.5, 1.0]);
        assert_eq!(values.unique_labels(), vec!["1", "2.5"]);
    }

    #[test]
    fn common_length_skips_empty_channels() {
        let x = Values::Numbers(vec![1.0, 2.0, 3.0]);
        let y = Values::Numbers(vec![1.0, 2.0]);
        let color = Values::Numbers(Vec::new());
        assert_eq!(common_length([&x, &y, &color]), 2);
    }
}
