use serde::{Deserialize, Serialize};

/// Scale type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    /// Linear numeric scale.
    Linear,
    /// Base-10 logarithmic scale.
    Log,
    /// Date scale over milliseconds since the Unix epoch.
    Date,
    /// Categorical scale mapping labels to bands.
    Ordinal,
    /// Numeric scale mapping to a color gradient.
    ColorLinear,
    /// Categorical scale mapping labels to palette colors.
    ColorOrdinal,
    /// Date scale mapping to a color gradient.
    DateColor,
}

impl ScaleKind {
    /// Check whether the scale merges label lists instead of extents.
    pub fn is_ordinal(self) -> bool {
        matches!(self, Self::Ordinal | Self::ColorOrdinal)
    }

    /// Check whether the scale maps into colors rather than pixels.
    pub fn is_color(self) -> bool {
        matches!(self, Self::ColorLinear | Self::ColorOrdinal | Self::DateColor)
    }

    /// Check whether values are dates.
    pub fn is_date(self) -> bool {
        matches!(self, Self::Date | Self::DateColor)
    }

    /// Map a value into the scale's linear working space.
    ///
    /// Log scales work in decades and reject non-positive values.
    pub fn map_value(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Self::Log => {
                if value <= 0.0 {
                    None
                } else {
                    Some(value.log10())
                }
            }
            _ => Some(value),
        }
    }

    /// Invert a value from working space back into data space.
    pub fn invert_value(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        match self {
            Self::Log => Some(10_f64.powf(value)),
            _ => Some(value),
        }
    }

    /// Resolve a widget model name such as `LinearScaleModel`.
    pub fn from_model_name(name: &str) -> Option<Self> {
        let kind = match name {
            "LinearScaleModel" => Self::Linear,
            "LogScaleModel" => Self::Log,
            "DateScaleModel" => Self::Date,
            "OrdinalScaleModel" => Self::Ordinal,
            "ColorScaleModel" => Self::ColorLinear,
            "OrdinalColorScaleModel" => Self::ColorOrdinal,
            "DateColorScaleModel" => Self::DateColor,
            _ => return None,
        };
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_scale_rejects_non_positive() {
        let kind = ScaleKind::Log;
        assert!(kind.map_value(0.0).is_none());
        assert!(kind.map_value(-1.0).is_none());
        assert!(kind.map_value(1.0).is_some());
    }

    #[test]
    fn log_scale_roundtrip() {
        let kind = ScaleKind::Log;
        let mapped = kind.map_value(1000.0).unwrap();
        let roundtrip = kind.invert_value(mapped).unwrap();
        assert!((roundtrip - 1000.0).abs() < 1e-9);
    }
}
