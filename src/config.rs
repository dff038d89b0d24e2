//! Configuration for figures, scales, and axes.
//!
//! Every struct deserializes from widget state with `serde(default)`, so a
//! host only needs to send the attributes it changes.

use serde::{Deserialize, Serialize};

use crate::geom::Margin;

/// Figure-level layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    /// Figure width in pixels.
    pub width: f64,
    /// Figure height in pixels.
    pub height: f64,
    /// Base margin before axis space is added.
    pub fig_margin: Margin,
    /// Fraction of the plot width padded on each side for marks.
    pub padding_x: f64,
    /// Fraction of the plot height padded on each side for marks.
    pub padding_y: f64,
    /// Grow margins by the space axes need for ticks and labels.
    pub auto_layout: bool,
    /// Optional figure title.
    pub title: Option<String>,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            fig_margin: Margin::default(),
            padding_x: 0.0,
            padding_y: 0.025,
            auto_layout: true,
            title: None,
        }
    }
}

/// Scale model options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Explicit lower bound; `None` derives it from data.
    pub min: Option<f64>,
    /// Explicit upper bound; `None` derives it from data.
    pub max: Option<f64>,
    /// Explicit divergence point for divergent color scales.
    pub mid: Option<f64>,
    /// Reverse the scale direction.
    pub reverse: bool,
    /// Only move the domain when data leaves a window of the old domain.
    pub stabilized: bool,
    /// Smallest fraction of the old span the data may shrink to before the
    /// stabilized domain follows it.
    pub min_range: f64,
    /// Fraction of a freshly stabilized domain occupied by the data.
    pub mid_range: f64,
    /// Allow marks to pad the pixel range of this scale.
    pub allow_padding: bool,
    /// Resolve a three-point domain for color scales.
    pub divergent: bool,
    /// Explicit ordinal domain overriding contributions.
    pub domain: Option<Vec<String>>,
    /// Color stops (hex strings) for color scales.
    pub colors: Vec<String>,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            mid: None,
            reverse: false,
            stabilized: false,
            min_range: 0.6,
            mid_range: 0.8,
            allow_padding: true,
            divergent: false,
            domain: None,
            colors: Vec::new(),
        }
    }
}

/// Axis tick and label styling used for layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisStyle {
    /// Tick length in pixels.
    pub tick_size: f64,
    /// Gap between tick ends and tick labels.
    pub tick_padding: f64,
    /// Font size for tick and axis labels.
    pub font_size: f64,
    /// Gap between tick labels and the axis label.
    pub label_offset: f64,
    /// Requested tick count; `None` uses ten.
    pub num_ticks: Option<usize>,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            tick_size: 6.0,
            tick_padding: 4.0,
            font_size: 12.0,
            label_offset: 8.0,
            num_ticks: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_figure_state_keeps_defaults() {
        let config: FigureConfig =
            serde_json::from_str(r#"{"width": 400, "auto_layout": false}"#).unwrap();
        assert_eq!(config.width, 400.0);
        assert!(!config.auto_layout);
        assert_eq!(config.height, 480.0);
        assert_eq!(config.fig_margin, Margin::uniform(60.0));
    }

    #[test]
    fn scale_defaults_match_widget() {
        let config = ScaleConfig::default();
        assert_eq!(config.min_range, 0.6);
        assert_eq!(config.mid_range, 0.8);
        assert!(config.allow_padding);
    }
}
