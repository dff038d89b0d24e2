/// Configuration for the GPUI figure view.
#[derive(Debug, Clone)]
pub struct FigureViewConfig {
    /// Pixel threshold for starting a drag.
    pub drag_threshold_px: f32,
    /// Zoom change per wheel pixel.
    pub wheel_zoom_speed: f64,
    /// Minimum distance between recorded lasso vertices.
    pub lasso_spacing_px: f32,
}

impl Default for FigureViewConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 4.0,
            wheel_zoom_speed: 0.002,
            lasso_spacing_px: 3.0,
        }
    }
}
