use crate::geom::{Point, ScreenPoint, ScreenRect};

pub(crate) fn distance_sq(a: ScreenPoint, b: ScreenPoint) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Window position relative to the plot area's top-left corner.
pub(crate) fn plot_point(point: ScreenPoint, plot: ScreenRect) -> Point {
    Point::new((point.x - plot.min.x) as f64, (point.y - plot.min.y) as f64)
}

pub(crate) fn offset(point: ScreenPoint, origin: ScreenPoint) -> ScreenPoint {
    ScreenPoint::new(point.x + origin.x, point.y + origin.y)
}

pub(crate) fn offset_rect(rect: ScreenRect, origin: ScreenPoint) -> ScreenRect {
    ScreenRect::new(offset(rect.min, origin), offset(rect.max, origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_points_are_relative_to_the_plot_area() {
        let plot = ScreenRect::new(ScreenPoint::new(60.0, 40.0), ScreenPoint::new(400.0, 300.0));
        assert_eq!(plot_point(ScreenPoint::new(70.0, 45.0), plot), Point::new(10.0, 5.0));
        assert_eq!(distance_sq(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(3.0, 4.0)), 25.0);
    }
}
