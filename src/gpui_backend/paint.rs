use gpui::{
    App, BorderStyle, Bounds, ContentMask, Corners, Edges, PathBuilder, Pixels, TextRun, Window,
    font, point, px, quad,
};

use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{
    Color, LineSegment, LineStyle, Marker, MarkerShape, RectStyle, RenderCommand, TextStyle,
};

use super::frame::FigureFrame;
use super::geometry::{offset, offset_rect};

pub(crate) fn paint_frame(frame: &FigureFrame, window: &mut Window, cx: &mut App) {
    let origin = frame.origin;
    let mut clip_stack: Vec<ContentMask<Pixels>> = Vec::new();
    for command in frame.render.commands() {
        match command {
            RenderCommand::ClipRect(rect) => {
                clip_stack.push(ContentMask {
                    bounds: to_bounds(offset_rect(*rect, origin)),
                });
            }
            RenderCommand::ClipEnd => {
                clip_stack.pop();
            }
            RenderCommand::LineSegments { segments, style } => {
                with_clip(window, &clip_stack, |window| {
                    paint_lines(window, origin, segments, *style);
                });
            }
            RenderCommand::Markers(markers) => {
                with_clip(window, &clip_stack, |window| {
                    paint_markers(window, origin, markers);
                });
            }
            RenderCommand::Rect { rect, style } => {
                with_clip(window, &clip_stack, |window| {
                    paint_rect(window, offset_rect(*rect, origin), *style);
                });
            }
            RenderCommand::Polygon { points, fill } => {
                with_clip(window, &clip_stack, |window| {
                    paint_polygon(window, origin, points, *fill);
                });
            }
            RenderCommand::Text {
                position,
                text,
                style,
            } => {
                with_clip(window, &clip_stack, |window| {
                    paint_text(window, cx, offset(*position, origin), text, style);
                });
            }
        }
    }
}

fn paint_lines(window: &mut Window, origin: ScreenPoint, segments: &[LineSegment], style: LineStyle) {
    if segments.is_empty() {
        return;
    }
    let width = style.width.max(0.5);
    let mut builder = PathBuilder::stroke(px(width));
    for segment in segments {
        builder.move_to(to_point(offset(segment.start, origin)));
        builder.line_to(to_point(offset(segment.end, origin)));
    }
    if let Ok(path) = builder.build() {
        window.paint_path(path, to_rgba(style.color));
    }
}

fn paint_markers(window: &mut Window, origin: ScreenPoint, markers: &[Marker]) {
    for marker in markers {
        let center = offset(marker.center, origin);
        let radius = marker.radius().max(1.0);
        let bounds = Bounds::from_corners(
            point(px(center.x - radius), px(center.y - radius)),
            point(px(center.x + radius), px(center.y + radius)),
        );
        match marker.shape {
            MarkerShape::Circle | MarkerShape::Square => {
                let corner = if marker.shape == MarkerShape::Circle { radius } else { 0.0 };
                window.paint_quad(quad(
                    bounds,
                    Corners::all(px(corner)),
                    to_rgba(marker.color),
                    Edges::all(px(0.0)),
                    to_rgba(marker.color),
                    BorderStyle::default(),
                ));
            }
            MarkerShape::Cross => {
                let mut builder = PathBuilder::stroke(px(1.0));
                builder.move_to(point(px(center.x - radius), px(center.y)));
                builder.line_to(point(px(center.x + radius), px(center.y)));
                builder.move_to(point(px(center.x), px(center.y - radius)));
                builder.line_to(point(px(center.x), px(center.y + radius)));
                if let Ok(path) = builder.build() {
                    window.paint_path(path, to_rgba(marker.color));
                }
            }
        }
    }
}

fn paint_polygon(window: &mut Window, origin: ScreenPoint, points: &[ScreenPoint], fill: Color) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    let mut builder = PathBuilder::fill();
    builder.move_to(to_point(offset(*first, origin)));
    for vertex in rest {
        builder.line_to(to_point(offset(*vertex, origin)));
    }
    builder.close();
    if let Ok(path) = builder.build() {
        window.paint_path(path, to_rgba(fill));
    }
}

fn paint_rect(window: &mut Window, rect: ScreenRect, style: RectStyle) {
    let quad = quad(
        to_bounds(rect),
        Corners::all(px(0.0)),
        to_rgba(style.fill),
        Edges::all(px(style.stroke_width)),
        to_rgba(style.stroke),
        BorderStyle::default(),
    );
    window.paint_quad(quad);
}

fn paint_text(
    window: &mut Window,
    cx: &mut App,
    position: ScreenPoint,
    text: &str,
    style: &TextStyle,
) {
    if text.is_empty() {
        return;
    }
    let run = TextRun {
        len: text.len(),
        font: font(".SystemUIFont"),
        color: to_hsla(style.color),
        background_color: None,
        underline: None,
        strikethrough: None,
    };
    let shaped = window
        .text_system()
        .shape_line(text.to_string().into(), px(style.size), &[run], None);
    let line_height = shaped.ascent + shaped.descent;
    let _ = shaped.paint(to_point(position), line_height, window, cx);
}

fn to_rgba(color: Color) -> gpui::Rgba {
    gpui::Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

pub(crate) fn to_hsla(color: Color) -> gpui::Hsla {
    gpui::Hsla::from(to_rgba(color))
}

fn to_point(point: ScreenPoint) -> gpui::Point<Pixels> {
    gpui::point(px(point.x), px(point.y))
}

fn to_bounds(rect: ScreenRect) -> Bounds<Pixels> {
    Bounds::from_corners(to_point(rect.min), to_point(rect.max))
}

fn with_clip(window: &mut Window, stack: &[ContentMask<Pixels>], f: impl FnOnce(&mut Window)) {
    if let Some(mask) = stack.last() {
        window.with_content_mask(Some(mask.clone()), f);
    } else {
        f(window);
    }
}
