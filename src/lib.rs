//! bqplot is the scale, layout, and selection core of an interactive 2-D
//! plotting widget library.
//!
//! Marks contribute partial domains to shared scales; every scale folds its
//! contributions into one domain, and the figure propagates domain changes to
//! marks, axes, and selectors through a FIFO event bus. Axes claim margin
//! space for their ticks and labels, and the plot area follows.

#![forbid(unsafe_code)]

pub mod axis;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod event;
pub mod factory;
pub mod figure;
pub mod geom;
#[cfg(feature = "gpui")]
pub mod gpui_backend;
pub mod interaction;
pub mod mark;
pub mod render;
pub mod scale;
pub mod selector;
pub mod style;
pub mod widget;
pub mod wire;

pub use axis::{ApproxTextMeasurer, Axis, AxisFormatter, AxisId, TextMeasurer, Tick};
pub use config::{AxisStyle, FigureConfig, ScaleConfig};
pub use data::{Value, Values};
pub use domain::{Domain, Extent, PartialDomain};
pub use error::{PlotError, Result};
pub use event::{EventBus, FigureEvent, SubscriptionId};
pub use factory::{FigureBinding, ModelFactory};
pub use figure::Figure;
pub use geom::{Direction, Margin, PlotArea, Point, ScreenPoint, ScreenRect, Side};
pub use interaction::{Interaction, PanZoom};
pub use mark::{Channel, DomainContributor, Mark, MarkData, MarkId, MarkKind, UpdatePhase};
pub use render::{
    Color, LineSegment, LineStyle, Marker, MarkerShape, RectStyle, RenderCommand, RenderList,
    TextStyle,
};
pub use scale::{
    ContributorId, DomainChanged, PixelMapper, PixelScale, ScaleId, ScaleKind, ScaleModel,
    ScaleRegistry,
};
pub use selector::{AxisSelection, Selection, SelectionTarget, Selector, SelectorId, SelectorKind};
pub use style::Theme;
pub use widget::{ModelStore, WidgetModel};
pub use wire::{ArrayData, DType, TypedArray, WireArray};
