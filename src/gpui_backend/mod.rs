//! GPUI integration.
//!
//! [`FigureView`] paints a [`Figure`](crate::figure::Figure) and maps
//! pointer input onto its active interaction: drags feed the selector or
//! pan the scales, the wheel zooms, double-click resets.

#![allow(clippy::collapsible_if)]

mod config;
mod frame;
mod geometry;
mod paint;
mod state;
mod text;
mod view;

pub use config::FigureViewConfig;
pub use view::{FigureHandle, FigureView};
