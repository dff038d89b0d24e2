//! Scales: shared domain models and per-owner pixel views.

mod color;
mod kind;
mod model;
mod pixel;
mod registry;
pub mod ticks;

pub use color::{CATEGORY10, parse_hex};
pub use kind::ScaleKind;
pub use model::{ContributorId, DomainChanged, ScaleId, ScaleModel};
pub use pixel::{PixelMapper, PixelScale};
pub use registry::ScaleRegistry;
