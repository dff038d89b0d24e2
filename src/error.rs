//! Error types surfaced to the widget host.
//!
//! Domain negotiation itself never fails: mismatched lengths are truncated and
//! missing scales are skipped. Errors are reserved for malformed wire data and
//! references to objects the figure does not know about.

use thiserror::Error;

use crate::axis::AxisId;
use crate::mark::MarkId;
use crate::scale::ScaleId;
use crate::selector::SelectorId;

/// Errors returned by figure, wire, and factory operations.
#[derive(Debug, Error)]
pub enum PlotError {
    /// A typed array could not be decoded from its wire representation.
    #[error("failed to deserialize array: {0}")]
    Deserialize(String),

    /// The wire dtype tag is not one of the supported numeric types.
    #[error("unsupported dtype: {0}")]
    UnsupportedDtype(String),

    /// A widget attribute had the wrong JSON shape.
    #[error("invalid attribute `{name}`: {reason}")]
    InvalidAttribute {
        /// Attribute name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A required widget attribute was missing.
    #[error("missing attribute `{0}`")]
    MissingAttribute(String),

    /// No constructor is registered for a widget model name.
    #[error("unknown model name: {0}")]
    UnknownModel(String),

    /// A `IPY_MODEL_` reference points at a model that is not in the store.
    #[error("dangling model reference: {0}")]
    DanglingReference(String),

    /// The figure does not own a scale with this id.
    #[error("unknown scale: {0:?}")]
    UnknownScale(ScaleId),

    /// The figure does not own a mark with this id.
    #[error("unknown mark: {0:?}")]
    UnknownMark(MarkId),

    /// The figure does not own an axis with this id.
    #[error("unknown axis: {0:?}")]
    UnknownAxis(AxisId),

    /// The figure does not own a selector with this id.
    #[error("unknown selector: {0:?}")]
    UnknownSelector(SelectorId),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for plotting operations.
pub type Result<T> = std::result::Result<T, PlotError>;
