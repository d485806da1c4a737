//! Error taxonomy for route aggregation

use thiserror::Error;

use crate::resolver::ResolutionMode;

pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// Errors surfaced to the caller by the flow-map pipeline.
///
/// Per-record problems never show up here; they are counted in
/// [`Diagnostics`](crate::pipeline::Diagnostics) instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("missing input fields: {0}")]
    MissingFields(String),

    #[error("resolver already settled on {0}; use a new resolver per run")]
    AlreadyResolved(ResolutionMode),

    #[error(
        "no routes could be built from {total_records} records \
         ({unusable_records} unusable, last mode attempted: {attempted})"
    )]
    DataInsufficient {
        total_records: usize,
        unusable_records: usize,
        attempted: ResolutionMode,
    },
}
