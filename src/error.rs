use geo_types::Coord;
use thiserror::Error;

use crate::overlay::OpCode;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Topology error: {message}{}", fmt_coord(.coord))]
    Topology {
        message: String,
        coord: Option<Coord<f64>>,
    },

    #[error("Noding failed: {message}{}", fmt_coord(.coord))]
    Noding {
        message: String,
        coord: Option<Coord<f64>>,
    },

    #[error("{op} failed after {attempts} precision attempts: {source}")]
    PrecisionExhausted {
        op: OpCode,
        attempts: usize,
        #[source]
        source: Box<OverlayError>,
    },
}

fn fmt_coord(coord: &Option<Coord<f64>>) -> String {
    match coord {
        Some(c) => format!(" [ ({} {}) ]", c.x, c.y),
        None => String::new(),
    }
}

impl OverlayError {
    pub(crate) fn topology(message: impl Into<String>, coord: Coord<f64>) -> Self {
        OverlayError::Topology {
            message: message.into(),
            coord: Some(coord),
        }
    }

    pub(crate) fn noding(message: impl Into<String>, coord: Coord<f64>) -> Self {
        OverlayError::Noding {
            message: message.into(),
            coord: Some(coord),
        }
    }

    /// Topology and noding failures are artifacts of floating-point decisions
    /// and may disappear when the operation is re-run at a coarser precision.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, OverlayError::Topology { .. } | OverlayError::Noding { .. })
    }

    /// The coordinate at which the failure was detected, if known.
    pub fn coordinate(&self) -> Option<Coord<f64>> {
        match self {
            OverlayError::Topology { coord, .. } | OverlayError::Noding { coord, .. } => *coord,
            OverlayError::PrecisionExhausted { source, .. } => source.coordinate(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, OverlayError>;
