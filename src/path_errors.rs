use thiserror::Error;

use crate::constants::BodyId;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Unknown body: {0}")]
    UnknownBody(BodyId),

    #[error("Invalid resampling step: {0} (must be a positive finite number)")]
    InvalidTimeStep(f64),

    #[error("Resampling grid of {len} points exceeds the configured maximum of {max}")]
    GridTooLarge { len: usize, max: usize },

    #[error("Trajectory axis '{axis}' has {found} samples, expected {expected}")]
    LengthMismatch {
        axis: char,
        expected: usize,
        found: usize,
    },

    #[error("Trajectory time is not strictly increasing at sample {index}")]
    NonIncreasingTime { index: usize },

    #[error("Trajectory time is not finite at sample {index}")]
    NonFiniteTime { index: usize },

    #[error("Trajectory has no samples")]
    EmptyTrajectory,

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed sample file: {0}")]
    MalformedSampleFile(String),

    #[error("Invalid chart description line: {0}")]
    InvalidChartLine(String),

    #[error("Error while tokenizing chart descriptions: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl PartialEq for PathError {
    fn eq(&self, other: &Self) -> bool {
        use PathError::*;
        match (self, other) {
            (UnknownBody(a), UnknownBody(b)) => a == b,
            (InvalidTimeStep(a), InvalidTimeStep(b)) => a.to_bits() == b.to_bits(),
            (
                GridTooLarge { len: l1, max: m1 },
                GridTooLarge { len: l2, max: m2 },
            ) => l1 == l2 && m1 == m2,
            (
                LengthMismatch {
                    axis: a1,
                    expected: e1,
                    found: f1,
                },
                LengthMismatch {
                    axis: a2,
                    expected: e2,
                    found: f2,
                },
            ) => a1 == a2 && e1 == e2 && f1 == f2,
            (NonIncreasingTime { index: a }, NonIncreasingTime { index: b }) => a == b,
            (NonFiniteTime { index: a }, NonFiniteTime { index: b }) => a == b,
            (MalformedSampleFile(a), MalformedSampleFile(b)) => a == b,
            (InvalidChartLine(a), InvalidChartLine(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,

            // Not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (Csv(_), Csv(_)) => true,

            (EmptyTrajectory, EmptyTrajectory) => true,

            _ => false,
        }
    }
}
