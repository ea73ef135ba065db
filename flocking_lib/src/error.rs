use thiserror::Error;

use crate::options::{Axis, Parameter};

pub type Result<T> = std::result::Result<T, FlockError>;

#[derive(Debug, Error, PartialEq)]
pub enum FlockError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
}

/// Reasons a call can be rejected. A rejected call leaves the flock untouched.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidArgument {
    #[error("cannot remove {requested} agents from a population of {available}")]
    RemoveExceedsPopulation { requested: usize, available: usize },

    #[error("{parameter} must be a finite value >= 0, got {value}")]
    OutOfRange { parameter: Parameter, value: f64 },

    #[error("{parameter} must be a whole number of agents, got {value}")]
    NotACount { parameter: Parameter, value: f64 },

    #[error("{axis} scope must satisfy min < max, got ({min}, {max})")]
    MalformedScope { axis: Axis, min: f64, max: f64 },

    #[error("agent {index} lies outside the domain or is not finite: ({x}, {y}, {vx}, {vy})")]
    InvalidAgent {
        index: usize,
        x: f64,
        y: f64,
        vx: f64,
        vy: f64,
    },

    #[error("a snapshot has 4 columns (x, y, vx, vy), got {columns}")]
    MalformedSnapshot { columns: usize },
}

impl FlockError {
    pub(crate) fn out_of_range(parameter: Parameter, value: f64) -> Self {
        InvalidArgument::OutOfRange { parameter, value }.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = FlockError::out_of_range(Parameter::RVision, -1.);
        assert_eq!(
            err.to_string(),
            "invalid argument: r_vision must be a finite value >= 0, got -1"
        );

        let err: FlockError = InvalidArgument::MalformedScope {
            axis: Axis::X,
            min: 5.,
            max: 5.,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "invalid argument: x scope must satisfy min < max, got (5, 5)"
        );
    }
}
