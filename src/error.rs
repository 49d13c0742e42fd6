//! Error kinds for the core: configuration, numerical, resource, and
//! external-collaborator failures. A `thiserror::Error` enum per kind,
//! each expanding into its own structured variant set so the fatal path
//! can log component name, offending input, and numeric context rather
//! than a pre-formatted string.

use crate::real::Real;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{path}: duplicate table heading '[{heading}]'")]
    DuplicateHeading { path: String, heading: String },

    #[error("{path}: key '{key}' collides with a table heading of the same name")]
    HeadingKeyCollision { path: String, key: String },

    #[error("{path}:{line}: malformed line: '{text}'")]
    MalformedLine { path: String, line: usize, text: String },

    #[error("{path}:{line}: invalid key '{key}'")]
    InvalidKey { path: String, line: usize, key: String },

    #[error("missing required key '{key}'")]
    MissingKey { key: String },

    #[error("key '{key}' has value '{value}', which cannot be parsed as {expected}")]
    TypeMismatch { key: String, value: String, expected: &'static str },

    #[error("unknown key '{key}' (strict mode)")]
    UnknownKey { key: String },

    #[error("malformed override '{token}', expected key=value")]
    MalformedOverride { token: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum NumericalError {
    #[error("non-finite {field} = {value} in {component} at cell {indices:?}")]
    NonFinite { component: &'static str, indices: [usize; 3], field: &'static str, value: Real },

    #[error("{solver} failed to converge after {iterations} iterations (residual {residual})")]
    RiemannNonConvergence { solver: &'static str, iterations: usize, residual: Real },

    #[error("negative pressure {pressure} recovered in {component} at cell {indices:?}, floor is {floor}")]
    NegativePressure { component: &'static str, indices: [usize; 3], pressure: Real, floor: Real },

    #[error("timestep reduction degenerate: {reason}")]
    DegenerateTimestep { reason: &'static str },
}

#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    #[error("failed to allocate {what}: {reason}")]
    Allocation { what: &'static str, reason: String },
}

#[derive(thiserror::Error, Debug)]
pub enum CollaboratorError {
    #[error("halo exchange failed: {0}")]
    HaloExchange(String),

    #[error("potential solve failed: {0}")]
    PotentialSolve(String),

    #[error("snapshot I/O failed: {0}")]
    SnapshotIo(String),
}

/// The top-level error type returned by the core's fallible entry points.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Numerical(#[from] NumericalError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
