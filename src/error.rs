/// Result alias for grid construction and solving
pub type MdpResult<T> = Result<T, MdpError>;

/// Errors surfaced by grid construction and the solvers
///
/// All of these are deterministic: the same input fails the same way on
/// every run, so there is no retry path anywhere in the crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MdpError {
    /// A solve or grid parameter outside its valid range
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A malformed source grid (ragged rows, unknown cell code)
    #[error("malformed grid: {0}")]
    GridFormat(String),

    /// A lookup outside the grid. The neighbor substitution rule keeps the
    /// solvers in bounds, so hitting this from a solve indicates a logic
    /// defect, not bad input.
    #[error("position ({0}, {1}) is outside the grid")]
    OutOfBounds(usize, usize),

    /// The sweep cap was reached before the termination criterion
    #[error("no convergence within {0} sweeps")]
    NonConvergence(u32),
}
