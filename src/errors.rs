use thiserror::Error;

/// Fatal error conditions of an analysis run. All of these abort the run at
/// the point of occurrence; the loader's retention filter is a policy
/// exclusion and never surfaces here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatError {
    /// An input row that cannot be decoded into a trajectory.
    #[error("malformed record {id}: {detail}")]
    MalformedRecord { id: String, detail: String },

    /// Normalization of, or projection onto, a zero-length vector.
    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,

    /// The trajectory table contains no data rows.
    #[error("no trajectory rows in {path}")]
    EmptyInput { path: String },

    /// The bin-count heuristic was handed a population it cannot handle.
    #[error("cannot derive a bin count from population {population}")]
    UnsupportedInput { population: f64 },
}
