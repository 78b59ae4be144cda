//Run-level constants
/// Retention threshold: trajectories whose final projectile kinetic energy
/// exceeds this factor times the initial one are treated as failed
/// integrations and excluded from all statistics.
pub const RETENTION_FACTOR: f64 = 1.1;

/// Placeholder grid written in place of a 2D artifact whose gating subset is
/// empty, so the plotting stage always finds a parsable file. A blank
/// separator line follows the second row.
pub const EMPTY_GRID_SENTINEL: [(f64, f64, u64); 4] = [
    (0.1, 0.5, 0),
    (0.1, 1.0, 1),
    (0.2, 1.0, 1),
    (0.2, 0.5, 2),
];
