use super::*;

/// Mutually exclusive fate of a trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Net outward motion: final z-position above the initial one.
    SCATTERED,
    /// Final z-position below the shoot-through limit.
    TRANSMITTED,
    /// Residual class: ended inside the surface region.
    ADSORBED,
}

impl Outcome {
    /// Classifies a trajectory from its initial/final z-positions. Scattering
    /// takes precedence over transmission.
    pub fn classify(z_initial: f64, z_final: f64, shot_thru_limit: f64) -> Outcome {
        if z_final > z_initial {
            Outcome::SCATTERED
        } else if z_final < shot_thru_limit {
            Outcome::TRANSMITTED
        } else {
            Outcome::ADSORBED
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Outcome::SCATTERED => write!(f, "scattered"),
            Outcome::TRANSMITTED => write!(f, "transmitted"),
            Outcome::ADSORBED => write!(f, "adsorbed"),
        }
    }
}
