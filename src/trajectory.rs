use super::*;

/// One simulated projectile trajectory, decoded from a single row of the
/// trajectory summary table. The derived quantities (energy loss, velocity
/// loss, outcome, window flags) are computed once at construction and never
/// change afterwards.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub traj_id: String,
    //Initial state
    pub ekin_p_i: f64,
    pub ekin_l_i: f64,
    pub epot_i: f64,
    pub etotal_i: f64,
    pub r_p_i: Vector,
    pub v_p_i: Vector,
    pub polar_i: f64,
    pub azi_i: f64,
    //Final state
    pub ekin_p_f: f64,
    pub ekin_l_f: f64,
    pub epot_f: f64,
    pub etotal_f: f64,
    pub r_p_f: Vector,
    pub v_p_f: Vector,
    pub polar_f: f64,
    pub azi_f: f64,
    //Auxiliary
    pub time: f64,
    pub turn_pnts: u32,
    pub cl_appr: f64,
    pub cl_appr_t: u32,
    pub r_p_min: Vector,
    //Derived
    pub eloss: f64,
    pub vloss: f64,
    pub outcome: Outcome,
    pub in_spec: bool,
    pub in_plane: bool,
}

impl Trajectory {
    /// Trajectory constructor from decoded physical quantities.
    pub fn new(
        ekin_p_i: f64, ekin_l_i: f64, epot_i: f64, etotal_i: f64,
        r_p_i: Vector, v_p_i: Vector, polar_i: f64, azi_i: f64,
        ekin_p_f: f64, ekin_l_f: f64, epot_f: f64, etotal_f: f64,
        r_p_f: Vector, v_p_f: Vector, polar_f: f64, azi_f: f64,
        time: f64, turn_pnts: u32, cl_appr: f64, cl_appr_t: u32,
        r_p_min: Vector, traj_id: String,
        shot_thru_limit: f64, specular_radius: f64,
    ) -> Trajectory {
        let eloss = ekin_p_i - ekin_p_f;
        let vloss = v_p_f.distance(&v_p_i);
        let outcome = Outcome::classify(r_p_i.z, r_p_f.z, shot_thru_limit);

        //Azimuth is directional: differences are measured on the short arc so
        //a delta straddling the 0/360 boundary never reads as nearly 360.
        let d_azi = azimuth_delta(azi_f, azi_i);
        let d_polar = polar_f - polar_i;
        let in_spec = (d_polar*d_polar + d_azi*d_azi).sqrt() < specular_radius;
        let in_plane = d_azi < specular_radius;

        Trajectory {
            traj_id,
            ekin_p_i,
            ekin_l_i,
            epot_i,
            etotal_i,
            r_p_i,
            v_p_i,
            polar_i,
            azi_i,
            ekin_p_f,
            ekin_l_f,
            epot_f,
            etotal_f,
            r_p_f,
            v_p_f,
            polar_f,
            azi_f,
            time,
            turn_pnts,
            cl_appr,
            cl_appr_t,
            r_p_min,
            eloss,
            vloss,
            outcome,
            in_spec,
            in_plane,
        }
    }

    /// Decodes one whitespace-delimited 32-column row of the summary table.
    pub fn from_line(line: &str, shot_thru_limit: f64, specular_radius: f64) -> Result<Trajectory, StatError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 32 {
            return Err(StatError::MalformedRecord {
                id: fields.first().unwrap_or(&"?").to_string(),
                detail: format!("expected 32 columns, found {}", fields.len()),
            });
        }
        let traj_id = fields[0].to_string();

        let number = |index: usize| -> Result<f64, StatError> {
            fields[index].parse().map_err(|_| StatError::MalformedRecord {
                id: traj_id.clone(),
                detail: format!("column {} is not a number: {}", index, fields[index]),
            })
        };
        let count = |index: usize| -> Result<u32, StatError> {
            fields[index].parse().map_err(|_| StatError::MalformedRecord {
                id: traj_id.clone(),
                detail: format!("column {} is not a non-negative integer: {}", index, fields[index]),
            })
        };

        Ok(Trajectory::new(
            number(1)?, number(2)?, number(3)?, number(4)?,
            Vector::new(number(5)?, number(6)?, number(7)?),
            Vector::new(number(8)?, number(9)?, number(10)?),
            number(11)?, number(12)?,
            number(13)?, number(14)?, number(15)?, number(16)?,
            Vector::new(number(17)?, number(18)?, number(19)?),
            Vector::new(number(20)?, number(21)?, number(22)?),
            number(23)?, number(24)?,
            number(25)?, count(26)?, number(27)?, count(28)?,
            Vector::new(number(29)?, number(30)?, number(31)?),
            traj_id.clone(),
            shot_thru_limit, specular_radius,
        ))
    }

    pub fn has_scattered(&self) -> bool {
        self.outcome == Outcome::SCATTERED
    }

    pub fn has_adsorbed(&self) -> bool {
        self.outcome == Outcome::ADSORBED
    }

    pub fn has_transmitted(&self) -> bool {
        self.outcome == Outcome::TRANSMITTED
    }

    /// Direction a perfectly specular reflection of the incoming velocity
    /// would exit along: the incoming direction with its z-component flipped.
    pub fn specular_direction(&self) -> Result<Vector, StatError> {
        let mut incoming = self.v_p_i.clone();
        incoming.z *= -1.;
        incoming.normalize()?;
        Ok(incoming)
    }

    /// Angle in degrees between the final velocity direction and the specular
    /// exit direction. Zero for a perfectly specular trajectory.
    pub fn angle_to_specular(&self) -> Result<f64, StatError> {
        let specular = self.specular_direction()?;
        self.angle_with_vector(&specular)
    }

    /// Angle in degrees between the final velocity direction and an arbitrary
    /// direction.
    pub fn angle_with_vector(&self, vector: &Vector) -> Result<f64, StatError> {
        let mut outgoing = self.v_p_f.clone();
        outgoing.normalize()?;
        let mut direction = vector.clone();
        direction.normalize()?;

        //Clamp against floating-point overshoot beyond the domain of acos
        let dp = outgoing.dot(&direction).clamp(-1., 1.);
        Ok(dp.acos()*180./PI)
    }
}

/// Angular separation of two azimuths in degrees, reduced modulo 360 and
/// folded onto the short arc [0, 180].
pub fn azimuth_delta(azi_f: f64, azi_i: f64) -> f64 {
    let delta = (azi_f - azi_i).abs() % 360.;
    if delta > 180. {
        360. - delta
    } else {
        delta
    }
}
