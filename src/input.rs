use super::*;
use std::fs::File;
use std::io::BufReader;

///This helper function is a workaround to issue #368 in serde
fn default_input_file() -> String {
    "MXT2Summary.txt".to_string()
}

///This helper function is a workaround to issue #368 in serde
fn default_log_file() -> Option<String> {
    Some("CreateMXTSummary.log".to_string())
}

///This helper function is a workaround to issue #368 in serde
fn default_output_directory() -> String {
    "analysis".to_string()
}

///This helper function is a workaround to issue #368 in serde
fn default_shot_thru_limit() -> f64 {
    0.0
}

///This helper function is a workaround to issue #368 in serde
fn default_specular_radius() -> f64 {
    1.5
}

/// Run-level options, fixed at run start.
#[derive(Deserialize, Clone)]
pub struct Options {
    /// Trajectory summary table to analyze.
    #[serde(default = "default_input_file")]
    pub input_file: String,
    /// Log destination; screen output goes there when set.
    #[serde(default = "default_log_file")]
    pub log_file: Option<String>,
    /// Directory the tabular artifacts are written into.
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
    /// z-position below which a trajectory counts as transmitted. This should
    /// be a negative number.
    #[serde(default = "default_shot_thru_limit")]
    pub shot_thru_limit: f64,
    /// Angular tolerance in degrees of the specular and in-plane windows.
    #[serde(default = "default_specular_radius")]
    pub specular_radius: f64,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            input_file: default_input_file(),
            log_file: default_log_file(),
            output_directory: default_output_directory(),
            shot_thru_limit: default_shot_thru_limit(),
            specular_radius: default_specular_radius(),
        }
    }
}

impl Options {
    /// Reads options from a TOML file.
    pub fn from_file(path: &str) -> Result<Options> {
        let mut input_toml = String::new();
        let mut file = OpenOptions::new()
            .read(true)
            .open(path)
            .context(format!("Input error: could not open options file {}.", path))?;
        file.read_to_string(&mut input_toml).context("Could not convert TOML file to string.")?;
        let options = toml::from_str(&input_toml).context("Could not parse TOML options file.")?;
        Ok(options)
    }
}

/// Aggregate outcome counts of one run, frozen after loading.
#[derive(Clone, Copy, Debug)]
pub struct RunStatistics {
    pub total_rows: usize,
    pub rejected: usize,
    pub retained: usize,
    pub scattered: usize,
    pub adsorbed: usize,
    pub transmitted: usize,
}

impl RunStatistics {
    pub fn frac_scattered(&self) -> f64 {
        self.scattered as f64/self.retained as f64
    }

    pub fn frac_adsorbed(&self) -> f64 {
        self.adsorbed as f64/self.retained as f64
    }

    pub fn frac_transmitted(&self) -> f64 {
        self.transmitted as f64/self.retained as f64
    }
}

/// Reads the trajectory summary table, applies the retention filter and
/// counts outcomes among the retained trajectories. Comment lines prefixed
/// `#` are ignored. A single malformed row aborts the run.
pub fn read_trajectories(options: &Options) -> Result<(Vec<Trajectory>, RunStatistics)> {
    let file = File::open(&options.input_file)
        .context(format!("Input error: could not open trajectory table {}.", &options.input_file))?;
    let reader = BufReader::new(file);
    let lines = reader.lines()
        .collect::<std::io::Result<Vec<String>>>()
        .context(format!("Input error: could not read trajectory table {}.", &options.input_file))?;

    let ntrajs = lines.iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .count();
    if ntrajs == 0 {
        return Err(StatError::EmptyInput { path: options.input_file.clone() }.into());
    }
    info!("Reading {} trajectories from {}", ntrajs, options.input_file);

    let milestone = std::cmp::max(ntrajs/10, 1);
    let mut trajectories: Vec<Trajectory> = Vec::with_capacity(ntrajs);
    let mut rejected = 0;
    let mut counter = 0;

    for line in &lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if counter % milestone == 0 {
            info!("{} %", 100*counter/ntrajs);
        }
        counter += 1;

        let trajectory = Trajectory::from_line(trimmed, options.shot_thru_limit, options.specular_radius)?;
        if trajectory.ekin_p_f < RETENTION_FACTOR*trajectory.ekin_p_i {
            if trajectory.has_transmitted() {
                info!("Particle was transmitted in trajectory {}", trajectory.traj_id);
            }
            trajectories.push(trajectory);
        } else {
            rejected += 1;
            warn!("Neglecting trajectory {} with final kinetic energy {}", trajectory.traj_id, trajectory.ekin_p_f);
        }
    }
    ensure!(!trajectories.is_empty(),
        "Input error: all {} trajectories were rejected by the retention filter.", ntrajs);

    let scattered = trajectories.iter().filter(|t| t.has_scattered()).count();
    let adsorbed = trajectories.iter().filter(|t| t.has_adsorbed()).count();
    let transmitted = trajectories.iter().filter(|t| t.has_transmitted()).count();

    let statistics = RunStatistics {
        total_rows: ntrajs,
        rejected,
        retained: trajectories.len(),
        scattered,
        adsorbed,
        transmitted,
    };
    Ok((trajectories, statistics))
}
