#![allow(non_snake_case)]
#![allow(non_camel_case_types)]

use std::fmt;

//Error handling crates
use anyhow::Result;
use anyhow::Context;
use anyhow::ensure;

//Serializing/Deserializing crate
use serde::*;

//I/O
use std::fs::OpenOptions;
use std::io::prelude::*;

//Logging
use log::{info, warn};

//itertools
use itertools::izip;

//Math
use std::f64::consts::PI;

//Load internal modules
pub mod consts;
pub mod enums;
pub mod errors;
pub mod structs;
pub mod trajectory;
pub mod input;
pub mod histogram;
pub mod analysis;
pub mod output;

pub use crate::consts::*;
pub use crate::enums::*;
pub use crate::errors::StatError;
pub use crate::structs::{Vector, RotationMatrix};
pub use crate::trajectory::{Trajectory, azimuth_delta};
pub use crate::input::{Options, RunStatistics, read_trajectories};
pub use crate::histogram::{numbins, bounds, mean, Histogram1D, Histogram2D};
pub use crate::analysis::{AnalysisPipeline, AnalysisResults, LossDecomposition, bounce_resolved};
pub use crate::output::write_summary;
