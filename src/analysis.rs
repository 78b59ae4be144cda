use super::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Bounce-resolved loss decomposition: the composite probability density of
/// one loss quantity over a trajectory subset, plus the fraction-weighted
/// single/double/multi-bounce densities over the same bins. Summing the
/// weighted columns bin-by-bin reproduces the composite.
#[derive(Clone, Debug)]
pub struct LossDecomposition {
    pub hist: Histogram1D,
    pub single: Vec<f64>,
    pub double: Vec<f64>,
    pub multi: Vec<f64>,
    pub samples: Vec<f64>,
}

/// Splits `(value, bounce count)` pairs into a composite density and the
/// weighted sub-densities. A single outward bounce shows up as one turning
/// point, a double bounce as three. With `remainder_bucket` the multi column
/// collects every other bounce count; otherwise only counts of five and
/// above.
pub fn bounce_resolved(pairs: &[(f64, u32)], remainder_bucket: bool) -> Result<LossDecomposition, StatError> {
    let samples: Vec<f64> = pairs.iter().map(|&(value, _)| value).collect();
    let single: Vec<f64> = pairs.iter().filter(|&&(_, b)| b == 1).map(|&(value, _)| value).collect();
    let double: Vec<f64> = pairs.iter().filter(|&&(_, b)| b == 3).map(|&(value, _)| value).collect();
    let multi: Vec<f64> = if remainder_bucket {
        pairs.iter().filter(|&&(_, b)| b != 1 && b != 3).map(|&(value, _)| value).collect()
    } else {
        pairs.iter().filter(|&&(_, b)| b >= 5).map(|&(value, _)| value).collect()
    };

    let bins = numbins(samples.len() as f64)?;
    let range = bounds(&samples);
    let hist = Histogram1D::new(&samples, bins, range, true);

    let weighted = |subset: &[f64]| -> Vec<f64> {
        let fraction = subset.len() as f64/samples.len() as f64;
        Histogram1D::new(subset, bins, range, true)
            .values
            .iter()
            .map(|value| fraction*value)
            .collect()
    };

    Ok(LossDecomposition {
        single: weighted(&single),
        double: weighted(&double),
        multi: weighted(&multi),
        hist,
        samples,
    })
}

/// Everything the analysis sequence computes, kept as value objects so the
/// summary reporter and the tests can consume results without re-reading the
/// artifact files.
pub struct AnalysisResults {
    pub beam_energy: f64,
    pub bounce_centers: Vec<f64>,
    pub bounce_columns: [Vec<f64>; 4],
    pub eloss: LossDecomposition,
    pub spec_eloss: Option<LossDecomposition>,
    pub in_plane_eloss: Option<LossDecomposition>,
    pub vloss: LossDecomposition,
    pub spec_vloss: Option<LossDecomposition>,
    pub in_plane_vloss: Option<LossDecomposition>,
    pub adsorbed_eloss: Vec<f64>,
    pub final_z: Option<Histogram1D>,
    pub bounces_vs_eloss: Histogram2D,
    pub bounces_vs_vloss: Histogram2D,
    pub ang_res_eloss: Option<Histogram2D>,
    pub ang_res_vloss: Option<Histogram2D>,
    pub polar_azi_integrated: Option<Histogram2D>,
    pub polar_azi_integrated_v: Option<Histogram2D>,
    pub spherical: Histogram2D,
    pub ehp_loss: Histogram1D,
    pub ehp_loss_spec: Option<Histogram1D>,
    pub ehp_samples: Vec<f64>,
    pub ehp_samples_spec: Vec<f64>,
    pub closest_approach: Histogram1D,
    pub eloss_vs_closest: Histogram2D,
    pub polar_vs_closest: Option<Histogram2D>,
    pub eloss_vs_closest_in_plane: Option<Histogram2D>,
    pub energy_won: usize,
    pub spec_count: usize,
    pub in_plane_count: usize,
}

/// Runs the fixed sequence of named analyses over the retained trajectories.
/// Each analysis selects a subset by predicate, extracts one or two derived
/// quantities, bins them, rescales sub-populations by their population
/// fraction and writes one tabular artifact.
pub struct AnalysisPipeline<'a> {
    trajectories: &'a [Trajectory],
    statistics: &'a RunStatistics,
    options: &'a Options,
}

impl<'a> AnalysisPipeline<'a> {
    pub fn new(trajectories: &'a [Trajectory], statistics: &'a RunStatistics, options: &'a Options) -> AnalysisPipeline<'a> {
        AnalysisPipeline {
            trajectories,
            statistics,
            options,
        }
    }

    fn artifact(&self, name: &str) -> PathBuf {
        Path::new(&self.options.output_directory).join(name)
    }

    /// `(value, bounce count)` pairs over scattered trajectories passing `gate`.
    fn scattered_pairs<V, G>(&self, value: V, gate: G) -> Vec<(f64, u32)>
    where
        V: Fn(&Trajectory) -> f64,
        G: Fn(&Trajectory) -> bool,
    {
        self.trajectories.iter()
            .filter(|t| t.has_scattered() && gate(t))
            .map(|t| (value(t), t.turn_pnts))
            .collect()
    }

    pub fn run(&self) -> Result<AnalysisResults> {
        let bar = ProgressBar::new(14);
        bar.set_style(ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .progress_chars("#>-"));

        bar.set_message("bounces");
        let (bounce_centers, bounce_columns) = self.bounce_distribution()?;
        bar.inc(1);

        bar.set_message("energy loss");
        let eloss = self.total_loss(|t| t.eloss, "eloss.txt",
            "# eloss/eV  all  single bounce  double bounce  multi bounce")?;
        bar.inc(1);

        bar.set_message("windowed energy loss");
        let spec_eloss = self.windowed_loss(|t| t.eloss, |t| t.in_spec, "spec_eloss.txt",
            "# eloss/eV  all  single bounce  double bounce  multi bounce")?;
        let in_plane_eloss = self.windowed_loss(|t| t.eloss, |t| t.in_plane, "in_plane_eloss.txt",
            "# eloss/eV  all  single bounce  double bounce  multi bounce")?;
        bar.inc(1);

        bar.set_message("final z positions");
        let final_z = self.final_z_distribution()?;
        bar.inc(1);

        bar.set_message("bounce correlations");
        let bounces_vs_eloss = self.bounces_vs_loss(&eloss.samples, "bounces_vs_eloss.txt",
            "# bounces  eloss/eV  counts")?;
        bar.inc(1);

        bar.set_message("angular energy loss");
        let ang_res_eloss = self.angle_resolved_loss(|t| t.eloss, true, "ang_res_eloss.txt",
            "# eloss/eV  polar angle/deg  counts")?;
        let polar_azi_integrated = self.angle_resolved_loss(|t| t.eloss, false, "polar_scatt_azi_int.txt",
            "# eloss/eV  polar angle/deg  counts")?;
        bar.inc(1);

        bar.set_message("loss to ehps");
        let (ehp_loss, ehp_samples, ehp_loss_spec, ehp_samples_spec) = self.ehp_loss()?;
        bar.inc(1);

        bar.set_message("spherical symmetry");
        let spherical = self.spherical_symmetry()?;
        bar.inc(1);

        bar.set_message("closest approach");
        let closest_approach = self.closest_approach_distribution()?;
        bar.inc(1);

        bar.set_message("closest approach correlations");
        let eloss_vs_closest = self.loss_vs_closest_approach(&eloss.samples)?;
        let (polar_vs_closest, eloss_vs_closest_in_plane) = self.in_plane_closest_approach()?;
        bar.inc(1);

        bar.set_message("velocity loss");
        let vloss = self.total_loss(|t| t.vloss, "vloss.txt",
            "# vloss  all  single bounce  double bounce  multi bounce")?;
        bar.inc(1);

        bar.set_message("windowed velocity loss");
        let spec_vloss = self.windowed_loss(|t| t.vloss, |t| t.in_spec, "spec_vloss.txt",
            "# vloss  all  single bounce  double bounce  multi bounce")?;
        let in_plane_vloss = self.windowed_loss(|t| t.vloss, |t| t.in_plane, "in_plane_vloss.txt",
            "# vloss  all  single bounce  double bounce  multi bounce")?;
        bar.inc(1);

        bar.set_message("bounce/velocity correlations");
        let bounces_vs_vloss = self.bounces_vs_loss(&vloss.samples, "bounces_vs_vloss.txt",
            "# bounces  vloss  counts")?;
        bar.inc(1);

        bar.set_message("angular velocity loss");
        let ang_res_vloss = self.angle_resolved_loss(|t| t.vloss, true, "ang_res_vloss.txt",
            "# vloss  polar angle/deg  counts")?;
        let polar_azi_integrated_v = self.angle_resolved_loss(|t| t.vloss, false, "polar_scatt_azi_int_v.txt",
            "# vloss  polar angle/deg  counts")?;
        bar.inc(1);

        bar.finish_with_message("analysis complete");

        let adsorbed_eloss: Vec<f64> = self.trajectories.iter()
            .filter(|t| t.has_adsorbed())
            .map(|t| t.eloss)
            .collect();
        let energy_won = eloss.samples.iter().filter(|&&e| e < 0.).count();
        let spec_count = spec_eloss.as_ref().map_or(0, |d| d.samples.len());
        let in_plane_count = in_plane_eloss.as_ref().map_or(0, |d| d.samples.len());

        Ok(AnalysisResults {
            beam_energy: self.trajectories[0].ekin_p_i,
            bounce_centers,
            bounce_columns,
            eloss,
            spec_eloss,
            in_plane_eloss,
            vloss,
            spec_vloss,
            in_plane_vloss,
            adsorbed_eloss,
            final_z,
            bounces_vs_eloss,
            bounces_vs_vloss,
            ang_res_eloss,
            ang_res_vloss,
            polar_azi_integrated,
            polar_azi_integrated_v,
            spherical,
            ehp_loss,
            ehp_loss_spec,
            ehp_samples,
            ehp_samples_spec,
            closest_approach,
            eloss_vs_closest,
            polar_vs_closest,
            eloss_vs_closest_in_plane,
            energy_won,
            spec_count,
            in_plane_count,
        })
    }

    /// Bounce-count distribution of all retained trajectories, decomposed
    /// into the three outcome classes. Each class column is weighted by its
    /// outcome fraction so the class columns sum to the composite.
    fn bounce_distribution(&self) -> Result<(Vec<f64>, [Vec<f64>; 4])> {
        let all: Vec<f64> = self.trajectories.iter().map(|t| t.turn_pnts as f64).collect();
        let scattered: Vec<f64> = self.trajectories.iter().filter(|t| t.has_scattered()).map(|t| t.turn_pnts as f64).collect();
        let adsorbed: Vec<f64> = self.trajectories.iter().filter(|t| t.has_adsorbed()).map(|t| t.turn_pnts as f64).collect();
        let transmitted: Vec<f64> = self.trajectories.iter().filter(|t| t.has_transmitted()).map(|t| t.turn_pnts as f64).collect();

        let (_, max_bounce) = bounds(&all);
        let bins = max_bounce as usize;
        let range = (0., max_bounce);

        let all_hist = Histogram1D::new(&all, bins, range, true);
        let weight = |subset: &[f64], fraction: f64| -> Vec<f64> {
            Histogram1D::new(subset, bins, range, true)
                .values
                .iter()
                .map(|value| fraction*value)
                .collect()
        };
        let columns = [
            all_hist.values.clone(),
            weight(&scattered, self.statistics.frac_scattered()),
            weight(&adsorbed, self.statistics.frac_adsorbed()),
            weight(&transmitted, self.statistics.frac_transmitted()),
        ];

        let centers = all_hist.centers();
        output::write_histogram_table(
            &self.artifact("bounces.txt"),
            "# bounces  all  scattered  absorbed  transmitted",
            &centers,
            &columns,
            true,
        )?;
        Ok((centers, columns))
    }

    /// Loss distribution over all scattered trajectories with the
    /// single/double/multi bounce decomposition (multi means five or more
    /// turning points; trajectories with other bounce counts appear only in
    /// the composite).
    fn total_loss<V>(&self, value: V, filename: &str, header: &str) -> Result<LossDecomposition>
    where
        V: Fn(&Trajectory) -> f64,
    {
        let pairs = self.scattered_pairs(value, |_| true);
        let decomposition = bounce_resolved(&pairs, false)?;
        output::write_loss_table(&self.artifact(filename), header, &decomposition)?;
        Ok(decomposition)
    }

    /// Loss distribution restricted to scattered trajectories inside an
    /// angular window. The multi-bounce column collects every bounce count
    /// other than one and three. An empty window writes a single all-zero
    /// row and yields no decomposition.
    fn windowed_loss<V, G>(&self, value: V, gate: G, filename: &str, header: &str) -> Result<Option<LossDecomposition>>
    where
        V: Fn(&Trajectory) -> f64,
        G: Fn(&Trajectory) -> bool,
    {
        let pairs = self.scattered_pairs(value, gate);
        if pairs.is_empty() {
            output::write_zero_row(&self.artifact(filename), header, 5)?;
            return Ok(None);
        }
        let decomposition = bounce_resolved(&pairs, true)?;
        output::write_loss_table(&self.artifact(filename), header, &decomposition)?;
        Ok(Some(decomposition))
    }

    /// Final z-position density of adsorbed trajectories. Skipped entirely
    /// when nothing adsorbed.
    fn final_z_distribution(&self) -> Result<Option<Histogram1D>> {
        let final_z: Vec<f64> = self.trajectories.iter()
            .filter(|t| t.has_adsorbed())
            .map(|t| t.r_p_f.z)
            .collect();
        if final_z.is_empty() {
            return Ok(None);
        }
        let bins = numbins(final_z.len() as f64)?;
        let hist = Histogram1D::new(&final_z, bins, bounds(&final_z), true);
        output::write_histogram_table(
            &self.artifact("final_z.txt"),
            "# z/A  probability density",
            &hist.centers(),
            &[hist.values.clone()],
            false,
        )?;
        Ok(Some(hist))
    }

    /// Joint distribution of bounce count and a loss quantity over scattered
    /// trajectories.
    fn bounces_vs_loss(&self, losses: &[f64], filename: &str, header: &str) -> Result<Histogram2D> {
        let bounces: Vec<f64> = self.trajectories.iter()
            .filter(|t| t.has_scattered())
            .map(|t| t.turn_pnts as f64)
            .collect();
        let (_, max_bounce) = bounds(&bounces);
        let hist = Histogram2D::new(
            &bounces,
            losses,
            (max_bounce as usize, numbins(losses.len() as f64)?),
            Some(((0., max_bounce), bounds(losses))),
        );
        output::write_grid_table(&self.artifact(filename), header, &hist, true, false)?;
        Ok(hist)
    }

    /// Joint distribution of a loss quantity and the final polar angle, either
    /// restricted to the incidence plane or integrated over all azimuths.
    fn angle_resolved_loss<V>(&self, value: V, in_plane_only: bool, filename: &str, header: &str) -> Result<Option<Histogram2D>>
    where
        V: Fn(&Trajectory) -> f64,
    {
        let subset: Vec<&Trajectory> = self.trajectories.iter()
            .filter(|t| t.has_scattered() && (!in_plane_only || t.in_plane))
            .collect();
        if subset.is_empty() {
            output::write_empty_grid(&self.artifact(filename), header)?;
            return Ok(None);
        }
        let losses: Vec<f64> = subset.iter().map(|t| value(t)).collect();
        let polar: Vec<f64> = subset.iter().map(|t| t.polar_f).collect();
        let bins = numbins(losses.len() as f64)?;
        let hist = Histogram2D::new(&losses, &polar, (bins, bins), None);
        output::write_grid_table(&self.artifact(filename), header, &hist, false, false)?;
        Ok(Some(hist))
    }

    /// Density of the energy lost to degrees of freedom the trajectory does
    /// not carry (electron-hole pairs and phonons): total initial minus total
    /// final energy, for scattered and specular-scattered trajectories.
    fn ehp_loss(&self) -> Result<(Histogram1D, Vec<f64>, Option<Histogram1D>, Vec<f64>)> {
        let samples: Vec<f64> = self.trajectories.iter()
            .filter(|t| t.has_scattered())
            .map(|t| t.etotal_i - t.etotal_f)
            .collect();
        let samples_spec: Vec<f64> = self.trajectories.iter()
            .filter(|t| t.has_scattered() && t.in_spec)
            .map(|t| t.etotal_i - t.etotal_f)
            .collect();

        let hist = Histogram1D::new(&samples, numbins(samples.len() as f64)?, bounds(&samples), true);
        output::write_histogram_table(
            &self.artifact("eloss_to_ehps.txt"),
            "# eloss/eV  probability density",
            &hist.centers(),
            &[hist.values.clone()],
            false,
        )?;

        let hist_spec = if samples_spec.is_empty() {
            output::write_zero_row(&self.artifact("eloss_to_ehps_spec.txt"), "# eloss/eV  probability density", 2)?;
            None
        } else {
            let hist_spec = Histogram1D::new(
                &samples_spec,
                numbins(samples_spec.len() as f64)?,
                bounds(&samples_spec),
                true,
            );
            output::write_histogram_table(
                &self.artifact("eloss_to_ehps_spec.txt"),
                "# eloss/eV  probability density",
                &hist_spec.centers(),
                &[hist_spec.values.clone()],
                false,
            )?;
            Some(hist_spec)
        };
        Ok((hist, samples, hist_spec, samples_spec))
    }

    /// Final azimuth against final polar angle for all scattered
    /// trajectories. The polar axis is sign-flipped in the artifact, the
    /// convention the polar plots expect.
    fn spherical_symmetry(&self) -> Result<Histogram2D> {
        let azimuth: Vec<f64> = self.trajectories.iter()
            .filter(|t| t.has_scattered())
            .map(|t| t.azi_f)
            .collect();
        let polar: Vec<f64> = self.trajectories.iter()
            .filter(|t| t.has_scattered())
            .map(|t| t.polar_f)
            .collect();
        let bins = numbins(azimuth.len() as f64)?;
        let hist = Histogram2D::new(&azimuth, &polar, (bins, bins), None);
        output::write_grid_table(
            &self.artifact("spherical_symmetry.txt"),
            "# azimuth/deg  polar angle/deg  counts",
            &hist,
            false,
            true,
        )?;
        Ok(hist)
    }

    /// Density of the distance of closest approach for scattered
    /// trajectories.
    fn closest_approach_distribution(&self) -> Result<Histogram1D> {
        let distances: Vec<f64> = self.trajectories.iter()
            .filter(|t| t.has_scattered())
            .map(|t| t.cl_appr)
            .collect();
        let hist = Histogram1D::new(&distances, numbins(distances.len() as f64)?, bounds(&distances), true);
        output::write_histogram_table(
            &self.artifact("ps_dist.txt"),
            "# closest approach/A  probability density",
            &hist.centers(),
            &[hist.values.clone()],
            false,
        )?;
        Ok(hist)
    }

    /// Joint distribution of energy loss and closest approach over scattered
    /// trajectories.
    fn loss_vs_closest_approach(&self, losses: &[f64]) -> Result<Histogram2D> {
        let distances: Vec<f64> = self.trajectories.iter()
            .filter(|t| t.has_scattered())
            .map(|t| t.cl_appr)
            .collect();
        let bins = numbins(losses.len() as f64)?;
        let hist = Histogram2D::new(losses, &distances, (bins, bins), None);
        output::write_grid_table(
            &self.artifact("eloss_psd.txt"),
            "# eloss/eV  closest approach/A  counts",
            &hist,
            false,
            false,
        )?;
        Ok(hist)
    }

    /// In-plane joint distributions against closest approach: polar angle
    /// and energy loss. Both fall back to the placeholder grid when no
    /// scattered trajectory stays in the incidence plane.
    fn in_plane_closest_approach(&self) -> Result<(Option<Histogram2D>, Option<Histogram2D>)> {
        let subset: Vec<&Trajectory> = self.trajectories.iter()
            .filter(|t| t.has_scattered() && t.in_plane)
            .collect();
        if subset.is_empty() {
            output::write_empty_grid(&self.artifact("polar_psd.txt"), "# closest approach/A  polar angle/deg  counts")?;
            output::write_empty_grid(&self.artifact("eloss_psd_in_plane.txt"), "# eloss/eV  closest approach/A  counts")?;
            return Ok((None, None));
        }
        let distances: Vec<f64> = subset.iter().map(|t| t.cl_appr).collect();
        let polar: Vec<f64> = subset.iter().map(|t| t.polar_f).collect();
        let losses: Vec<f64> = subset.iter().map(|t| t.eloss).collect();
        let bins = numbins(distances.len() as f64)?;

        let polar_hist = Histogram2D::new(&distances, &polar, (bins, bins), None);
        output::write_grid_table(
            &self.artifact("polar_psd.txt"),
            "# closest approach/A  polar angle/deg  counts",
            &polar_hist,
            false,
            false,
        )?;

        let loss_hist = Histogram2D::new(&losses, &distances, (bins, bins), None);
        output::write_grid_table(
            &self.artifact("eloss_psd_in_plane.txt"),
            "# eloss/eV  closest approach/A  counts",
            &loss_hist,
            false,
            false,
        )?;
        Ok((Some(polar_hist), Some(loss_hist)))
    }
}
