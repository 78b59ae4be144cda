use super::*;
use std::fmt::Write;
use std::fs;
use std::path::Path;

/// Writes a fully composed artifact with a single call.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .context(format!("Output error: could not write to {}.", path.display()))?;
    Ok(())
}

/// Writes a 1D histogram table: one row per bin, bin center first, one value
/// column per subset. Bounce-count centers are printed as integers.
pub fn write_histogram_table(path: &Path, header: &str, centers: &[f64], columns: &[Vec<f64>], integer_centers: bool) -> Result<()> {
    let mut content = String::new();
    writeln!(content, "{}", header)?;
    for (index, center) in centers.iter().enumerate() {
        if integer_centers {
            write!(content, "{}", *center as i64)?;
        } else {
            write!(content, "{:.6}", center)?;
        }
        for column in columns {
            write!(content, " {:.6}", column[index])?;
        }
        writeln!(content)?;
    }
    write_atomic(path, &content)
}

/// Writes a bounce-resolved loss decomposition: bin center, composite
/// density, then the three fraction-weighted bounce columns.
pub fn write_loss_table(path: &Path, header: &str, decomposition: &LossDecomposition) -> Result<()> {
    let mut content = String::new();
    writeln!(content, "{}", header)?;
    for (center, all, single, double, multi) in izip!(
        decomposition.hist.centers(),
        &decomposition.hist.values,
        &decomposition.single,
        &decomposition.double,
        &decomposition.multi
    ) {
        writeln!(content, "{:.6} {:.6} {:.6} {:.6} {:.6}", center, all, single, double, multi)?;
    }
    write_atomic(path, &content)
}

/// Writes a 2D count grid as `x y count` rows with a blank line between
/// successive x-blocks, the grid-row separator the plotting stage consumes.
pub fn write_grid_table(path: &Path, header: &str, hist: &Histogram2D, integer_x: bool, flip_y_sign: bool) -> Result<()> {
    let mut content = String::new();
    writeln!(content, "{}", header)?;
    for (i, x_center) in hist.x_centers().iter().enumerate() {
        for (j, y_center) in hist.y_centers().iter().enumerate() {
            let y = if flip_y_sign { -y_center } else { *y_center };
            if integer_x {
                writeln!(content, "{} {:.6} {}", *x_center as i64, y, hist.counts[i][j])?;
            } else {
                writeln!(content, "{:.6} {:.6} {}", x_center, y, hist.counts[i][j])?;
            }
        }
        writeln!(content)?;
    }
    write_atomic(path, &content)
}

/// Writes the fixed placeholder grid for a 2D analysis whose gating subset is
/// empty.
pub fn write_empty_grid(path: &Path, header: &str) -> Result<()> {
    let mut content = String::new();
    writeln!(content, "{}", header)?;
    for (index, (x, y, count)) in EMPTY_GRID_SENTINEL.iter().enumerate() {
        writeln!(content, "{:.6} {:.6} {}", x, y, count)?;
        if index == 1 {
            writeln!(content)?;
        }
    }
    write_atomic(path, &content)
}

/// Writes a single all-zero row below the header, the empty-subset stand-in
/// for 1D loss tables.
pub fn write_zero_row(path: &Path, header: &str, columns: usize) -> Result<()> {
    let row = vec!["0.000000"; columns].join(" ");
    write_atomic(path, &format!("{}\n{}\n", header, row))
}

/// Writes the human-readable run summary. Degrades to an explicit marker
/// when the specular subset is empty.
pub fn write_summary(path: &Path, options: &Options, statistics: &RunStatistics, results: &AnalysisResults) -> Result<()> {
    let scattered = statistics.scattered as f64;
    let energy_won_pct = 100.*results.energy_won as f64/scattered;
    let in_plane_pct = 100.*results.in_plane_count as f64/scattered;
    let spec_pct = 100.*results.spec_count as f64/scattered;

    let spec_mean = results.spec_eloss.as_ref().map(|d| mean(&d.samples)).unwrap_or(f64::NAN);
    let all_mean = mean(&results.eloss.samples);
    let all_peak = results.eloss.hist.peak_edge();
    let adsorbed_mean = mean(&results.adsorbed_eloss);
    let ehp_mean = mean(&results.ehp_samples);
    let ehp_spec_mean = mean(&results.ehp_samples_spec);
    let beam = results.beam_energy;

    let mut content = String::new();
    writeln!(content, "Created by RustScatter version {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(content, "Scattered:   {} ({:.6}%)", statistics.scattered, 100.*statistics.frac_scattered())?;
    writeln!(content, "Absorbed:    {} ({:.6}%)", statistics.adsorbed, 100.*statistics.frac_adsorbed())?;
    writeln!(content, "Transmitted: {} ({:.6}%)\n", statistics.transmitted, 100.*statistics.frac_transmitted())?;

    writeln!(content, "{} ({:.6}%) of the scattered projectiles won kinetic energy.", results.energy_won, energy_won_pct)?;
    writeln!(content, "{:.6}% of scattered trajectories were within +-{:.6} degrees in plane.", in_plane_pct, options.specular_radius)?;
    writeln!(content, "{:.6}% of scattered trajectories were within +-{:.6} degrees to specular scattering angle.\n", spec_pct, options.specular_radius)?;

    writeln!(content, "Average energy loss of projectiles in specular scattering angle {:.6} eV.", spec_mean)?;
    match &results.spec_eloss {
        Some(decomposition) => writeln!(content,
            "Peak energy loss of projectiles in specular scattering angle    {:.6} eV.\n",
            decomposition.hist.peak_edge())?,
        None => writeln!(content,
            "Peak energy loss of projectiles in specular scattering angle    {} eV.\n",
            "No atoms in specular scattering angle")?,
    }
    writeln!(content, "Average energy loss of projectiles reflected {:.6} eV.", all_mean)?;
    writeln!(content, "Peak energy loss of projectiles reflected    {:.6} eV.\n", all_peak)?;
    writeln!(content, "Average energy loss of projectiles in bulk   {:.6} eV.", adsorbed_mean)?;
    writeln!(content, "Average energy loss of reflected projectiles to ehps {:.6} eV.", ehp_mean)?;
    writeln!(content, "Average energy loss of specularly reflected projectiles to ehps {:.6} eV.\n", ehp_spec_mean)?;

    writeln!(content, "%refl  %in bulk  %shot_thru  %E_won  %in_spec  avg_E_in_spec  peak_E_in_spec  avg_E_in_bulk  avg_E_refl  peak_E_refl  avg_ehp_loss  avg_ehp_loss_spec  Trajs")?;
    match &results.spec_eloss {
        Some(decomposition) => writeln!(content,
            "{:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {}",
            100.*statistics.frac_scattered(), 100.*statistics.frac_adsorbed(), 100.*statistics.frac_transmitted(),
            energy_won_pct, spec_pct,
            beam - spec_mean, beam - decomposition.hist.peak_edge(),
            beam - adsorbed_mean, beam - all_mean, beam - all_peak,
            ehp_mean, ehp_spec_mean, statistics.retained)?,
        None => writeln!(content,
            "{:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {}",
            100.*statistics.frac_scattered(), 100.*statistics.frac_adsorbed(), 100.*statistics.frac_transmitted(),
            energy_won_pct, spec_pct,
            beam - spec_mean,
            beam - adsorbed_mean, beam - all_mean, beam - all_peak,
            ehp_mean, ehp_spec_mean, statistics.retained)?,
    }

    write_atomic(path, &content)
}
