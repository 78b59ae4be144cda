#![allow(non_snake_case)]

use std::env;
use std::fs;
use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;

use libRustScatter::*;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = match args.len() {
        1 => Options::default(),
        2 => Options::from_file(&args[1])?,
        _ => bail!("Usage: RustScatter [options.toml]"),
    };

    init_logging(&options)?;
    info!("RustScatter version {}", env!("CARGO_PKG_VERSION"));

    fs::create_dir_all(&options.output_directory)
        .context(format!("Output error: could not create directory {}.", &options.output_directory))?;

    let (trajectories, statistics) = read_trajectories(&options)?;
    info!(
        "Retained {} of {} trajectories ({} rejected): {} scattered, {} adsorbed, {} transmitted",
        statistics.retained, statistics.total_rows, statistics.rejected,
        statistics.scattered, statistics.adsorbed, statistics.transmitted
    );

    let pipeline = AnalysisPipeline::new(&trajectories, &statistics, &options);
    let results = pipeline.run()?;

    let summary_path = Path::new(&options.output_directory).join("Summary.txt");
    write_summary(&summary_path, &options, &statistics, &results)?;
    info!("Analysis artifacts written to {}", options.output_directory);

    Ok(())
}

/// Initializes logging; when a log file is configured all screen output is
/// piped there instead of stderr.
fn init_logging(options: &Options) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = &options.log_file {
        let log_file = File::create(path)
            .context(format!("Output error: could not create log file {}.", path))?;
        println!("Screen output will be automatically written to {}!", path);
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    builder.init();
    Ok(())
}
