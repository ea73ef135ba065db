use std::{
    fs::{self, File},
    io::BufReader,
    path::Path,
    time::Instant,
};

use anyhow::{Context, Result};
use clap_serde_derive::{clap::Parser, ClapSerde};
use flocking_lib::{birdwatcher::Frame, flock_base, math_helpers::polarisation};
use itertools::Itertools;
use tracing::{debug, info};

mod cliargs;
use cliargs::{Args, Config};

fn main() -> Result<()> {
    init_tracing();

    let mut args = Args::parse();
    let config = load_config(&mut args)?;

    let run_options = config.run_options();
    run_options.validate()?;
    info!(
        n_obj = run_options.n_obj,
        no_iter = config.no_iter,
        sample_rate = config.sample_rate,
        seed = ?run_options.seed,
        "starting flock"
    );
    debug!(?run_options);

    let started = Instant::now();
    let frames = flock_base(config.no_iter, run_options, config.sample_rate)?;
    info!(
        frames = frames.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "run finished"
    );

    println!("time\tn\tpolarisation\tmean_speed");
    for frame in &frames {
        println!("{}", summary_line(frame));
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Merges the config file, when there is one, with the command line. Command
/// line values win.
fn load_config(args: &mut Args) -> Result<Config> {
    let path = args.config_path.clone();

    if !path.exists() {
        debug!(path = %path.display(), "no config file, using command line only");
        return Ok(Config::from(&mut args.config));
    }

    let file_config = read_config_file(&path)
        .with_context(|| format!("Error in configuration file {}", path.display()))?;
    info!(path = %path.display(), "loaded config file");

    Ok(Config::from(file_config).merge(&mut args.config))
}

fn read_config_file(path: &Path) -> Result<<Config as ClapSerde>::Opt> {
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    if is_toml {
        Ok(toml::from_str(&fs::read_to_string(path)?)?)
    } else {
        Ok(serde_yaml::from_reader(BufReader::new(File::open(path)?))?)
    }
}

fn summary_line(frame: &Frame) -> String {
    let n = frame.state.nrows();
    let mean_speed = if n == 0 {
        0.
    } else {
        frame
            .state
            .rows()
            .into_iter()
            .map(|row| row[2].hypot(row[3]))
            .sum::<f64>()
            / n as f64
    };

    [
        frame.time.to_string(),
        n.to_string(),
        format!("{:.4}", polarisation(frame.state.view())),
        format!("{:.4}", mean_speed),
    ]
    .iter()
    .join("\t")
}
