// https://docs.rs/clap-serde/latest/clap_serde/#
use clap_serde_derive::{
    clap::{self, Parser},
    serde::Serialize,
    ClapSerde,
};
use flocking_lib::options::{RunOptions, Scope};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Headless runner for the collective motion (boids) engine.
pub struct Args {
    /// Config file, YAML or TOML (by extension)
    #[arg(short, long = "config", default_value = "config.yaml")]
    pub config_path: std::path::PathBuf,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Serialize)]
/// Programatic configuration
///
/// Uses defaults, which can be overwritten by specifying a filepath for the `-c` or `--config` arg option
pub struct Config {
    #[default(200)]
    #[arg(short = 'i', long)]
    /// number of steps to simulate
    pub no_iter: u64,

    #[default(10)]
    #[arg(short = 'r', long)]
    /// record every n-th step
    pub sample_rate: u64,

    #[default(10)]
    #[arg(short = 'n', long)]
    /// number of boids
    pub n_obj: usize,

    #[default(0.)]
    #[arg(long)]
    pub x_min: f64,
    #[default(50.)]
    #[arg(long)]
    pub x_max: f64,
    #[default(0.)]
    #[arg(long)]
    pub y_min: f64,
    #[default(50.)]
    #[arg(long)]
    pub y_max: f64,

    #[default(10.)]
    #[arg(long = "speed")]
    pub abs_v: f64,
    #[default(0.1)]
    #[arg(long = "dt")]
    pub delta_t: f64,

    #[default(0.5)]
    #[arg(long = "ali_coef")]
    pub alpha_alignment: f64,
    #[default(1.)]
    #[arg(long = "sep_coef")]
    pub alpha_separation: f64,
    #[default(1.)]
    #[arg(long = "coh_coef")]
    pub alpha_cohesion: f64,
    #[default(1.)]
    #[arg(long = "rand_coef")]
    pub alpha_random: f64,
    #[default(20.)]
    #[arg(long = "bound_coef")]
    pub alpha_boundary_avoidance: f64,

    #[default(13.)]
    #[arg(long = "bound_trs")]
    pub bound_threshold: f64,
    #[default(3.)]
    #[arg(long = "vision")]
    pub r_vision: f64,
    #[default(1.)]
    #[arg(long = "personal_space")]
    pub r_personal_space: f64,

    #[default(2023)]
    #[arg(short = 's', long)]
    pub seed: u64,
    #[default(false)]
    #[arg(long)]
    /// seed from the OS instead of `seed`
    pub entropy: bool,
}

impl Config {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            n_obj: self.n_obj,
            x_scope: Scope {
                min: self.x_min,
                max: self.x_max,
            },
            y_scope: Scope {
                min: self.y_min,
                max: self.y_max,
            },
            abs_v: self.abs_v,
            delta_t: self.delta_t,
            alpha_alignment: self.alpha_alignment,
            alpha_separation: self.alpha_separation,
            alpha_cohesion: self.alpha_cohesion,
            alpha_random: self.alpha_random,
            alpha_boundary_avoidance: self.alpha_boundary_avoidance,
            bound_threshold: self.bound_threshold,
            r_vision: self.r_vision,
            r_personal_space: self.r_personal_space,
            seed: (!self.entropy).then_some(self.seed),
        }
    }
}
