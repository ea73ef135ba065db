use birdwatcher::{Birdwatcher, Frame};
use error::Result;
use flock::Flock;
use options::RunOptions;

pub mod boid;
pub mod error;
pub mod flock;

pub mod birdwatcher;
pub mod math_helpers;
pub mod options;

/// Builds a flock from `run_options` and runs it for `no_iter` steps,
/// returning the initial frame and every `sample_rate`-th frame after it.
pub fn flock_base(no_iter: u64, run_options: RunOptions, sample_rate: u64) -> Result<Vec<Frame>> {
    let mut flock = Flock::new(run_options)?;
    let mut bird_watcher = Birdwatcher::new(sample_rate);

    bird_watcher.record(&flock);
    (0..no_iter).for_each(|_| {
        flock.step();
        bird_watcher.watch(&flock);
    });

    Ok(bird_watcher.pop_data())
}
