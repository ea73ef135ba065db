use std::mem;

use crate::flock::{Flock, Snapshot};

/// One recorded state of the flock.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// number of steps taken when the frame was recorded
    pub time: u64,
    pub state: Snapshot,
}

/// Accumulates flock snapshots into a trajectory log, keeping every
/// `sample_rate`-th step.
pub struct Birdwatcher {
    frames: Vec<Frame>,
    step_ticker: u64,
    sample_rate: u64,
}

impl Birdwatcher {
    /// A sample rate of 0 is treated as 1.
    pub fn new(sample_rate: u64) -> Self {
        Birdwatcher {
            frames: Vec::new(),
            step_ticker: 0,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Records the flock unconditionally, without advancing the step counter.
    pub fn record(&mut self, flock: &Flock) {
        self.frames.push(Frame {
            time: self.step_ticker,
            state: flock.snapshot(),
        });
    }

    /// Called once after every step, records the flock when the step is due.
    pub fn watch(&mut self, flock: &Flock) {
        if self.should_sample() {
            self.record(flock);
        }
    }

    pub fn restart(&mut self) {
        self.frames.clear();
        self.step_ticker = 0;
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the recorded frames, emptying the birdwatcher's memory.
    pub fn pop_data(&mut self) -> Vec<Frame> {
        mem::take(&mut self.frames)
    }

    /// Like [`Birdwatcher::pop_data`], keeping only the states.
    pub fn pop_states(&mut self) -> Vec<Snapshot> {
        self.pop_data().into_iter().map(|f| f.state).collect()
    }

    fn should_sample(&mut self) -> bool {
        self.step_ticker += 1;

        self.step_ticker % self.sample_rate == 0
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Birdwatcher;
    use crate::{flock::Flock, options::RunOptions};

    fn flock() -> Flock {
        Flock::new(RunOptions {
            n_obj: 4,
            seed: Some(17),
            ..Default::default()
        })
        .unwrap()
    }

    #[rstest]
    #[case(1, 10, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10])]
    #[case(4, 10, vec![0, 4, 8])]
    #[case(0, 3, vec![0, 1, 2, 3])]
    #[case(5, 4, vec![0])]
    fn samples_every_nth_step(#[case] rate: u64, #[case] steps: u64, #[case] expected: Vec<u64>) {
        let mut flock = flock();
        let mut bird_watcher = Birdwatcher::new(rate);

        bird_watcher.record(&flock);
        for _ in 0..steps {
            flock.step();
            bird_watcher.watch(&flock);
        }

        let times: Vec<u64> = bird_watcher.pop_data().iter().map(|f| f.time).collect();
        assert_eq!(times, expected);
        assert!(bird_watcher.is_empty());
    }

    #[test]
    fn restart_forgets_everything() {
        let flock = flock();
        let mut bird_watcher = Birdwatcher::new(2);

        bird_watcher.record(&flock);
        bird_watcher.watch(&flock);
        bird_watcher.watch(&flock);
        assert_eq!(bird_watcher.len(), 2);

        bird_watcher.restart();
        bird_watcher.record(&flock);
        assert_eq!(bird_watcher.pop_data()[0].time, 0);
    }
}
