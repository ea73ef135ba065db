use std::collections::HashSet;

use ndarray::Array2;
use rand::{seq::index, Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

use crate::{
    birdwatcher::Birdwatcher,
    boid::Boid,
    error::{InvalidArgument, Result},
    math_helpers::distance_matrix,
    options::{Axis, ParamChange, Parameter, RunOptions, Scope},
};

pub mod neighbourhood;
pub mod rules;

/// `N×4` copy of the flock state, one `(x, y, vx, vy)` row per boid.
pub type Snapshot = Array2<f64>;

/// The generator every flock owns. Seeding it makes a run reproducible.
pub type FlockRng = Xoshiro256PlusPlus;

/// A population of boids together with its configuration and generator.
///
/// All mutation goes through `&mut self`, so a resize or a parameter change
/// can never overlap a step.
#[derive(Debug, Clone)]
pub struct Flock {
    boids: Vec<Boid>,
    run_options: RunOptions,
    rng: FlockRng,
}

impl Flock {
    /// Builds a flock of `run_options.n_obj` random boids. The generator is
    /// seeded from `run_options.seed`, or from the OS when that is `None`.
    pub fn new(run_options: RunOptions) -> Result<Self> {
        let rng = match run_options.seed {
            Some(seed) => FlockRng::seed_from_u64(seed),
            None => FlockRng::from_entropy(),
        };

        Flock::with_rng(run_options, rng)
    }

    pub fn with_rng(run_options: RunOptions, mut rng: FlockRng) -> Result<Self> {
        run_options.validate()?;

        let boids = initialize(
            run_options.n_obj,
            &run_options.x_scope,
            &run_options.y_scope,
            run_options.abs_v,
            &mut rng,
        );

        Ok(Flock {
            boids,
            run_options,
            rng,
        })
    }

    /// Builds a flock from explicit boids, e.g. a hand-made scenario. Every
    /// boid must lie inside the domain and have a finite velocity.
    pub fn from_boids(mut run_options: RunOptions, boids: Vec<Boid>, rng: FlockRng) -> Result<Self> {
        run_options.validate()?;

        if let Some((index, boid)) = boids
            .iter()
            .enumerate()
            .find(|(_, b)| !b.is_valid(&run_options.x_scope, &run_options.y_scope))
        {
            let [x, y, vx, vy] = boid.state();
            return Err(InvalidArgument::InvalidAgent { index, x, y, vx, vy }.into());
        }

        run_options.n_obj = boids.len();

        Ok(Flock {
            boids,
            run_options,
            rng,
        })
    }

    /// Rebuilds a flock from a snapshot, e.g. one taken earlier with
    /// [`Flock::snapshot`]. The rows go through the same checks as
    /// [`Flock::from_boids`].
    pub fn from_snapshot(
        run_options: RunOptions,
        snapshot: &Snapshot,
        rng: FlockRng,
    ) -> Result<Self> {
        if snapshot.ncols() != 4 {
            return Err(InvalidArgument::MalformedSnapshot {
                columns: snapshot.ncols(),
            }
            .into());
        }

        let boids = snapshot
            .rows()
            .into_iter()
            .map(|row| Boid::from_state([row[0], row[1], row[2], row[3]]))
            .collect();

        Flock::from_boids(run_options, boids, rng)
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn run_options(&self) -> &RunOptions {
        &self.run_options
    }

    /// Current value of a runtime parameter.
    pub fn get(&self, parameter: Parameter) -> f64 {
        self.run_options.get(parameter)
    }

    /// Copy of the current `(x, y, vx, vy)` rows.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Array2::zeros((self.boids.len(), 4));
        for (mut row, boid) in snapshot.rows_mut().into_iter().zip(self.boids.iter()) {
            for (cell, value) in row.iter_mut().zip(boid.state()) {
                *cell = value;
            }
        }
        snapshot
    }

    /// Pairwise distance matrix of the current positions.
    pub fn distances(&self) -> Array2<f64> {
        distance_matrix(&self.boids)
    }

    /// Appends `k` random boids, moving at the current `abs_v`.
    pub fn add_agents(&mut self, k: usize) {
        let new_boids = initialize(
            k,
            &self.run_options.x_scope,
            &self.run_options.y_scope,
            self.run_options.abs_v,
            &mut self.rng,
        );

        self.boids.extend(new_boids);
        self.run_options.n_obj = self.boids.len();
    }

    /// Removes `k` distinct boids chosen uniformly at random. The survivors
    /// keep their relative order.
    pub fn remove_agents(&mut self, k: usize) -> Result<()> {
        let available = self.boids.len();
        if k > available {
            return Err(InvalidArgument::RemoveExceedsPopulation {
                requested: k,
                available,
            }
            .into());
        }

        self.remove_unchecked(k);
        Ok(())
    }

    /// Grows or shrinks the flock to exactly `n` boids.
    pub fn set_population(&mut self, n: usize) {
        let current = self.boids.len();

        if n > current {
            self.add_agents(n - current);
        } else if n < current {
            self.remove_unchecked(current - n);
        }
    }

    /// Removes `k <= len()` distinct random boids, keeping survivor order.
    fn remove_unchecked(&mut self, k: usize) {
        let ids_delete: HashSet<usize> = index::sample(&mut self.rng, self.boids.len(), k)
            .into_iter()
            .collect();

        let mut row = 0;
        self.boids.retain(|_| {
            let keep = !ids_delete.contains(&row);
            row += 1;
            keep
        });
        self.run_options.n_obj = self.boids.len();
    }

    pub fn set_abs_v(&mut self, value: f64) -> Result<()> {
        self.run_options.set_scalar(Parameter::AbsV, value)
    }

    pub fn set_delta_t(&mut self, value: f64) -> Result<()> {
        self.run_options.set_scalar(Parameter::DeltaT, value)
    }

    pub fn set_alpha_alignment(&mut self, value: f64) -> Result<()> {
        self.run_options.set_scalar(Parameter::AlphaAlignment, value)
    }

    pub fn set_alpha_separation(&mut self, value: f64) -> Result<()> {
        self.run_options.set_scalar(Parameter::AlphaSeparation, value)
    }

    pub fn set_alpha_cohesion(&mut self, value: f64) -> Result<()> {
        self.run_options.set_scalar(Parameter::AlphaCohesion, value)
    }

    pub fn set_alpha_random(&mut self, value: f64) -> Result<()> {
        self.run_options.set_scalar(Parameter::AlphaRandom, value)
    }

    pub fn set_alpha_boundary_avoidance(&mut self, value: f64) -> Result<()> {
        self.run_options
            .set_scalar(Parameter::AlphaBoundaryAvoidance, value)
    }

    pub fn set_bound_threshold(&mut self, value: f64) -> Result<()> {
        self.run_options.set_scalar(Parameter::BoundThreshold, value)
    }

    pub fn set_r_vision(&mut self, value: f64) -> Result<()> {
        self.run_options.set_scalar(Parameter::RVision, value)
    }

    pub fn set_r_personal_space(&mut self, value: f64) -> Result<()> {
        self.run_options.set_scalar(Parameter::RPersonalSpace, value)
    }

    /// Replaces the x extent of the domain and folds every boid back inside it.
    pub fn set_x_scope(&mut self, min: f64, max: f64) -> Result<()> {
        let scope = Scope::new(Axis::X, min, max)?;
        self.run_options.x_scope = scope;
        self.boids
            .iter_mut()
            .for_each(|b| b.position.x = scope.wrap_fully(b.position.x));
        Ok(())
    }

    /// Replaces the y extent of the domain and folds every boid back inside it.
    pub fn set_y_scope(&mut self, min: f64, max: f64) -> Result<()> {
        let scope = Scope::new(Axis::Y, min, max)?;
        self.run_options.y_scope = scope;
        self.boids
            .iter_mut()
            .for_each(|b| b.position.y = scope.wrap_fully(b.position.y));
        Ok(())
    }

    /// Applies a single change pushed in by a controller.
    pub fn apply(&mut self, change: ParamChange) -> Result<()> {
        match change {
            ParamChange::Population(n) => {
                self.set_population(n);
                Ok(())
            }
            ParamChange::XScope(scope) => self.set_x_scope(scope.min, scope.max),
            ParamChange::YScope(scope) => self.set_y_scope(scope.min, scope.max),
            ParamChange::AbsV(v) => self.set_abs_v(v),
            ParamChange::DeltaT(v) => self.set_delta_t(v),
            ParamChange::AlphaAlignment(v) => self.set_alpha_alignment(v),
            ParamChange::AlphaSeparation(v) => self.set_alpha_separation(v),
            ParamChange::AlphaCohesion(v) => self.set_alpha_cohesion(v),
            ParamChange::AlphaRandom(v) => self.set_alpha_random(v),
            ParamChange::AlphaBoundaryAvoidance(v) => self.set_alpha_boundary_avoidance(v),
            ParamChange::BoundThreshold(v) => self.set_bound_threshold(v),
            ParamChange::RVision(v) => self.set_r_vision(v),
            ParamChange::RPersonalSpace(v) => self.set_r_personal_space(v),
        }
    }

    /// Advances the flock by one time step.
    pub fn step(&mut self) {
        let distances = distance_matrix(&self.boids);

        rules::update_velocities(&mut self.boids, &distances, &self.run_options, &mut self.rng);
        self.update_positions();
    }

    /// Runs `n_iter` steps and returns the trajectory: the initial state
    /// followed by the state after every step, `n_iter + 1` snapshots.
    pub fn run(&mut self, n_iter: u64) -> Vec<Snapshot> {
        let mut bird_watcher = Birdwatcher::new(1);
        bird_watcher.record(self);

        (0..n_iter).for_each(|_| {
            self.step();
            bird_watcher.watch(self);
        });

        bird_watcher.pop_states()
    }

    /// `position += delta_t * velocity`, followed by a single toroidal wrap.
    fn update_positions(&mut self) {
        let RunOptions {
            delta_t,
            x_scope,
            y_scope,
            ..
        } = self.run_options;

        self.boids.par_iter_mut().for_each(|boid| {
            boid.position += delta_t * boid.velocity;
            boid.position.x = x_scope.wrap(boid.position.x);
            boid.position.y = y_scope.wrap(boid.position.y);
        });
    }
}

/// Draws `n` boids uniformly over the domain, each moving at `abs_v`.
pub fn initialize<R: Rng + ?Sized>(
    n: usize,
    x_scope: &Scope,
    y_scope: &Scope,
    abs_v: f64,
    rng: &mut R,
) -> Vec<Boid> {
    (0..n)
        .map(|_| Boid::random(x_scope, y_scope, abs_v, rng))
        .collect()
}
