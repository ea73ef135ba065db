//! The velocity update rule. Stages run in a fixed order, each one reading
//! the velocity left behind by the previous stage:
//!
//! 1. alignment + cohesion, for boids with neighbours within `r_vision`
//! 2. separation, for boids with neighbours within `r_personal_space`
//! 3. boundary avoidance, for boids closer than `bound_threshold` to an edge
//! 4. random jitter, for every boid
//! 5. speed renormalisation to `abs_v`, for every boid
//!
//! Stages 1-3 are pure per-boid arithmetic and run in parallel. Stages 4 and 5
//! draw from the flock's generator and run sequentially in row order, which
//! keeps a seeded run reproducible.

use std::f64::consts::TAU;

use glam::DVec2;
use ndarray::Array2;
use rand::Rng;
use rayon::prelude::*;

use super::neighbourhood::Neighbourhood;
use crate::{boid::Boid, math_helpers::random_sign, options::RunOptions};

/// Runs all five stages over the flock, in place.
pub fn update_velocities<R: Rng + ?Sized>(
    boids: &mut [Boid],
    distances: &Array2<f64>,
    run_options: &RunOptions,
    rng: &mut R,
) {
    let vision = Neighbourhood::within(boids, distances, run_options.r_vision);
    align_and_cohere(boids, &vision, run_options);

    let personal = Neighbourhood::within(boids, distances, run_options.r_personal_space);
    separate(boids, &personal, run_options);

    avoid_boundaries(boids, run_options);
    jitter(boids, run_options, rng);
    renormalise(boids, run_options, rng);
}

/// Replaces the velocity of every boid that can see a neighbour with the sum
/// of its alignment and cohesion terms. Boids without neighbours keep their
/// velocity, so a neighbour count of zero is never divided by.
pub fn align_and_cohere(boids: &mut [Boid], vision: &Neighbourhood, run_options: &RunOptions) {
    let a_al = run_options.alpha_alignment;
    let a_co = run_options.alpha_cohesion;

    boids.par_iter_mut().enumerate().for_each(|(i, boid)| {
        if !vision.has_neighbour[i] {
            return;
        }
        let count = vision.count[i] as f64;

        let alignment = boid.velocity * (1. - a_al) + (a_al / count) * vision.velocity_sum(i);
        let cohesion = -a_co * boid.position + (a_co / count) * vision.position_sum(i);

        boid.velocity = alignment + cohesion;
    });
}

/// Pushes boids away from the centroid of the neighbours inside their
/// personal space, scaled by how many there are. Added on top of the
/// current velocity.
pub fn separate(boids: &mut [Boid], personal: &Neighbourhood, run_options: &RunOptions) {
    let a_se = run_options.alpha_separation;

    boids.par_iter_mut().enumerate().for_each(|(i, boid)| {
        if !personal.has_neighbour[i] {
            return;
        }
        let count = personal.count[i] as f64;

        boid.velocity += a_se * count * boid.position - a_se * personal.position_sum(i);
    });
}

pub fn avoid_boundaries(boids: &mut [Boid], run_options: &RunOptions) {
    boids.par_iter_mut().for_each(|boid| {
        boid.velocity += boundary_correction(boid.position, run_options);
    });
}

/// Correction away from the nearest domain edge, zero when that edge is at
/// least `bound_threshold` away.
///
/// Edges are checked in the order `x_min, x_max, y_min, y_max`, the first one
/// wins a tie. The strength is `alpha_boundary_avoidance / distance` along the
/// edge's axis, with the distance floored at `f64::EPSILON` so a boid sitting
/// exactly on an edge gets a large but finite push.
pub fn boundary_correction(position: DVec2, run_options: &RunOptions) -> DVec2 {
    let x_scope = &run_options.x_scope;
    let y_scope = &run_options.y_scope;

    let edges = [
        ((position.x - x_scope.min).abs(), DVec2::new(1., 0.)),
        ((position.x - x_scope.max).abs(), DVec2::new(-1., 0.)),
        ((position.y - y_scope.min).abs(), DVec2::new(0., 1.)),
        ((position.y - y_scope.max).abs(), DVec2::new(0., -1.)),
    ];

    let (min_distance, direction) = edges
        .iter()
        .skip(1)
        .fold(edges[0], |nearest, edge| if edge.0 < nearest.0 { *edge } else { nearest });

    if min_distance < run_options.bound_threshold {
        direction * (run_options.alpha_boundary_avoidance / min_distance.max(f64::EPSILON))
    } else {
        DVec2::ZERO
    }
}

/// Adds `alpha_random * r` to every velocity, where each component of `r` is
/// a random sign times a magnitude uniform in `[0, 1)`.
pub fn jitter<R: Rng + ?Sized>(boids: &mut [Boid], run_options: &RunOptions, rng: &mut R) {
    for boid in boids.iter_mut() {
        let rx = random_sign(rng) * rng.gen::<f64>();
        let ry = random_sign(rng) * rng.gen::<f64>();

        boid.velocity += run_options.alpha_random * DVec2::new(rx, ry);
    }
}

/// Rescales every velocity to length `abs_v`.
///
/// A zero velocity has no direction to keep, as does one whose length
/// overflowed. Those boids get a uniformly random heading instead of NaN.
pub fn renormalise<R: Rng + ?Sized>(boids: &mut [Boid], run_options: &RunOptions, rng: &mut R) {
    for boid in boids.iter_mut() {
        let length = boid.velocity.length();

        boid.velocity = if length > 0. && length.is_finite() {
            boid.velocity * (run_options.abs_v / length)
        } else {
            let angle = rng.gen::<f64>() * TAU;
            DVec2::new(angle.cos(), angle.sin()) * run_options.abs_v
        };
    }
}
