use glam::DVec2;
use ndarray::Array2;
use rayon::prelude::*;

use crate::boid::Boid;

/// Per-boid neighbour statistics at a single radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbourhood {
    pub has_neighbour: Vec<bool>,
    pub count: Vec<usize>,
    /// elementwise `(x, y, vx, vy)` sum over qualifying neighbours, `N×4`
    pub state_sum: Array2<f64>,
}

impl Neighbourhood {
    /// Aggregates, for every boid `i`, the boids `j != i` with
    /// `distances[[i, j]] < radius`. A boid never counts itself, even at
    /// distance zero or with an infinite radius.
    pub fn within(boids: &[Boid], distances: &Array2<f64>, radius: f64) -> Self {
        let n = boids.len();
        debug_assert_eq!(distances.dim(), (n, n));

        let rows: Vec<(usize, [f64; 4])> = (0..n)
            .into_par_iter()
            .map(|i| {
                let mut count = 0;
                let mut sum = [0.; 4];

                for (j, other) in boids.iter().enumerate() {
                    if j == i || distances[[i, j]] >= radius {
                        continue;
                    }
                    count += 1;
                    for (acc, value) in sum.iter_mut().zip(other.state()) {
                        *acc += value;
                    }
                }

                (count, sum)
            })
            .collect();

        let mut state_sum = Array2::zeros((n, 4));
        for (i, (_, sum)) in rows.iter().enumerate() {
            for (k, value) in sum.iter().enumerate() {
                state_sum[[i, k]] = *value;
            }
        }
        let count: Vec<usize> = rows.iter().map(|(count, _)| *count).collect();

        Neighbourhood {
            has_neighbour: count.iter().map(|c| *c > 0).collect(),
            count,
            state_sum,
        }
    }

    pub fn len(&self) -> usize {
        self.count.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count.is_empty()
    }

    #[inline]
    pub fn position_sum(&self, i: usize) -> DVec2 {
        DVec2::new(self.state_sum[[i, 0]], self.state_sum[[i, 1]])
    }

    #[inline]
    pub fn velocity_sum(&self, i: usize) -> DVec2 {
        DVec2::new(self.state_sum[[i, 2]], self.state_sum[[i, 3]])
    }
}
