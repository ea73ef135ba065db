use glam::DVec2;
use ndarray::{Array2, ArrayView2};
use rand::Rng;
use rayon::prelude::*;

use crate::boid::Boid;

/// `+1.` or `-1.` with equal probability.
#[inline]
pub fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen::<bool>() {
        1.
    } else {
        -1.
    }
}

#[inline]
pub fn simple_distance(p1: DVec2, p2: DVec2) -> f64 {
    simple_distance_sq(p1, p2).sqrt()
}

#[inline]
pub fn simple_distance_sq(p1: DVec2, p2: DVec2) -> f64 {
    (p1.x - p2.x).powi(2) + (p1.y - p2.y).powi(2)
}

/// Dense `N×N` matrix of Euclidean distances between boid positions.
///
/// Only the upper triangle is computed, rows in parallel, and then mirrored,
/// so the result is exactly symmetric with a zero diagonal.
pub fn distance_matrix(boids: &[Boid]) -> Array2<f64> {
    let n = boids.len();

    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            boids[i + 1..]
                .iter()
                .map(|other| simple_distance(boids[i].position, other.position))
                .collect()
        })
        .collect();

    let mut distances = Array2::zeros((n, n));
    for (i, row) in upper.iter().enumerate() {
        for (offset, d) in row.iter().enumerate() {
            let j = i + 1 + offset;
            distances[[i, j]] = *d;
            distances[[j, i]] = *d;
        }
    }

    distances
}

/// Flock order parameter: length of the mean unit velocity, 1 for a
/// perfectly aligned flock and close to 0 for random headings. Rows with a
/// zero velocity are ignored. An empty snapshot yields 0.
pub fn polarisation(snapshot: ArrayView2<f64>) -> f64 {
    let (sum, count) = snapshot
        .rows()
        .into_iter()
        .map(|row| DVec2::new(row[2], row[3]))
        .filter(|v| v.length() > 0.)
        .fold((DVec2::ZERO, 0_usize), |(sum, count), v| {
            (sum + v / v.length(), count + 1)
        });

    if count == 0 {
        0.
    } else {
        (sum / count as f64).length()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    use super::*;

    macro_rules! assert_eqf64 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-3_f64)
        };
    }

    fn boid_at(x: f64, y: f64) -> Boid {
        Boid::new(x, y, DVec2::new(1., 0.))
    }

    #[test]
    fn distances_of_a_right_triangle() {
        let boids = vec![boid_at(0., 0.), boid_at(3., 0.), boid_at(0., 4.)];
        let d = distance_matrix(&boids);

        assert_eq!(d.dim(), (3, 3));
        assert_eqf64!(d[[0, 1]], 3.);
        assert_eqf64!(d[[0, 2]], 4.);
        assert_eqf64!(d[[1, 2]], 5.);
        assert_eqf64!(d[[2, 1]], 5.);
    }

    #[test]
    fn distances_ignore_velocity() {
        let mut a = boid_at(1., 1.);
        let b = boid_at(2., 2.);
        let before = distance_matrix(&[a, b]);
        a.velocity = DVec2::new(-40., 13.);

        assert_eq!(distance_matrix(&[a, b]), before);
    }

    #[test]
    fn random_matrix_is_symmetric_with_zero_diagonal() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let boids: Vec<Boid> = (0..64)
            .map(|_| boid_at(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)))
            .collect();

        let d = distance_matrix(&boids);

        for i in 0..boids.len() {
            assert_eq!(d[[i, i]], 0.);
            for j in 0..boids.len() {
                assert_eq!(d[[i, j]], d[[j, i]]);
            }
        }
    }

    #[test]
    fn degenerate_populations() {
        assert_eq!(distance_matrix(&[]).dim(), (0, 0));
        assert_eq!(distance_matrix(&[boid_at(4., 4.)]), array![[0.]]);
    }

    #[test]
    fn polarisation_of_aligned_and_opposed_flocks() {
        let aligned = array![[0., 0., 2., 0.], [5., 5., 7., 0.]];
        let opposed = array![[0., 0., 1., 1.], [5., 5., -1., -1.]];

        assert_eqf64!(polarisation(aligned.view()), 1.);
        assert_eqf64!(polarisation(opposed.view()), 0.);
        assert_eq!(polarisation(Array2::<f64>::zeros((0, 4)).view()), 0.);
    }
}
