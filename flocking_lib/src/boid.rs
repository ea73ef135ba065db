use std::f64::consts::PI;

use glam::DVec2;
use rand::Rng;

use crate::{math_helpers::random_sign, options::Scope};

/// A point agent. Agents have no identity beyond their row in the flock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    pub position: DVec2,
    pub velocity: DVec2,
}

impl Boid {
    /// Creates a new [`Boid`].
    pub fn new(x: f64, y: f64, velocity: DVec2) -> Self {
        Boid {
            position: DVec2::new(x, y),
            velocity,
        }
    }

    /// Draws a boid uniformly inside the domain, moving at exactly `abs_v`.
    ///
    /// `vx` gets a random sign and a magnitude uniform in `[0, abs_v)`, `vy`
    /// takes whatever is left so that `vx² + vy² = abs_v²`, with its own sign.
    pub fn random<R: Rng + ?Sized>(x_scope: &Scope, y_scope: &Scope, abs_v: f64, rng: &mut R) -> Self {
        let x = rng.gen::<f64>() * x_scope.width() + x_scope.min;
        let y = rng.gen::<f64>() * y_scope.width() + y_scope.min;

        let vx = random_sign(rng) * rng.gen::<f64>() * abs_v;
        // rounding can push vx² a hair above abs_v²
        let vy = random_sign(rng) * (abs_v.powi(2) - vx.powi(2)).max(0.).sqrt();

        Boid::new(x, y, DVec2::new(vx, vy))
    }

    /// Rebuilds a boid from an `(x, y, vx, vy)` row.
    pub fn from_state(state: [f64; 4]) -> Self {
        Boid::new(state[0], state[1], DVec2::new(state[2], state[3]))
    }

    /// The `(x, y, vx, vy)` state vector.
    #[inline]
    pub fn state(&self) -> [f64; 4] {
        [
            self.position.x,
            self.position.y,
            self.velocity.x,
            self.velocity.y,
        ]
    }

    /// Heading angle in radians, `atan2(vy, vx)`, in `(-π, π]`.
    pub fn heading(&self) -> f64 {
        self.velocity.y.atan2(self.velocity.x)
    }

    /// Heading mapped onto `[0, 1]`, ready for a cyclic colour map.
    pub fn hue(&self) -> f64 {
        self.heading() / PI / 2. + 0.5
    }

    pub(crate) fn is_valid(&self, x_scope: &Scope, y_scope: &Scope) -> bool {
        self.velocity.is_finite()
            && x_scope.contains(self.position.x)
            && y_scope.contains(self.position.y)
    }
}
