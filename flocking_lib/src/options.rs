use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FlockError, InvalidArgument, Result};

/// Configuration of a flock: domain, time step, target speed and the
/// behaviour weights/thresholds shared by all agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub n_obj: usize,
    pub x_scope: Scope,
    pub y_scope: Scope,
    pub abs_v: f64,
    pub delta_t: f64,

    pub alpha_alignment: f64,
    pub alpha_separation: f64,
    pub alpha_cohesion: f64,
    pub alpha_random: f64,
    pub alpha_boundary_avoidance: f64,

    pub bound_threshold: f64,
    pub r_vision: f64,
    pub r_personal_space: f64,

    /// seed for the flock's generator, `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            n_obj: 1,
            x_scope: Scope { min: 0., max: 50. },
            y_scope: Scope { min: 0., max: 50. },
            abs_v: 10.,
            delta_t: 0.1,
            alpha_alignment: 0.5,
            alpha_separation: 1.,
            alpha_cohesion: 1.,
            alpha_random: 1.,
            alpha_boundary_avoidance: 20.,
            bound_threshold: 13.,
            r_vision: 3.,
            r_personal_space: 1.,
            seed: None,
        }
    }
}

impl RunOptions {
    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<()> {
        self.x_scope.validate(Axis::X)?;
        self.y_scope.validate(Axis::Y)?;

        for parameter in Parameter::ALL.iter().filter(|p| **p != Parameter::NObj) {
            check_non_negative(*parameter, self.get(*parameter))?;
        }

        Ok(())
    }

    /// Current value of a scalar parameter, counts converted to `f64`.
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::NObj => self.n_obj as f64,
            Parameter::AbsV => self.abs_v,
            Parameter::DeltaT => self.delta_t,
            Parameter::AlphaAlignment => self.alpha_alignment,
            Parameter::AlphaSeparation => self.alpha_separation,
            Parameter::AlphaCohesion => self.alpha_cohesion,
            Parameter::AlphaRandom => self.alpha_random,
            Parameter::AlphaBoundaryAvoidance => self.alpha_boundary_avoidance,
            Parameter::BoundThreshold => self.bound_threshold,
            Parameter::RVision => self.r_vision,
            Parameter::RPersonalSpace => self.r_personal_space,
        }
    }

    /// Validates and stores a real-valued parameter. Population size is not a
    /// scalar here, it goes through the flock's resize operations.
    pub(crate) fn set_scalar(&mut self, parameter: Parameter, value: f64) -> Result<()> {
        check_non_negative(parameter, value)?;

        let slot = match parameter {
            Parameter::NObj => {
                return Err(InvalidArgument::NotACount { parameter, value }.into())
            }
            Parameter::AbsV => &mut self.abs_v,
            Parameter::DeltaT => &mut self.delta_t,
            Parameter::AlphaAlignment => &mut self.alpha_alignment,
            Parameter::AlphaSeparation => &mut self.alpha_separation,
            Parameter::AlphaCohesion => &mut self.alpha_cohesion,
            Parameter::AlphaRandom => &mut self.alpha_random,
            Parameter::AlphaBoundaryAvoidance => &mut self.alpha_boundary_avoidance,
            Parameter::BoundThreshold => &mut self.bound_threshold,
            Parameter::RVision => &mut self.r_vision,
            Parameter::RPersonalSpace => &mut self.r_personal_space,
        };
        *slot = value;

        Ok(())
    }
}

fn check_non_negative(parameter: Parameter, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0. {
        Ok(())
    } else {
        Err(FlockError::out_of_range(parameter, value))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Closed interval `[min, max]` spanned by the domain along one axis.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Scope {
    pub min: f64,
    pub max: f64,
}

impl Scope {
    pub fn new(axis: Axis, min: f64, max: f64) -> Result<Self> {
        let scope = Scope { min, max };
        scope.validate(axis)?;
        Ok(scope)
    }

    pub fn validate(&self, axis: Axis) -> Result<()> {
        if self.min.is_finite() && self.max.is_finite() && self.min < self.max {
            Ok(())
        } else {
            Err(InvalidArgument::MalformedScope {
                axis,
                min: self.min,
                max: self.max,
            }
            .into())
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Single toroidal wrap: an overshoot past one edge re-enters from the
    /// opposite edge by the same amount. Values more than one width outside
    /// are not folded back any further.
    #[inline]
    pub fn wrap(&self, value: f64) -> f64 {
        if value < self.min {
            self.max - (self.min - value)
        } else if value > self.max {
            self.min + (value - self.max)
        } else {
            value
        }
    }

    /// Folds any finite value into the scope, however far outside it lies.
    pub fn wrap_fully(&self, value: f64) -> f64 {
        if self.contains(value) {
            value
        } else {
            self.min + (value - self.min).rem_euclid(self.width())
        }
    }
}

/// Identifiers of the scalar parameters that can be changed at runtime.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Parameter {
    NObj,
    AbsV,
    DeltaT,
    AlphaAlignment,
    AlphaSeparation,
    AlphaCohesion,
    AlphaRandom,
    AlphaBoundaryAvoidance,
    BoundThreshold,
    RVision,
    RPersonalSpace,
}

impl Parameter {
    pub const ALL: [Parameter; 11] = [
        Parameter::NObj,
        Parameter::AbsV,
        Parameter::DeltaT,
        Parameter::AlphaAlignment,
        Parameter::AlphaSeparation,
        Parameter::AlphaCohesion,
        Parameter::AlphaRandom,
        Parameter::AlphaBoundaryAvoidance,
        Parameter::BoundThreshold,
        Parameter::RVision,
        Parameter::RPersonalSpace,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Parameter::NObj => "n_obj",
            Parameter::AbsV => "abs_v",
            Parameter::DeltaT => "delta_t",
            Parameter::AlphaAlignment => "alpha_alignment",
            Parameter::AlphaSeparation => "alpha_separation",
            Parameter::AlphaCohesion => "alpha_cohesion",
            Parameter::AlphaRandom => "alpha_random",
            Parameter::AlphaBoundaryAvoidance => "alpha_boundary_avoidance",
            Parameter::BoundThreshold => "bound_threshold",
            Parameter::RVision => "r_vision",
            Parameter::RPersonalSpace => "r_personal_space",
        }
    }

    /// Human readable label for control panels.
    pub fn label(&self) -> &'static str {
        match self {
            Parameter::NObj => "# Objects",
            Parameter::AbsV => "Speed",
            Parameter::DeltaT => "Time Step",
            Parameter::AlphaAlignment => "Alignment",
            Parameter::AlphaSeparation => "Separation",
            Parameter::AlphaCohesion => "Cohesion",
            Parameter::AlphaRandom => "Randomness",
            Parameter::AlphaBoundaryAvoidance => "Boundary Avoidance",
            Parameter::BoundThreshold => "Boundary Threshold",
            Parameter::RVision => "Vision",
            Parameter::RPersonalSpace => "Private Space",
        }
    }

    /// Range offered by an interactive slider, `None` for parameters that
    /// are only set through configuration. This is a UI hint, the engine
    /// validates against the wider `>= 0` domain.
    pub fn slider_range(&self) -> Option<(f64, f64)> {
        match self {
            Parameter::NObj => Some((1., 2000.)),
            Parameter::AlphaAlignment => Some((0., 1.)),
            Parameter::AlphaSeparation => Some((0., 5.)),
            Parameter::AlphaCohesion => Some((0., 5.)),
            Parameter::AlphaRandom => Some((0., 5.)),
            Parameter::AlphaBoundaryAvoidance => Some((0., 50.)),
            Parameter::BoundThreshold => Some((0., 50.)),
            Parameter::RVision => Some((0., 10.)),
            Parameter::RPersonalSpace => Some((0., 5.)),
            Parameter::AbsV | Parameter::DeltaT => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single runtime change pushed into the flock by a controller.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ParamChange {
    Population(usize),
    AbsV(f64),
    DeltaT(f64),
    AlphaAlignment(f64),
    AlphaSeparation(f64),
    AlphaCohesion(f64),
    AlphaRandom(f64),
    AlphaBoundaryAvoidance(f64),
    BoundThreshold(f64),
    RVision(f64),
    RPersonalSpace(f64),
    XScope(Scope),
    YScope(Scope),
}

/// Largest population a raw control value may ask for. The distance matrix
/// is `N×N`, so anything near this is already far past interactive sizes.
pub const MAX_RAW_POPULATION: usize = 1 << 20;

impl ParamChange {
    /// Builds a change from a raw control value, e.g. a slider position.
    ///
    /// Population counts must be whole, non-negative and at most
    /// [`MAX_RAW_POPULATION`]. Real-valued parameters are range-checked when
    /// the change is applied.
    pub fn from_raw(parameter: Parameter, value: f64) -> Result<Self> {
        Ok(match parameter {
            Parameter::NObj => {
                check_non_negative(parameter, value)?;
                if value.fract() != 0. {
                    return Err(InvalidArgument::NotACount { parameter, value }.into());
                }
                if value > MAX_RAW_POPULATION as f64 {
                    return Err(FlockError::out_of_range(parameter, value));
                }
                ParamChange::Population(value as usize)
            }
            Parameter::AbsV => ParamChange::AbsV(value),
            Parameter::DeltaT => ParamChange::DeltaT(value),
            Parameter::AlphaAlignment => ParamChange::AlphaAlignment(value),
            Parameter::AlphaSeparation => ParamChange::AlphaSeparation(value),
            Parameter::AlphaCohesion => ParamChange::AlphaCohesion(value),
            Parameter::AlphaRandom => ParamChange::AlphaRandom(value),
            Parameter::AlphaBoundaryAvoidance => ParamChange::AlphaBoundaryAvoidance(value),
            Parameter::BoundThreshold => ParamChange::BoundThreshold(value),
            Parameter::RVision => ParamChange::RVision(value),
            Parameter::RPersonalSpace => ParamChange::RPersonalSpace(value),
        })
    }

    /// The real-valued parameter this change targets, if any.
    pub fn scalar(&self) -> Option<(Parameter, f64)> {
        match *self {
            ParamChange::AbsV(v) => Some((Parameter::AbsV, v)),
            ParamChange::DeltaT(v) => Some((Parameter::DeltaT, v)),
            ParamChange::AlphaAlignment(v) => Some((Parameter::AlphaAlignment, v)),
            ParamChange::AlphaSeparation(v) => Some((Parameter::AlphaSeparation, v)),
            ParamChange::AlphaCohesion(v) => Some((Parameter::AlphaCohesion, v)),
            ParamChange::AlphaRandom(v) => Some((Parameter::AlphaRandom, v)),
            ParamChange::AlphaBoundaryAvoidance(v) => {
                Some((Parameter::AlphaBoundaryAvoidance, v))
            }
            ParamChange::BoundThreshold(v) => Some((Parameter::BoundThreshold, v)),
            ParamChange::RVision(v) => Some((Parameter::RVision, v)),
            ParamChange::RPersonalSpace(v) => Some((Parameter::RPersonalSpace, v)),
            ParamChange::Population(_) | ParamChange::XScope(_) | ParamChange::YScope(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RunOptions::default().validate().is_ok());
    }

    #[rstest]
    #[case(Parameter::RVision, -0.5)]
    #[case(Parameter::RPersonalSpace, -1.)]
    #[case(Parameter::AlphaCohesion, f64::NAN)]
    #[case(Parameter::AbsV, f64::INFINITY)]
    #[case(Parameter::BoundThreshold, -13.)]
    fn rejects_out_of_range_scalars(#[case] parameter: Parameter, #[case] value: f64) {
        let mut options = RunOptions::default();
        let before = options.clone();

        let err = options.set_scalar(parameter, value).unwrap_err();

        assert!(matches!(
            err,
            FlockError::InvalidArgument(InvalidArgument::OutOfRange { parameter: p, .. }) if p == parameter
        ));
        assert_eq!(options, before);
    }

    #[test]
    fn accepts_boundary_values() {
        let mut options = RunOptions::default();
        options.set_scalar(Parameter::RVision, 0.).unwrap();
        options.set_scalar(Parameter::AlphaAlignment, 7.5).unwrap();

        assert_eq!(options.r_vision, 0.);
        assert_eq!(options.get(Parameter::AlphaAlignment), 7.5);
    }

    #[rstest]
    #[case(0., 0.)]
    #[case(10., -10.)]
    #[case(f64::NAN, 1.)]
    fn rejects_malformed_scopes(#[case] min: f64, #[case] max: f64) {
        assert!(Scope::new(Axis::Y, min, max).is_err());

        let mut options = RunOptions::default();
        options.y_scope = Scope { min, max };
        assert!(options.validate().is_err());
    }

    #[rstest]
    #[case(-1., 49.)]
    #[case(51., 1.)]
    #[case(50., 50.)]
    #[case(0., 0.)]
    #[case(25., 25.)]
    fn wraps_single_overshoot(#[case] value: f64, #[case] expected: f64) {
        let scope = Scope { min: 0., max: 50. };
        assert_relative_eq!(scope.wrap(value), expected, epsilon = 1e-12);
    }

    #[test]
    fn wraps_far_values_fully() {
        let scope = Scope { min: -10., max: 10. };
        assert_relative_eq!(scope.wrap_fully(75.), -5., epsilon = 1e-12);
        assert_relative_eq!(scope.wrap_fully(-35.), 5., epsilon = 1e-12);
        assert_eq!(scope.wrap_fully(10.), 10.);
    }

    #[test]
    fn raw_population_must_be_a_count() {
        assert_eq!(
            ParamChange::from_raw(Parameter::NObj, 42.).unwrap(),
            ParamChange::Population(42)
        );
        assert!(ParamChange::from_raw(Parameter::NObj, -3.).is_err());
        assert!(ParamChange::from_raw(Parameter::NObj, 2.5).is_err());
    }

    #[rstest]
    #[case(1e30)]
    #[case(f64::INFINITY)]
    #[case((MAX_RAW_POPULATION + 1) as f64)]
    fn raw_population_is_capped(#[case] value: f64) {
        let err = ParamChange::from_raw(Parameter::NObj, value).unwrap_err();

        assert!(matches!(
            err,
            FlockError::InvalidArgument(InvalidArgument::OutOfRange {
                parameter: Parameter::NObj,
                ..
            })
        ));
        assert_eq!(
            ParamChange::from_raw(Parameter::NObj, MAX_RAW_POPULATION as f64).unwrap(),
            ParamChange::Population(MAX_RAW_POPULATION)
        );
    }

    #[test]
    fn slider_catalogue_covers_ui_parameters() {
        let sliders: Vec<_> = Parameter::ALL
            .iter()
            .filter(|p| p.slider_range().is_some())
            .collect();

        assert_eq!(sliders.len(), 9);
        assert_eq!(Parameter::RPersonalSpace.label(), "Private Space");
        assert_eq!(Parameter::NObj.slider_range(), Some((1., 2000.)));
    }

    #[test]
    fn every_scalar_change_maps_back_to_its_parameter() {
        for parameter in Parameter::ALL.iter().filter(|p| **p != Parameter::NObj) {
            let change = ParamChange::from_raw(*parameter, 1.25).unwrap();
            assert_eq!(change.scalar(), Some((*parameter, 1.25)));
        }
    }
}
