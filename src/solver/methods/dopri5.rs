//! Dormand-Prince 5(4) adaptive solver
//!
//! # Mathematical Background
//!
//! Explicit embedded Runge-Kutta pair: every step computes a fifth-order
//! solution and a fourth-order one from the same seven stages. Their
//! difference estimates the local error, which drives the step size.
//!
//! ```text
//! k₁ = f(yₙ, tₙ)                          (reused: last stage of previous step)
//! kᵢ = f(yₙ + h·Σⱼ aᵢⱼ kⱼ, tₙ + cᵢ·h)      i = 2..6
//! yₙ₊₁ = yₙ + h·Σ bᵢ kᵢ
//! k₇ = f(yₙ₊₁, tₙ + h)                    (first stage of next step)
//! errᵢ = h·Σ eᵢ kᵢ                         eᵢ = bᵢ - b̂ᵢ
//! ```
//!
//! # Step control
//!
//! - Scaled RMS norm with `scᵢ = atol + rtol·max(|yᵢ|, |yᵢ new|)`
//! - Accept when the norm is ≤ 1
//! - New step `h·0.9·err^(-1/5)`, factor clamped to `[0.2, 10]`
//!   (no growth right after a rejection)
//! - Steps never cross the last grid time or a model breakpoint; after a
//!   breakpoint the step restarts from the right-hand derivative
//! - Underflow when the step falls below `1e-12·max(1, |t|)`
//!
//! # Reporting
//!
//! The internal steps are independent of the grid. Grid times falling inside
//! an accepted step are filled by cubic Hermite interpolation between the
//! step ends (values and derivatives are both known); a grid time equal to a
//! step end gets that state unchanged.

use crate::error::ConfigurationError;
use crate::physics::{ReactionModel, State, Trajectory};
use crate::solver::{
    breakpoints_within, evaluate, just_after, log_outcome, validate_state, Counters, Scenario,
    SimulationResult, Solver, SolverConfiguration, SolverDiagnostic, SolverStatus, SolverType,
    TimeGrid,
};

// =================================================================================================
// Butcher tableau
// =================================================================================================

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights (b₂ = b₇ = 0)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Error weights b - b̂ (e₂ = 0)
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

// =================================================================================================
// Step control constants
// =================================================================================================

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -0.2;

/// Smallest usable step relative to `max(1, |t|)`
const MIN_STEP_RATIO: f64 = 1e-12;

// =================================================================================================
// Settings
// =================================================================================================

/// Adaptive parameters extracted from a `SolverType::Adaptive`
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AdaptiveSettings {
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: usize,
    pub initial_step: Option<f64>,
    pub max_step: Option<f64>,
}

impl AdaptiveSettings {
    pub(crate) fn from_configuration(config: &SolverConfiguration) -> Result<Self, ConfigurationError> {
        match &config.solver_type {
            SolverType::Adaptive { rtol, atol, max_steps, initial_step, max_step } => Ok(Self {
                rtol: *rtol,
                atol: *atol,
                max_steps: *max_steps,
                initial_step: *initial_step,
                max_step: *max_step,
            }),
            other => Err(ConfigurationError::Solver(format!(
                "Dopri5Solver only supports Adaptive configuration, got {}",
                other.name()
            ))),
        }
    }

    fn scale(&self, a: f64, b: f64) -> f64 {
        self.atol + self.rtol * a.abs().max(b.abs())
    }
}

// =================================================================================================
// Dopri5 Solver
// =================================================================================================

/// Adaptive Dormand-Prince 5(4) solver
///
/// Default integrator of the crate. Deterministic: the same scenario and
/// configuration always produce bit-identical results.
///
/// # Example
///
/// ```rust
/// use denit_rs::models::{build_model, DoseSchedule, NetworkKind};
/// use denit_rs::physics::RateParameters;
/// use denit_rs::solver::{Dopri5Solver, Scenario, Solver, SolverConfiguration, TimeGrid};
/// use nalgebra::DVector;
///
/// let model = build_model(
///     NetworkKind::ForcedBranching,
///     RateParameters::new(vec![45.0, 10.0, 5.0, 0.0]).unwrap(),
///     DoseSchedule::from_pairs(&[(-0.001, 1200.0)]).unwrap(),
/// ).unwrap();
/// let scenario = Scenario::new(
///     model,
///     DVector::zeros(3),
///     TimeGrid::linspace(0.0, 10.0, 101).unwrap(),
/// ).unwrap();
///
/// let result = Dopri5Solver::new()
///     .solve(&scenario, &SolverConfiguration::adaptive(1e-8, 1e-10))
///     .unwrap();
/// assert!(result.success());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Dopri5Solver;

impl Dopri5Solver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for Dopri5Solver {
    fn solve(
        &self,
        scenario: &Scenario,
        config: &SolverConfiguration,
    ) -> Result<SimulationResult, ConfigurationError> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;
        let settings = AdaptiveSettings::from_configuration(config)?;

        // ====== Step 2: Integration ======

        let (trajectory, diagnostic) = integrate_adaptive(
            scenario.model.as_ref(),
            &scenario.initial,
            &scenario.grid,
            &settings,
        );

        // ====== Step 3: Build Result ======

        let mut result = SimulationResult::new(
            scenario.grid.as_slice().to_vec(),
            trajectory,
            diagnostic,
            scenario.labels(),
        );

        result.add_metadata("solver", self.name());
        result.add_metadata("model", scenario.get_model_name());
        result.add_metadata("rtol", &settings.rtol.to_string());
        result.add_metadata("atol", &settings.atol.to_string());
        result.add_metadata("function evaluations", &result.diagnostic.evaluations.to_string());
        result.add_metadata("accepted steps", &result.diagnostic.accepted_steps.to_string());
        result.add_metadata("rejected steps", &result.diagnostic.rejected_steps.to_string());

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "Dormand-Prince 5(4)"
    }
}

// =================================================================================================
// Integration core
// =================================================================================================

/// Result of one attempted step
enum Attempt {
    /// All stages finite
    Completed { y_new: State, f_new: State, error: f64 },

    /// A stage or the new state is NaN/Inf; holds a state showing it
    NonFinite(State),
}

/// Mutable state of one run: output rows and counters
struct Integration<'a> {
    model: &'a dyn ReactionModel,
    grid: &'a TimeGrid,
    trajectory: Trajectory,
    counters: Counters,
    next_row: usize,
}

impl<'a> Integration<'a> {
    fn new(model: &'a dyn ReactionModel, grid: &'a TimeGrid, n_species: usize) -> Self {
        Self {
            model,
            grid,
            trajectory: Trajectory::filled(grid.len(), n_species, f64::NAN),
            counters: Counters::default(),
            next_row: 0,
        }
    }

    fn done(&self) -> bool {
        self.next_row >= self.grid.len()
    }

    fn record(&mut self, state: &State) {
        self.trajectory.set_row(self.next_row, state);
        self.next_row += 1;
    }

    /// Rows whose time equals `t` (repeated grid times)
    fn record_until(&mut self, t: f64, state: &State) {
        while !self.done() && self.grid[self.next_row] <= t {
            self.record(state);
        }
    }

    fn derivative(&mut self, state: &State, t: f64) -> Result<State, SolverStatus> {
        evaluate(self.model, state, t, &mut self.counters)
    }

    /// Fill the rows inside `(t, t + h]` from an accepted step
    #[allow(clippy::too_many_arguments)]
    fn dense_output(
        &mut self,
        t: f64,
        h: f64,
        t_new: f64,
        y: &State,
        f: &State,
        y_new: &State,
        f_new: &State,
    ) {
        while !self.done() {
            let tg = self.grid[self.next_row];
            if tg > t_new {
                break;
            }
            if tg == t_new {
                self.record(y_new);
            } else {
                let theta = (tg - t) / h;
                let state = hermite(y, f, y_new, f_new, h, theta);
                self.record(&state);
            }
        }
    }

    /// One Dormand-Prince step of size `h` from `(t, y)` with `f = f(t, y)`
    fn attempt(
        &mut self,
        settings: &AdaptiveSettings,
        t: f64,
        y: &State,
        f: &State,
        h: f64,
    ) -> Result<Attempt, SolverStatus> {
        let k1 = f;
        let k2 = self.derivative(&(y + k1 * (h * A21)), t + C2 * h)?;
        let k3 = self.derivative(&(y + (k1 * A31 + &k2 * A32) * h), t + C3 * h)?;
        let k4 = self.derivative(&(y + (k1 * A41 + &k2 * A42 + &k3 * A43) * h), t + C4 * h)?;
        let k5 = self.derivative(
            &(y + (k1 * A51 + &k2 * A52 + &k3 * A53 + &k4 * A54) * h),
            t + C5 * h,
        )?;
        let k6 = self.derivative(
            &(y + (k1 * A61 + &k2 * A62 + &k3 * A63 + &k4 * A64 + &k5 * A65) * h),
            t + h,
        )?;

        for k in [&k2, &k3, &k4, &k5, &k6] {
            if !validate_state(k) {
                return Ok(Attempt::NonFinite(y + k * h));
            }
        }

        let y_new = y + (k1 * B1 + &k3 * B3 + &k4 * B4 + &k5 * B5 + &k6 * B6) * h;
        if !validate_state(&y_new) {
            return Ok(Attempt::NonFinite(y_new));
        }

        let f_new = self.derivative(&y_new, t + h)?;
        if !validate_state(&f_new) {
            return Ok(Attempt::NonFinite(&y_new + &f_new * h));
        }

        let local = (k1 * E1 + &k3 * E3 + &k4 * E4 + &k5 * E5 + &k6 * E6 + &f_new * E7) * h;
        let error = error_norm(settings, y, &y_new, &local);

        Ok(Attempt::Completed { y_new, f_new, error })
    }

    /// Starting step estimate (Hairer, Nørsett & Wanner, II.4)
    fn initial_step(
        &mut self,
        settings: &AdaptiveSettings,
        t: f64,
        y: &State,
        f: &State,
        max_step: f64,
    ) -> Result<f64, SolverStatus> {
        let scale: Vec<f64> = y
            .iter()
            .map(|yi| settings.scale(*yi, *yi).max(f64::MIN_POSITIVE))
            .collect();
        let rms = |v: &State| scaled_rms(v.iter().zip(&scale).map(|(vi, si)| vi / si));

        let d0 = rms(y);
        let d1 = rms(f);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };
        let h0 = h0.min(max_step);

        let f1 = self.derivative(&(y + f * h0), t + h0)?;
        let d2 = rms(&(&f1 - f)) / h0;

        let dmax = d1.max(d2);
        let h1 = if dmax <= 1e-15 { (h0 * 1e-3).max(1e-6) } else { (0.01 / dmax).powf(0.2) };

        Ok((100.0 * h0).min(h1).min(max_step))
    }

    /// Derivative and step size to start from `(t, y)`
    ///
    /// At a breakpoint the derivative is the right-hand limit, so the step
    /// sees the jump from its first stage on.
    fn restart(
        &mut self,
        settings: &AdaptiveSettings,
        t: f64,
        y: &State,
        at_breakpoint: bool,
        max_step: f64,
    ) -> Result<(State, f64), SolverStatus> {
        let t_eval = if at_breakpoint { just_after(t) } else { t };
        let f = self.derivative(y, t_eval)?;
        if !validate_state(&f) {
            let shown = y + &f * (self.grid[self.next_row] - t);
            self.record(&shown);
            return Err(SolverStatus::NonFiniteState { t });
        }

        let h = match settings.initial_step {
            Some(h) => h.min(max_step),
            None => self.initial_step(settings, t_eval, y, &f, max_step)?,
        };
        Ok((f, h))
    }

    fn run(&mut self, settings: &AdaptiveSettings, x0: &State) -> SolverStatus {
        let t_end = self.grid.end();
        let mut t = self.grid.start();
        let mut y = x0.clone();

        // Row 0 (and any repeat of the start time) is the initial state itself
        self.record_until(t, &y);
        if self.done() {
            return SolverStatus::Success;
        }

        // Steps end exactly on every breakpoint in (t0, t_end)
        let breakpoints = breakpoints_within(self.model, t, t_end);
        let mut next_break = breakpoints.iter().take_while(|b| **b <= t).count();

        let span = t_end - t;
        let max_step = settings.max_step.map_or(span, |m| m.min(span));
        let (mut f, mut h) = match self.restart(settings, t, &y, next_break > 0, max_step) {
            Ok(start) => start,
            Err(status) => return status,
        };

        let mut attempts = 0usize;
        let mut previous_rejected = false;

        while !self.done() {
            if attempts >= settings.max_steps {
                return SolverStatus::MaxStepsExceeded { t, steps: attempts };
            }

            let target = breakpoints.get(next_break).copied().unwrap_or(t_end);
            let remaining = target - t;
            let last = h >= remaining;
            if last {
                h = remaining;
            }

            let min_step = MIN_STEP_RATIO * t.abs().max(1.0);
            if h < min_step && !last {
                return SolverStatus::StepSizeUnderflow { t, step: h };
            }

            attempts += 1;
            let attempt = match self.attempt(settings, t, &y, &f, h) {
                Ok(attempt) => attempt,
                Err(status) => return status,
            };
            let t_new = if last { target } else { t + h };

            match attempt {
                Attempt::NonFinite(shown) => {
                    self.counters.rejected += 1;
                    previous_rejected = true;
                    h *= MIN_FACTOR;
                    if h < min_step {
                        self.record(&shown);
                        return SolverStatus::NonFiniteState { t: t_new };
                    }
                }
                Attempt::Completed { y_new, f_new, error } if error <= 1.0 => {
                    self.counters.accepted += 1;
                    self.dense_output(t, h, t_new, &y, &f, &y_new, &f_new);

                    t = t_new;
                    y = y_new;

                    if last && next_break < breakpoints.len() {
                        // Jump in the right-hand side: FSAL does not carry over
                        next_break += 1;
                        previous_rejected = false;
                        (f, h) = match self.restart(settings, t, &y, true, max_step) {
                            Ok(start) => start,
                            Err(status) => return status,
                        };
                        continue;
                    }

                    let mut factor = if error == 0.0 {
                        MAX_FACTOR
                    } else {
                        (SAFETY * error.powf(ERROR_EXPONENT)).clamp(MIN_FACTOR, MAX_FACTOR)
                    };
                    if previous_rejected {
                        factor = factor.min(1.0);
                    }
                    previous_rejected = false;

                    f = f_new;
                    h = (h * factor).min(max_step);
                }
                Attempt::Completed { error, .. } => {
                    self.counters.rejected += 1;
                    previous_rejected = true;
                    // NaN error norm shrinks at the maximum rate
                    let factor = SAFETY * error.powf(ERROR_EXPONENT);
                    h *= if factor.is_nan() { MIN_FACTOR } else { factor.clamp(MIN_FACTOR, 1.0) };
                }
            }
        }

        SolverStatus::Success
    }
}

/// Adaptive integration onto `grid` (no validation: callers check `x0` and settings)
pub(crate) fn integrate_adaptive(
    model: &dyn ReactionModel,
    x0: &State,
    grid: &TimeGrid,
    settings: &AdaptiveSettings,
) -> (Trajectory, SolverDiagnostic) {
    log::debug!(
        "Dopri5: {} over [{}, {}] ({} points, rtol {}, atol {})",
        model.name(),
        grid.start(),
        grid.end(),
        grid.len(),
        settings.rtol,
        settings.atol
    );

    let mut integration = Integration::new(model, grid, x0.len());
    let status = integration.run(settings, x0);

    let diagnostic = integration
        .counters
        .diagnostic(status, integration.next_row);
    log_outcome("Dopri5", model.name(), &diagnostic);

    (integration.trajectory, diagnostic)
}

// =================================================================================================
// Numerical helpers
// =================================================================================================

/// Cubic Hermite interpolant at `t + θ·h`
fn hermite(y0: &State, f0: &State, y1: &State, f1: &State, h: f64, theta: f64) -> State {
    let t2 = theta * theta;
    let t3 = t2 * theta;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + theta;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    y0 * h00 + f0 * (h10 * h) + y1 * h01 + f1 * (h11 * h)
}

/// Scaled RMS norm of the local error estimate
fn error_norm(settings: &AdaptiveSettings, y: &State, y_new: &State, local: &State) -> f64 {
    let ratios = (0..local.len()).map(|i| {
        let sc = settings.scale(y[i], y_new[i]);
        if sc > 0.0 {
            local[i] / sc
        } else if local[i] == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    });
    scaled_rms(ratios)
}

fn scaled_rms(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v * v, n + 1));
    if count == 0 {
        0.0
    } else {
        (sum / count as f64).sqrt()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
