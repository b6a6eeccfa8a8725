//! The iteration engine: initialize → step → record → evaluate, until a
//! stop condition fires or the iteration cap is reached.

use serde::{Deserialize, Serialize};

use crate::conditions::StopCondition;
use crate::errors::{ConfigError, EngineError};
use crate::history::History;
use crate::observer::{NullObserver, RunEvent, RunObserver};
use crate::record::Record;
use crate::traits::Scalar;

/// Settings controlling one engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Bounds the number of step invocations; the initial state does not
    /// count.
    pub max_iterations: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_iterations: 1_000,
        }
    }
}

/// Engine life cycle. Reaching the iteration cap is a terminal state, not
/// an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RunStatus {
    Uninitialized,
    Running,
    Stopped { reasons: Vec<String> },
    MaxIterationsReached,
}

impl RunStatus {
    pub fn is_stopped(&self) -> bool {
        matches!(self, RunStatus::Stopped { .. })
    }
}

/// Status of one stop condition at one iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionReport {
    pub condition: String,
    pub met: bool,
    pub reason: String,
}

/// Result of a completed run. `reports` holds the final iteration's full
/// condition status list, in registration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub iterations: usize,
    pub reports: Vec<ConditionReport>,
}

/// Drives one logical computation: owns the history, the stop conditions,
/// and the iteration bound. Algorithms supply the initial state and a step
/// closure per run.
///
/// Single-threaded by design; parallel sweeps construct one engine per
/// computation.
pub struct Engine<T: Scalar, R: Record<T>> {
    label: String,
    settings: EngineSettings,
    conditions: Vec<Box<dyn StopCondition<T, R>>>,
    observer: Box<dyn RunObserver>,
    history: History<T, R>,
    iteration: usize,
    status: RunStatus,
}

impl<T: Scalar, R: Record<T>> Engine<T, R> {
    pub fn new(label: impl Into<String>, settings: EngineSettings) -> Result<Self, ConfigError> {
        if settings.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations {
                got: settings.max_iterations,
            });
        }
        Ok(Self {
            label: label.into(),
            settings,
            conditions: Vec::new(),
            observer: Box::new(NullObserver),
            history: History::new(),
            iteration: 0,
            status: RunStatus::Uninitialized,
        })
    }

    /// Attaches a stop condition. Registration order is the reporting
    /// order; it does not affect the outcome, since every condition is
    /// evaluated every iteration.
    pub fn add_condition(&mut self, condition: impl StopCondition<T, R> + 'static) {
        self.conditions.push(Box::new(condition));
    }

    /// Replaces the progress sink. The engine never configures logging
    /// itself.
    pub fn set_observer(&mut self, observer: impl RunObserver + 'static) {
        self.observer = Box::new(observer);
    }

    /// The run log. After a step failure this still holds every state
    /// recorded before the failure.
    pub fn history(&self) -> &History<T, R> {
        &self.history
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    /// Runs the loop to completion and returns the outcome; the full
    /// history stays available through [`Engine::history`].
    ///
    /// Each call is an independent run: the history is rebuilt from
    /// `initial` (recorded as iteration 0) and every condition's counters
    /// are reset, so a deterministic step function reproduces the same
    /// history on every call.
    ///
    /// A step failure is re-raised as [`EngineError::Step`] after the
    /// partial history is secured — fail loud, but don't discard evidence.
    pub fn run<F>(&mut self, initial: R, mut step: F) -> Result<RunOutcome, EngineError>
    where
        F: FnMut(&History<T, R>) -> anyhow::Result<R>,
    {
        self.history.clear();
        self.iteration = 0;
        for condition in &mut self.conditions {
            condition.reset();
        }
        self.status = RunStatus::Running;
        self.observer.observe(RunEvent::RunStarted {
            label: &self.label,
            max_iterations: self.settings.max_iterations,
        });

        self.record(initial)?;

        let mut reports = Vec::new();
        for iteration in 1..=self.settings.max_iterations {
            self.iteration = iteration;

            let state = match step(&self.history) {
                Ok(state) => state,
                Err(source) => {
                    self.observer.observe(RunEvent::StepFailed {
                        iteration,
                        message: &format!("{source:#}"),
                    });
                    return Err(EngineError::Step { iteration, source });
                }
            };
            self.record(state)?;

            reports.clear();
            for condition in &mut self.conditions {
                let verdict = condition.evaluate(&self.history)?;
                reports.push(ConditionReport {
                    condition: condition.label().to_string(),
                    met: verdict.should_stop,
                    reason: verdict.reason,
                });
            }
            self.observer.observe(RunEvent::ConditionsEvaluated {
                iteration,
                reports: &reports,
            });

            if reports.iter().any(|report| report.met) {
                let reasons = reports
                    .iter()
                    .filter(|report| report.met)
                    .map(|report| report.reason.clone())
                    .collect();
                self.status = RunStatus::Stopped { reasons };
                break;
            }
        }

        if self.status == RunStatus::Running {
            self.status = RunStatus::MaxIterationsReached;
        }
        let outcome = RunOutcome {
            status: self.status.clone(),
            iterations: self.iteration,
            reports,
        };
        self.observer.observe(RunEvent::RunFinished { outcome: &outcome });
        Ok(outcome)
    }

    fn record(&mut self, state: R) -> Result<(), EngineError> {
        self.history.record(state)?;
        if let Some(state) = self.history.last_state() {
            self.observer.observe(RunEvent::StateRecorded {
                iteration: self.iteration,
                state,
            });
        }
        Ok(())
    }
}
