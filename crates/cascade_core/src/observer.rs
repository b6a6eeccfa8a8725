//! Injected logging sink for the engine.
//!
//! The engine reports run progress through a [`RunObserver`] at
//! well-defined points (run start, state recorded, stop-condition results,
//! run end) and never owns logger configuration. [`NullObserver`] is the
//! default; [`LogObserver`] forwards to the `log` facade.

use std::fmt;

use crate::engine::{ConditionReport, RunOutcome, RunStatus};

/// One engine progress event.
#[derive(Debug)]
pub enum RunEvent<'a> {
    RunStarted {
        label: &'a str,
        max_iterations: usize,
    },
    StateRecorded {
        iteration: usize,
        state: &'a dyn fmt::Debug,
    },
    ConditionsEvaluated {
        iteration: usize,
        reports: &'a [ConditionReport],
    },
    StepFailed {
        iteration: usize,
        message: &'a str,
    },
    RunFinished {
        outcome: &'a RunOutcome,
    },
}

/// A sink for engine progress events.
pub trait RunObserver {
    fn observe(&mut self, event: RunEvent<'_>);
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RunObserver for NullObserver {
    fn observe(&mut self, _event: RunEvent<'_>) {}
}

/// Forwards events to the `log` facade. How and whether they are emitted
/// is the host application's logger configuration, not the engine's.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl RunObserver for LogObserver {
    fn observe(&mut self, event: RunEvent<'_>) {
        match event {
            RunEvent::RunStarted {
                label,
                max_iterations,
            } => {
                log::info!("starting {label} (max {max_iterations} iterations)");
            }
            RunEvent::StateRecorded { iteration, state } => {
                log::debug!("iteration {iteration}: {state:?}");
            }
            RunEvent::ConditionsEvaluated { iteration, reports } => {
                for report in reports {
                    let status = if report.met { "met" } else { "not met" };
                    log::debug!(
                        "iteration {iteration}: [{}] {status}: {}",
                        report.condition,
                        report.reason
                    );
                }
            }
            RunEvent::StepFailed { iteration, message } => {
                log::error!("step failed at iteration {iteration}: {message}");
            }
            RunEvent::RunFinished { outcome } => match &outcome.status {
                RunStatus::Stopped { reasons } => {
                    log::info!(
                        "stopped after {} iteration(s): {}",
                        outcome.iterations,
                        reasons.join("; ")
                    );
                }
                RunStatus::MaxIterationsReached => {
                    log::info!(
                        "maximum of {} iteration(s) reached without convergence",
                        outcome.iterations
                    );
                }
                status => log::info!(
                    "run finished after {} iteration(s) in state {status:?}",
                    outcome.iterations
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::conditions::StopWhenEqual;
    use crate::engine::{Engine, EngineSettings};
    use crate::record::VarMap;
    use crate::tolerance::Tolerance;

    /// Records event kinds through a shared handle, for asserting the
    /// engine's notification points.
    struct RecordingObserver(Rc<RefCell<Vec<&'static str>>>);

    impl RunObserver for RecordingObserver {
        fn observe(&mut self, event: RunEvent<'_>) {
            let kind = match event {
                RunEvent::RunStarted { .. } => "started",
                RunEvent::StateRecorded { .. } => "recorded",
                RunEvent::ConditionsEvaluated { .. } => "evaluated",
                RunEvent::StepFailed { .. } => "step_failed",
                RunEvent::RunFinished { .. } => "finished",
            };
            self.0.borrow_mut().push(kind);
        }
    }

    #[test]
    fn engine_notifies_at_every_defined_point() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut engine: Engine<f64, VarMap<f64>> =
            Engine::new("observed", EngineSettings { max_iterations: 5 }).unwrap();
        engine.set_observer(RecordingObserver(Rc::clone(&seen)));
        engine.add_condition(
            StopWhenEqual::zero("x", Tolerance::absolute(0.5).unwrap(), 1).unwrap(),
        );

        engine
            .run(VarMap::new().with("x", 1.0), |history| {
                let x = history.at(-1, "x")?;
                Ok(VarMap::new().with("x", x / 2.0))
            })
            .unwrap();

        // Initial state, then one step: record + evaluate, then the end of
        // the run.
        assert_eq!(
            *seen.borrow(),
            vec!["started", "recorded", "recorded", "evaluated", "finished"]
        );
    }

    #[test]
    fn null_observer_ignores_everything() {
        let mut observer = NullObserver;
        observer.observe(RunEvent::RunStarted {
            label: "test",
            max_iterations: 10,
        });
    }
}
