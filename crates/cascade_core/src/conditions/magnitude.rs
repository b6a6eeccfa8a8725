use num_traits::ToPrimitive;

use crate::conditions::{latest, validate_patience, validate_tracking, StopCondition, Verdict};
use crate::errors::{ConditionError, ConfigError};
use crate::history::History;
use crate::record::Record;
use crate::traits::Scalar;

#[derive(Debug, Clone, Copy)]
struct Baseline<T> {
    value: T,
    order: i32,
}

/// Divergence guard over the order of magnitude (floor of log10) of a
/// tracked variable.
///
/// A small state machine: uninitialized → monitoring → triggered. The
/// baseline order is established on the first usable value and, while
/// monitoring, follows the value down (adaptive floor). Once the current
/// order reaches `baseline + orders_increase` the condition is triggered
/// and a patience counter starts, the triggering iteration counting as 1.
/// Falling back below the threshold resets to monitoring with the
/// recovered value as the new baseline — an oscillating-but-recovering
/// sequence is a false alarm. `patience` consecutive elevated iterations
/// stop the run.
///
/// NaN or non-positive values with an established baseline count as far
/// above it (they trigger rather than crash on log of a non-positive
/// number).
#[derive(Debug, Clone)]
pub struct StopOnMagnitudeJump<T> {
    tracking: String,
    orders_increase: usize,
    patience: usize,
    adapt_to_decrease: bool,
    baseline: Option<Baseline<T>>,
    triggered: bool,
    counter: usize,
}

impl<T: Scalar> StopOnMagnitudeJump<T> {
    pub fn new(
        tracking: impl Into<String>,
        orders_increase: usize,
        patience: usize,
    ) -> Result<Self, ConfigError> {
        let tracking = tracking.into();
        validate_tracking(&tracking)?;
        validate_patience(patience)?;
        if orders_increase == 0 {
            return Err(ConfigError::InvalidOrdersIncrease {
                got: orders_increase,
            });
        }
        Ok(Self {
            tracking,
            orders_increase,
            patience,
            adapt_to_decrease: true,
            baseline: None,
            triggered: false,
            counter: 0,
        })
    }

    /// Disables (or re-enables) lowering the baseline when the value
    /// improves while monitoring.
    pub fn adapt_to_decrease(mut self, adapt: bool) -> Self {
        self.adapt_to_decrease = adapt;
        self
    }
}

/// `floor(log10(value))`, or `None` for NaN, infinite, or non-positive
/// values.
fn order_of<T: Scalar>(value: T) -> Option<i32> {
    if !value.is_finite() || value <= T::zero() {
        return None;
    }
    value.log10().floor().to_i32()
}

impl<T: Scalar, R: Record<T>> StopCondition<T, R> for StopOnMagnitudeJump<T> {
    fn label(&self) -> &'static str {
        "StopOnMagnitudeJump"
    }

    fn evaluate(&mut self, history: &History<T, R>) -> Result<Verdict, ConditionError> {
        let label = <Self as StopCondition<T, R>>::label(self);
        let Some(current) = latest(history, &self.tracking, label)? else {
            return Ok(Verdict::hold("no state recorded yet"));
        };
        let current_order = order_of(current);

        let Some(baseline) = self.baseline else {
            return Ok(match current_order {
                Some(order) => {
                    self.baseline = Some(Baseline {
                        value: current,
                        order,
                    });
                    Verdict::hold(format!(
                        "baseline established: {current} (order 10^{order})"
                    ))
                }
                None => Verdict::hold(format!(
                    "cannot establish a baseline from non-positive value {current}"
                )),
            });
        };

        let threshold = baseline.order + self.orders_increase as i32;
        match current_order {
            // Below the trigger threshold: recover or keep monitoring.
            Some(order) if order < threshold => {
                if self.triggered {
                    self.triggered = false;
                    self.counter = 0;
                    self.baseline = Some(Baseline {
                        value: current,
                        order,
                    });
                    Ok(Verdict::hold(format!(
                        "'{}' recovered below 10^{threshold}; baseline reset to {current} (10^{order})",
                        self.tracking
                    )))
                } else if self.adapt_to_decrease && order < baseline.order {
                    self.baseline = Some(Baseline {
                        value: current,
                        order,
                    });
                    Ok(Verdict::hold(format!(
                        "baseline lowered from {} (10^{}) to {current} (10^{order})",
                        baseline.value, baseline.order
                    )))
                } else {
                    Ok(Verdict::hold(format!(
                        "monitoring '{}': current {current} (10^{order}), baseline {} (10^{})",
                        self.tracking, baseline.value, baseline.order
                    )))
                }
            }
            // At or above the threshold, or NaN/non-positive (treated as
            // far above the baseline).
            _ => {
                if self.triggered {
                    self.counter += 1;
                } else {
                    self.triggered = true;
                    self.counter = 1;
                }
                let order_text = match current_order {
                    Some(order) => format!("10^{order}"),
                    None => "undefined".to_string(),
                };
                if self.counter >= self.patience {
                    Ok(Verdict::stop(format!(
                        "variable '{}' rose {} order(s) of magnitude above baseline {} (10^{}): \
                         current {current} ({order_text}), elevated for {} iteration(s)",
                        self.tracking,
                        self.orders_increase,
                        baseline.value,
                        baseline.order,
                        self.counter
                    )))
                } else {
                    Ok(Verdict::hold(format!(
                        "'{}' elevated: current {current} ({order_text}) >= 10^{threshold}, \
                         {}/{} iteration(s)",
                        self.tracking, self.counter, self.patience
                    )))
                }
            }
        }
    }

    fn reset(&mut self) {
        self.baseline = None;
        self.triggered = false;
        self.counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::VarMap;

    fn push(history: &mut History<f64, VarMap<f64>>, r: f64) {
        history.record(VarMap::new().with("residual", r)).unwrap();
    }

    fn evaluate(
        condition: &mut StopOnMagnitudeJump<f64>,
        history: &History<f64, VarMap<f64>>,
    ) -> Verdict {
        condition.evaluate(history).unwrap()
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(StopOnMagnitudeJump::<f64>::new("", 1, 1).is_err());
        assert!(StopOnMagnitudeJump::<f64>::new("r", 0, 1).is_err());
        assert!(StopOnMagnitudeJump::<f64>::new("r", 1, 0).is_err());
    }

    #[test]
    fn stops_at_the_patience_th_elevated_iteration_and_not_before() {
        let mut condition = StopOnMagnitudeJump::new("residual", 2, 3).unwrap();
        let mut history: History<f64, VarMap<f64>> = History::new();

        push(&mut history, 1.0); // baseline order 0
        assert!(!evaluate(&mut condition, &history).should_stop);

        for i in 0..3 {
            push(&mut history, 150.0); // order 2 = baseline + 2
            let verdict = evaluate(&mut condition, &history);
            if i < 2 {
                assert!(!verdict.should_stop, "stopped early at elevated #{}", i + 1);
            } else {
                assert!(verdict.should_stop);
                assert!(verdict.reason.contains("3 iteration(s)"));
            }
        }
    }

    #[test]
    fn recovery_resets_and_adopts_the_recovered_value_as_baseline() {
        let mut condition = StopOnMagnitudeJump::new("residual", 1, 2).unwrap();
        let mut history: History<f64, VarMap<f64>> = History::new();

        push(&mut history, 1.0); // baseline order 0
        evaluate(&mut condition, &history);

        push(&mut history, 20.0); // order 1, elevated #1
        assert!(!evaluate(&mut condition, &history).should_stop);

        push(&mut history, 2.0); // back below threshold
        let verdict = evaluate(&mut condition, &history);
        assert!(!verdict.should_stop);
        assert!(verdict.reason.contains("recovered"));

        // The false alarm left no residue: two fresh elevated iterations
        // are needed again.
        push(&mut history, 20.0);
        assert!(!evaluate(&mut condition, &history).should_stop);
        push(&mut history, 20.0);
        assert!(evaluate(&mut condition, &history).should_stop);
    }

    #[test]
    fn baseline_follows_improving_values() {
        let mut condition = StopOnMagnitudeJump::new("residual", 1, 1).unwrap();
        let mut history: History<f64, VarMap<f64>> = History::new();

        push(&mut history, 100.0); // baseline order 2
        evaluate(&mut condition, &history);
        push(&mut history, 0.5); // improvement: baseline drops to order -1
        let verdict = evaluate(&mut condition, &history);
        assert!(verdict.reason.contains("baseline lowered"));

        // Order 0 is now one order above the adapted baseline.
        push(&mut history, 5.0);
        assert!(evaluate(&mut condition, &history).should_stop);
    }

    #[test]
    fn without_adaptation_the_baseline_is_fixed() {
        let mut condition = StopOnMagnitudeJump::new("residual", 1, 1)
            .unwrap()
            .adapt_to_decrease(false);
        let mut history: History<f64, VarMap<f64>> = History::new();

        push(&mut history, 100.0);
        evaluate(&mut condition, &history);
        push(&mut history, 0.5);
        let verdict = evaluate(&mut condition, &history);
        assert!(verdict.reason.contains("monitoring"));

        // Order 1 stays below the original baseline + 1 = order 3.
        push(&mut history, 50.0);
        assert!(!evaluate(&mut condition, &history).should_stop);
    }

    #[test]
    fn nan_with_a_baseline_counts_as_far_above() {
        let mut condition = StopOnMagnitudeJump::new("residual", 1, 1).unwrap();
        let mut history: History<f64, VarMap<f64>> = History::new();

        push(&mut history, 1.0);
        evaluate(&mut condition, &history);
        push(&mut history, f64::NAN);
        let verdict = evaluate(&mut condition, &history);
        assert!(verdict.should_stop);
        assert!(verdict.reason.contains("undefined"));
    }

    #[test]
    fn non_positive_values_cannot_establish_a_baseline() {
        let mut condition = StopOnMagnitudeJump::new("residual", 1, 1).unwrap();
        let mut history: History<f64, VarMap<f64>> = History::new();

        push(&mut history, -3.0);
        let verdict = evaluate(&mut condition, &history);
        assert!(!verdict.should_stop);
        assert!(verdict.reason.contains("cannot establish"));

        // The first positive value becomes the baseline.
        push(&mut history, 1.0);
        assert!(evaluate(&mut condition, &history)
            .reason
            .contains("baseline established"));
    }

    #[test]
    fn reset_clears_baseline_trigger_and_counter() {
        let mut condition = StopOnMagnitudeJump::new("residual", 1, 2).unwrap();
        let mut history: History<f64, VarMap<f64>> = History::new();

        push(&mut history, 1.0);
        evaluate(&mut condition, &history);
        push(&mut history, 100.0);
        evaluate(&mut condition, &history);

        StopCondition::<f64, VarMap<f64>>::reset(&mut condition);
        let mut fresh: History<f64, VarMap<f64>> = History::new();
        push(&mut fresh, 100.0);
        let verdict = evaluate(&mut condition, &fresh);
        assert!(verdict.reason.contains("baseline established"));
    }
}
