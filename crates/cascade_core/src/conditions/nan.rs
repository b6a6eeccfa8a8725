use crate::conditions::{latest, StopCondition, Verdict};
use crate::errors::{ConditionError, ConfigError};
use crate::history::History;
use crate::record::Record;
use crate::traits::Scalar;

/// Stops the run the first iteration any tracked variable is NaN.
/// No patience — an undefined value is never going to recover.
#[derive(Debug, Clone)]
pub struct StopIfNan {
    variables: Vec<String>,
}

impl StopIfNan {
    pub fn new<I, S>(variables: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variables: Vec<String> = variables.into_iter().map(Into::into).collect();
        if variables.is_empty() {
            return Err(ConfigError::NoTrackedVariables);
        }
        for name in &variables {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyVariableName);
            }
        }
        Ok(Self { variables })
    }
}

impl<T: Scalar, R: Record<T>> StopCondition<T, R> for StopIfNan {
    fn label(&self) -> &'static str {
        "StopIfNan"
    }

    fn evaluate(&mut self, history: &History<T, R>) -> Result<Verdict, ConditionError> {
        for name in &self.variables {
            let Some(value) = latest(history, name, <Self as StopCondition<T, R>>::label(self))? else {
                return Ok(Verdict::hold("no state recorded yet"));
            };
            if value.is_nan() {
                return Ok(Verdict::stop(format!("variable '{name}' is NaN")));
            }
        }
        Ok(Verdict::hold(format!(
            "no NaN values in {:?}",
            self.variables
        )))
    }

    fn reset(&mut self) {}
}
