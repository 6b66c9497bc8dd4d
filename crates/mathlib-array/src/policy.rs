use tracing::warn;

use crate::error::{ArrayError, FloatCondition, Result};

/// What to do when a kernel hits a floating point condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorAction {
    /// Silently produce the IEEE result.
    Ignore,
    /// Produce the IEEE result and log a warning.
    #[default]
    Warn,
    /// Fail the call. No output is written.
    Raise,
}

/// Per-condition handling for numeric kernels, in the spirit of numpy's
/// `seterr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NumericErrorPolicy {
    /// Division by zero, and poles such as `log(0)`.
    pub divide: ErrorAction,
    /// A NaN produced from non-NaN inputs, e.g. `sqrt(-1)`.
    pub invalid: ErrorAction,
    /// An infinite result produced from finite inputs without a zero operand.
    pub overflow: ErrorAction,
}

impl NumericErrorPolicy {
    /// A policy that ignores every condition.
    pub fn ignore_all() -> Self {
        Self::uniform(ErrorAction::Ignore)
    }

    /// A policy that fails on every condition.
    pub fn raise_all() -> Self {
        Self::uniform(ErrorAction::Raise)
    }

    pub fn uniform(action: ErrorAction) -> Self {
        NumericErrorPolicy {
            divide: action,
            invalid: action,
            overflow: action,
        }
    }

    fn action_for(&self, kind: FloatCondition) -> ErrorAction {
        match kind {
            FloatCondition::DivideByZero => self.divide,
            FloatCondition::Invalid => self.invalid,
            FloatCondition::Overflow => self.overflow,
        }
    }

    /// Apply the policy to the conditions a kernel observed.
    pub(crate) fn check(&self, op: &str, seen: &Conditions) -> Result<()> {
        for (kind, count) in seen.iter() {
            if count == 0 {
                continue;
            }
            match self.action_for(kind) {
                ErrorAction::Ignore => {}
                ErrorAction::Warn => warn!(op, count, "{} encountered", kind),
                ErrorAction::Raise => {
                    return Err(ArrayError::FloatingPoint {
                        op: op.to_string(),
                        kind,
                    })
                }
            }
        }
        Ok(())
    }
}

/// Counts of floating point conditions seen while running a kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Conditions {
    pub divide: usize,
    pub invalid: usize,
    pub overflow: usize,
}

impl Conditions {
    fn iter(&self) -> [(FloatCondition, usize); 3] {
        [
            (FloatCondition::DivideByZero, self.divide),
            (FloatCondition::Invalid, self.invalid),
            (FloatCondition::Overflow, self.overflow),
        ]
    }

    /// Classify one float result given the inputs that produced it.
    pub fn note<T: num_traits::Float>(&mut self, inputs: &[T], result: T) {
        if result.is_nan() {
            if !inputs.iter().any(|x| x.is_nan()) {
                self.invalid += 1;
            }
        } else if result.is_infinite() && inputs.iter().all(|x| x.is_finite()) {
            if inputs.iter().any(|x| x.is_zero()) {
                self.divide += 1;
            } else {
                self.overflow += 1;
            }
        }
    }
}
