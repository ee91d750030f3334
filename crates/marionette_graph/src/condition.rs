// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transition conditions: comparator predicates over named variables.

use crate::variable::{VariableSet, VariableValue};
use serde::{Deserialize, Serialize};

/// Comparator fused with its operand type.
///
/// Float comparators carry their compare value; boolean comparators carry
/// nothing. Invalid comparator/type pairings (e.g. `Greater` against a bool
/// variable) are unrepresentable at the predicate level and only arise when a
/// variable's type changes after the condition was authored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Float variable strictly greater than the value
    Greater(f32),
    /// Float variable strictly less than the value
    Less(f32),
    /// Bool or trigger variable is raised
    IsTrue,
    /// Bool or trigger variable is lowered
    IsFalse,
}

/// A single predicate gating a transition.
///
/// References its variable by name rather than by handle so that persisted
/// machines stay index-free for variables and renames remain a plain string
/// rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Name of the variable this condition reads
    pub variable: String,
    /// Predicate applied to the variable's value
    pub predicate: Predicate,
}

impl Condition {
    /// Create a new condition
    pub fn new(variable: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            variable: variable.into(),
            predicate,
        }
    }

    /// Evaluate this condition against a variable set.
    ///
    /// Fails soft: a missing variable is simply not fulfilled. A predicate
    /// applied to a variable of the wrong type asserts in debug builds and is
    /// not fulfilled in release builds.
    pub fn is_fulfilled(&self, variables: &VariableSet) -> bool {
        let Some(variable) = variables.get(&self.variable) else {
            return false;
        };
        match (self.predicate, variable.value) {
            (Predicate::Greater(compare), VariableValue::Float(value)) => value > compare,
            (Predicate::Less(compare), VariableValue::Float(value)) => value < compare,
            (Predicate::IsTrue, VariableValue::Bool(value) | VariableValue::Trigger(value)) => {
                value
            }
            (Predicate::IsFalse, VariableValue::Bool(value) | VariableValue::Trigger(value)) => {
                !value
            }
            (predicate, value) => {
                debug_assert!(
                    false,
                    "condition on '{}' pairs {predicate:?} with {:?}",
                    self.variable,
                    value.variable_type()
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_comparators() {
        let mut vars = VariableSet::new();
        vars.set_float("Speed", 0.6);

        assert!(Condition::new("Speed", Predicate::Greater(0.5)).is_fulfilled(&vars));
        assert!(!Condition::new("Speed", Predicate::Less(0.5)).is_fulfilled(&vars));

        vars.set_float("Speed", 0.4);
        assert!(!Condition::new("Speed", Predicate::Greater(0.5)).is_fulfilled(&vars));
        assert!(Condition::new("Speed", Predicate::Less(0.5)).is_fulfilled(&vars));
    }

    #[test]
    fn test_bool_comparators() {
        let mut vars = VariableSet::new();
        vars.set_bool("Grounded", true);

        assert!(Condition::new("Grounded", Predicate::IsTrue).is_fulfilled(&vars));
        assert!(!Condition::new("Grounded", Predicate::IsFalse).is_fulfilled(&vars));
    }

    #[test]
    fn test_trigger_reads_as_bool() {
        let mut vars = VariableSet::new();
        vars.set_trigger("Fire");
        assert!(Condition::new("Fire", Predicate::IsTrue).is_fulfilled(&vars));

        vars.reset_trigger("Fire");
        assert!(!Condition::new("Fire", Predicate::IsTrue).is_fulfilled(&vars));
    }

    #[test]
    fn test_missing_variable_is_not_fulfilled() {
        let vars = VariableSet::new();
        assert!(!Condition::new("Speed", Predicate::Greater(0.5)).is_fulfilled(&vars));
        assert!(!Condition::new("Speed", Predicate::IsTrue).is_fulfilled(&vars));
    }
}
