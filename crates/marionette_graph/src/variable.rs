// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed runtime variables driving transition conditions and blend weights.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Type of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    /// Floating point value
    Float,
    /// Boolean value
    Bool,
    /// Boolean that is consumed (reset to false) when a transition fires on it
    Trigger,
}

/// Value stored in a variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VariableValue {
    /// Floating point value
    Float(f32),
    /// Boolean value
    Bool(bool),
    /// Trigger value; behaves like a bool until consumed
    Trigger(bool),
}

impl VariableValue {
    /// Get the variable type for this value
    pub fn variable_type(&self) -> VariableType {
        match self {
            Self::Float(_) => VariableType::Float,
            Self::Bool(_) => VariableType::Bool,
            Self::Trigger(_) => VariableType::Trigger,
        }
    }

    /// Get the float payload, if this is a float
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the boolean payload; triggers read as their pending state
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) | Self::Trigger(v) => Some(*v),
            Self::Float(_) => None,
        }
    }
}

/// A named, typed runtime value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name, unique within its machine
    pub name: String,
    /// Current value
    pub value: VariableValue,
}

impl Variable {
    /// Create a new variable
    pub fn new(name: impl Into<String>, value: VariableValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Get the variable's type
    pub fn variable_type(&self) -> VariableType {
        self.value.variable_type()
    }
}

/// Ordered collection of variables, keyed by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableSet {
    variables: IndexMap<String, Variable>,
}

impl VariableSet {
    /// Create a new empty set
    pub fn new() -> Self {
        Self {
            variables: IndexMap::new(),
        }
    }

    /// Get a variable by name
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Get a mutable variable by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.get_mut(name)
    }

    /// Get all variables in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Get the number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Insert a variable, replacing any previous one with the same name
    pub fn insert(&mut self, variable: Variable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Find-or-create the named variable and set it to a float value.
    ///
    /// An existing variable of a different type is coerced to a float.
    pub fn set_float(&mut self, name: &str, value: f32) {
        self.set_value(name, VariableValue::Float(value));
    }

    /// Find-or-create the named variable and set it to a bool value.
    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.set_value(name, VariableValue::Bool(value));
    }

    /// Find-or-create the named variable and raise it as a trigger.
    ///
    /// The trigger stays raised until a transition consumes it.
    pub fn set_trigger(&mut self, name: &str) {
        self.set_value(name, VariableValue::Trigger(true));
    }

    /// Lower a trigger after a transition consumed it. No-op for other types.
    pub fn reset_trigger(&mut self, name: &str) {
        if let Some(variable) = self.variables.get_mut(name) {
            if let VariableValue::Trigger(raised) = &mut variable.value {
                *raised = false;
            }
        }
    }

    fn set_value(&mut self, name: &str, value: VariableValue) {
        match self.variables.get_mut(name) {
            Some(variable) => variable.value = value,
            None => {
                self.insert(Variable::new(name, value));
            }
        }
    }

    /// Create a new float variable with an automatically chosen unique name.
    ///
    /// Names follow the "NewVariable", "NewVariable2", "NewVariable3", ...
    /// progression, skipping names already taken.
    pub fn create_unique(&mut self) -> String {
        let mut name = String::from("NewVariable");
        let mut suffix = 2u32;
        while self.variables.contains_key(&name) {
            name = format!("NewVariable{suffix}");
            suffix += 1;
        }
        self.insert(Variable::new(name.clone(), VariableValue::Float(0.0)));
        name
    }

    /// Remove a variable by name
    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        self.variables.shift_remove(name)
    }

    /// Rename a variable, keeping its position in declaration order.
    ///
    /// Returns `false` if `old` does not exist or `new` is already taken.
    /// Condition rewriting is the owning machine's job; this only moves the
    /// variable itself.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        if old == new {
            return self.variables.contains_key(old);
        }
        if self.variables.contains_key(new) {
            return false;
        }
        let Some(index) = self.variables.get_index_of(old) else {
            return false;
        };
        let Some(mut variable) = self.variables.shift_remove(old) else {
            return false;
        };
        variable.name = new.to_string();
        self.variables.insert(new.to_string(), variable);
        self.variables.move_index(self.variables.len() - 1, index);
        true
    }

    /// Remove all variables
    pub fn clear(&mut self) {
        self.variables.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_coerces_type() {
        let mut vars = VariableSet::new();
        vars.set_bool("Jump", true);
        assert_eq!(vars.get("Jump").unwrap().variable_type(), VariableType::Bool);

        vars.set_float("Jump", 0.5);
        assert_eq!(vars.get("Jump").unwrap().variable_type(), VariableType::Float);
        assert_eq!(vars.get("Jump").unwrap().value.as_float(), Some(0.5));
    }

    #[test]
    fn test_create_unique_names() {
        let mut vars = VariableSet::new();
        assert_eq!(vars.create_unique(), "NewVariable");
        assert_eq!(vars.create_unique(), "NewVariable2");
        assert_eq!(vars.create_unique(), "NewVariable3");
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn test_rename_preserves_order() {
        let mut vars = VariableSet::new();
        vars.set_float("A", 1.0);
        vars.set_float("B", 2.0);
        vars.set_float("C", 3.0);

        assert!(vars.rename("B", "Middle"));
        let names: Vec<&str> = vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["A", "Middle", "C"]);
        assert_eq!(vars.get("Middle").unwrap().value.as_float(), Some(2.0));
        assert!(vars.get("B").is_none());
    }

    #[test]
    fn test_rename_rejects_collision() {
        let mut vars = VariableSet::new();
        vars.set_float("A", 1.0);
        vars.set_float("B", 2.0);
        assert!(!vars.rename("A", "B"));
        assert!(!vars.rename("Missing", "D"));
    }

    #[test]
    fn test_trigger_reset() {
        let mut vars = VariableSet::new();
        vars.set_trigger("Fire");
        assert_eq!(vars.get("Fire").unwrap().value.as_bool(), Some(true));

        vars.reset_trigger("Fire");
        assert_eq!(vars.get("Fire").unwrap().value.as_bool(), Some(false));
        assert_eq!(
            vars.get("Fire").unwrap().variable_type(),
            VariableType::Trigger
        );
    }
}
