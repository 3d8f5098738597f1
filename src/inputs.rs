use std::collections::HashMap;

use crate::variable::{Variable, VariableKey};

/// Crisp values bound to antecedents for one evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inputs(pub(crate) HashMap<VariableKey, f64>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(HashMap::new())
    }

    /// Binds `val` to `var`, replacing any earlier binding. Values are not range checked.
    pub fn add(&mut self, var: Variable, val: f64) -> Option<f64> {
        self.0.insert(var.0, val)
    }

    pub fn get(&self, key: VariableKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    pub fn contains(&self, var: Variable) -> bool {
        self.0.contains_key(&var.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
