//! Named remote procedures.

use crate::{BackendError, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A procedure callable through [`DataBackend::rpc`](crate::DataBackend::rpc).
pub type Procedure = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Registry of procedures shared by the bundled backends.
#[derive(Default, Clone)]
pub struct ProcedureRegistry {
    procedures: Arc<RwLock<HashMap<String, Procedure>>>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a procedure.
    pub fn register<F>(&self, name: impl Into<String>, procedure: F)
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.procedures.write().insert(name.into(), Arc::new(procedure));
    }

    /// Invoke a procedure by name.
    pub fn call(&self, name: &str, params: Value) -> Result<Value> {
        let procedure = self
            .procedures
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| BackendError::UnknownProcedure(name.to_string()))?;
        procedure(params)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.procedures.read().contains_key(name)
    }
}

impl std::fmt::Debug for ProcedureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.procedures.read().keys().cloned().collect();
        f.debug_struct("ProcedureRegistry").field("procedures", &names).finish()
    }
}
