use std::collections::HashMap;
use std::path::PathBuf;

// Re-export the core language types from strand_ast
pub use strand_ast::*;

// --- Execution context ---

/// The interpreter's only piece of state, created once per run and
/// threaded through every recursive dispatch. Loop bodies, branch
/// actions and function bodies all share it: there is no call-frame
/// isolation, so a nested fragment's mutations (including the line
/// counter) are visible to the caller after it returns.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Global variables. A name holds exactly one `Value` at a time.
    pub variables: HashMap<String, Value>,
    /// User-defined functions: name to the ordered statement-source
    /// strings of the body. Redefinition fully replaces the entry.
    pub functions: HashMap<String, Vec<String>>,
    /// Path of the top-level program file; `./` imports resolve against
    /// its directory.
    pub current_file: PathBuf,
    /// 1-based line counter, used only for diagnostics. Advanced by
    /// whichever fragment is currently being walked.
    pub current_line: usize,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn define_function(&mut self, name: impl Into<String>, body: Vec<String>) {
        self.functions.insert(name.into(), body);
    }
}
