pub mod ast;
pub mod interpreter;
pub mod stdlib;

use interpreter::Interpreter;
use std::io::Write;

impl<W: Write> Interpreter<W> {
    /// Runs a program given as source text, without a backing file.
    /// Relative imports resolve against the working directory in this
    /// mode; `run_file` is the normal entry point.
    pub fn run_source(&mut self, source: &str) {
        self.ctx.current_line = 0;
        self.execute(source);
    }
}
