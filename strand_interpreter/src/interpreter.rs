use crate::ast::{
    BinaryOp, Comparison, ExecutionContext, Expr, RuntimeError, Statement, UnaryOp, Value,
};
use crate::stdlib;
use std::cmp::Ordering;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Outcome of dispatching one statement. `Stop` terminates only the
/// `execute` call that is currently walking lines, not any enclosing
/// fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// The Strand interpreter. All program output and diagnostics go to the
/// output sink `W`; the CLI uses stdout, tests capture a `Vec<u8>`.
pub struct Interpreter<W: Write> {
    pub ctx: ExecutionContext,
    out: W,
    allow_exec: bool,
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Self {
        Interpreter::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Self {
        Interpreter {
            ctx: ExecutionContext::new(),
            out,
            allow_exec: false,
        }
    }

    /// Grants the `exec` statement access to the host shell. Disabled by
    /// default; the CLI enables it for `--allow-exec`.
    pub fn allow_exec(&mut self, allowed: bool) {
        self.allow_exec = allowed;
    }

    /// Consumes the interpreter and hands back the output sink, so tests
    /// can inspect the captured text.
    pub fn into_output(self) -> W {
        self.out
    }

    // --- Entry contract ---

    /// Loads and runs a top-level program file. Positional arguments are
    /// bound to `parg0..pargN` as text before the first line executes.
    /// The only fatal error is an unreadable program file; everything
    /// after that is reported on the output stream and recovered.
    pub fn run_file(&mut self, path: &Path, args: &[String]) -> Result<(), RuntimeError> {
        let source = fs::read_to_string(path).map_err(|e| {
            RuntimeError::Io(format!("Cannot open program file '{}': {}", path.display(), e))
        })?;
        self.ctx.current_file = path.to_path_buf();
        for (i, arg) in args.iter().enumerate() {
            self.ctx.set(format!("parg{}", i), Value::Text(arg.clone()));
        }
        self.ctx.current_line = 0;
        self.execute(&source);
        Ok(())
    }

    // --- Dispatcher ---

    /// Executes a program fragment, one statement per physical line.
    /// Fragments recurse through here: loop bodies, branch actions and
    /// function bodies are fragments of their own, walked with the same
    /// shared context (and the same shared line counter). An error is
    /// reported at the line that raised it and the walk continues; only
    /// `stop` breaks out of the current fragment.
    pub fn execute(&mut self, program: &str) {
        for line in program.lines() {
            self.ctx.current_line += 1;
            let statement = strand_parser::classify(line);
            match self.dispatch(statement) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break,
                Err(err) => self.report(&err),
            }
        }
    }

    fn report(&mut self, err: &RuntimeError) {
        let line = self.ctx.current_line;
        let _ = writeln!(self.out, "Error at line {}: {}", line, err);
    }

    fn dispatch(&mut self, statement: Statement) -> Result<Flow, RuntimeError> {
        match statement {
            Statement::Print(expr) => self.print(&expr)?,
            Statement::CPrint(expr) => self.cprint(&expr)?,
            Statement::Input { name, prompt } => self.input(&name, prompt.as_deref())?,
            Statement::For { var, start, end, action } => {
                self.run_for(&var, &start, &end, &action)?
            }
            Statement::Use(path) => self.import_module(&path)?,
            Statement::Branch { op, condition, value, action } => {
                self.branch(op, &condition, &value, &action)
            }
            Statement::FunctionDef { name, body } => self.ctx.define_function(name, body),
            Statement::Call { name, args } => self.call(&name, &args)?,
            Statement::Assign { name, expr } => {
                if let Some(value) = self.evaluate(&expr)? {
                    self.ctx.set(name, value);
                }
            }
            Statement::Copy { from, to } => stdlib::copy_list(&mut self.ctx, &from, &to)?,
            Statement::Append { list, value } => {
                if let Some(value) = self.evaluate(&value)? {
                    stdlib::append(&mut self.ctx, &list, value)?;
                }
            }
            Statement::Pop { list, index } => {
                let index = self.resolve_index(&index)?;
                stdlib::pop(&mut self.ctx, &list, index)?;
            }
            Statement::Exec(command) => self.exec(&command)?,
            Statement::WriteFile { path, content } => self.write_file(&path, &content)?,
            Statement::Delete(name) => {
                if self.ctx.remove(&name).is_none() {
                    return Err(RuntimeError::Reference(name));
                }
            }
            Statement::WhileNot { condition, value, action } => {
                self.run_while(&condition, &value, &action, true)?
            }
            Statement::While { condition, value, action } => {
                self.run_while(&condition, &value, &action, false)?
            }
            Statement::Increment(name) => self.adjust(&name, 1)?,
            Statement::Decrement(name) => self.adjust(&name, -1)?,
            Statement::Move { from, to, list } => {
                let from = self.resolve_index(&from)?;
                let to = self.resolve_index(&to)?;
                stdlib::move_element(&mut self.ctx, &list, from, to)?;
            }
            Statement::Swap { left, right, list } => {
                let left = self.resolve_index(&left)?;
                let right = self.resolve_index(&right)?;
                stdlib::swap_elements(&mut self.ctx, &list, left, right)?;
            }
            Statement::Stop => {
                self.wait_for_enter();
                return Ok(Flow::Stop);
            }
            Statement::Empty => {}
            Statement::Invalid(text) => {
                let line = self.ctx.current_line;
                let _ = writeln!(self.out, "Invalid statement at line {}: {}", line, text);
            }
        }
        Ok(Flow::Continue)
    }

    // --- Statements ---

    fn print(&mut self, expr: &str) -> Result<(), RuntimeError> {
        let Some(value) = self.evaluate(expr)? else {
            return Ok(());
        };
        let text = match &value {
            // A literal backslash-n in program text stands for a newline.
            Value::Text(s) if s.contains("\\n") => s.replace("\\n", "\n"),
            other => other.to_string(),
        };
        let _ = writeln!(self.out, "{}", text);
        Ok(())
    }

    /// `cprint` adds one level of indirection: a non-numeric result is
    /// itself evaluated again before printing.
    fn cprint(&mut self, expr: &str) -> Result<(), RuntimeError> {
        let Some(value) = self.evaluate(expr)? else {
            return Ok(());
        };
        let text = value.to_string();
        if strand_parser::is_digits(&text) {
            let _ = writeln!(self.out, "{}", text);
            return Ok(());
        }
        if let Some(resolved) = self.evaluate(&text)? {
            let _ = writeln!(self.out, "{}", resolved);
        }
        Ok(())
    }

    fn input(&mut self, name: &str, prompt: Option<&str>) -> Result<(), RuntimeError> {
        if let Some(prompt) = prompt {
            let _ = write!(self.out, "{}", prompt);
            let _ = self.out.flush();
        }
        let mut buffer = String::new();
        io::stdin()
            .read_line(&mut buffer)
            .map_err(|e| RuntimeError::Io(format!("Cannot read input: {}", e)))?;
        while buffer.ends_with('\n') || buffer.ends_with('\r') {
            buffer.pop();
        }
        self.ctx.set(name, Value::Text(buffer));
        Ok(())
    }

    fn run_for(
        &mut self,
        var: &str,
        start: &str,
        end: &str,
        action: &str,
    ) -> Result<(), RuntimeError> {
        let start_val = self.evaluate(start)?;
        let end_val = self.evaluate(end)?;
        match (start_val, end_val) {
            (Some(Value::Int(lo)), Some(Value::Int(hi))) => {
                // The range is inclusive on both ends.
                for i in lo..=hi {
                    self.ctx.set(var, Value::Int(i));
                    self.execute(action);
                }
                Ok(())
            }
            _ => Err(RuntimeError::Type(format!(
                "Invalid range '{}:{}' in for loop",
                start, end
            ))),
        }
    }

    fn branch(&mut self, op: Comparison, condition: &str, value: &str, action: &str) {
        // A `*` in either operand field is a wildcard that forces the
        // action regardless of the comparison.
        if condition == "*" || value == "*" {
            self.execute(action);
            return;
        }
        let cond = self.resolve_operand(condition);
        let val = self.resolve_operand(value);
        let holds = match op {
            Comparison::Equal => val.to_string() == cond.to_string(),
            Comparison::NotEqual => val.to_string() != cond.to_string(),
            Comparison::Greater => compare_order(&val, &cond) == Ordering::Greater,
            Comparison::Less => compare_order(&val, &cond) == Ordering::Less,
        };
        if holds {
            self.execute(action);
        }
    }

    fn call(&mut self, name: &str, args: &[String]) -> Result<(), RuntimeError> {
        let Some(body) = self.ctx.functions.get(name).cloned() else {
            return Err(RuntimeError::UndefinedFunction(name.to_string()));
        };
        // Arguments land in the global store as arg1..argN, overwriting
        // any prior values. They stay visible after the call returns.
        for (i, arg) in args.iter().enumerate() {
            let value = self.resolve_operand(arg);
            self.ctx.set(format!("arg{}", i + 1), value);
        }
        for statement_src in body {
            self.execute(&statement_src);
        }
        Ok(())
    }

    fn run_while(
        &mut self,
        condition: &str,
        value: &str,
        action: &str,
        negated: bool,
    ) -> Result<(), RuntimeError> {
        loop {
            let lhs = self.resolve_loop_operand(condition)?;
            let rhs = self.resolve_loop_operand(value)?;
            let equal = lhs == rhs;
            if equal == negated {
                return Ok(());
            }
            self.execute(action);
        }
    }

    fn adjust(&mut self, name: &str, delta: i64) -> Result<(), RuntimeError> {
        match self.ctx.variables.get_mut(name) {
            Some(Value::Int(n)) => {
                *n = n.wrapping_add(delta);
                Ok(())
            }
            Some(other) => Err(RuntimeError::Type(format!(
                "Cannot increment '{}': expected int, found {}",
                name,
                other.type_name()
            ))),
            None => Err(RuntimeError::Reference(name.to_string())),
        }
    }

    fn exec(&mut self, command: &str) -> Result<(), RuntimeError> {
        if !self.allow_exec {
            return Err(RuntimeError::ExecDisabled);
        }
        // Inherits the process's standard streams and blocks until the
        // command finishes; the exit status is not surfaced.
        shell_command(command)
            .status()
            .map_err(|e| RuntimeError::Io(format!("Cannot run shell command: {}", e)))?;
        Ok(())
    }

    fn write_file(&mut self, path: &str, content: &str) -> Result<(), RuntimeError> {
        let path = self.resolve_operand(path).to_string();
        let text = match self.resolve_operand(content) {
            // A list is written one element per line.
            Value::List(items) => items
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        };
        fs::write(&path, text)
            .map_err(|e| RuntimeError::Io(format!("Cannot write file '{}': {}", path, e)))
    }

    fn wait_for_enter(&mut self) {
        let mut buffer = String::new();
        let _ = io::stdin().read_line(&mut buffer);
    }

    // --- Module importer ---

    /// Loads function definitions from another source file. Only the
    /// `/name{...}` shape is recognized; every other non-blank line is
    /// reported invalid without aborting the import. Imported functions
    /// overwrite same-named entries.
    fn import_module(&mut self, path: &str) -> Result<(), RuntimeError> {
        let resolved = self.resolve_import_path(path);
        let source = fs::read_to_string(&resolved).map_err(|e| {
            RuntimeError::Io(format!("Cannot open module '{}': {}", resolved.display(), e))
        })?;
        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match strand_parser::classify(line) {
                Statement::FunctionDef { name, body } => self.ctx.define_function(name, body),
                _ => {
                    let _ = writeln!(self.out, "Invalid statement in module '{}': {}", path, line);
                }
            }
        }
        Ok(())
    }

    /// `./` paths resolve against the directory of the top-level program
    /// file, not the importing fragment.
    fn resolve_import_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("./") {
            if let Some(dir) = self.ctx.current_file.parent() {
                return dir.join(rest);
            }
        }
        PathBuf::from(path)
    }

    // --- Operand resolution ---

    /// Branch, loop and call-site operands: quoted literal, then
    /// variable, then digit literal, then the raw token as text.
    fn resolve_operand(&self, token: &str) -> Value {
        let token = token.trim();
        if let Some(text) = strand_parser::strip_quotes(token) {
            return Value::Text(text.to_string());
        }
        if let Some(value) = self.ctx.get(token) {
            return value.clone();
        }
        if strand_parser::is_digits(token) {
            if let Ok(n) = token.parse() {
                return Value::Int(n);
            }
        }
        Value::Text(token.to_string())
    }

    /// Loop operands keep two resolution paths: a textually quoted
    /// operand stays a fixed literal, anything else goes through the
    /// full expression evaluator on every pass.
    fn resolve_loop_operand(&mut self, token: &str) -> Result<String, RuntimeError> {
        let token = token.trim();
        if let Some(text) = strand_parser::strip_quotes(token) {
            return Ok(text.to_string());
        }
        match self.evaluate(token)? {
            Some(value) => Ok(value.to_string()),
            None => Ok(token.to_string()),
        }
    }

    /// Text-form resolution for builtin arguments: quoted literal, then
    /// variable text form, then the raw token.
    fn resolve_text(&self, token: &str) -> String {
        let token = token.trim();
        if let Some(text) = strand_parser::strip_quotes(token) {
            return text.to_string();
        }
        if let Some(value) = self.ctx.get(token) {
            return value.to_string();
        }
        token.to_string()
    }

    /// List indices: a digit literal or an integer variable.
    fn resolve_index(&self, token: &str) -> Result<i64, RuntimeError> {
        let token = token.trim();
        if strand_parser::is_digits(token) {
            return token
                .parse()
                .map_err(|_| RuntimeError::Type(format!("Index '{}' is out of range", token)));
        }
        match self.ctx.get(token) {
            Some(Value::Int(n)) => Ok(*n),
            Some(other) => Err(RuntimeError::Type(format!(
                "Index '{}' is not an integer (found {})",
                token,
                other.type_name()
            ))),
            None => Err(RuntimeError::Reference(token.to_string())),
        }
    }

    // --- Expression evaluator ---

    /// Evaluates one expression string. `Ok(None)` is the "no value"
    /// outcome: it is never stored in a variable, and statements skip
    /// their effect when they receive it. The resolution order is fixed:
    /// digit literal, quoted literal, variable, `+` chain, cast hint,
    /// builtin, arithmetic fallback.
    pub fn evaluate(&mut self, expr: &str) -> Result<Option<Value>, RuntimeError> {
        let expr = expr.trim();
        if strand_parser::is_digits(expr) {
            let n = expr.parse().map_err(|_| {
                RuntimeError::Type(format!("Integer literal '{}' is out of range", expr))
            })?;
            return Ok(Some(Value::Int(n)));
        }
        if let Some(text) = strand_parser::strip_quotes(expr) {
            return Ok(Some(Value::Text(text.to_string())));
        }
        if let Some(value) = self.ctx.get(expr) {
            return Ok(Some(value.clone()));
        }
        if expr.contains('+') {
            return self.eval_chain(expr);
        }
        if let Some((lhs, rhs)) = expr.split_once('=') {
            return self.eval_cast(lhs.trim(), rhs.trim());
        }
        if let Some((name, args)) = builtin_shape(expr) {
            if stdlib::is_builtin(name) {
                return self.eval_builtin(name, args);
            }
        }
        // Last resort: the arithmetic/relational mini-expression grammar
        // bound to the variable store. Failures are reported here and
        // yield no value instead of aborting the statement.
        match strand_parser::parse_expr(expr) {
            Ok(parsed) => match self.eval_arith(&parsed) {
                Ok(n) => Ok(Some(Value::Int(n))),
                Err(err) => {
                    self.report(&err);
                    Ok(None)
                }
            },
            Err(message) => {
                self.report(&RuntimeError::SyntaxShape(message));
                Ok(None)
            }
        }
    }

    /// A `+` chain sums if every part is an integer and concatenates if
    /// every part is text. Anything mixed yields no value, silently.
    fn eval_chain(&mut self, expr: &str) -> Result<Option<Value>, RuntimeError> {
        let mut ints = Vec::new();
        let mut texts = Vec::new();
        let mut count = 0usize;
        for part in expr.split('+') {
            count += 1;
            match self.evaluate(part.trim())? {
                Some(Value::Int(n)) => ints.push(n),
                Some(Value::Text(s)) => texts.push(s),
                Some(Value::List(_)) | None => return Ok(None),
            }
        }
        if ints.len() == count {
            let sum = ints.iter().fold(0i64, |acc, n| acc.wrapping_add(*n));
            Ok(Some(Value::Int(sum)))
        } else if texts.len() == count {
            Ok(Some(Value::Text(texts.concat())))
        } else {
            Ok(None)
        }
    }

    /// Legacy cast-hint form: a left side of `int(...)` or `str(...)`
    /// coerces the evaluated right side; any other left side evaluates
    /// the right side plainly. Kept as-is for compatibility.
    fn eval_cast(&mut self, lhs: &str, rhs: &str) -> Result<Option<Value>, RuntimeError> {
        let Some(value) = self.evaluate(rhs)? else {
            return Ok(None);
        };
        if lhs.starts_with("int(") {
            let text = value.to_string();
            return match text.trim().parse::<i64>() {
                Ok(n) => Ok(Some(Value::Int(n))),
                Err(_) => Err(RuntimeError::Type(format!(
                    "Cannot convert '{}' to int",
                    text
                ))),
            };
        }
        if lhs.starts_with("str(") {
            return Ok(Some(Value::Text(value.to_string())));
        }
        Ok(Some(value))
    }

    // --- Builtins ---

    fn eval_builtin(&mut self, name: &str, args: &str) -> Result<Option<Value>, RuntimeError> {
        match name {
            "type" => {
                let Some(value) = self.evaluate(args)? else {
                    return Ok(None);
                };
                Ok(Some(Value::Text(value.type_name().to_string())))
            }
            "len" => stdlib::len_of(&self.ctx, args.trim()).map(Some),
            "splitby" => {
                let (sep, rest) = strand_parser::split_once_unquoted(args, ',').ok_or_else(
                    || RuntimeError::SyntaxShape("'splitby' expects two arguments".to_string()),
                )?;
                let sep = self.resolve_text(sep);
                let text = self.resolve_text(rest);
                Ok(Some(stdlib::split_by(&sep, &text)))
            }
            "split" => {
                let text = self.resolve_text(args);
                Ok(Some(stdlib::split_whitespace(&text)))
            }
            "splitlines" => stdlib::split_lines(&self.ctx, args.trim()).map(Some),
            "read" => {
                let path = self.resolve_text(args);
                match fs::read_to_string(&path) {
                    Ok(text) => Ok(Some(Value::Text(text))),
                    Err(e) => {
                        // A missing file reads as empty text, with the
                        // error reported alongside.
                        self.report(&RuntimeError::Io(format!(
                            "Cannot read file '{}': {}",
                            path, e
                        )));
                        Ok(Some(Value::Text(String::new())))
                    }
                }
            }
            "in" => {
                let (list, needle) = strand_parser::split_once_unquoted(args, ',').ok_or_else(
                    || RuntimeError::SyntaxShape("'in' expects two arguments".to_string()),
                )?;
                let needle = stdlib::resolve_literal_first(&self.ctx, needle);
                let found = stdlib::list_contains(&self.ctx, list.trim(), &needle)?;
                Ok(Some(Value::Int(found as i64)))
            }
            "index" => {
                let (list, needle) = strand_parser::split_once_unquoted(args, ',').ok_or_else(
                    || RuntimeError::SyntaxShape("'index' expects two arguments".to_string()),
                )?;
                let needle = stdlib::resolve_literal_first(&self.ctx, needle);
                match stdlib::index_of(&self.ctx, list.trim(), &needle)? {
                    Some(i) => Ok(Some(Value::Int(i as i64))),
                    None => {
                        self.report(&RuntimeError::Type(format!(
                            "Value '{}' not found in list '{}'",
                            needle,
                            list.trim()
                        )));
                        Ok(None)
                    }
                }
            }
            "all" => stdlib::all_of(&self.ctx, args.trim()).map(Some),
            "isanumber" => {
                let text = self.resolve_text(args);
                Ok(Some(Value::Int(strand_parser::is_digits(&text) as i64)))
            }
            _ => Ok(None),
        }
    }

    // --- Arithmetic fallback ---

    fn eval_arith(&self, expr: &Expr) -> Result<i64, RuntimeError> {
        match expr {
            Expr::Int(n) => Ok(*n),
            Expr::Var(name) => match self.ctx.get(name) {
                Some(Value::Int(n)) => Ok(*n),
                Some(other) => Err(RuntimeError::Type(format!(
                    "Variable '{}' is not an integer (found {})",
                    name,
                    other.type_name()
                ))),
                None => Err(RuntimeError::Reference(name.clone())),
            },
            Expr::Unary { op: UnaryOp::Neg, operand } => {
                Ok(self.eval_arith(operand)?.wrapping_neg())
            }
            Expr::Binary { op, left, right } => {
                let l = self.eval_arith(left)?;
                let r = self.eval_arith(right)?;
                match op {
                    BinaryOp::Add => Ok(l.wrapping_add(r)),
                    BinaryOp::Sub => Ok(l.wrapping_sub(r)),
                    BinaryOp::Mul => Ok(l.wrapping_mul(r)),
                    BinaryOp::Div => {
                        if r == 0 {
                            Err(RuntimeError::Type("Division by zero".to_string()))
                        } else {
                            Ok(l / r)
                        }
                    }
                    BinaryOp::Rem => {
                        if r == 0 {
                            Err(RuntimeError::Type("Division by zero".to_string()))
                        } else {
                            Ok(l % r)
                        }
                    }
                    BinaryOp::Eq => Ok((l == r) as i64),
                    BinaryOp::Ne => Ok((l != r) as i64),
                    BinaryOp::Lt => Ok((l < r) as i64),
                    BinaryOp::Gt => Ok((l > r) as i64),
                    BinaryOp::Le => Ok((l <= r) as i64),
                    BinaryOp::Ge => Ok((l >= r) as i64),
                }
            }
        }
    }
}

/// Ordering comparisons are numeric when both operands are integers and
/// lexicographic over the text forms otherwise.
fn compare_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// The `name(args)` shape that selects a builtin before the arithmetic
/// fallback runs.
fn builtin_shape(expr: &str) -> Option<(&str, &str)> {
    let open = expr.find('(')?;
    let inner = expr[open..].strip_prefix('(')?.strip_suffix(')')?;
    let name = expr[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some((name, inner))
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}
