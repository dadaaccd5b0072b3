//! Core language definitions for the Strand scripting language.
//!
//! This crate contains the constructs shared between the statement
//! classifier and the interpreter: the runtime value variants, the
//! classified statement forms, the small expression AST used by the
//! evaluator's arithmetic fallback, and the runtime error taxonomy.
//! It performs no I/O and holds no execution logic.

use std::fmt;
use thiserror::Error;

// --- Runtime values ---

/// A runtime value. A variable always holds exactly one variant at a
/// time; re-assignment may change the variant. Lists are mutated in
/// place by the list statements, never copied implicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Variant name as reported by the `type` builtin.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Text(_) => "str",
            Value::List(_) => "list",
        }
    }

    /// Truthiness as used by the `all` builtin: nonzero, nonempty text,
    /// nonempty list.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Text(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

// --- Classified statements ---

/// Comparator selected by a branch keyword: `if` is equality, `ifn`
/// not-equal, `ifs` greater-than, `ifb` less-than.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    Less,
}

/// One physical line of a program, classified by the ordered keyword
/// table in `strand_parser`. Fields hold raw source fragments; all
/// resolution and evaluation happens in the interpreter, so the same
/// fragment can be re-evaluated on every loop pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Print(String),
    CPrint(String),
    Input { name: String, prompt: Option<String> },
    For { var: String, start: String, end: String, action: String },
    Use(String),
    Branch { op: Comparison, condition: String, value: String, action: String },
    FunctionDef { name: String, body: Vec<String> },
    Call { name: String, args: Vec<String> },
    Assign { name: String, expr: String },
    Copy { from: String, to: String },
    Append { list: String, value: String },
    Pop { list: String, index: String },
    Exec(String),
    WriteFile { path: String, content: String },
    Delete(String),
    WhileNot { condition: String, value: String, action: String },
    While { condition: String, value: String, action: String },
    Increment(String),
    Decrement(String),
    Move { from: String, to: String, list: String },
    Swap { left: String, right: String, list: String },
    Stop,
    Empty,
    Invalid(String),
}

// --- Arithmetic fallback expressions ---

/// AST of the arithmetic/relational mini-expression grammar the
/// evaluator falls back to when nothing else matches. It binds only to
/// the variable store; there is no call form and no side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Var(String),
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

// --- Runtime errors ---

/// An error raised while processing a single statement. Every variant is
/// recovered at the statement boundary: the interpreter writes one
/// diagnostic line to the output stream and continues with the next
/// statement. Nothing here unwinds past the currently executing fragment.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Malformed statement or wrong argument count for a known shape.
    #[error("{0}")]
    SyntaxShape(String),
    /// Unknown variable name.
    #[error("Variable '{0}' is not defined")]
    Reference(String),
    /// Call of a function that was never defined.
    #[error("Function '{0}' is not defined")]
    UndefinedFunction(String),
    /// Missing or unreadable file on read, write or import.
    #[error("{0}")]
    Io(String),
    /// Operation applied to a value of the wrong variant.
    #[error("{0}")]
    Type(String),
    #[error("Index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("Shell access is disabled; run with --allow-exec to enable it")]
    ExecDisabled,
}
