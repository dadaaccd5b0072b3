//! Statement classification and expression parsing for Strand.
//!
//! Strand programs are line-oriented: every physical line is one
//! statement. `classify` matches a trimmed line against an ordered
//! keyword table and returns the corresponding `Statement`; the order
//! matters because several keywords share a prefix (`if` is a prefix of
//! `ifs`, `ifb` and `ifn`) and because a bare `=` anywhere in an
//! otherwise unclassified line means assignment. First match wins.
//!
//! The crate also provides the grammar for the evaluator's arithmetic
//! fallback: a small integer expression language with comparisons,
//! parsed by recursive descent into the `Expr` AST from `strand_ast`.

use strand_ast::{BinaryOp, Comparison, Expr, Statement, UnaryOp};

// --- Lexical helpers ---

/// True for a nonempty run of ASCII digits. This is the only numeric
/// literal shape the language has; signs are handled by the arithmetic
/// fallback.
pub fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Strips a matching pair of single or double quotes, if the token is
/// one quoted literal. The inner text must not contain the quote
/// character itself, so `"a"+"b"` is a chain of two literals rather
/// than a single quoted token.
pub fn strip_quotes(token: &str) -> Option<&str> {
    for quote in ['"', '\''] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            let inner = &token[1..token.len() - 1];
            if !inner.contains(quote) {
                return Some(inner);
            }
        }
    }
    None
}

/// Splits on the first `sep` that is not inside a quoted literal.
/// Builtin argument lists use this so that `splitby(",", s)` keeps its
/// quoted separator intact.
pub fn split_once_unquoted(s: &str, sep: char) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == sep => return Some((&s[..i], &s[i + 1..])),
            None => {}
        }
    }
    None
}

// --- Statement classification ---

/// Classifies one physical line. The caller is expected to have split
/// the program into lines already; surrounding whitespace is ignored
/// here. Malformed shapes for a recognized keyword (wrong comma count,
/// missing braces) classify as `Invalid` and are reported by the
/// interpreter with the current line number.
pub fn classify(line: &str) -> Statement {
    let line = line.trim();
    if line.is_empty() {
        return Statement::Empty;
    }
    if let Some(rest) = line.strip_prefix("print ") {
        return Statement::Print(rest.trim().to_string());
    }
    if let Some(rest) = line.strip_prefix("cprint ") {
        return Statement::CPrint(rest.trim().to_string());
    }
    if let Some(rest) = line.strip_prefix("input ") {
        return classify_input(rest.trim());
    }
    if let Some(rest) = line.strip_prefix("for ") {
        return classify_for(line, rest);
    }
    if let Some(rest) = line.strip_prefix("use ") {
        return Statement::Use(rest.trim().to_string());
    }
    // The three-letter branch keywords must be tried before `if`.
    for (keyword, op) in [
        ("ifs ", Comparison::Greater),
        ("ifb ", Comparison::Less),
        ("ifn ", Comparison::NotEqual),
        ("if ", Comparison::Equal),
    ] {
        if let Some(rest) = line.strip_prefix(keyword) {
            return classify_branch(line, op, rest);
        }
    }
    if line.starts_with('/') {
        return classify_function_def(line);
    }
    if line.starts_with('@') {
        return classify_call(line);
    }
    if let Some((name, expr)) = line.split_once('=') {
        return Statement::Assign {
            name: name.trim().to_string(),
            expr: expr.trim().to_string(),
        };
    }
    if let Some(rest) = line.strip_prefix("copy ") {
        return match rest.split_once(',') {
            Some((from, to)) => Statement::Copy {
                from: from.trim().to_string(),
                to: to.trim().to_string(),
            },
            None => Statement::Invalid(line.to_string()),
        };
    }
    if let Some(rest) = line.strip_prefix("append ") {
        return match rest.split_once(',') {
            Some((list, value)) => Statement::Append {
                list: list.trim().to_string(),
                value: value.trim().to_string(),
            },
            None => Statement::Invalid(line.to_string()),
        };
    }
    if let Some(rest) = line.strip_prefix("pop ") {
        return match rest.split_once(',') {
            Some((list, index)) => Statement::Pop {
                list: list.trim().to_string(),
                index: index.trim().to_string(),
            },
            None => Statement::Invalid(line.to_string()),
        };
    }
    if let Some(rest) = line.strip_prefix("exec ") {
        // The remainder goes to the host shell verbatim.
        return Statement::Exec(rest.to_string());
    }
    if let Some(args) = paren_form(line, "write") {
        return match split_once_unquoted(args, ',') {
            Some((path, content)) => Statement::WriteFile {
                path: path.trim().to_string(),
                content: content.trim().to_string(),
            },
            None => Statement::Invalid(line.to_string()),
        };
    }
    if let Some(args) = paren_form(line, "del") {
        return Statement::Delete(args.trim().to_string());
    }
    if let Some(rest) = line.strip_prefix("whilen ") {
        return classify_loop(line, rest, true);
    }
    if let Some(rest) = line.strip_prefix("while ") {
        return classify_loop(line, rest, false);
    }
    if line.contains("++") {
        return Statement::Increment(line.replace("++", "").trim().to_string());
    }
    if line.contains("--") {
        return Statement::Decrement(line.replace("--", "").trim().to_string());
    }
    if let Some(args) = paren_form(line, "move") {
        return match three_args(args) {
            Some((from, to, list)) => Statement::Move { from, to, list },
            None => Statement::Invalid(line.to_string()),
        };
    }
    if let Some(args) = paren_form(line, "swap") {
        return match three_args(args) {
            Some((left, right, list)) => Statement::Swap { left, right, list },
            None => Statement::Invalid(line.to_string()),
        };
    }
    if line == "stop" {
        return Statement::Stop;
    }
    Statement::Invalid(line.to_string())
}

fn classify_input(rest: &str) -> Statement {
    match rest.split_once("::") {
        Some((name, prompt)) => Statement::Input {
            name: name.trim().to_string(),
            prompt: Some(prompt.to_string()),
        },
        None => Statement::Input {
            name: rest.to_string(),
            prompt: None,
        },
    }
}

fn classify_for(line: &str, rest: &str) -> Statement {
    let Some((var, rest)) = rest.split_once(',') else {
        return Statement::Invalid(line.to_string());
    };
    let Some((range, action)) = rest.split_once(',') else {
        return Statement::Invalid(line.to_string());
    };
    let Some((start, end)) = range.split_once(':') else {
        return Statement::Invalid(line.to_string());
    };
    Statement::For {
        var: var.trim().to_string(),
        start: start.trim().to_string(),
        end: end.trim().to_string(),
        action: action.trim().to_string(),
    }
}

fn classify_branch(line: &str, op: Comparison, rest: &str) -> Statement {
    // The action is the remainder after the second comma and may itself
    // contain commas.
    let Some((condition, rest)) = rest.split_once(',') else {
        return Statement::Invalid(line.to_string());
    };
    let Some((value, action)) = rest.split_once(',') else {
        return Statement::Invalid(line.to_string());
    };
    Statement::Branch {
        op,
        condition: condition.trim().to_string(),
        value: value.trim().to_string(),
        action: action.trim().to_string(),
    }
}

fn classify_loop(line: &str, rest: &str, negated: bool) -> Statement {
    let Some((condition, rest)) = rest.split_once(',') else {
        return Statement::Invalid(line.to_string());
    };
    let Some((value, action)) = rest.split_once(',') else {
        return Statement::Invalid(line.to_string());
    };
    let condition = condition.trim().to_string();
    let value = value.trim().to_string();
    let action = action.trim().to_string();
    if negated {
        Statement::WhileNot { condition, value, action }
    } else {
        Statement::While { condition, value, action }
    }
}

/// `/name{stmt|stmt|...}` — the body is everything between the first
/// `{` and the last `}`, split on pipes into statement strings.
fn classify_function_def(line: &str) -> Statement {
    let Some(open) = line.find('{') else {
        return Statement::Invalid(line.to_string());
    };
    let Some(close) = line.rfind('}') else {
        return Statement::Invalid(line.to_string());
    };
    if close < open {
        return Statement::Invalid(line.to_string());
    }
    let name = line[1..open].trim();
    if name.is_empty() {
        return Statement::Invalid(line.to_string());
    }
    let body = line[open + 1..close]
        .split('|')
        .map(|s| s.trim().to_string())
        .collect();
    Statement::FunctionDef {
        name: name.to_string(),
        body,
    }
}

/// `@name(arg,arg,...)` — an empty argument list yields no bindings.
fn classify_call(line: &str) -> Statement {
    let Some(open) = line.find('(') else {
        return Statement::Invalid(line.to_string());
    };
    let Some(close) = line.rfind(')') else {
        return Statement::Invalid(line.to_string());
    };
    if close < open {
        return Statement::Invalid(line.to_string());
    }
    let name = line[1..open].trim();
    if name.is_empty() {
        return Statement::Invalid(line.to_string());
    }
    let args_src = &line[open + 1..close];
    let args = if args_src.trim().is_empty() {
        Vec::new()
    } else {
        args_src.split(',').map(|s| s.trim().to_string()).collect()
    };
    Statement::Call {
        name: name.to_string(),
        args,
    }
}

fn paren_form<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?.trim_start();
    rest.strip_prefix('(')?.strip_suffix(')')
}

fn three_args(args: &str) -> Option<(String, String, String)> {
    let (first, rest) = args.split_once(',')?;
    let (second, third) = rest.split_once(',')?;
    Some((
        first.trim().to_string(),
        second.trim().to_string(),
        third.trim().to_string(),
    ))
}

// --- Arithmetic fallback expressions ---

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    LParen,
    RParen,
}

/// Parses the arithmetic/relational mini-expression grammar:
///
/// ```text
/// comparison := additive (('==' | '!=' | '<' | '>' | '<=' | '>=') additive)?
/// additive   := term (('+' | '-') term)*
/// term       := factor (('*' | '/' | '%') factor)*
/// factor     := INT | IDENT | '-' factor | '(' comparison ')'
/// ```
///
/// Identifiers are resolved against the variable store at evaluation
/// time; nothing else is in scope. Note that the evaluator claims any
/// expression containing `=` for the cast-hint form before falling
/// back to this grammar, so from program text only `<` and `>` reach
/// the comparison rule; `==`, `!=`, `<=` and `>=` serve direct callers.
pub fn parse_expr(source: &str) -> Result<Expr, String> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err("Empty expression".to_string());
    }
    let mut parser = ExprParser { tokens, pos: 0 };
    let expr = parser.comparison()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!("Unexpected input after expression: '{}'", source.trim()));
    }
    Ok(expr)
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '0'..='9' => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n = digits
                    .parse()
                    .map_err(|_| format!("Integer literal '{}' is out of range", digits))?;
                tokens.push(Token::Int(n));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::EqEq);
                } else {
                    return Err("Expected '==' in expression".to_string());
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ne);
                } else {
                    return Err("Expected '!=' in expression".to_string());
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            other => {
                return Err(format!("Unexpected character '{}' in expression", other));
            }
        }
    }
    Ok(tokens)
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn comparison(&mut self) -> Result<Expr, String> {
        let left = self.additive()?;
        let op = match self.peek() {
            Some(Token::EqEq) => BinaryOp::Eq,
            Some(Token::Ne) => BinaryOp::Ne,
            Some(Token::Lt) => BinaryOp::Lt,
            Some(Token::Gt) => BinaryOp::Gt,
            Some(Token::Le) => BinaryOp::Le,
            Some(Token::Ge) => BinaryOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.additive()?;
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn additive(&mut self) -> Result<Expr, String> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn term(&mut self) -> Result<Expr, String> {
        let mut left = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.factor()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn factor(&mut self) -> Result<Expr, String> {
        match self.advance() {
            Some(Token::Int(n)) => Ok(Expr::Int(n)),
            Some(Token::Ident(name)) => Ok(Expr::Var(name)),
            Some(Token::Minus) => {
                let operand = self.factor()?;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                })
            }
            Some(Token::LParen) => {
                let expr = self.comparison()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(expr),
                    _ => Err("Expected ')' in expression".to_string()),
                }
            }
            _ => Err("Expected a value in expression".to_string()),
        }
    }
}
