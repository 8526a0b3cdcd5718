//! R code generation.

use super::ast::{BinaryOp, Block, Callee, Expr, Part, Program, Stmt, StmtKind, Target, UnaryOp};

/// Layout options for generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// One level of indentation.
    pub indent: String,
    /// Whether source comments are carried over.
    pub keep_comments: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            keep_comments: true,
        }
    }
}

/// Render a program as R source. Non-empty output ends with a newline.
pub fn emit(program: &Program, options: &EmitOptions) -> String {
    let mut emitter = Emitter {
        options,
        lines: Vec::new(),
        depth: 0,
        in_function: false,
    };
    emitter.block(&program.body);
    if emitter.lines.is_empty() {
        return String::new();
    }
    let mut code = emitter.lines.join("\n");
    code.push('\n');
    code
}

// Binding strength of R operators, loosest first.
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_COMPARE: u8 = 4;
const PREC_ADD: u8 = 5;
const PREC_MUL: u8 = 6;
const PREC_SPECIAL: u8 = 7;
const PREC_RANGE: u8 = 8;
const PREC_UNARY: u8 = 9;
const PREC_POW: u8 = 10;
const PREC_ATOM: u8 = 11;

struct Emitter<'a> {
    options: &'a EmitOptions,
    lines: Vec<String>,
    depth: usize,
    in_function: bool,
}

impl Emitter<'_> {
    fn line(&mut self, text: String) {
        let indent = self.options.indent.repeat(self.depth);
        self.lines.push(format!("{}{}", indent, text));
    }

    fn with_comment(&self, text: String, comment: &Option<String>) -> String {
        match comment {
            Some(comment) if self.options.keep_comments => format!("{} #{}", text, comment),
            _ => text,
        }
    }

    fn block(&mut self, block: &Block) {
        for stmt in block {
            self.stmt(stmt);
        }
    }

    fn nested(&mut self, block: &Block) {
        self.depth += 1;
        self.block(block);
        self.depth -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Blank => self.lines.push(String::new()),
            StmtKind::Comment(text) => {
                if self.options.keep_comments {
                    self.line(format!("#{}", text));
                }
            }
            StmtKind::Assign { target, value } => {
                let target = match target {
                    Target::Var { name, .. } => r_name(name),
                    Target::Index { name, indices, .. } => {
                        let mut text = r_name(name);
                        for index in indices {
                            text = format!("{}[[{}]]", text, index_expr(&text, index));
                        }
                        text
                    }
                };
                let text = format!("{} <- {}", target, expr(value));
                self.line(self.with_comment(text, &stmt.comment));
            }
            StmtKind::Expr(value) => {
                let text = expr(value);
                self.line(self.with_comment(text, &stmt.comment));
            }
            StmtKind::If {
                branches,
                otherwise,
            } => {
                for (i, branch) in branches.iter().enumerate() {
                    let condition = expr(&branch.condition);
                    if i == 0 {
                        self.line(format!("if ({}) {{", condition));
                    } else {
                        self.line(format!("}} else if ({}) {{", condition));
                    }
                    self.nested(&branch.body);
                }
                if let Some(body) = otherwise {
                    self.line("} else {".to_string());
                    self.nested(body);
                }
                self.close(&stmt.comment);
            }
            StmtKind::While { condition, body } => {
                self.line(format!("while ({}) {{", expr(condition)));
                self.nested(body);
                self.close(&stmt.comment);
            }
            StmtKind::Until { condition, body } => {
                self.line(format!("while (!({})) {{", expr(condition)));
                self.nested(body);
                self.close(&stmt.comment);
            }
            StmtKind::For {
                var,
                iterable,
                body,
                ..
            } => {
                self.line(format!("for ({} in {}) {{", r_name(var), expr(iterable)));
                self.nested(body);
                self.close(&stmt.comment);
            }
            StmtKind::Def {
                name, params, body, ..
            } => {
                let params: Vec<String> = params.iter().map(|p| r_name(&p.name)).collect();
                self.line(format!(
                    "{} <- function({}) {{",
                    r_name(name),
                    params.join(", ")
                ));
                let outer = std::mem::replace(&mut self.in_function, true);
                self.nested(body);
                self.in_function = outer;
                self.close(&stmt.comment);
            }
            StmtKind::Return(value) => {
                let text = if !self.in_function {
                    "quit(save = \"no\")".to_string()
                } else {
                    match value {
                        Some(value) => format!("return({})", expr(value)),
                        None => "return()".to_string(),
                    }
                };
                self.line(self.with_comment(text, &stmt.comment));
            }
            StmtKind::Next => self.line(self.with_comment("next".to_string(), &stmt.comment)),
            StmtKind::Break => self.line(self.with_comment("break".to_string(), &stmt.comment)),
        }
    }

    fn close(&mut self, comment: &Option<String>) {
        let text = self.with_comment("}".to_string(), comment);
        self.line(text);
    }
}

/// R has no `?` in plain identifiers.
fn r_name(name: &str) -> String {
    match name.strip_suffix('?') {
        Some(stem) => format!("{}_p", stem),
        None => name.to_string(),
    }
}

fn expr(e: &Expr) -> String {
    render(e).0
}

fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => PREC_OR,
        BinaryOp::And => PREC_AND,
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Less
        | BinaryOp::Greater
        | BinaryOp::LessEq
        | BinaryOp::GreaterEq => PREC_COMPARE,
        BinaryOp::Add | BinaryOp::Sub => PREC_ADD,
        BinaryOp::Mul | BinaryOp::Div => PREC_MUL,
        BinaryOp::Mod | BinaryOp::IntDiv => PREC_SPECIAL,
        BinaryOp::Pow => PREC_POW,
    }
}

fn operator(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::IntDiv => "%/%",
        BinaryOp::Mod => "%%",
        BinaryOp::Pow => "^",
        BinaryOp::Eq => "==",
        BinaryOp::NotEq => "!=",
        BinaryOp::Less => "<",
        BinaryOp::Greater => ">",
        BinaryOp::LessEq => "<=",
        BinaryOp::GreaterEq => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

/// Render `e` if it binds at least as tightly as `min`, else parenthesize.
fn operand(e: &Expr, min: u8) -> String {
    let (text, prec) = render(e);
    if prec < min {
        format!("({})", text)
    } else {
        text
    }
}

/// Rendered text and its precedence.
fn render(e: &Expr) -> (String, u8) {
    match e {
        Expr::Integer(n) if *n < 0 => (n.to_string(), PREC_UNARY),
        Expr::Integer(n) => (n.to_string(), PREC_ATOM),
        Expr::Float(text) => (text.clone(), PREC_ATOM),
        Expr::Str { value, quote } => (format!("{0}{1}{0}", quote, value), PREC_ATOM),
        Expr::Bool(true) => ("TRUE".to_string(), PREC_ATOM),
        Expr::Bool(false) => ("FALSE".to_string(), PREC_ATOM),
        Expr::Nil => ("NULL".to_string(), PREC_ATOM),
        Expr::Array(items) => {
            let nested = items.iter().any(|item| matches!(item, Expr::Array(_)));
            let func = if nested { "list" } else { "c" };
            (format!("{}({})", func, list(items)), PREC_ATOM)
        }
        Expr::Var { name, .. } => (r_name(name), PREC_ATOM),
        Expr::Index { target, index } => {
            let base = operand(target, PREC_ATOM);
            let index = index_expr(&base, index);
            (format!("{}[[{}]]", base, index), PREC_ATOM)
        }
        Expr::Call { callee, args } => {
            let name = match callee {
                Callee::User { name, .. } => r_name(name),
                Callee::Builtin(builtin) => builtin.target().to_string(),
            };
            (format!("{}({})", name, list(args)), PREC_ATOM)
        }
        Expr::Unary { op, operand: inner } => match op {
            UnaryOp::Not => {
                let (text, prec) = render(inner);
                if prec == PREC_ATOM {
                    (format!("!{}", text), PREC_NOT)
                } else {
                    (format!("!({})", text), PREC_NOT)
                }
            }
            UnaryOp::Neg => (format!("-{}", operand(inner, PREC_UNARY)), PREC_UNARY),
            UnaryOp::Pos => (format!("+{}", operand(inner, PREC_UNARY)), PREC_UNARY),
        },
        Expr::Binary { op, lhs, rhs } => {
            let prec = precedence(*op);
            // `^` groups to the right, everything else to the left.
            let (left_min, right_min) = if *op == BinaryOp::Pow {
                (prec + 1, prec)
            } else {
                (prec, prec + 1)
            };
            let text = format!(
                "{} {} {}",
                operand(lhs, left_min),
                operator(*op),
                operand(rhs, right_min)
            );
            (text, prec)
        }
        Expr::Concat(items) => (format!("paste0({})", list(items)), PREC_ATOM),
        Expr::Interpolated(parts) => {
            let items: Vec<String> = parts
                .iter()
                .map(|part| match part {
                    Part::Text(text) => format!("\"{}\"", text),
                    Part::Expr(e) => expr(e),
                })
                .collect();
            (format!("paste0({})", items.join(", ")), PREC_ATOM)
        }
        Expr::Range { start, end } => {
            let text = format!(
                "{}:{}",
                operand(start, PREC_RANGE + 1),
                operand(end, PREC_RANGE + 1)
            );
            (text, PREC_RANGE)
        }
    }
}

fn list(items: &[Expr]) -> String {
    items.iter().map(expr).collect::<Vec<_>>().join(", ")
}

/// Convert a zero-based Ruby index into a one-based R index on `base`.
fn index_expr(base: &str, index: &Expr) -> String {
    let literal = match index {
        Expr::Integer(n) => Some(*n),
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => match operand.as_ref() {
            Expr::Integer(n) => n.checked_neg(),
            _ => None,
        },
        _ => None,
    };
    match literal {
        Some(n) if n >= 0 => match n.checked_add(1) {
            Some(one_based) => one_based.to_string(),
            None => format!("{} + 1", n),
        },
        Some(-1) => format!("length({})", base),
        Some(n) => format!("length({}) - {}", base, -(n + 1)),
        None => format!("{} + 1", operand(index, PREC_ADD)),
    }
}
