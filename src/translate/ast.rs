//! Syntax tree produced by the parser.
//!
//! Names that refer to variables or functions carry the [`SymbolId`] they
//! were resolved to, so later passes never look names up again.

use serde::Serialize;

/// Index into the symbol table arena.
pub type SymbolId = usize;

/// Functions every program can call without defining them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Builtin {
    /// `puts x`, one argument.
    Puts,
    /// `print a, b`, one or more arguments.
    Print,
    /// `readline` or `readline(prompt)`.
    Readline,
}

impl Builtin {
    /// Resolve a builtin by its Ruby name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "puts" => Some(Self::Puts),
            "print" => Some(Self::Print),
            "readline" => Some(Self::Readline),
            _ => None,
        }
    }

    /// The Ruby name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Puts => "puts",
            Self::Print => "print",
            Self::Readline => "readline",
        }
    }

    /// The R function it maps to.
    pub fn target(&self) -> &'static str {
        match self {
            Self::Puts => "print",
            Self::Print => "cat",
            Self::Readline => "readline",
        }
    }

    /// Whether `count` arguments are accepted.
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Self::Puts => count == 1,
            Self::Print => count >= 1,
            Self::Readline => count <= 1,
        }
    }

    /// Expected argument count, for error messages.
    pub fn expected(&self) -> &'static str {
        match self {
            Self::Puts => "1",
            Self::Print => "1+",
            Self::Readline => "0..1",
        }
    }
}

/// What a call invokes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    User { name: String, symbol: SymbolId },
    Builtin(Builtin),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Division with at least one non-integer operand.
    Div,
    /// Division of two integers, which floors.
    IntDiv,
    Mod,
    Pow,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    And,
    Or,
}

impl BinaryOp {
    /// Ruby spelling, for diagnostics.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div | Self::IntDiv => "/",
            Self::Mod => "%",
            Self::Pow => "**",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Less | Self::Greater | Self::LessEq | Self::GreaterEq
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// A piece of an interpolated string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Integer(i64),
    Float(String),
    Str {
        value: String,
        quote: char,
    },
    /// `"text #{expr}"`.
    Interpolated(Vec<Part>),
    Bool(bool),
    Nil,
    Array(Vec<Expr>),
    Var {
        name: String,
        symbol: SymbolId,
    },
    /// `target[index]` with a zero-based index.
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Callee,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// String concatenation, flattened.
    Concat(Vec<Expr>),
    /// Inclusive range `start..end`.
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
    },
}

impl Expr {
    /// Visit every symbol this expression reads or calls.
    pub fn for_each_symbol(&self, f: &mut dyn FnMut(SymbolId)) {
        match self {
            Self::Integer(_) | Self::Float(_) | Self::Str { .. } | Self::Bool(_) | Self::Nil => {}
            Self::Var { symbol, .. } => f(*symbol),
            Self::Interpolated(parts) => {
                for part in parts {
                    if let Part::Expr(expr) = part {
                        expr.for_each_symbol(f);
                    }
                }
            }
            Self::Array(items) | Self::Concat(items) => {
                for item in items {
                    item.for_each_symbol(f);
                }
            }
            Self::Index { target, index } => {
                target.for_each_symbol(f);
                index.for_each_symbol(f);
            }
            Self::Call { callee, args } => {
                if let Callee::User { symbol, .. } = callee {
                    f(*symbol);
                }
                for arg in args {
                    arg.for_each_symbol(f);
                }
            }
            Self::Unary { operand, .. } => operand.for_each_symbol(f),
            Self::Binary { lhs, rhs, .. } => {
                lhs.for_each_symbol(f);
                rhs.for_each_symbol(f);
            }
            Self::Range { start, end } => {
                start.for_each_symbol(f);
                end.for_each_symbol(f);
            }
        }
    }

    /// Whether evaluating this expression calls any function.
    pub fn contains_call(&self) -> bool {
        match self {
            Self::Call { .. } => true,
            Self::Integer(_)
            | Self::Float(_)
            | Self::Str { .. }
            | Self::Bool(_)
            | Self::Nil
            | Self::Var { .. } => false,
            Self::Interpolated(parts) => parts.iter().any(|part| match part {
                Part::Text(_) => false,
                Part::Expr(expr) => expr.contains_call(),
            }),
            Self::Array(items) | Self::Concat(items) => items.iter().any(Expr::contains_call),
            Self::Index { target, index } => target.contains_call() || index.contains_call(),
            Self::Unary { operand, .. } => operand.contains_call(),
            Self::Binary { lhs, rhs, .. } => lhs.contains_call() || rhs.contains_call(),
            Self::Range { start, end } => start.contains_call() || end.contains_call(),
        }
    }
}

/// Left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Var {
        name: String,
        symbol: SymbolId,
    },
    /// `name[i][j] = value`.
    Index {
        name: String,
        symbol: SymbolId,
        indices: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub condition: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub symbol: SymbolId,
}

pub type Block = Vec<Stmt>;

/// A statement with an optional comment trailing it on the same line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub comment: Option<String>,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            kind,
            comment: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.kind, StmtKind::Blank)
    }

    /// Visit every symbol read or called anywhere in this statement.
    pub fn for_each_symbol(&self, f: &mut dyn FnMut(SymbolId)) {
        match &self.kind {
            StmtKind::Blank
            | StmtKind::Comment(_)
            | StmtKind::Next
            | StmtKind::Break
            | StmtKind::Return(None) => {}
            StmtKind::Assign { target, value } => {
                if let Target::Index {
                    symbol, indices, ..
                } = target
                {
                    f(*symbol);
                    for index in indices {
                        index.for_each_symbol(f);
                    }
                }
                value.for_each_symbol(f);
            }
            StmtKind::Expr(expr) | StmtKind::Return(Some(expr)) => expr.for_each_symbol(f),
            StmtKind::If { branches, otherwise } => {
                for branch in branches {
                    branch.condition.for_each_symbol(f);
                    block_symbols(&branch.body, f);
                }
                if let Some(body) = otherwise {
                    block_symbols(body, f);
                }
            }
            StmtKind::While { condition, body } | StmtKind::Until { condition, body } => {
                condition.for_each_symbol(f);
                block_symbols(body, f);
            }
            StmtKind::For { iterable, body, .. } => {
                iterable.for_each_symbol(f);
                block_symbols(body, f);
            }
            StmtKind::Def { body, .. } => block_symbols(body, f),
        }
    }
}

/// Drop leading and trailing blank lines and collapse runs of them.
pub fn tidy_blank_lines(block: &mut Block) {
    let mut previous_blank = true;
    block.retain(|stmt| {
        let blank = stmt.is_blank();
        let keep = !(blank && previous_blank);
        previous_blank = blank;
        keep
    });
    while block.last().is_some_and(Stmt::is_blank) {
        block.pop();
    }
}

fn block_symbols(block: &[Stmt], f: &mut dyn FnMut(SymbolId)) {
    for stmt in block {
        stmt.for_each_symbol(f);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    /// An empty source line, kept for layout.
    Blank,
    /// A comment on its own line.
    Comment(String),
    Assign {
        target: Target,
        value: Expr,
    },
    Expr(Expr),
    If {
        branches: Vec<Branch>,
        otherwise: Option<Block>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    Until {
        condition: Expr,
        body: Block,
    },
    For {
        var: String,
        symbol: SymbolId,
        iterable: Expr,
        body: Block,
    },
    Def {
        name: String,
        symbol: SymbolId,
        params: Vec<Param>,
        body: Block,
    },
    Return(Option<Expr>),
    Next,
    Break,
}

/// A parsed program.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub body: Block,
}
