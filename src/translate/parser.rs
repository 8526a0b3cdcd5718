//! Recursive-descent parser.
//!
//! Names are resolved against the [`SymbolTable`] while parsing, so every
//! semantic check happens in the same pass. When optimizing, integer
//! constants are folded, repeated unary operators collapse and statements
//! that can never run are dropped as they are parsed.

use super::ast::{
    tidy_blank_lines, BinaryOp, Block, Branch, Builtin, Callee, Expr, Param, Part, Program, Stmt,
    StmtKind, Target, UnaryOp,
};
use super::error::{Result, TranslateError};
use super::lexer;
use super::span::Position;
use super::symbols::{SymbolKind, SymbolTable, ValueType};
use super::token::{Keyword, Operator, Token, TokenKind};

/// An expression with its statically known type.
type Typed = (Expr, ValueType);

/// Parse a token stream into a program and the symbols it declares.
pub fn parse(tokens: Vec<Token>, optimize: bool) -> Result<(Program, SymbolTable)> {
    let mut parser = Parser::new(tokens, optimize);
    let program = parser.program()?;
    tracing::debug!(
        "Parsed {} top-level statements, {} symbols",
        program.body.len(),
        parser.symbols.len()
    );
    Ok((program, parser.symbols))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    symbols: SymbolTable,
    optimize: bool,
    loop_depth: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Token>, optimize: bool) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let at = tokens
                .last()
                .map(|t| t.position)
                .unwrap_or_else(Position::start);
            tokens.push(Token::new(TokenKind::Eof, at));
        }
        Self {
            tokens,
            pos: 0,
            symbols: SymbolTable::new(),
            optimize,
            loop_depth: 0,
        }
    }

    // Token access. The stream always ends with Eof and the cursor never
    // moves past it.

    fn token(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek(&self) -> &TokenKind {
        &self.token().kind
    }

    fn peek_nth(&self, n: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)].kind
    }

    fn position(&self) -> Position {
        self.token().position
    }

    fn advance(&mut self) -> Token {
        let token = self.token().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek(), TokenKind::Keyword(k) if *k == keyword)
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_op(&mut self, op: Operator) -> bool {
        if matches!(self.peek(), TokenKind::Op(o) if *o == op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        if *self.peek() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{}`", keyword.as_str())))
        }
    }

    fn unexpected(&self, expected: &str) -> TranslateError {
        TranslateError::syntax(
            self.position(),
            format!("expected {}, found {}", expected, self.peek().describe()),
        )
    }

    /// Skip line breaks inside an unfinished expression.
    fn skip_newlines(&mut self) {
        while matches!(self.peek(), TokenKind::Newline | TokenKind::Comment(_)) {
            self.advance();
        }
    }

    // Statements

    fn program(&mut self) -> Result<Program> {
        let mut body = Vec::new();
        while !matches!(self.peek(), TokenKind::Eof) {
            let Some(stmt) = self.statement()? else {
                continue;
            };
            let ends = self.optimize && matches!(stmt.kind, StmtKind::Return(_));
            body.push(stmt);
            if ends {
                tracing::debug!("Top-level return at {}, ignoring the rest", self.position());
                break;
            }
        }
        tidy_blank_lines(&mut body);
        Ok(Program { body })
    }

    fn scoped_block(&mut self, closers: &[Keyword], lead: Option<Stmt>) -> Result<Block> {
        self.symbols.push_scope();
        let body = self.statements(closers, lead);
        self.symbols.pop_scope();
        body
    }

    fn statements(&mut self, closers: &[Keyword], lead: Option<Stmt>) -> Result<Block> {
        let mut body: Block = lead.into_iter().collect();
        let mut terminated = false;
        loop {
            match self.peek() {
                TokenKind::Keyword(k) if closers.contains(k) => break,
                TokenKind::Eof => return Err(self.unexpected("`end`")),
                _ => {}
            }
            let Some(stmt) = self.statement()? else {
                continue;
            };
            if terminated {
                let symbols = &mut self.symbols;
                stmt.for_each_symbol(&mut |id| symbols.release(id));
                continue;
            }
            terminated = self.optimize
                && matches!(
                    stmt.kind,
                    StmtKind::Return(_) | StmtKind::Next | StmtKind::Break
                );
            body.push(stmt);
        }
        tidy_blank_lines(&mut body);
        Ok(body)
    }

    fn statement(&mut self) -> Result<Option<Stmt>> {
        let at = self.position();
        let kind = match self.peek().clone() {
            TokenKind::Newline => {
                self.advance();
                return Ok(Some(Stmt::new(StmtKind::Blank)));
            }
            TokenKind::Semicolon => {
                self.advance();
                return Ok(None);
            }
            TokenKind::Comment(text) => {
                self.advance();
                self.eat(&TokenKind::Newline);
                return Ok(Some(Stmt::new(StmtKind::Comment(text))));
            }
            TokenKind::Keyword(Keyword::If) => self.if_statement()?,
            TokenKind::Keyword(Keyword::While) => self.while_statement(false)?,
            TokenKind::Keyword(Keyword::Until) => self.while_statement(true)?,
            TokenKind::Keyword(Keyword::For) => self.for_statement()?,
            TokenKind::Keyword(Keyword::Def) => self.def_statement()?,
            TokenKind::Keyword(Keyword::Return) => self.return_statement()?,
            TokenKind::Keyword(keyword @ (Keyword::Next | Keyword::Break)) => {
                if self.loop_depth == 0 {
                    return Err(TranslateError::semantic(
                        at,
                        format!("`{}` used outside of a loop", keyword.as_str()),
                    ));
                }
                self.advance();
                if keyword == Keyword::Next {
                    StmtKind::Next
                } else {
                    StmtKind::Break
                }
            }
            TokenKind::Keyword(Keyword::Case | Keyword::When) => {
                return Err(TranslateError::syntax(
                    at,
                    "`case` expressions are not supported",
                ));
            }
            TokenKind::Ident(name) => self.ident_statement(name)?,
            _ => StmtKind::Expr(self.expression()?.0),
        };
        let comment = self.finish_statement()?;
        Ok(Some(Stmt { kind, comment }))
    }

    /// Consume what ends a statement and return its trailing comment.
    fn finish_statement(&mut self) -> Result<Option<String>> {
        let comment = match self.peek() {
            TokenKind::Comment(text) => {
                let text = text.clone();
                self.advance();
                Some(text)
            }
            _ => None,
        };
        match self.peek() {
            TokenKind::Newline | TokenKind::Semicolon => {
                self.advance();
            }
            TokenKind::Eof
            | TokenKind::Keyword(Keyword::End | Keyword::Else | Keyword::Elsif) => {}
            _ => return Err(self.unexpected("end of statement")),
        }
        Ok(comment)
    }

    /// A comment ending the current line, as a statement of its own.
    fn line_comment(&mut self) -> Option<Stmt> {
        match self.peek() {
            TokenKind::Comment(text) => {
                let stmt = Stmt::new(StmtKind::Comment(text.clone()));
                self.advance();
                Some(stmt)
            }
            _ => None,
        }
    }

    /// What separates a condition from its body: `then`/`do`, a line break
    /// or `;`.
    fn clause_start(&mut self) -> Result<Option<Stmt>> {
        let explicit = self.eat_keyword(Keyword::Then) || self.eat_keyword(Keyword::Do);
        let lead = self.line_comment();
        match self.peek() {
            TokenKind::Newline | TokenKind::Semicolon => {
                self.advance();
            }
            _ if explicit && lead.is_none() => {}
            _ => return Err(self.unexpected("end of line")),
        }
        Ok(lead)
    }

    fn if_statement(&mut self) -> Result<StmtKind> {
        self.advance();
        let mut branches = Vec::new();
        loop {
            let condition = self.condition()?;
            let lead = self.clause_start()?;
            let body = self.scoped_block(&[Keyword::Elsif, Keyword::Else, Keyword::End], lead)?;
            branches.push(Branch { condition, body });
            if !self.eat_keyword(Keyword::Elsif) {
                break;
            }
        }

        let otherwise = if self.eat_keyword(Keyword::Else) {
            let lead = self.line_comment();
            if matches!(self.peek(), TokenKind::Newline | TokenKind::Semicolon) {
                self.advance();
            }
            Some(self.scoped_block(&[Keyword::End], lead)?)
        } else {
            None
        };
        self.expect_keyword(Keyword::End)?;
        Ok(StmtKind::If {
            branches,
            otherwise,
        })
    }

    fn while_statement(&mut self, until: bool) -> Result<StmtKind> {
        self.advance();
        let condition = self.condition()?;
        let lead = self.clause_start()?;
        self.loop_depth += 1;
        let body = self.scoped_block(&[Keyword::End], lead);
        self.loop_depth -= 1;
        let body = body?;
        self.expect_keyword(Keyword::End)?;
        Ok(if until {
            StmtKind::Until { condition, body }
        } else {
            StmtKind::While { condition, body }
        })
    }

    fn for_statement(&mut self) -> Result<StmtKind> {
        self.advance();
        let at = self.position();
        let var = match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                name
            }
            _ => return Err(self.unexpected("loop variable")),
        };
        if matches!(self.peek(), TokenKind::Comma) {
            return Err(TranslateError::syntax(
                self.position(),
                "only one loop variable is supported",
            ));
        }
        self.expect_keyword(Keyword::In)?;

        let iterable_at = self.position();
        let (iterable, ty) = self.expression()?;
        if matches!(
            ty,
            ValueType::Integer | ValueType::Float | ValueType::Str | ValueType::Bool | ValueType::Nil
        ) {
            return Err(TranslateError::semantic(
                iterable_at,
                format!("cannot iterate over {} values", ty),
            ));
        }
        let element = if matches!(iterable, Expr::Range { .. }) {
            ValueType::Integer
        } else {
            ValueType::Unknown
        };
        let lead = self.clause_start()?;

        self.symbols.push_scope();
        let symbol = self.symbols.declare_variable(&var, element, at);
        self.loop_depth += 1;
        let body = self.statements(&[Keyword::End], lead);
        self.loop_depth -= 1;
        self.symbols.pop_scope();
        let body = body?;
        self.expect_keyword(Keyword::End)?;

        Ok(StmtKind::For {
            var,
            symbol,
            iterable,
            body,
        })
    }

    fn def_statement(&mut self) -> Result<StmtKind> {
        self.advance();
        if matches!(self.peek(), TokenKind::Ident(name) if name == "self")
            && matches!(self.peek_nth(1), TokenKind::Dot)
        {
            self.advance();
            self.advance();
        }
        let at = self.position();
        let name = match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                name
            }
            _ => return Err(self.unexpected("function name")),
        };
        let params = self.parameters()?;
        let symbol = self.symbols.declare_function(&name, params.len(), at)?;
        let lead = self.clause_start()?;

        self.symbols.push_scope();
        let params: Vec<Param> = params
            .into_iter()
            .map(|(name, at)| {
                let symbol = self.symbols.declare_param(&name, at);
                Param { name, symbol }
            })
            .collect();
        let outer_loops = std::mem::replace(&mut self.loop_depth, 0);
        let body = self.statements(&[Keyword::End], lead);
        self.loop_depth = outer_loops;
        self.symbols.pop_scope();
        let body = body?;
        self.expect_keyword(Keyword::End)?;

        tracing::trace!("Defined function `{}` with {} parameters", name, params.len());
        Ok(StmtKind::Def {
            name,
            symbol,
            params,
            body,
        })
    }

    fn parameters(&mut self) -> Result<Vec<(String, Position)>> {
        let mut params: Vec<(String, Position)> = Vec::new();
        let parens = self.eat(&TokenKind::LParen);
        if parens {
            self.skip_newlines();
            if self.eat(&TokenKind::RParen) {
                return Ok(params);
            }
        } else if !matches!(self.peek(), TokenKind::Ident(_)) {
            return Ok(params);
        }

        loop {
            let at = self.position();
            match self.peek().clone() {
                TokenKind::Ident(name) => {
                    self.advance();
                    if params.iter().any(|(existing, _)| *existing == name) {
                        return Err(TranslateError::semantic(
                            at,
                            format!("duplicate parameter `{}`", name),
                        ));
                    }
                    params.push((name, at));
                }
                _ => return Err(self.unexpected("parameter name")),
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            if parens {
                self.skip_newlines();
            }
        }

        if parens {
            self.skip_newlines();
            self.expect(TokenKind::RParen, "`,` or `)`")?;
        }
        Ok(params)
    }

    fn return_statement(&mut self) -> Result<StmtKind> {
        self.advance();
        let value = match self.peek() {
            TokenKind::Newline
            | TokenKind::Semicolon
            | TokenKind::Eof
            | TokenKind::Comment(_)
            | TokenKind::Keyword(Keyword::End | Keyword::Else | Keyword::Elsif) => None,
            _ => Some(self.expression()?.0),
        };
        Ok(StmtKind::Return(value))
    }

    fn ident_statement(&mut self, name: String) -> Result<StmtKind> {
        let at = self.position();
        match self.peek_nth(1).clone() {
            TokenKind::Op(Operator::Assign) => {
                self.advance();
                self.advance();
                self.skip_newlines();
                let (value, ty) = self.expression()?;
                let symbol = self.symbols.declare_variable(&name, ty, at);
                Ok(StmtKind::Assign {
                    target: Target::Var { name, symbol },
                    value,
                })
            }
            TokenKind::Op(op) if compound_op(op).is_some() => {
                self.advance();
                self.advance();
                let symbol = self.symbols.lookup_variable(&name).ok_or_else(|| {
                    TranslateError::semantic(at, format!("undefined local variable `{}`", name))
                })?;
                self.symbols.touch(symbol);
                let current = (
                    Expr::Var {
                        name: name.clone(),
                        symbol,
                    },
                    self.symbols.type_of(symbol),
                );
                self.skip_newlines();
                let rhs = self.expression()?;
                let op = compound_op(op).unwrap_or(BinaryOp::Add);
                let (value, ty) = self.binary(op, current, rhs, at)?;
                self.symbols.set_type(symbol, ty);
                Ok(StmtKind::Assign {
                    target: Target::Var { name, symbol },
                    value,
                })
            }
            TokenKind::LBracket if self.symbols.lookup_variable(&name).is_some() => {
                self.index_assignment(name)
            }
            next if self.is_command_call(&name, &next) => self.command_call(name),
            _ => Ok(StmtKind::Expr(self.expression()?.0)),
        }
    }

    fn index_assignment(&mut self, name: String) -> Result<StmtKind> {
        let at = self.position();
        self.advance();
        let symbol = self.symbols.lookup_variable(&name).ok_or_else(|| {
            TranslateError::semantic(at, format!("undefined local variable `{}`", name))
        })?;
        check_indexable(self.symbols.type_of(symbol), at)?;

        let mut indices = Vec::new();
        while self.eat(&TokenKind::LBracket) {
            indices.push(self.index_expr()?);
        }
        if !self.eat_op(Operator::Assign) {
            return Err(self.unexpected("`=`"));
        }
        self.skip_newlines();
        let (value, _) = self.expression()?;
        self.symbols.touch(symbol);

        Ok(StmtKind::Assign {
            target: Target::Index {
                name,
                symbol,
                indices,
            },
            value,
        })
    }

    /// `puts x` style calls: a known function name followed directly by
    /// its first argument.
    fn is_command_call(&self, name: &str, next: &TokenKind) -> bool {
        if self.symbols.lookup_variable(name).is_some() {
            return false;
        }
        let callable =
            self.symbols.lookup_function(name).is_some() || Builtin::from_name(name).is_some();
        callable && starts_expression(next)
    }

    fn command_call(&mut self, name: String) -> Result<StmtKind> {
        let at = self.position();
        self.advance();
        let mut args = vec![self.expression()?.0];
        while self.eat(&TokenKind::Comma) {
            self.skip_newlines();
            args.push(self.expression()?.0);
        }
        let (call, _) = self.call(&name, args, at)?;
        Ok(StmtKind::Expr(call))
    }

    // Expressions, lowest precedence first

    fn expression(&mut self) -> Result<Typed> {
        self.or_expr()
    }

    fn condition(&mut self) -> Result<Expr> {
        let at = self.position();
        let (condition, ty) = self.expression()?;
        check_condition(ty, at)?;
        Ok(condition)
    }

    fn or_expr(&mut self) -> Result<Typed> {
        let mut lhs = self.and_expr()?;
        loop {
            let at = self.position();
            if !(self.eat_keyword(Keyword::Or) || self.eat_op(Operator::OrOr)) {
                break;
            }
            self.skip_newlines();
            let rhs = self.and_expr()?;
            lhs = self.binary(BinaryOp::Or, lhs, rhs, at)?;
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Typed> {
        let mut lhs = self.not_expr()?;
        loop {
            let at = self.position();
            if !(self.eat_keyword(Keyword::And) || self.eat_op(Operator::AndAnd)) {
                break;
            }
            self.skip_newlines();
            let rhs = self.not_expr()?;
            lhs = self.binary(BinaryOp::And, lhs, rhs, at)?;
        }
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Typed> {
        let at = self.position();
        if self.eat_keyword(Keyword::Not) {
            let operand = self.not_expr()?;
            return self.unary(UnaryOp::Not, operand, at);
        }
        self.range_expr()
    }

    fn range_expr(&mut self) -> Result<Typed> {
        let start = self.comparison()?;
        let at = self.position();
        let exclusive = if self.eat_op(Operator::Range) {
            false
        } else if self.eat_op(Operator::ExclusiveRange) {
            true
        } else {
            return Ok(start);
        };
        self.skip_newlines();
        let end = self.comparison()?;
        self.range(start, end, exclusive, at)
    }

    fn comparison(&mut self) -> Result<Typed> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Op(Operator::Eq) => BinaryOp::Eq,
                TokenKind::Op(Operator::NotEq) => BinaryOp::NotEq,
                TokenKind::Op(Operator::Less) => BinaryOp::Less,
                TokenKind::Op(Operator::Greater) => BinaryOp::Greater,
                TokenKind::Op(Operator::LessEq) => BinaryOp::LessEq,
                TokenKind::Op(Operator::GreaterEq) => BinaryOp::GreaterEq,
                _ => break,
            };
            let at = self.position();
            self.advance();
            self.skip_newlines();
            let rhs = self.additive()?;
            lhs = self.binary(op, lhs, rhs, at)?;
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Typed> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Op(Operator::Plus) => BinaryOp::Add,
                TokenKind::Op(Operator::Minus) => BinaryOp::Sub,
                _ => break,
            };
            let at = self.position();
            self.advance();
            self.skip_newlines();
            let rhs = self.multiplicative()?;
            lhs = self.binary(op, lhs, rhs, at)?;
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Typed> {
        let mut lhs = self.unary_expr()?;
        loop {
            let op = match self.peek() {
                TokenKind::Op(Operator::Star) => BinaryOp::Mul,
                TokenKind::Op(Operator::Slash) => BinaryOp::Div,
                TokenKind::Op(Operator::Percent) => BinaryOp::Mod,
                _ => break,
            };
            let at = self.position();
            self.advance();
            self.skip_newlines();
            let rhs = self.unary_expr()?;
            lhs = self.binary(op, lhs, rhs, at)?;
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self) -> Result<Typed> {
        let at = self.position();
        let op = match self.peek() {
            TokenKind::Op(Operator::Minus) => UnaryOp::Neg,
            TokenKind::Op(Operator::Plus) => UnaryOp::Pos,
            TokenKind::Op(Operator::Bang) => UnaryOp::Not,
            _ => return self.power(),
        };
        self.advance();
        let operand = self.unary_expr()?;
        self.unary(op, operand, at)
    }

    fn power(&mut self) -> Result<Typed> {
        let base = self.postfix()?;
        let at = self.position();
        if self.eat_op(Operator::Power) {
            self.skip_newlines();
            // Right associative: the exponent may itself be a power.
            let exponent = self.unary_expr()?;
            return self.binary(BinaryOp::Pow, base, exponent, at);
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<Typed> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                TokenKind::LBracket => {
                    let at = self.position();
                    self.advance();
                    check_indexable(expr.1, at)?;
                    let index = self.index_expr()?;
                    expr = (
                        Expr::Index {
                            target: Box::new(expr.0),
                            index: Box::new(index),
                        },
                        ValueType::Unknown,
                    );
                }
                TokenKind::Dot => {
                    return Err(TranslateError::syntax(
                        self.position(),
                        "method calls are not supported",
                    ));
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// The inside of `[...]`, after the opening bracket.
    fn index_expr(&mut self) -> Result<Expr> {
        self.skip_newlines();
        let at = self.position();
        let (index, ty) = self.expression()?;
        if matches!(ty, ValueType::Float | ValueType::Str) {
            return Err(TranslateError::semantic(
                at,
                format!("array index must be an integer, found {}", ty),
            ));
        }
        self.skip_newlines();
        self.expect(TokenKind::RBracket, "`]`")?;
        Ok(index)
    }

    fn primary(&mut self) -> Result<Typed> {
        let token = self.token().clone();
        let at = token.position;
        match token.kind {
            TokenKind::Integer(n) => {
                self.advance();
                Ok((Expr::Integer(n), ValueType::Integer))
            }
            TokenKind::Float(text) => {
                self.advance();
                Ok((Expr::Float(text), ValueType::Float))
            }
            TokenKind::Str { value, quote } => {
                self.advance();
                if quote == '"' {
                    self.double_quoted(&value, at)
                } else {
                    Ok((Expr::Str { value, quote }, ValueType::Str))
                }
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok((Expr::Bool(true), ValueType::Bool))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok((Expr::Bool(false), ValueType::Bool))
            }
            TokenKind::Keyword(Keyword::Nil) => {
                self.advance();
                Ok((Expr::Nil, ValueType::Nil))
            }
            TokenKind::LParen => {
                self.advance();
                self.skip_newlines();
                let inner = self.expression()?;
                self.skip_newlines();
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                self.array()
            }
            TokenKind::Ident(name) => {
                self.advance();
                self.identifier(name, at)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn array(&mut self) -> Result<Typed> {
        let mut items = Vec::new();
        self.skip_newlines();
        if !self.eat(&TokenKind::RBracket) {
            loop {
                items.push(self.expression()?.0);
                self.skip_newlines();
                if self.eat(&TokenKind::Comma) {
                    self.skip_newlines();
                    if self.eat(&TokenKind::RBracket) {
                        break;
                    }
                    continue;
                }
                self.expect(TokenKind::RBracket, "`,` or `]`")?;
                break;
            }
        }
        Ok((Expr::Array(items), ValueType::Array))
    }

    fn identifier(&mut self, name: String, at: Position) -> Result<Typed> {
        if self.eat(&TokenKind::LParen) {
            let args = self.arguments()?;
            return self.call(&name, args, at);
        }
        if let Some(symbol) = self.symbols.lookup_variable(&name) {
            self.symbols.touch(symbol);
            let ty = self.symbols.type_of(symbol);
            return Ok((Expr::Var { name, symbol }, ty));
        }
        if self.symbols.lookup_function(&name).is_some() || Builtin::from_name(&name).is_some() {
            return self.call(&name, Vec::new(), at);
        }
        Err(TranslateError::semantic(
            at,
            format!("undefined local variable or method `{}`", name),
        ))
    }

    /// Call arguments, after the opening parenthesis.
    fn arguments(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        self.skip_newlines();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?.0);
            self.skip_newlines();
            if self.eat(&TokenKind::Comma) {
                self.skip_newlines();
                continue;
            }
            self.expect(TokenKind::RParen, "`,` or `)`")?;
            return Ok(args);
        }
    }

    fn call(&mut self, name: &str, args: Vec<Expr>, at: Position) -> Result<Typed> {
        if let Some(symbol) = self.symbols.lookup_function(name) {
            let arity = match self.symbols.get(symbol).map(|s| &s.kind) {
                Some(SymbolKind::Function { arity }) => *arity,
                _ => 0,
            };
            if args.len() != arity {
                return Err(TranslateError::semantic(
                    at,
                    format!(
                        "wrong number of arguments for `{}` (given {}, expected {})",
                        name,
                        args.len(),
                        arity
                    ),
                ));
            }
            self.symbols.touch(symbol);
            let callee = Callee::User {
                name: name.to_string(),
                symbol,
            };
            return Ok((Expr::Call { callee, args }, ValueType::Unknown));
        }

        let Some(builtin) = Builtin::from_name(name) else {
            return Err(TranslateError::semantic(
                at,
                format!("undefined method `{}`", name),
            ));
        };
        if !builtin.accepts(args.len()) {
            return Err(TranslateError::semantic(
                at,
                format!(
                    "wrong number of arguments for `{}` (given {}, expected {})",
                    builtin.name(),
                    args.len(),
                    builtin.expected()
                ),
            ));
        }
        let ty = match builtin {
            Builtin::Readline => ValueType::Str,
            Builtin::Puts | Builtin::Print => ValueType::Nil,
        };
        let callee = Callee::Builtin(builtin);
        Ok((Expr::Call { callee, args }, ty))
    }

    /// Split a double-quoted literal into text and `#{...}` parts.
    fn double_quoted(&mut self, value: &str, at: Position) -> Result<Typed> {
        let chars: Vec<char> = value.chars().collect();
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '\\' if chars.get(i + 1) == Some(&'#') => {
                    text.push('#');
                    i += 2;
                }
                '\\' => {
                    text.push('\\');
                    if let Some(&c) = chars.get(i + 1) {
                        text.push(c);
                    }
                    i += 2;
                }
                '#' if chars.get(i + 1) == Some(&'{') => {
                    let start = i + 2;
                    let end = closing_brace(&chars, start).ok_or_else(|| {
                        TranslateError::lexical(at, "unterminated interpolation in string literal")
                    })?;
                    if !text.is_empty() {
                        parts.push(Part::Text(std::mem::take(&mut text)));
                    }
                    let source: String = chars[start..end].iter().collect();
                    // The opening quote occupies one column.
                    let base = Position::new(at.line, at.column + 1 + start);
                    parts.push(Part::Expr(self.interpolation(&source, base)?));
                    i = end + 1;
                }
                c => {
                    text.push(c);
                    i += 1;
                }
            }
        }

        if parts.is_empty() {
            return Ok((Expr::Str { value: text, quote: '"' }, ValueType::Str));
        }
        if !text.is_empty() {
            parts.push(Part::Text(text));
        }
        Ok((Expr::Interpolated(parts), ValueType::Str))
    }

    /// Parse the code inside `#{...}` with positions relative to the file.
    fn interpolation(&mut self, source: &str, base: Position) -> Result<Expr> {
        let mut tokens = lexer::tokenize(source).map_err(|mut err| {
            err.position = relocate(err.position, base);
            err
        })?;
        for token in &mut tokens {
            token.position = relocate(token.position, base);
        }

        let outer_tokens = std::mem::replace(&mut self.tokens, tokens);
        let outer_pos = std::mem::replace(&mut self.pos, 0);
        let result = self.interpolated_expression();
        self.tokens = outer_tokens;
        self.pos = outer_pos;
        result
    }

    fn interpolated_expression(&mut self) -> Result<Expr> {
        let (expr, _) = self.expression()?;
        if !matches!(self.peek(), TokenKind::Eof) {
            return Err(self.unexpected("`}`"));
        }
        Ok(expr)
    }

    // Node builders

    fn unary(&mut self, op: UnaryOp, operand: Typed, at: Position) -> Result<Typed> {
        let (operand, ty) = operand;
        if op != UnaryOp::Not
            && matches!(
                ty,
                ValueType::Str | ValueType::Bool | ValueType::Nil | ValueType::Array
            )
        {
            let symbol = if op == UnaryOp::Neg { "-" } else { "+" };
            return Err(TranslateError::semantic(
                at,
                format!("unary `{}` is not defined for {} values", symbol, ty),
            ));
        }
        let ty = if op == UnaryOp::Not { ValueType::Bool } else { ty };

        let operand = if self.optimize {
            match operand {
                Expr::Unary {
                    op: inner,
                    operand: nested,
                } if inner == op => return Ok((*nested, ty)),
                Expr::Integer(n) if op == UnaryOp::Neg && n.checked_neg().is_some() => {
                    return Ok((Expr::Integer(-n), ValueType::Integer));
                }
                other => other,
            }
        } else {
            operand
        };

        Ok((
            Expr::Unary {
                op,
                operand: Box::new(operand),
            },
            ty,
        ))
    }

    fn binary(&mut self, op: BinaryOp, lhs: Typed, rhs: Typed, at: Position) -> Result<Typed> {
        let (lhs, lt) = lhs;
        let (rhs, rt) = rhs;

        if op.is_logical() {
            check_condition(lt, at)?;
            check_condition(rt, at)?;
            return Ok((binary_node(op, lhs, rhs), ValueType::Bool));
        }
        if op.is_comparison() {
            return Ok((binary_node(op, lhs, rhs), ValueType::Bool));
        }
        if op == BinaryOp::Add && (lt == ValueType::Str || rt == ValueType::Str) {
            let mut items = concat_items(lhs);
            items.extend(concat_items(rhs));
            return Ok((Expr::Concat(items), ValueType::Str));
        }

        for ty in [lt, rt] {
            if matches!(ty, ValueType::Str | ValueType::Bool | ValueType::Nil) {
                return Err(TranslateError::semantic(
                    at,
                    format!(
                        "`{}` is not defined for {} and {}",
                        op.symbol(),
                        lt,
                        rt
                    ),
                ));
            }
        }

        let op = if op == BinaryOp::Div && lt == ValueType::Integer && rt == ValueType::Integer {
            BinaryOp::IntDiv
        } else {
            op
        };

        if self.optimize {
            if let (Expr::Integer(a), Expr::Integer(b)) = (&lhs, &rhs) {
                if let Some(value) = fold(op, *a, *b) {
                    return Ok((Expr::Integer(value), ValueType::Integer));
                }
            }
        }

        let ty = match (lt, rt) {
            (ValueType::Integer, ValueType::Integer) => ValueType::Integer,
            (a, b) if a.is_numeric() && b.is_numeric() => ValueType::Float,
            _ => ValueType::Unknown,
        };
        Ok((binary_node(op, lhs, rhs), ty))
    }

    fn range(&mut self, start: Typed, end: Typed, exclusive: bool, at: Position) -> Result<Typed> {
        for ty in [start.1, end.1] {
            if matches!(
                ty,
                ValueType::Str | ValueType::Bool | ValueType::Nil | ValueType::Array
            ) {
                return Err(TranslateError::semantic(
                    at,
                    format!("range bounds must be numbers, found {}", ty),
                ));
            }
        }
        let end = if exclusive {
            // `a...b` is the inclusive range `a..b - 1`.
            let one = (Expr::Integer(1), ValueType::Integer);
            self.binary(BinaryOp::Sub, end, one, at)?
        } else {
            end
        };
        Ok((
            Expr::Range {
                start: Box::new(start.0),
                end: Box::new(end.0),
            },
            ValueType::Array,
        ))
    }
}

fn binary_node(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn compound_op(op: Operator) -> Option<BinaryOp> {
    match op {
        Operator::PlusAssign => Some(BinaryOp::Add),
        Operator::MinusAssign => Some(BinaryOp::Sub),
        Operator::StarAssign => Some(BinaryOp::Mul),
        Operator::SlashAssign => Some(BinaryOp::Div),
        Operator::PercentAssign => Some(BinaryOp::Mod),
        Operator::PowerAssign => Some(BinaryOp::Pow),
        _ => None,
    }
}

fn starts_expression(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::Integer(_)
            | TokenKind::Float(_)
            | TokenKind::Str { .. }
            | TokenKind::LBracket
            | TokenKind::Op(Operator::Bang)
            | TokenKind::Keyword(Keyword::True | Keyword::False | Keyword::Nil | Keyword::Not)
    )
}

fn check_condition(ty: ValueType, at: Position) -> Result<()> {
    match ty {
        ValueType::Integer
        | ValueType::Float
        | ValueType::Str
        | ValueType::Array
        | ValueType::Nil => Err(TranslateError::semantic(
            at,
            format!("condition must be a boolean, found {}", ty),
        )),
        ValueType::Bool | ValueType::Unknown => Ok(()),
    }
}

fn check_indexable(ty: ValueType, at: Position) -> Result<()> {
    match ty {
        ValueType::Array | ValueType::Unknown => Ok(()),
        other => Err(TranslateError::semantic(
            at,
            format!("{} values cannot be indexed", other),
        )),
    }
}

/// Operands of a string `+`, flattening nested concatenations.
fn concat_items(expr: Expr) -> Vec<Expr> {
    match expr {
        Expr::Concat(items) => items,
        Expr::Interpolated(parts) => parts
            .into_iter()
            .map(|part| match part {
                Part::Text(value) => Expr::Str { value, quote: '"' },
                Part::Expr(expr) => expr,
            })
            .collect(),
        other => vec![other],
    }
}

/// Fold an integer operation the way Ruby evaluates it. Returns `None` on
/// overflow, division by zero and negative exponents.
fn fold(op: BinaryOp, a: i64, b: i64) -> Option<i64> {
    match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::IntDiv => floor_div(a, b),
        BinaryOp::Mod => floor_mod(a, b),
        BinaryOp::Pow => u32::try_from(b).ok().and_then(|e| a.checked_pow(e)),
        _ => None,
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    let remainder = a.checked_rem(b)?;
    if remainder != 0 && (remainder < 0) != (b < 0) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let remainder = a.checked_rem(b)?;
    if remainder != 0 && (remainder < 0) != (b < 0) {
        remainder.checked_add(b)
    } else {
        Some(remainder)
    }
}

/// Index of the `}` closing an interpolation that starts at `start`.
fn closing_brace(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(q) => {
                if c == '\\' {
                    i += 1;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '{' => depth += 1,
                '}' if depth == 0 => return Some(i),
                '}' => depth -= 1,
                _ => {}
            },
        }
        i += 1;
    }
    None
}

fn relocate(position: Position, base: Position) -> Position {
    if position.line == 1 {
        Position::new(base.line, base.column + position.column - 1)
    } else {
        Position::new(base.line + position.line - 1, position.column)
    }
}
