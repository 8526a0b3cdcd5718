//! Lexical analysis.

use super::error::{Result, TranslateError};
use super::span::Position;
use super::token::{Keyword, Operator, Token, TokenKind};

const OPERATORS: &[(&str, Operator)] = &[
    ("**=", Operator::PowerAssign),
    ("...", Operator::ExclusiveRange),
    ("**", Operator::Power),
    ("==", Operator::Eq),
    ("!=", Operator::NotEq),
    ("<=", Operator::LessEq),
    (">=", Operator::GreaterEq),
    ("+=", Operator::PlusAssign),
    ("-=", Operator::MinusAssign),
    ("*=", Operator::StarAssign),
    ("/=", Operator::SlashAssign),
    ("%=", Operator::PercentAssign),
    ("..", Operator::Range),
    ("&&", Operator::AndAnd),
    ("||", Operator::OrOr),
    ("=", Operator::Assign),
    ("<", Operator::Less),
    (">", Operator::Greater),
    ("+", Operator::Plus),
    ("-", Operator::Minus),
    ("*", Operator::Star),
    ("/", Operator::Slash),
    ("%", Operator::Percent),
    ("!", Operator::Bang),
];

/// Split source text into tokens, ending with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let start = self.position();
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\\' if self.peek_at(1) == Some('\n') => {
                    self.bump();
                    self.bump();
                }
                '\\' if self.peek_at(1) == Some('\r') && self.peek_at(2) == Some('\n') => {
                    self.bump();
                    self.bump();
                    self.bump();
                }
                '\n' => {
                    self.bump();
                    tokens.push(Token::new(TokenKind::Newline, start));
                }
                '#' => {
                    self.bump();
                    let text = self.take_while(|c| c != '\n');
                    let text = text.strip_suffix('\r').unwrap_or(&text).to_string();
                    tokens.push(Token::new(TokenKind::Comment(text), start));
                }
                '"' | '\'' => {
                    let kind = self.string(c, start)?;
                    tokens.push(Token::new(kind, start));
                }
                c if c.is_ascii_digit() => {
                    let kind = self.number(start)?;
                    tokens.push(Token::new(kind, start));
                }
                c if c.is_alphabetic() || c == '_' => {
                    let kind = self.word();
                    tokens.push(Token::new(kind, start));
                }
                _ => {
                    let kind = self.punctuation(start)?;
                    tokens.push(Token::new(kind, start));
                }
            }
        }

        tokens.push(Token::new(TokenKind::Eof, self.position()));
        tracing::debug!("Tokenized {} tokens", tokens.len());
        Ok(tokens)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            text.push(c);
            self.bump();
        }
        text
    }

    fn word(&mut self) -> TokenKind {
        let mut word = self.take_while(|c| c.is_alphanumeric() || c == '_');
        // Predicate names like `empty?`, but not `x ?= ...` style operators.
        if self.peek() == Some('?') && self.peek_at(1) != Some('=') {
            self.bump();
            word.push('?');
        }
        match Keyword::from_word(&word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident(word),
        }
    }

    fn number(&mut self, start: Position) -> Result<TokenKind> {
        let mut text = self.take_while(|c| c.is_ascii_digit());
        if text.len() > 1 && text.starts_with('0') {
            return Err(TranslateError::lexical(
                start,
                format!("leading zero in number `{}`", text),
            ));
        }

        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
            is_float = true;
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
                text.push_str(&self.take_while(|c| c.is_ascii_digit()));
                is_float = true;
            }
        }

        if let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                let rest = self.take_while(|c| c.is_alphanumeric() || c == '_');
                return Err(TranslateError::lexical(
                    start,
                    format!("malformed number `{}{}`", text, rest),
                ));
            }
        }

        if is_float {
            return Ok(TokenKind::Float(text));
        }
        text.parse::<i64>()
            .map(TokenKind::Integer)
            .map_err(|_| TranslateError::lexical(start, format!("integer `{}` is too large", text)))
    }

    fn string(&mut self, quote: char, start: Position) -> Result<TokenKind> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(TranslateError::lexical(start, "unterminated string literal"));
                }
                Some('\\') => {
                    self.bump();
                    value.push('\\');
                    match self.peek() {
                        None | Some('\n') => {
                            return Err(TranslateError::lexical(
                                start,
                                "unterminated string literal",
                            ));
                        }
                        Some(c) => {
                            self.bump();
                            value.push(c);
                        }
                    }
                }
                Some(c) if c == quote => {
                    self.bump();
                    return Ok(TokenKind::Str { value, quote });
                }
                Some(c) => {
                    self.bump();
                    value.push(c);
                }
            }
        }
    }

    fn punctuation(&mut self, start: Position) -> Result<TokenKind> {
        for (text, op) in OPERATORS {
            if self.matches(text) {
                for _ in 0..text.chars().count() {
                    self.bump();
                }
                return Ok(TokenKind::Op(*op));
            }
        }

        let c = self.bump().unwrap_or_default();
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '|' => TokenKind::Pipe,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            other => {
                return Err(TranslateError::lexical(
                    start,
                    format!("unexpected character `{}`", other.escape_default()),
                ));
            }
        };
        Ok(kind)
    }

    fn matches(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }
}
