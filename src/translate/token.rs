//! Token definitions.

use std::fmt;

use serde::Serialize;

use super::span::Position;

/// Reserved words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Def,
    Return,
    End,
    While,
    Do,
    For,
    Until,
    Next,
    Break,
    If,
    Elsif,
    Else,
    Then,
    In,
    Case,
    When,
    Or,
    And,
    Not,
    True,
    False,
    Nil,
}

impl Keyword {
    /// Look up a keyword by its source spelling.
    pub fn from_word(word: &str) -> Option<Self> {
        let keyword = match word {
            "def" => Self::Def,
            "return" => Self::Return,
            "end" => Self::End,
            "while" => Self::While,
            "do" => Self::Do,
            "for" => Self::For,
            "until" => Self::Until,
            "next" => Self::Next,
            "break" => Self::Break,
            "if" => Self::If,
            "elsif" => Self::Elsif,
            "else" => Self::Else,
            "then" => Self::Then,
            "in" => Self::In,
            "case" => Self::Case,
            "when" => Self::When,
            "or" => Self::Or,
            "and" => Self::And,
            "not" => Self::Not,
            "true" => Self::True,
            "false" => Self::False,
            "nil" => Self::Nil,
            _ => return None,
        };
        Some(keyword)
    }

    /// The source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Def => "def",
            Self::Return => "return",
            Self::End => "end",
            Self::While => "while",
            Self::Do => "do",
            Self::For => "for",
            Self::Until => "until",
            Self::Next => "next",
            Self::Break => "break",
            Self::If => "if",
            Self::Elsif => "elsif",
            Self::Else => "else",
            Self::Then => "then",
            Self::In => "in",
            Self::Case => "case",
            Self::When => "when",
            Self::Or => "or",
            Self::And => "and",
            Self::Not => "not",
            Self::True => "true",
            Self::False => "false",
            Self::Nil => "nil",
        }
    }
}

/// Operators, including assignment forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Assign,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    PowerAssign,
    Range,
    ExclusiveRange,
    Bang,
    AndAnd,
    OrOr,
}

impl Operator {
    /// The source spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Power => "**",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::StarAssign => "*=",
            Self::SlashAssign => "/=",
            Self::PercentAssign => "%=",
            Self::PowerAssign => "**=",
            Self::Range => "..",
            Self::ExclusiveRange => "...",
            Self::Bang => "!",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Assign => "ASSIGN",
            Self::Eq => "EQ",
            Self::NotEq => "NOT_EQ",
            Self::Less => "LESS",
            Self::Greater => "GREATER",
            Self::LessEq => "LESS_EQ",
            Self::GreaterEq => "GREATER_EQ",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Star => "STAR",
            Self::Slash => "SLASH",
            Self::Percent => "PERCENT",
            Self::Power => "POWER",
            Self::PlusAssign => "PLUS_ASSIGN",
            Self::MinusAssign => "MINUS_ASSIGN",
            Self::StarAssign => "STAR_ASSIGN",
            Self::SlashAssign => "SLASH_ASSIGN",
            Self::PercentAssign => "PERCENT_ASSIGN",
            Self::PowerAssign => "POWER_ASSIGN",
            Self::Range => "RANGE",
            Self::ExclusiveRange => "EXCLUSIVE_RANGE",
            Self::Bang => "BANG",
            Self::AndAnd => "AND_AND",
            Self::OrOr => "OR_OR",
        }
    }
}

/// The kind of a token, with its payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TokenKind {
    Ident(String),
    Integer(i64),
    /// Float literal, kept as written.
    Float(String),
    /// String literal contents without quotes; escapes are left as written.
    Str { value: String, quote: char },
    /// Comment text after the `#`.
    Comment(String),
    Keyword(Keyword),
    Op(Operator),
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Pipe,
    Comma,
    Semicolon,
    Dot,
    Newline,
    Eof,
}

impl TokenKind {
    /// Upper-case name used in token dumps.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ident(_) => "IDENT",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Str { .. } => "STR",
            Self::Comment(_) => "COMMENT",
            Self::Keyword(_) => "KEYWORD",
            Self::Op(op) => op.name(),
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::LBracket => "LBRACKET",
            Self::RBracket => "RBRACKET",
            Self::LBrace => "LBRACE",
            Self::RBrace => "RBRACE",
            Self::Pipe => "PIPE",
            Self::Comma => "COMMA",
            Self::Semicolon => "SEMICOLON",
            Self::Dot => "DOT",
            Self::Newline => "NEWLINE",
            Self::Eof => "EOF",
        }
    }

    /// Payload rendered as text, if the kind carries one.
    pub fn value(&self) -> Option<String> {
        match self {
            Self::Ident(s) | Self::Float(s) | Self::Comment(s) => Some(s.clone()),
            Self::Str { value, .. } => Some(value.clone()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Keyword(k) => Some(k.as_str().to_string()),
            _ => None,
        }
    }

    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier `{}`", name),
            Self::Integer(n) => format!("integer `{}`", n),
            Self::Float(s) => format!("float `{}`", s),
            Self::Str { .. } => "string literal".to_string(),
            Self::Comment(_) => "comment".to_string(),
            Self::Keyword(k) => format!("`{}`", k.as_str()),
            Self::Op(op) => format!("`{}`", op.as_str()),
            Self::LParen => "`(`".to_string(),
            Self::RParen => "`)`".to_string(),
            Self::LBracket => "`[`".to_string(),
            Self::RBracket => "`]`".to_string(),
            Self::LBrace => "`{`".to_string(),
            Self::RBrace => "`}`".to_string(),
            Self::Pipe => "`|`".to_string(),
            Self::Comma => "`,`".to_string(),
            Self::Semicolon => "`;`".to_string(),
            Self::Dot => "`.`".to_string(),
            Self::Newline => "end of line".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

/// A token and where it starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    /// Create a token.
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for Token {
    /// Formats as `KIND[:value]:line:column`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())?;
        if let Some(value) = self.kind.value() {
            write!(f, ":{}", value)?;
        }
        write!(f, ":{}", self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip_through_spelling() {
        for word in ["def", "elsif", "until", "nil", "not"] {
            let keyword = Keyword::from_word(word).unwrap();
            assert_eq!(keyword.as_str(), word);
        }
        assert_eq!(Keyword::from_word("puts"), None);
    }

    #[test]
    fn token_display_includes_value_and_position() {
        let token = Token::new(TokenKind::Ident("hello".into()), Position::new(1, 17));
        assert_eq!(token.to_string(), "IDENT:hello:1:17");

        let token = Token::new(TokenKind::Op(Operator::Assign), Position::new(1, 23));
        assert_eq!(token.to_string(), "ASSIGN:1:23");

        let token = Token::new(TokenKind::Keyword(Keyword::If), Position::new(8, 1));
        assert_eq!(token.to_string(), "KEYWORD:if:8:1");
    }

    #[test]
    fn describe_names_the_token() {
        assert_eq!(TokenKind::Op(Operator::Power).describe(), "`**`");
        assert_eq!(TokenKind::Newline.describe(), "end of line");
        assert_eq!(
            TokenKind::Ident("x".into()).describe(),
            "identifier `x`"
        );
    }
}
