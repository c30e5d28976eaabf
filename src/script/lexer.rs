//! Token kinds for pipeline descriptions.
//!
//! Logos derives token recognition. Trivia (whitespace, comments) is lexed so
//! that every byte is accounted for, then dropped before parsing.

use super::ScriptError;
use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token(";")]
    Semicolon,

    #[token("=")]
    Equals,

    #[token("+")]
    Plus,

    /// `var`, `let` and `const` all introduce a binding.
    #[token("var")]
    #[token("let")]
    #[token("const")]
    KwVar,

    #[token("true")]
    KwTrue,

    #[token("false")]
    KwFalse,

    /// Defined after keywords so they take precedence.
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r"[0-9]+(?:\.[0-9]+)?")]
    Number,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    #[regex(r"'(?:[^'\\\n]|\\.)*'")]
    Str,

    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*(?:[^*]|\*+[^*/])*\*+/")]
    BlockComment,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment)
    }

    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::ParenOpen => "'('",
            TokenKind::ParenClose => "')'",
            TokenKind::BracketOpen => "'['",
            TokenKind::BracketClose => "']'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Semicolon => "';'",
            TokenKind::Equals => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::KwVar => "declaration keyword",
            TokenKind::KwTrue | TokenKind::KwFalse => "boolean",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::Str => "string",
            TokenKind::Whitespace => "whitespace",
            TokenKind::LineComment | TokenKind::BlockComment => "comment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Lex `source` into non-trivia tokens.
pub fn lex(source: &str) -> Result<Vec<Token>, ScriptError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) if kind.is_trivia() => {}
            Ok(kind) => tokens.push(Token { kind, span }),
            Err(()) => {
                let found = source[span.start..].chars().next().unwrap_or(' ');
                let message = if found == '"' || found == '\'' {
                    "unterminated string literal".to_string()
                } else if source[span.start..].starts_with("/*") {
                    "unterminated block comment".to_string()
                } else {
                    format!("unexpected character '{found}'")
                };
                return Err(ScriptError::at(source, span.start, message));
            }
        }
    }

    Ok(tokens)
}

/// Decode the body of a quoted string token.
pub fn unquote(raw: &str) -> String {
    let body = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
