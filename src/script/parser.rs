//! Recursive-descent parser for pipeline descriptions.
//!
//! The grammar is a small data-only expression language: bindings, string
//! concatenation, lists, and call chains. There are no control-flow
//! constructs, so a description always terminates.

use super::lexer::{lex, unquote, Token, TokenKind};
use super::ScriptError;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let { name: String, value: Expr },
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Byte offset used for error positions.
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Str(String),
    Num(f64),
    Bool(bool),
    Var(String),
    List(Vec<Expr>),
    Call { name: String, args: Vec<Expr> },
    Method { receiver: Box<Expr>, name: String, args: Vec<Expr> },
    Concat(Box<Expr>, Box<Expr>),
}

/// Deepest expression nesting accepted, counting parentheses, lists, call
/// arguments, method chains and `+` operands.
pub const MAX_DEPTH: usize = 256;

pub fn parse(source: &str) -> Result<Vec<Stmt>, ScriptError> {
    let tokens = lex(source)?;
    let mut parser = Parser { source, tokens, pos: 0, depth: 0 };
    parser.program()
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'src> Parser<'src> {
    fn program(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        let mut stmts = Vec::new();
        while !self.at_end() {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            stmts.push(self.statement()?);
        }
        Ok(stmts)
    }

    fn statement(&mut self) -> Result<Stmt, ScriptError> {
        let stmt = if self.eat(TokenKind::KwVar) {
            let name = self.expect(TokenKind::Ident, "binding name")?;
            let name = self.text(&name).to_string();
            self.expect(TokenKind::Equals, "'='")?;
            let value = self.expr()?;
            Stmt::Let { name, value }
        } else {
            Stmt::Expr(self.expr()?)
        };
        self.eat(TokenKind::Semicolon);
        Ok(stmt)
    }

    fn expr(&mut self) -> Result<Expr, ScriptError> {
        let depth = self.depth;
        self.enter_recursion(self.offset())?;
        let mut lhs = self.chain()?;
        while self.eat(TokenKind::Plus) {
            self.enter_recursion(lhs.offset)?;
            let rhs = self.chain()?;
            let offset = lhs.offset;
            lhs = Expr { kind: ExprKind::Concat(Box::new(lhs), Box::new(rhs)), offset };
        }
        self.depth = depth;
        Ok(lhs)
    }

    fn chain(&mut self) -> Result<Expr, ScriptError> {
        let depth = self.depth;
        let mut receiver = self.primary()?;
        while self.eat(TokenKind::Dot) {
            self.enter_recursion(receiver.offset)?;
            let name_tok = self.expect(TokenKind::Ident, "method name")?;
            let name = self.text(&name_tok).to_string();
            self.expect(TokenKind::ParenOpen, "'(' after method name")?;
            let args = self.args(TokenKind::ParenClose)?;
            receiver = Expr {
                kind: ExprKind::Method { receiver: Box::new(receiver), name, args },
                offset: name_tok.span.start,
            };
        }
        self.depth = depth;
        Ok(receiver)
    }

    fn primary(&mut self) -> Result<Expr, ScriptError> {
        let Some(tok) = self.bump() else {
            return Err(self.error_at_end("expected an expression"));
        };
        let offset = tok.span.start;
        let kind = match tok.kind {
            TokenKind::Str => ExprKind::Str(unquote(self.text(&tok))),
            TokenKind::Number => {
                let raw = self.text(&tok);
                let value = raw.parse::<f64>().map_err(|_| {
                    ScriptError::at(self.source, offset, format!("invalid number '{raw}'"))
                })?;
                ExprKind::Num(value)
            }
            TokenKind::KwTrue => ExprKind::Bool(true),
            TokenKind::KwFalse => ExprKind::Bool(false),
            TokenKind::Ident => {
                let name = self.text(&tok).to_string();
                if self.eat(TokenKind::ParenOpen) {
                    let args = self.args(TokenKind::ParenClose)?;
                    ExprKind::Call { name, args }
                } else {
                    ExprKind::Var(name)
                }
            }
            TokenKind::BracketOpen => ExprKind::List(self.args(TokenKind::BracketClose)?),
            TokenKind::ParenOpen => {
                let inner = self.expr()?;
                self.expect(TokenKind::ParenClose, "')'")?;
                return Ok(Expr { kind: inner.kind, offset });
            }
            other => {
                return Err(ScriptError::at(
                    self.source,
                    offset,
                    format!("expected an expression, found {}", other.describe()),
                ));
            }
        };
        Ok(Expr { kind, offset })
    }

    /// Comma-separated expressions up to `close`; a trailing comma is allowed.
    fn args(&mut self, close: TokenKind) -> Result<Vec<Expr>, ScriptError> {
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.expr()?);
            if !self.eat(TokenKind::Comma) {
                self.expect(close, close.describe())?;
                return Ok(items);
            }
        }
    }

    /// Every level of nesting becomes a level of recursion here and in the
    /// interpreter, so it is capped.
    fn enter_recursion(&mut self, offset: usize) -> Result<(), ScriptError> {
        if self.depth >= MAX_DEPTH {
            return Err(ScriptError::at(
                self.source,
                offset,
                format!("expression nests deeper than {MAX_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn offset(&self) -> usize {
        self.peek().map(|t| t.span.start).unwrap_or(self.source.len())
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().is_some_and(|t| t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ScriptError> {
        match self.peek() {
            Some(tok) if tok.kind == kind => {
                let tok = tok.clone();
                self.pos += 1;
                Ok(tok)
            }
            Some(tok) => Err(ScriptError::at(
                self.source,
                tok.span.start,
                format!("expected {what}, found {}", tok.kind.describe()),
            )),
            None => Err(self.error_at_end(&format!("expected {what}"))),
        }
    }

    fn text(&self, tok: &Token) -> &'src str {
        &self.source[tok.span.clone()]
    }

    fn error_at_end(&self, message: &str) -> ScriptError {
        ScriptError::at(self.source, self.source.len(), format!("{message}, found end of input"))
    }
}
