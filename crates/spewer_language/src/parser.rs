//! Parser for the spewer language.
//!
//! Statements are one per line. Blocks (`fn`, `if`, `while`) open on a header
//! line and close with a line holding only `end`. Expressions within a line
//! are parsed by precedence climbing.

use spewer_foundation::{Error, Result, Value};

use crate::ast::{BinaryOp, Expr, FunctionDef, ModuleAst, Stmt, StmtKind, UnaryOp};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Parses a whole module.
///
/// # Errors
///
/// Returns a parse error for lexical errors, malformed statements, or
/// unbalanced blocks.
pub fn parse_module(source: &str) -> Result<ModuleAst> {
    Parser::new(source)?.parse()
}

/// How deeply blocks may nest, and how deeply expressions may nest within one
/// line. Parsing and evaluation both recurse once per level.
pub const MAX_NESTING: usize = 64;

/// A non-blank source line and its tokens.
#[derive(Default)]
struct Line {
    number: u32,
    tokens: Vec<Token>,
}

/// How a block ended.
enum Terminator {
    End(u32),
    Else,
}

struct Parser {
    lines: Vec<Line>,
    pos: usize,
    line_count: u32,
    /// Blocks currently open.
    depth: usize,
}

impl Parser {
    fn new(source: &str) -> Result<Self> {
        let mut lines = Vec::new();
        let mut line_count = 0;
        for (index, text) in source.lines().enumerate() {
            let number = u32::try_from(index + 1).unwrap_or(u32::MAX);
            line_count = number;
            let tokens = Lexer::tokenize_line(text);
            if let Some(bad) = tokens.iter().find_map(|t| match &t.kind {
                TokenKind::Error(message) => Some((message, t.column)),
                _ => None,
            }) {
                return Err(Error::parse(bad.0.clone(), number, bad.1));
            }
            if tokens[0].kind != TokenKind::Eol {
                lines.push(Line { number, tokens });
            }
        }
        Ok(Self {
            lines,
            pos: 0,
            line_count,
            depth: 0,
        })
    }

    fn parse(mut self) -> Result<ModuleAst> {
        let mut module = ModuleAst {
            line_count: self.line_count,
            ..ModuleAst::default()
        };
        while let Some((number, first)) = self.first_token() {
            match first.kind {
                TokenKind::Fn => module.functions.push(self.parse_function()?),
                TokenKind::End | TokenKind::Else => {
                    return Err(Error::parse(
                        format!("unexpected {}", first.kind.name()),
                        number,
                        first.column,
                    ));
                }
                _ => module.body.push(self.parse_statement()?),
            }
        }
        Ok(module)
    }

    /// Line number and first token of the next unconsumed line.
    fn first_token(&self) -> Option<(u32, Token)> {
        let line = self.lines.get(self.pos)?;
        Some((line.number, line.tokens[0].clone()))
    }

    fn take_line(&mut self) -> Line {
        let line = std::mem::take(&mut self.lines[self.pos]);
        self.pos += 1;
        line
    }

    fn parse_function(&mut self) -> Result<FunctionDef> {
        let header = self.take_line();
        let mut cursor = Cursor::new(&header.tokens, header.number);
        cursor.expect(&TokenKind::Fn)?;
        let name = cursor.expect_ident()?;
        cursor.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if cursor.peek() != &TokenKind::RParen {
            loop {
                let param = cursor.expect_ident()?;
                if params.contains(&param) {
                    return Err(cursor.error(format!("duplicate parameter '{param}'")));
                }
                params.push(param);
                if cursor.peek() == &TokenKind::Comma {
                    cursor.advance();
                } else {
                    break;
                }
            }
        }
        cursor.expect(&TokenKind::RParen)?;
        cursor.expect_eol()?;

        let (body, terminator) = self.parse_block(false, header.number)?;
        let end_line = match terminator {
            Terminator::End(line) => line,
            Terminator::Else => header.number,
        };
        Ok(FunctionDef {
            name,
            params,
            body,
            line: header.number,
            end_line,
        })
    }

    /// Parses statements up to `end` (or `else`, when allowed).
    fn parse_block(&mut self, allow_else: bool, opened_at: u32) -> Result<(Vec<Stmt>, Terminator)> {
        if self.depth >= MAX_NESTING {
            return Err(Error::parse("blocks nested too deeply", opened_at, 1));
        }
        self.depth += 1;
        let result = self.parse_block_body(allow_else, opened_at);
        self.depth -= 1;
        result
    }

    fn parse_block_body(
        &mut self,
        allow_else: bool,
        opened_at: u32,
    ) -> Result<(Vec<Stmt>, Terminator)> {
        let mut body = Vec::new();
        loop {
            let Some((number, first)) = self.first_token() else {
                return Err(Error::parse(
                    format!("block opened on line {opened_at} is missing 'end'"),
                    self.line_count,
                    1,
                ));
            };
            match first.kind {
                TokenKind::End | TokenKind::Else => {
                    let is_else = first.kind == TokenKind::Else;
                    if is_else && !allow_else {
                        return Err(Error::parse("unexpected 'else'", number, first.column));
                    }
                    let line = self.take_line();
                    let mut cursor = Cursor::new(&line.tokens, line.number);
                    cursor.advance();
                    cursor.expect_eol()?;
                    let terminator = if is_else {
                        Terminator::Else
                    } else {
                        Terminator::End(line.number)
                    };
                    return Ok((body, terminator));
                }
                TokenKind::Fn => {
                    return Err(Error::parse(
                        "functions must be defined at top level",
                        number,
                        first.column,
                    ));
                }
                _ => body.push(self.parse_statement()?),
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        let line = self.take_line();
        let number = line.number;
        let mut cursor = Cursor::new(&line.tokens, number);

        let kind = match cursor.peek().clone() {
            TokenKind::If => {
                cursor.advance();
                let cond = cursor.expr()?;
                cursor.expect_eol()?;
                let (then_body, terminator) = self.parse_block(true, number)?;
                let else_body = match terminator {
                    Terminator::End(_) => Vec::new(),
                    Terminator::Else => self.parse_block(false, number)?.0,
                };
                StmtKind::If {
                    cond,
                    then_body,
                    else_body,
                }
            }
            TokenKind::While => {
                cursor.advance();
                let cond = cursor.expr()?;
                cursor.expect_eol()?;
                let (body, _) = self.parse_block(false, number)?;
                StmtKind::While { cond, body }
            }
            TokenKind::Return => {
                cursor.advance();
                let value = if cursor.peek() == &TokenKind::Eol {
                    None
                } else {
                    Some(cursor.expr()?)
                };
                cursor.expect_eol()?;
                StmtKind::Return(value)
            }
            TokenKind::Raise => {
                cursor.advance();
                let kind = cursor.expect_ident()?;
                let mut value = None;
                if cursor.peek() == &TokenKind::LParen {
                    cursor.advance();
                    if cursor.peek() != &TokenKind::RParen {
                        value = Some(cursor.expr()?);
                    }
                    cursor.expect(&TokenKind::RParen)?;
                }
                cursor.expect_eol()?;
                StmtKind::Raise { kind, value }
            }
            TokenKind::Ident(name) if cursor.peek_n(1) == &TokenKind::Assign => {
                cursor.advance();
                cursor.advance();
                let value = cursor.expr()?;
                cursor.expect_eol()?;
                StmtKind::Assign { name, value }
            }
            _ => {
                let expr = cursor.expr()?;
                cursor.expect_eol()?;
                StmtKind::Expr(expr)
            }
        };

        Ok(Stmt { line: number, kind })
    }
}

/// Expression parser over one line's tokens.
struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
    line: u32,
    depth: usize,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token], line: u32) -> Self {
        Self {
            tokens,
            pos: 0,
            line,
            depth: 0,
        }
    }

    /// Current token; the trailing `Eol` is returned forever once reached.
    fn current(&self) -> &'t Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &'t TokenKind {
        &self.current().kind
    }

    fn peek_n(&self, n: usize) -> &'t TokenKind {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn advance(&mut self) -> &'t Token {
        let token = self.current();
        if token.kind != TokenKind::Eol {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::parse(message, self.line, self.current().column)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<()> {
        if self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {}, found {}",
                kind.name(),
                self.peek().name()
            )))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.peek() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name.clone())
            }
            other => Err(self.error(format!("expected identifier, found {}", other.name()))),
        }
    }

    fn expect_eol(&mut self) -> Result<()> {
        if self.peek() == &TokenKind::Eol {
            Ok(())
        } else {
            Err(self.error(format!("unexpected {}", self.peek().name())))
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        self.nested(Self::negation)
    }

    /// Runs `parse` one nesting level deeper.
    fn nested(&mut self, parse: impl FnOnce(&mut Self) -> Result<Expr>) -> Result<Expr> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// `not` binds looser than comparisons.
    fn negation(&mut self) -> Result<Expr> {
        if self.peek() != &TokenKind::Not {
            return self.comparison();
        }
        self.advance();
        let operand = self.nested(Self::negation)?;
        Ok(Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        })
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.additive()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.peek() != &TokenKind::Minus {
            return self.postfix();
        }
        self.advance();
        let operand = self.nested(Self::unary)?;
        Ok(Expr::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.peek() {
                TokenKind::LParen => {
                    self.advance();
                    let (args, kwargs) = self.call_args()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        kwargs,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let Expr::Name(module) = expr else {
                        return Err(self.error("only module names support '.' access"));
                    };
                    let name = self.expect_ident()?;
                    expr = Expr::Qualified { module, name };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn call_args(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>)> {
        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Expr)> = Vec::new();
        if self.peek() == &TokenKind::RParen {
            self.advance();
            return Ok((args, kwargs));
        }
        loop {
            if let (TokenKind::Ident(name), TokenKind::Assign) = (self.peek(), self.peek_n(1)) {
                if kwargs.iter().any(|(existing, _)| existing == name) {
                    return Err(self.error(format!("keyword argument '{name}' repeated")));
                }
                let name = name.clone();
                self.advance();
                self.advance();
                kwargs.push((name, self.expr()?));
            } else if kwargs.is_empty() {
                args.push(self.expr()?);
            } else {
                return Err(self.error("positional argument follows keyword argument"));
            }

            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    return Ok((args, kwargs));
                }
                other => {
                    return Err(self.error(format!("expected ',' or ')', found {}", other.name())));
                }
            }
        }
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self.advance();
        let expr = match &token.kind {
            TokenKind::Int(n) => Expr::Literal(Value::Int(*n)),
            TokenKind::Float(n) => Expr::Literal(Value::Float(*n)),
            TokenKind::String(s) => Expr::Literal(Value::from(s.as_str())),
            TokenKind::True => Expr::Literal(Value::Bool(true)),
            TokenKind::False => Expr::Literal(Value::Bool(false)),
            TokenKind::Nil => Expr::Literal(Value::Nil),
            TokenKind::Ident(name) => Expr::Name(name.clone()),
            TokenKind::LParen => {
                let inner = self.expr()?;
                self.expect(&TokenKind::RParen)?;
                inner
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                if self.peek() != &TokenKind::RBracket {
                    loop {
                        items.push(self.expr()?);
                        if self.peek() == &TokenKind::Comma {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                self.expect(&TokenKind::RBracket)?;
                Expr::List(items)
            }
            other => {
                return Err(Error::parse(
                    format!("expected expression, found {}", other.name()),
                    self.line,
                    token.column,
                ));
            }
        };
        Ok(expr)
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
