//! The parser: a deterministic state machine over the scanner's tokens
//! that produces a parse tree of filter node *shells*, still carrying
//! operator names as plain keyword strings rather than resolved
//! [`OpKind`](crate::filter::OpKind) values.
//!
//! States `INITIAL -> ATTRIBUTE -> OPERATOR -> ARGUMENT -> ANDOR` are
//! realized as a recursive-descent parser rather than an explicit table:
//! each grammar production below corresponds to one state transition,
//! which keeps the bracket/context nesting (itself a stack of the same
//! states) structural instead of hand-managed.

use tracing::debug;

use crate::error::ParseError;
use crate::path::Path;
use crate::token::{scan, AndOr, Token, TokenKind};

/// A literal argument: either a bare scalar or a bracketed list of
/// scalars. Nested lists have no representation here, which is how the
/// grammar's "no nested lists" rule is enforced in the type.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<ScalarLiteral>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarLiteral {
    Integer(i64),
    Float(f64),
    String(String),
}

/// A parse-tree node. Operator keywords (`is`, `contains`, ...) are kept
/// as the raw string the scanner canonicalised them to; the compiler
/// is the only place that resolves them against a concrete
/// [`OpKind`](crate::filter::OpKind).
#[derive(Debug, Clone, PartialEq)]
pub enum ParseNode {
    BinaryOp {
        path: Path,
        op: String,
        arg: Literal,
    },
    Context {
        path: Path,
        child: Box<ParseNode>,
    },
    /// A flat `AND`/`OR` chain: `first` followed by zero or more
    /// `(connective, expr)` pairs, left-to-right, with no precedence
    /// between `AND` and `OR`. A single bare expression never gets
    /// wrapped in a `Chain`, so `rest` is always non-empty.
    Chain {
        first: Box<ParseNode>,
        rest: Vec<(AndOr, ParseNode)>,
    },
}

/// Parses `query` into a [`ParseNode`] tree. Fails with [`ParseError`]
/// on any malformed input; does not raise otherwise.
pub fn parse(query: &str) -> Result<ParseNode, ParseError> {
    let tokens = scan(query)?;
    if matches!(tokens.first().map(|t| &t.kind), Some(TokenKind::End)) {
        return Err(ParseError::EmptyQuery);
    }
    let mut cursor = Cursor::new(&tokens);
    let node = cursor.parse_query()?;
    cursor.expect_end()?;
    debug!(?node, "query parsed");
    Ok(node)
}

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        match &self.peek().kind {
            TokenKind::End => Ok(()),
            _ => Err(ParseError::TrailingTokens {
                pos: self.peek().start,
            }),
        }
    }

    /// `query := expr (AndOr expr)*`.
    fn parse_query(&mut self) -> Result<ParseNode, ParseError> {
        let first = self.parse_expr()?;
        let mut rest = Vec::new();
        loop {
            let connective = match &self.peek().kind {
                TokenKind::AndOr(op) => *op,
                _ => break,
            };
            self.advance();
            let next = self.parse_expr()?;
            rest.push((connective, next));
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(ParseNode::Chain {
                first: Box::new(first),
                rest,
            })
        }
    }

    /// `expr := '(' query ')' | '@' IDENT '(' query ')' | IDENT OP arg`.
    fn parse_expr(&mut self) -> Result<ParseNode, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_query()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Context => {
                self.advance();
                let path = self.expect_identifier()?;
                self.expect(TokenKind::LParen)?;
                let inner = self.parse_query()?;
                self.expect(TokenKind::RParen)?;
                Ok(ParseNode::Context {
                    path: Path::parse(&path),
                    child: Box::new(inner),
                })
            }
            TokenKind::Identifier(path) => {
                self.advance();
                let op = self.expect_operator()?;
                let arg = self.parse_argument()?;
                Ok(ParseNode::BinaryOp {
                    path: Path::parse(&path),
                    op,
                    arg,
                })
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "an attribute, '(', or '@'".into(),
                found: other.to_string(),
                pos: self.peek().start,
            }),
        }
    }

    fn expect(&mut self, want: TokenKind) -> Result<(), ParseError> {
        if self.peek().kind == want {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: want.to_string(),
                found: self.peek().kind.to_string(),
                pos: self.peek().start,
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "an attribute name".into(),
                found: other.to_string(),
                pos: self.peek().start,
            }),
        }
    }

    fn expect_operator(&mut self) -> Result<String, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Operator(op) => {
                self.advance();
                Ok(op)
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "an operator".into(),
                found: other.to_string(),
                pos: self.peek().start,
            }),
        }
    }

    /// `arg := INT | FLOAT | STRING | list`. Unquoted identifiers are
    /// never valid arguments.
    fn parse_argument(&mut self) -> Result<Literal, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Literal::Integer(n))
            }
            TokenKind::Float(n) => {
                self.advance();
                Ok(Literal::Float(n))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Literal::String(s))
            }
            TokenKind::LBracket => self.parse_list(),
            other => Err(ParseError::UnexpectedToken {
                expected: "an integer, float, string, or list literal".into(),
                found: other.to_string(),
                pos: self.peek().start,
            }),
        }
    }

    /// `list := '[' [ arg (',' arg)* ','? ] ']'`, with two quirks
    /// preserved verbatim from the original grammar: nested lists are
    /// always a hard error, but stray commas with no element between
    /// them are silently treated as an absent element, so `[,,]` parses
    /// as the empty list.
    fn parse_list(&mut self) -> Result<Literal, ParseError> {
        self.expect(TokenKind::LBracket)?;
        let mut items = Vec::new();
        loop {
            match self.peek().kind.clone() {
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                TokenKind::Comma => {
                    self.advance();
                    continue;
                }
                TokenKind::Integer(n) => {
                    self.advance();
                    items.push(ScalarLiteral::Integer(n));
                }
                TokenKind::Float(n) => {
                    self.advance();
                    items.push(ScalarLiteral::Float(n));
                }
                TokenKind::String(s) => {
                    self.advance();
                    items.push(ScalarLiteral::String(s));
                }
                TokenKind::LBracket => {
                    return Err(ParseError::NestedList {
                        pos: self.peek().start,
                    })
                }
                TokenKind::End => {
                    return Err(ParseError::UnexpectedEnd {
                        expected: "',' or ']'".into(),
                    })
                }
                other => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "a list element, ',', or ']'".into(),
                        found: other.to_string(),
                        pos: self.peek().start,
                    })
                }
            }
            match self.peek().kind {
                TokenKind::Comma | TokenKind::RBracket => {}
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "',' or ']'".into(),
                        found: self.peek().kind.to_string(),
                        pos: self.peek().start,
                    })
                }
            }
        }
        Ok(Literal::List(items))
    }
}
