use crate::ast::*;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    /// Parse a single constraint such as `painting: 2x1 + x2 <= 100`.
    pub fn parse_constraint(line: &str) -> Result<ConstraintDecl, ParseError> {
        let tokens = Lexer::tokenize(line);
        let mut parser = Parser::new(tokens);
        parser.skip_newlines_and_comments();
        let decl = parser.parse_constraint_decl()?;
        parser.skip_newlines_and_comments();
        parser.expect(TokenKind::Eof)?;
        Ok(decl)
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn skip_newlines_and_comments(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Comment) {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind == TokenKind::Eof => ParseError::UnexpectedEof(expected.to_string()),
            Some(t) if t.kind == TokenKind::Error => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("'{}'", t.text),
                span: t.span,
            },
            Some(t) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("{:?}", t.kind),
                span: t.span,
            },
            None => ParseError::UnexpectedEof(expected.to_string()),
        }
    }

    /// Statements do not span lines, so unlike the block parsers this never
    /// skips newlines before matching.
    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            _ => Err(self.unexpected(&format!("{:?}", kind))),
        }
    }

    fn end_of_statement(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Newline | TokenKind::Comment | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn last_end(&self, fallback: usize) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span.end)
            .unwrap_or(fallback)
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();

        loop {
            self.skip_newlines_and_comments();

            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Maximize => items.push(Item::Objective(self.parse_objective()?)),
                TokenKind::Ident | TokenKind::Number | TokenKind::Minus | TokenKind::Plus => {
                    items.push(Item::Constraint(self.parse_constraint_decl()?))
                }
                _ => return Err(self.unexpected("objective or constraint")),
            }
            self.end_of_statement()?;
        }

        Ok(Program { items })
    }

    fn parse_objective(&mut self) -> Result<Objective, ParseError> {
        let start = self.expect(TokenKind::Maximize)?.span;
        // `maximize Z = 7x1 + 5x2` names the objective; the name is dropped.
        if self.peek_kind() == TokenKind::Ident && self.peek_kind_at(1) == TokenKind::Eq {
            self.advance();
            self.advance();
        }
        let expr = self.parse_linear_expr()?;
        Ok(Objective {
            span: Span::new(start.start, self.last_end(start.end)),
            expr,
        })
    }

    fn parse_constraint_decl(&mut self) -> Result<ConstraintDecl, ParseError> {
        let start = self
            .current()
            .map(|t| t.span)
            .unwrap_or(Span::new(0, 0));

        let mut label = None;
        if self.peek_kind() == TokenKind::Ident && self.peek_kind_at(1) == TokenKind::Colon {
            label = self.advance().map(|t| t.text.clone());
            self.advance();
        }

        let lhs = self.parse_linear_expr()?;
        let relation = self.parse_relation()?;
        let rhs = self.parse_signed_number()?;

        Ok(ConstraintDecl {
            span: Span::new(start.start, self.last_end(start.end)),
            label,
            lhs,
            relation,
            rhs,
        })
    }

    fn parse_relation(&mut self) -> Result<Relation, ParseError> {
        let relation = match self.peek_kind() {
            TokenKind::Le => Relation::Le,
            TokenKind::Ge => Relation::Ge,
            TokenKind::Eq => Relation::Eq,
            _ => return Err(self.unexpected("<=, >= or =")),
        };
        self.advance();
        Ok(relation)
    }

    fn parse_linear_expr(&mut self) -> Result<LinearExpr, ParseError> {
        let mut terms = Vec::new();

        let mut sign = match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            _ => 1.0,
        };

        loop {
            let mut term = self.parse_term()?;
            term.coefficient *= sign;
            terms.push(term);

            sign = match self.peek_kind() {
                TokenKind::Plus => 1.0,
                TokenKind::Minus => -1.0,
                _ => break,
            };
            self.advance();
        }

        Ok(LinearExpr { terms })
    }

    /// `4x1`, `4 * x1`, `x1`, `2.5`
    fn parse_term(&mut self) -> Result<Term, ParseError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let token = self.expect(TokenKind::Number)?;
                let coefficient = parse_number(&token)?;
                let star = self.peek_kind() == TokenKind::Star;
                if star {
                    self.advance();
                }
                if star || self.peek_kind() == TokenKind::Ident {
                    let var = self.expect(TokenKind::Ident)?;
                    Ok(Term {
                        span: token.span.merge(var.span),
                        coefficient,
                        variable: Some(var.text),
                    })
                } else {
                    Ok(Term {
                        span: token.span,
                        coefficient,
                        variable: None,
                    })
                }
            }
            TokenKind::Ident => {
                let var = self.expect(TokenKind::Ident)?;
                Ok(Term {
                    span: var.span,
                    coefficient: 1.0,
                    variable: Some(var.text),
                })
            }
            _ => Err(self.unexpected("number or variable")),
        }
    }

    fn parse_signed_number(&mut self) -> Result<f64, ParseError> {
        let sign = match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            _ => 1.0,
        };
        let token = self.expect(TokenKind::Number)?;
        Ok(sign * parse_number(&token)?)
    }
}

fn parse_number(token: &Token) -> Result<f64, ParseError> {
    token
        .text
        .parse()
        .map_err(|_| ParseError::InvalidNumber(token.text.clone()))
}
