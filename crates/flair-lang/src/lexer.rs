use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Maximize,

    // Literals
    Ident,
    Number,

    // Operators
    Plus,
    Minus,
    Star,
    Colon,
    Le,
    Ge,
    Eq,

    // Special
    Newline,
    Comment,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        self.token(TokenKind::Comment, start)
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.token(TokenKind::Number, start)
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let kind = match &self.source[start..self.pos] {
            "maximize" | "maximise" | "max" => TokenKind::Maximize,
            _ => TokenKind::Ident,
        };
        self.token(kind, start)
    }

    /// Consume the current char, and the next one if it is `follow`.
    fn one_or_two(&mut self, follow: char, single: TokenKind, double: TokenKind) -> Token {
        let start = self.pos;
        self.advance();
        if self.peek() == Some(follow) {
            self.advance();
            self.token(double, start)
        } else {
            self.token(single, start)
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            '\n' => {
                self.advance();
                self.token(TokenKind::Newline, start)
            }
            '/' if self.peek_next() == Some('/') => self.skip_line_comment(),
            '#' => self.skip_line_comment(),
            '+' => {
                self.advance();
                self.token(TokenKind::Plus, start)
            }
            '-' => {
                self.advance();
                self.token(TokenKind::Minus, start)
            }
            '*' => {
                self.advance();
                self.token(TokenKind::Star, start)
            }
            ':' => {
                self.advance();
                self.token(TokenKind::Colon, start)
            }
            // A bare `<` or `>` is a strict inequality, which is not supported.
            '<' => self.one_or_two('=', TokenKind::Error, TokenKind::Le),
            '>' => self.one_or_two('=', TokenKind::Error, TokenKind::Ge),
            '=' => self.one_or_two('=', TokenKind::Eq, TokenKind::Eq),
            '≤' => {
                self.advance();
                self.token(TokenKind::Le, start)
            }
            '≥' => {
                self.advance();
                self.token(TokenKind::Ge, start)
            }
            c if c.is_ascii_digit() => self.read_number(),
            '.' if self.peek_next().is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.read_ident(),
            _ => {
                self.advance();
                self.token(TokenKind::Error, start)
            }
        }
    }
}
