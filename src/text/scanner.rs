//! Character cursor shared by both grammars.
//!
//! Assembly text has no fixed token set (descriptors contain `(`, `;` and
//! `[`), so the grammars pull exactly what they expect next from here instead
//! of going through a separate tokenizer.

use crate::ast::Position;

use super::ParseError;

#[derive(Copy, Clone, Debug)]
pub(crate) struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}

pub(crate) struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.column = mark.column;
    }

    /// Range from `mark` up to the current position.
    pub fn since(&self, mark: Mark) -> Position {
        Position::new(mark.line, mark.column, mark.pos, self.pos)
    }

    pub fn here(&self) -> Position {
        Position::new(self.line, self.column, self.pos, self.pos)
    }

    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.here())
    }

    pub fn error_since(&self, mark: Mark, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.since(mark))
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_ahead(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("Expected '{}'", expected)))
        }
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    pub fn at_comment(&self) -> bool {
        self.peek() == Some('/') && matches!(self.peek_ahead(1), Some('/') | Some('*'))
    }

    /// Reads a comment, markers included. `None` when not at one.
    pub fn comment(&mut self) -> Option<String> {
        if !self.at_comment() {
            return None;
        }
        let start = self.pos;
        self.advance();
        if self.advance() == Some('/') {
            while self.peek().is_some_and(|c| c != '\n') {
                self.advance();
            }
        } else {
            while !self.at_end() {
                if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                    self.advance();
                    self.advance();
                    break;
                }
                self.advance();
            }
        }
        Some(self.slice(start, self.pos))
    }

    /// Skips whitespace and discards comments, for use between operands.
    pub fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if self.comment().is_none() {
                break;
            }
        }
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start.min(self.chars.len())..end.min(self.chars.len())]
            .iter()
            .collect()
    }

    /// Reads up to whitespace or any char `stop` accepts.
    pub fn read_until(&mut self, stop: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| !c.is_whitespace() && !stop(c)) {
            self.advance();
        }
        self.slice(start, self.pos)
    }

    /// A run of non-whitespace chars.
    pub fn word(&mut self) -> String {
        self.read_until(|_| false)
    }

    pub fn peek_word(&mut self) -> String {
        let mark = self.mark();
        let word = self.word();
        self.reset(mark);
        word
    }

    /// Consumes `keyword` when it is the next whole word, ignoring case.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        let mark = self.mark();
        let word = self.read_until(|c| c == '(');
        if word.eq_ignore_ascii_case(keyword) {
            true
        } else {
            self.reset(mark);
            false
        }
    }

    /// Skips trivia, then reads a word that must not be empty.
    pub fn required_word(&mut self, what: &str) -> Result<String, ParseError> {
        self.skip_trivia();
        let word = self.word();
        if word.is_empty() {
            Err(self.error(format!("Missing {}", what)))
        } else {
            Ok(word)
        }
    }

    /// Consumes exactly one field or method descriptor.
    ///
    /// Leaves the cursor untouched and returns `None` if the text here is not
    /// a well-formed descriptor.
    pub fn descriptor(&mut self) -> Option<String> {
        let mark = self.mark();
        let start = self.pos;
        let ok = if self.eat('(') {
            let mut ok = true;
            while ok && self.peek() != Some(')') {
                ok = self.field_type(false);
            }
            ok && self.eat(')') && self.field_type(true)
        } else {
            self.field_type(false)
        };
        if ok {
            Some(self.slice(start, self.pos))
        } else {
            self.reset(mark);
            None
        }
    }

    /// Like [`Scanner::descriptor`] but for a single type, `V` allowed.
    pub fn return_type(&mut self) -> Option<String> {
        let mark = self.mark();
        let start = self.pos;
        if self.field_type(true) {
            Some(self.slice(start, self.pos))
        } else {
            self.reset(mark);
            None
        }
    }

    fn field_type(&mut self, allow_void: bool) -> bool {
        match self.advance() {
            Some('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z') => true,
            Some('V') => allow_void,
            Some('[') => self.field_type(false),
            Some('L') => {
                let mut empty = true;
                loop {
                    match self.advance() {
                        Some(';') => return !empty,
                        Some(c) if !c.is_whitespace() => empty = false,
                        _ => return false,
                    }
                }
            }
            _ => false,
        }
    }

    /// Reads a `"..."` literal, unescaping it.
    pub fn string_literal(&mut self) -> Result<String, ParseError> {
        let mark = self.mark();
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.advance() {
                None => return Err(self.error_since(mark, "Unterminated string literal")),
                Some('"') => return Ok(out),
                Some('\\') => out.push(self.escape(mark)?),
                Some(c) => out.push(c),
            }
        }
    }

    /// Reads a `'c'` literal.
    pub fn char_literal(&mut self) -> Result<char, ParseError> {
        let mark = self.mark();
        self.expect('\'')?;
        let c = match self.advance() {
            Some('\\') => self.escape(mark)?,
            Some(c) => c,
            None => return Err(self.error_since(mark, "Unterminated char literal")),
        };
        if !self.eat('\'') {
            return Err(self.error_since(mark, "Expected closing ' in char literal"));
        }
        Ok(c)
    }

    fn escape(&mut self, mark: Mark) -> Result<char, ParseError> {
        let c = match self.advance() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('0') => '\0',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('\\') => '\\',
            Some('u') => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self
                        .advance()
                        .and_then(|c| c.to_digit(16))
                        .ok_or_else(|| self.error_since(mark, "Invalid unicode escape"))?;
                    code = code * 16 + digit;
                }
                char::from_u32(code)
                    .ok_or_else(|| self.error_since(mark, "Invalid unicode escape"))?
            }
            _ => return Err(self.error_since(mark, "Invalid escape sequence")),
        };
        Ok(c)
    }

    /// Raw text up to the next whole word equal to `terminator`, which is
    /// consumed but not returned.
    pub fn text_until_word(&mut self, terminator: &str) -> Result<String, ParseError> {
        let mark = self.mark();
        let start = self.pos;
        loop {
            self.skip_whitespace();
            if self.at_end() {
                return Err(self.error_since(mark, format!("Missing '{}'", terminator)));
            }
            let end = self.pos;
            let word = self.word();
            if word.eq_ignore_ascii_case(terminator) {
                return Ok(self.slice(start, end).trim().to_string());
            }
        }
    }
}
