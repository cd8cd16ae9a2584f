//! Grammar rules both syntaxes spell the same way.

use crate::types::{AccessFlags, FlagTarget};

use super::literal::looks_numeric;
use super::node::{HandleNode, Literal, ParamNode, Spanned};
use super::scanner::Scanner;
use super::ParseError;

/// Chars that end a literal or name inside a bracketed list.
pub(crate) fn list_stop(c: char) -> bool {
    matches!(c, ',' | ')' | ']' | ':' | '=')
}

fn is_modifier(word: &str) -> bool {
    AccessFlags::from_keyword(FlagTarget::Method, word).is_some()
        || AccessFlags::from_keyword(FlagTarget::Field, word).is_some()
}

/// Leading modifier keywords. A keyword directly followed by `(` is a name.
pub(crate) fn modifiers(s: &mut Scanner) -> Vec<Spanned<String>> {
    let mut found = Vec::new();
    loop {
        let mark = s.mark();
        let word = s.read_until(|c| c == '(');
        if !word.is_empty() && is_modifier(&word) && s.peek().is_some_and(char::is_whitespace) {
            found.push(Spanned::new(word, s.since(mark)));
            s.skip_whitespace();
        } else {
            s.reset(mark);
            return found;
        }
    }
}

/// `(<desc> <name>, ...)<ret>`, starting at `(`.
///
/// A parameter descriptor that doesn't scan as one is kept as written so the
/// compiler can report it against the parameter's name.
pub(crate) fn method_signature(
    s: &mut Scanner,
) -> Result<(Vec<ParamNode>, Option<String>), ParseError> {
    s.expect('(')?;
    let mut params = Vec::new();
    loop {
        s.skip_whitespace();
        if s.eat(')') {
            break;
        }
        if s.at_end() {
            return Err(s.error("Unterminated parameter list"));
        }
        let mark = s.mark();
        let desc = match s.descriptor() {
            Some(desc) => desc,
            None => s.read_until(|c| c == ',' || c == ')'),
        };
        s.skip_whitespace();
        let name = s.read_until(|c| c == ',' || c == ')');
        if name.is_empty() {
            return Err(s.error_since(mark, "Missing parameter name"));
        }
        params.push(ParamNode {
            desc,
            name,
            position: s.since(mark),
        });
        s.skip_whitespace();
        s.eat(',');
    }
    Ok((params, s.return_type()))
}

/// `owner.name`, ending before whitespace, `(` or `)`.
pub(crate) fn member(s: &mut Scanner) -> Result<Spanned<String>, ParseError> {
    s.skip_trivia();
    let mark = s.mark();
    let text = s.read_until(|c| c == '(' || c == ')');
    if text.is_empty() {
        return Err(s.error("Missing member reference"));
    }
    Ok(Spanned::new(text, s.since(mark)))
}

/// A descriptor after optional whitespace, for member references.
pub(crate) fn member_desc(s: &mut Scanner) -> Result<String, ParseError> {
    s.skip_trivia();
    match s.descriptor() {
        Some(desc) => Ok(desc),
        None => {
            let mark = s.mark();
            let word = s.read_until(|c| c == ')');
            Err(s.error_since(mark, format!("Invalid descriptor: '{}'", word)))
        }
    }
}

/// `<TAG> owner.name desc`, the part of a handle both syntaxes share.
pub(crate) fn handle_body(s: &mut Scanner) -> Result<HandleNode, ParseError> {
    s.skip_trivia();
    let mark = s.mark();
    let tag = s.read_until(|c| c == ')');
    if tag.is_empty() {
        return Err(s.error("Missing handle tag"));
    }
    let tag = Spanned::new(tag, s.since(mark));
    let member = member(s)?;
    let desc = member_desc(s)?;
    Ok(HandleNode { tag, member, desc })
}

/// Whether a literal starts here, after trivia.
pub(crate) fn at_literal(s: &mut Scanner) -> bool {
    s.skip_trivia();
    match s.peek() {
        Some('"') | Some('\'') => true,
        Some(_) => {
            let mark = s.mark();
            let token = s.read_until(list_stop);
            s.reset(mark);
            looks_numeric(&token)
        }
        None => false,
    }
}

pub(crate) fn literal(s: &mut Scanner) -> Result<Spanned<Literal>, ParseError> {
    s.skip_trivia();
    let mark = s.mark();
    let value = match s.peek() {
        Some('"') => Literal::String(s.string_literal()?),
        Some('\'') => Literal::Char(s.char_literal()?),
        _ => {
            let token = s.read_until(list_stop);
            if !looks_numeric(&token) {
                return Err(s.error_since(mark, format!("Expected literal, found '{}'", token)));
            }
            Literal::Number(token)
        }
    };
    Ok(Spanned::new(value, s.since(mark)))
}

/// A label name inside a bracketed list or after a keyword.
pub(crate) fn label_ref(s: &mut Scanner) -> Result<String, ParseError> {
    s.skip_trivia();
    let name = s.read_until(list_stop);
    if name.is_empty() {
        Err(s.error("Missing label name"))
    } else {
        Ok(name)
    }
}

/// A label declaration is a word ending in `:`.
pub(crate) fn label_decl(word: &str) -> Option<&str> {
    word.strip_suffix(':').filter(|name| !name.is_empty())
}

/// A descriptor used as a constant, which must be well formed.
pub(crate) fn type_constant(s: &mut Scanner) -> Result<Spanned<String>, ParseError> {
    s.skip_trivia();
    let mark = s.mark();
    match s.descriptor() {
        Some(desc) => Ok(Spanned::new(desc, s.since(mark))),
        None => {
            let word = s.read_until(list_stop);
            Err(s.error_since(mark, format!("Invalid descriptor: '{}'", word)))
        }
    }
}
