//! Tokenizer for edge query expressions.

use crate::error::{CprnError, Result};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    True,
    False,
    None,
    And,
    Or,
    Not,
    In,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

fn parse_error(message: impl Into<String>, offset: usize) -> CprnError {
    CprnError::QueryParse {
        message: message.into(),
        offset,
    }
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let start = pos;

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let token = match c {
            b'(' => {
                pos += 1;
                Token::LParen
            }
            b')' => {
                pos += 1;
                Token::RParen
            }
            b'[' => {
                pos += 1;
                Token::LBracket
            }
            b']' => {
                pos += 1;
                Token::RBracket
            }
            b',' => {
                pos += 1;
                Token::Comma
            }
            b'=' | b'!' | b'<' | b'>' => {
                let two = bytes.get(pos + 1) == Some(&b'=');
                pos += if two { 2 } else { 1 };
                match (c, two) {
                    (b'=', true) => Token::Eq,
                    (b'!', true) => Token::Ne,
                    (b'<', true) => Token::Le,
                    (b'>', true) => Token::Ge,
                    (b'<', false) => Token::Lt,
                    (b'>', false) => Token::Gt,
                    _ => return Err(parse_error(format!("unexpected '{}'", c as char), start)),
                }
            }
            b'\'' | b'"' => {
                let (s, next) = lex_string(input, pos)?;
                pos = next;
                Token::Str(s)
            }
            b'0'..=b'9' | b'.' | b'-' => {
                let (token, next) = lex_number(input, pos)?;
                pos = next;
                token
            }
            c if c == b'_' || c.is_ascii_alphabetic() => {
                while pos < bytes.len() && (bytes[pos] == b'_' || bytes[pos].is_ascii_alphanumeric()) {
                    pos += 1;
                }
                keyword_or_ident(&input[start..pos])
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(parse_error(format!("unexpected character '{ch}'"), start));
            }
        };

        tokens.push(Spanned { token, offset: start });
    }

    Ok(tokens)
}

fn keyword_or_ident(word: &str) -> Token {
    match word {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "in" => Token::In,
        "True" | "true" => Token::True,
        "False" | "false" => Token::False,
        "None" => Token::None,
        _ => Token::Ident(word.to_string()),
    }
}

fn lex_string(input: &str, start: usize) -> Result<(String, usize)> {
    let mut chars = input[start..].char_indices();
    let quote = match chars.next() {
        Some((_, q)) => q,
        None => return Err(parse_error("expected string", start)),
    };
    let mut out = String::new();
    let mut escaped = false;

    for (i, ch) in chars {
        if escaped {
            out.push(match ch {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            return Ok((out, start + i + ch.len_utf8()));
        } else {
            out.push(ch);
        }
    }

    Err(parse_error("unterminated string literal", start))
}

fn lex_number(input: &str, start: usize) -> Result<(Token, usize)> {
    let bytes = input.as_bytes();
    let mut pos = start;
    if bytes[pos] == b'-' {
        pos += 1;
    }
    let mut is_float = false;
    while pos < bytes.len() {
        match bytes[pos] {
            b'0'..=b'9' => pos += 1,
            b'.' if !is_float => {
                is_float = true;
                pos += 1;
            }
            b'e' | b'E' => {
                is_float = true;
                pos += 1;
                if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
                    pos += 1;
                }
            }
            _ => break,
        }
    }

    let text = &input[start..pos];
    let token = if is_float {
        text.parse::<f64>().map(Token::Float).ok()
    } else {
        text.parse::<i64>().map(Token::Int).ok()
    };
    token
        .map(|t| (t, pos))
        .ok_or_else(|| parse_error(format!("invalid number '{text}'"), start))
}
