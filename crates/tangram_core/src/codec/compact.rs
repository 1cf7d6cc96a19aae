//! Compact bare-key text format for share-link payloads.
//!
//! # Responsibility
//! - Write JSON values in a minified form that drops the quotes around
//!   object keys matching `\w+`, and parse that form back exactly.
//!
//! # Invariants
//! - `compact_parse(compact_stringify(v)) == v` for every JSON value.
//! - Writer and parser work on the value tree, never on regex rewrites of
//!   serialized text, so quoted string *values* containing `word:` tokens
//!   are never corrupted.
//!
//! This format exists solely to shave bytes off the fixed wire-record key
//! set; it is intentionally not a general interchange format. Keys that are
//! not bare word tokens are still written quoted and round-trip safely.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

static BARE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+$").expect("bare key pattern is a valid regex"));

/// Malformed compact text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Character offset where parsing failed.
    pub position: usize,
    pub message: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "compact parse error at offset {}: {}",
            self.position, self.message
        )
    }
}

impl Error for ParseError {}

/// Writes a JSON value as compact text with bare word keys.
pub fn compact_stringify(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => write_string(text, out),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(entries) => {
            out.push('{');
            for (index, (key, item)) in entries.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                if BARE_KEY_RE.is_match(key) {
                    out.push_str(key);
                } else {
                    write_string(key, out);
                }
                out.push(':');
                write_value(item, out);
            }
            out.push('}');
        }
    }
}

fn write_string(text: &str, out: &mut String) {
    out.push('"');
    for character in text.chars() {
        match character {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Parses compact text back into a JSON value.
///
/// Accepts both bare `\w+` keys and quoted keys; everything else follows the
/// standard JSON value grammar.
///
/// # Errors
/// Fails with a position-carrying [`ParseError`] on malformed input or
/// trailing content.
pub fn compact_parse(text: &str) -> Result<Value, ParseError> {
    let mut parser = Parser {
        chars: text.chars().collect(),
        pos: 0,
    };
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing content"));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let character = self.peek();
        if character.is_some() {
            self.pos += 1;
        }
        character
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(ParseError {
                position: self.pos - 1,
                message: format!("expected `{expected}`, found `{c}`"),
            }),
            None => Err(self.error(format!("expected `{expected}`, found end of input"))),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.pos += 1;
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => Ok(Value::String(self.parse_string()?)),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if c.is_alphabetic() => self.parse_keyword(),
            Some(c) => Err(self.error(format!("unexpected character `{c}`"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<Value, ParseError> {
        self.expect('{')?;
        let mut entries = Map::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Value::Object(entries));
        }
        loop {
            self.skip_whitespace();
            let key = self.parse_key()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            entries.insert(key, value);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(entries)),
                Some(c) => {
                    return Err(ParseError {
                        position: self.pos - 1,
                        message: format!("expected `,` or `}}` in object, found `{c}`"),
                    });
                }
                None => return Err(self.error("unterminated object")),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, ParseError> {
        if self.peek() == Some('"') {
            return self.parse_string();
        }
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected object key"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(Value::Array(items));
        }
        loop {
            self.skip_whitespace();
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(Value::Array(items)),
                Some(c) => {
                    return Err(ParseError {
                        position: self.pos - 1,
                        message: format!("expected `,` or `]` in array, found `{c}`"),
                    });
                }
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(text),
                Some('\\') => text.push(self.parse_escape()?),
                Some(c) if (c as u32) < 0x20 => {
                    return Err(ParseError {
                        position: self.pos - 1,
                        message: "unescaped control character in string".to_string(),
                    });
                }
                Some(c) => text.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, ParseError> {
        match self.bump() {
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('b') => Ok('\u{0008}'),
            Some('f') => Ok('\u{000C}'),
            Some('u') => self.parse_unicode_escape(),
            Some(c) => Err(ParseError {
                position: self.pos - 1,
                message: format!("unknown escape `\\{c}`"),
            }),
            None => Err(self.error("unterminated escape")),
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, ParseError> {
        let first = self.parse_hex4()?;
        // Surrogate pairs arrive as two consecutive \uXXXX escapes.
        if (0xD800..0xDC00).contains(&first) {
            self.expect('\\')?;
            self.expect('u')?;
            let second = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&second) {
                return Err(self.error("invalid low surrogate in unicode escape"));
            }
            let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
            return char::from_u32(combined).ok_or_else(|| self.error("invalid surrogate pair"));
        }
        char::from_u32(first).ok_or_else(|| self.error("invalid unicode escape"))
    }

    fn parse_hex4(&mut self) -> Result<u32, ParseError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("expected four hex digits in unicode escape"))?;
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some('0'..='9' | '-' | '+' | '.' | 'e' | 'E')
        ) {
            self.pos += 1;
        }
        let token: String = self.chars[start..self.pos].iter().collect();
        let number = if token.contains(['.', 'e', 'E']) {
            token
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
        } else {
            token
                .parse::<i64>()
                .ok()
                .map(Number::from)
                .or_else(|| token.parse::<u64>().ok().map(Number::from))
        };
        number.map(Value::Number).ok_or(ParseError {
            position: start,
            message: format!("invalid number `{token}`"),
        })
    }

    fn parse_keyword(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            _ => Err(ParseError {
                position: start,
                message: format!("unexpected bare word `{word}`"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{compact_parse, compact_stringify};
    use serde_json::{json, Value};

    #[test]
    fn word_keys_are_written_bare() {
        let value = json!({"pn": "Home", "x": 10, "p": [{"t": 0, "r": 2}]});
        let text = compact_stringify(&value);
        assert_eq!(text, r#"{pn:"Home",x:10,p:[{t:0,r:2}]}"#);
    }

    #[test]
    fn non_word_keys_stay_quoted() {
        let value = json!({"a key": 1, "dash-ed": 2});
        let text = compact_stringify(&value);
        assert_eq!(text, r#"{"a key":1,"dash-ed":2}"#);
        assert_eq!(compact_parse(&text).unwrap(), value);
    }

    #[test]
    fn round_trips_the_wire_record_shape() {
        let value = json!({
            "pn": "Untitled Project",
            "x": 10.0,
            "y": -5.5,
            "p": [{"t": 0, "x": 12.346, "y": 0, "r": 2, "c": 0}],
            "cm": {"0": "#FF0000"}
        });
        let text = compact_stringify(&value);
        assert_eq!(compact_parse(&text).unwrap(), value);
    }

    #[test]
    fn string_values_containing_key_like_tokens_survive() {
        // The regex-rewrite approach this replaces would corrupt these.
        let value = json!({"pn": "note: x:1 {y:2}", "cm": {"0": "tricky:\"quoted\""}});
        let text = compact_stringify(&value);
        assert_eq!(compact_parse(&text).unwrap(), value);
    }

    #[test]
    fn escapes_and_multibyte_text_round_trip() {
        let value = json!({"pn": "tab\there \"q\" \\ \u{1F600} \u{65E5}\u{672C}"});
        let text = compact_stringify(&value);
        assert_eq!(compact_parse(&text).unwrap(), value);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(compact_parse("{pn:}").is_err());
        assert!(compact_parse("{pn:1").is_err());
        assert!(compact_parse("{:1}").is_err());
        assert!(compact_parse("[1,2").is_err());
        assert!(compact_parse("{pn:1}garbage").is_err());
        assert!(compact_parse("{pn:bogus}").is_err());

        let err = compact_parse("{pn:\"unterminated").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn parses_standard_json_too() {
        let text = r#"{"pn":"Home","flags":[true,false,null],"n":-3.25e2}"#;
        let parsed = compact_parse(text).unwrap();
        let reference: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, reference);
    }
}
