//! Lexer for free-form command text.
//!
//! Text is split into [`Token`]s by trying a fixed list of rules at each scan
//! position. The first rule that matches consumes its text and scanning resumes
//! right after it:
//!
//! 1. `-x="quoted value"`
//! 2. `-x=value`
//! 3. `-x` / `-!x`
//! 4. `--name="quoted value"`
//! 5. `--name=value`
//! 6. `--name` / `--!name`
//! 7. bare argument (no quotes, no whitespace)
//! 8. `"quoted argument"` / `'quoted argument'`
//!
//! Whitespace separates tokens. Quoted content is returned verbatim: escaped
//! quotes (`\"`) stay escaped.

use serde::Serialize;
use std::borrow::Cow;

/// The lexer rule that produced a token, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    QuotedShortFlag,
    ValueShortFlag,
    ShortFlag,
    QuotedLongFlag,
    ValueLongFlag,
    LongFlag,
    Argument,
    QuotedArgument,
}

/// Value attached to a flag token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlagValue<'a> {
    /// `--name=value` or `--name="value"`.
    Text(&'a str),
    /// `--name` (true) or `--!name` (false).
    Switch(bool),
}

impl<'a> FlagValue<'a> {
    /// The value as text. Switches render as `true` / `false`.
    pub fn as_text(&self) -> Cow<'a, str> {
        match *self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Switch(on) => Cow::Owned(on.to_string()),
        }
    }

    /// The boolean value of a switch, `None` for text values.
    pub fn as_switch(&self) -> Option<bool> {
        match *self {
            Self::Switch(on) => Some(on),
            Self::Text(_) => None,
        }
    }
}

/// A classified piece of input text. Borrows from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Token<'a> {
    Argument {
        text: &'a str,
        rule: Rule,
    },
    Flag {
        name: &'a str,
        value: FlagValue<'a>,
        rule: Rule,
    },
}

/// Iterator over the tokens of a piece of text.
///
/// The lexer never fails. A quote character that does not open a complete
/// quoted value (`don't`, `"unterminated`) is skipped.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn next_token(&self) -> Option<(Token<'a>, usize)> {
        let rest = &self.input[self.pos..];
        short_flag(rest)
            .or_else(|| long_flag(rest))
            .or_else(|| argument(rest))
            .or_else(|| self.quoted_argument(rest))
    }

    fn quoted_argument(&self, rest: &'a str) -> Option<(Token<'a>, usize)> {
        if self.input.as_bytes()[..self.pos].last() == Some(&b'\\') {
            return None;
        }
        let (text, len) = quoted(rest)?;
        Some((
            Token::Argument {
                text,
                rule: Rule::QuotedArgument,
            },
            len,
        ))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = &self.input[self.pos..];
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            let skipped = trimmed.chars().next()?;
            if let Some((token, len)) = self.next_token() {
                self.pos += len;
                return Some(token);
            }

            // Only a quote can fail every rule; bare text always forms an argument.
            tracing::trace!(position = self.pos, "skipping unmatched {skipped:?}");
            self.pos += skipped.len_utf8();
        }
    }
}

/// Tokenize `input` into a vector of tokens.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

fn name_len(s: &str, accept: impl Fn(u8) -> bool) -> usize {
    s.bytes().take_while(|b| accept(*b)).count()
}

fn value_len(s: &str) -> usize {
    s.find(char::is_whitespace).unwrap_or(s.len())
}

/// Match a quoted value at the start of `s`.
///
/// Either quote kind may open or close. Quotes inside the content must be
/// preceded by a backslash, and the closing quote must not be. Returns the
/// content and the number of bytes consumed including both quotes.
fn quoted(s: &str) -> Option<(&str, usize)> {
    let bytes = s.as_bytes();
    if !is_quote(*bytes.first()?) {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() {
        if is_quote(bytes[i]) && bytes[i - 1] != b'\\' {
            return Some((&s[1..i], i + 1));
        }
        i += 1;
    }
    None
}

/// `=value` / `="value"` after a flag name. `prefix` is the byte length of
/// everything before the `=`.
fn flag_value<'a>(
    name: &'a str,
    after_eq: &'a str,
    prefix: usize,
    quoted_rule: Rule,
    value_rule: Rule,
) -> Option<(Token<'a>, usize)> {
    if let Some((text, len)) = quoted(after_eq) {
        let token = Token::Flag {
            name,
            value: FlagValue::Text(text),
            rule: quoted_rule,
        };
        return Some((token, prefix + 1 + len));
    }

    let len = value_len(after_eq);
    if len == 0 {
        return None;
    }
    let token = Token::Flag {
        name,
        value: FlagValue::Text(&after_eq[..len]),
        rule: value_rule,
    };
    Some((token, prefix + 1 + len))
}

fn short_flag(rest: &str) -> Option<(Token<'_>, usize)> {
    let body = rest.strip_prefix('-')?;

    let n = name_len(body, |b| b.is_ascii_alphanumeric() || b == b'+');
    if n > 0 && body.as_bytes().get(n) == Some(&b'=') {
        let found = flag_value(
            &body[..n],
            &body[n + 1..],
            1 + n,
            Rule::QuotedShortFlag,
            Rule::ValueShortFlag,
        );
        if found.is_some() {
            return found;
        }
    }

    let (negated, body) = match body.strip_prefix('!') {
        Some(body) => (true, body),
        None => (false, body),
    };
    if !body.as_bytes().first()?.is_ascii_alphanumeric() {
        return None;
    }
    let token = Token::Flag {
        name: &body[..1],
        value: FlagValue::Switch(!negated),
        rule: Rule::ShortFlag,
    };
    Some((token, 2 + usize::from(negated)))
}

fn long_flag(rest: &str) -> Option<(Token<'_>, usize)> {
    let body = rest.strip_prefix("--")?;

    let n = name_len(body, |b| b.is_ascii_alphanumeric() || b == b'-' || b == b'+');
    if n > 0 && body.as_bytes().get(n) == Some(&b'=') {
        let found = flag_value(
            &body[..n],
            &body[n + 1..],
            2 + n,
            Rule::QuotedLongFlag,
            Rule::ValueLongFlag,
        );
        if found.is_some() {
            return found;
        }
    }

    let (negated, body) = match body.strip_prefix('!') {
        Some(body) => (true, body),
        None => (false, body),
    };
    let n = name_len(body, |b| b.is_ascii_alphanumeric() || b == b'-');
    if n == 0 {
        return None;
    }
    let token = Token::Flag {
        name: &body[..n],
        value: FlagValue::Switch(!negated),
        rule: Rule::LongFlag,
    };
    Some((token, 2 + usize::from(negated) + n))
}

fn argument(rest: &str) -> Option<(Token<'_>, usize)> {
    let len = rest
        .find(|c: char| c.is_whitespace() || c == '"' || c == '\'')
        .unwrap_or(rest.len());
    if len == 0 {
        return None;
    }
    let token = Token::Argument {
        text: &rest[..len],
        rule: Rule::Argument,
    };
    Some((token, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag<'a>(name: &'a str, value: FlagValue<'a>, rule: Rule) -> Token<'a> {
        Token::Flag { name, value, rule }
    }

    fn arg(text: &str, rule: Rule) -> Token<'_> {
        Token::Argument { text, rule }
    }

    #[test]
    fn splits_bare_arguments_on_whitespace() {
        assert_eq!(
            tokenize("  hello\tthere\nfriend "),
            vec![
                arg("hello", Rule::Argument),
                arg("there", Rule::Argument),
                arg("friend", Rule::Argument),
            ]
        );
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn classifies_every_flag_form() {
        let tokens = tokenize(r#"-a="x y" -b=2 -c -!d --long="p q" --val=3 --on --!off"#);
        assert_eq!(
            tokens,
            vec![
                flag("a", FlagValue::Text("x y"), Rule::QuotedShortFlag),
                flag("b", FlagValue::Text("2"), Rule::ValueShortFlag),
                flag("c", FlagValue::Switch(true), Rule::ShortFlag),
                flag("d", FlagValue::Switch(false), Rule::ShortFlag),
                flag("long", FlagValue::Text("p q"), Rule::QuotedLongFlag),
                flag("val", FlagValue::Text("3"), Rule::ValueLongFlag),
                flag("on", FlagValue::Switch(true), Rule::LongFlag),
                flag("off", FlagValue::Switch(false), Rule::LongFlag),
            ]
        );
    }

    #[test]
    fn short_value_flags_accept_multi_character_names() {
        assert_eq!(
            tokenize("-yo=5 -+test=hi"),
            vec![
                flag("yo", FlagValue::Text("5"), Rule::ValueShortFlag),
                flag("+test", FlagValue::Text("hi"), Rule::ValueShortFlag),
            ]
        );
    }

    #[test]
    fn bare_short_flag_is_a_single_character() {
        assert_eq!(
            tokenize("-ab"),
            vec![
                flag("a", FlagValue::Switch(true), Rule::ShortFlag),
                arg("b", Rule::Argument),
            ]
        );
    }

    #[test]
    fn named_override_uses_plus_prefix() {
        assert_eq!(
            tokenize("--+test=hello"),
            vec![flag("+test", FlagValue::Text("hello"), Rule::ValueLongFlag)]
        );
        // `+` is not allowed in boolean long flags.
        assert_eq!(tokenize("--+test"), vec![arg("--+test", Rule::Argument)]);
    }

    #[test]
    fn quoted_arguments_keep_escaped_quotes() {
        assert_eq!(
            tokenize(r#"say "he said \"hi\"" 'it\'s'"#),
            vec![
                arg("say", Rule::Argument),
                arg(r#"he said \"hi\""#, Rule::QuotedArgument),
                arg(r"it\'s", Rule::QuotedArgument),
            ]
        );
    }

    #[test]
    fn quoted_values_may_span_lines() {
        assert_eq!(
            tokenize("--note=\"line one\nline two\""),
            vec![flag(
                "note",
                FlagValue::Text("line one\nline two"),
                Rule::QuotedLongFlag
            )]
        );
    }

    #[test]
    fn quote_kinds_need_not_pair() {
        assert_eq!(
            tokenize(r#""mixed' rest"#),
            vec![
                arg("mixed", Rule::QuotedArgument),
                arg("rest", Rule::Argument),
            ]
        );
    }

    #[test]
    fn unmatched_quote_is_skipped() {
        assert_eq!(
            tokenize("I don't know"),
            vec![
                arg("I", Rule::Argument),
                arg("don", Rule::Argument),
                arg("t", Rule::Argument),
                arg("know", Rule::Argument),
            ]
        );
        assert_eq!(tokenize("\""), Vec::new());
    }

    #[test]
    fn unterminated_quoted_flag_falls_back_to_plain_value() {
        assert_eq!(
            tokenize(r#"--msg="oops"#),
            vec![flag("msg", FlagValue::Text("\"oops"), Rule::ValueLongFlag)]
        );
    }

    #[test]
    fn flag_without_value_after_equals_is_a_switch() {
        assert_eq!(
            tokenize("--name= x"),
            vec![
                flag("name", FlagValue::Switch(true), Rule::LongFlag),
                arg("=", Rule::Argument),
                arg("x", Rule::Argument),
            ]
        );
    }

    #[test]
    fn lone_dashes_are_arguments() {
        assert_eq!(
            tokenize("- --"),
            vec![arg("-", Rule::Argument), arg("--", Rule::Argument)]
        );
    }

    #[test]
    fn non_ascii_text_is_preserved() {
        assert_eq!(
            tokenize("héllo \"wörld ✓\""),
            vec![
                arg("héllo", Rule::Argument),
                arg("wörld ✓", Rule::QuotedArgument),
            ]
        );
    }

    #[test]
    fn flag_value_conversions() {
        assert_eq!(FlagValue::Switch(false).as_text(), "false");
        assert_eq!(FlagValue::Text("x").as_switch(), None);
    }
}
