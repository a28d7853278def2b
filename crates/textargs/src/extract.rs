//! Folding a token stream into positional arguments and a flag map.

use crate::lexer::{FlagValue, Lexer, Token};
use indexmap::IndexMap;
use serde::Serialize;

/// Positional arguments and flags pulled out of a piece of text.
///
/// Arguments keep their order among themselves; where they sat relative to
/// flags is not recorded. A repeated flag keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extracted<'a> {
    pub args: Vec<&'a str>,
    pub flags: IndexMap<&'a str, FlagValue<'a>>,
}

impl<'a> Extracted<'a> {
    pub fn push(&mut self, token: Token<'a>) {
        match token {
            Token::Argument { text, .. } => self.args.push(text.trim()),
            Token::Flag { name, value, .. } => {
                if let Some(previous) = self.flags.insert(name, value) {
                    tracing::trace!(flag = name, ?previous, "flag repeated, keeping last value");
                }
            }
        }
    }
}

impl<'a> FromIterator<Token<'a>> for Extracted<'a> {
    fn from_iter<I: IntoIterator<Item = Token<'a>>>(iter: I) -> Self {
        let mut out = Self::default();
        for token in iter {
            out.push(token);
        }
        out
    }
}

/// Tokenize and extract `input` in one step.
pub fn extract(input: &str) -> Extracted<'_> {
    Lexer::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separates_arguments_from_flags() {
        let out = extract(r#"ban --reason="spam bot" @someone -d=7 --silent"#);
        assert_eq!(out.args, vec!["ban", "@someone"]);
        assert_eq!(out.flags.get("reason"), Some(&FlagValue::Text("spam bot")));
        assert_eq!(out.flags.get("d"), Some(&FlagValue::Text("7")));
        assert_eq!(out.flags.get("silent"), Some(&FlagValue::Switch(true)));
    }

    #[test]
    fn quoted_arguments_are_trimmed() {
        let out = extract(r#"" padded "  ''"#);
        assert_eq!(out.args, vec!["padded", ""]);
    }

    #[test]
    fn later_flag_overwrites_earlier() {
        let out = extract("--mode=fast -v --mode=slow --!v");
        assert_eq!(out.flags.len(), 2);
        assert_eq!(out.flags.get("mode"), Some(&FlagValue::Text("slow")));
        assert_eq!(out.flags.get("v"), Some(&FlagValue::Switch(false)));
        // First insertion position is kept.
        assert_eq!(out.flags.keys().copied().collect::<Vec<_>>(), vec!["mode", "v"]);
    }
}
