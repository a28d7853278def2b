//! Binding extracted input against a compiled schema.

use crate::extract::{Extracted, extract};
use crate::lexer::FlagValue;
use crate::schema::{OptionKind, Parser};
use crate::slot::{OMITTED, Slot};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::VecDeque;

/// Positional results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments<'a> {
    ordered: Vec<Slot>,
    leftover: Vec<&'a str>,
    named: IndexMap<String, Slot>,
}

impl<'a> Arguments<'a> {
    /// One slot per declared argument, in declaration order.
    pub fn ordered(&self) -> &[Slot] {
        &self.ordered
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.ordered.get(index)
    }

    /// Positionals no spec asked for. Always empty when a rest argument exists.
    pub fn leftover(&self) -> &[&'a str] {
        &self.leftover
    }

    pub fn named(&self, name: &str) -> Option<&Slot> {
        self.named.get(name)
    }

    pub fn named_map(&self) -> &IndexMap<String, Slot> {
        &self.named
    }
}

/// A successful parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matches<'a> {
    arguments: Arguments<'a>,
    options: IndexMap<String, Slot>,
    flags: IndexMap<String, bool>,
}

impl<'a> Matches<'a> {
    pub fn arguments(&self) -> &Arguments<'a> {
        &self.arguments
    }

    /// Option value by key or alt. `None` for names the schema does not declare.
    pub fn option(&self, name: &str) -> Option<&Slot> {
        self.options.get(name)
    }

    pub fn options(&self) -> &IndexMap<String, Slot> {
        &self.options
    }

    /// Flag value by key or alt. Undeclared names read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn flags(&self) -> &IndexMap<String, bool> {
        &self.flags
    }
}

#[derive(Debug, thiserror::Error)]
enum Mismatch {
    #[error("missing required argument at position {0}")]
    MissingArgument(usize),
    #[error("argument at position {position} rejected value '{value}'")]
    ArgumentRejected { position: usize, value: String },
    #[error("option '{name}' rejected value '{value}'")]
    OptionRejected { name: String, value: String },
}

impl Parser<()> {
    /// Parse `text` without a context. `None` means the text does not match.
    pub async fn parse<'a>(&self, text: &'a str) -> Option<Matches<'a>> {
        self.parse_with(text, &mut ()).await
    }
}

impl<C> Parser<C> {
    /// Parse `text`, handing `ctx` to every converter in declaration order.
    ///
    /// Arguments are bound first, then options and flags. The first failure
    /// ends the parse and yields `None`; nothing after it is evaluated.
    pub async fn parse_with<'a>(&self, text: &'a str, ctx: &mut C) -> Option<Matches<'a>> {
        let input = extract(text);
        let mut out = Matches::default();

        let bound = match self.bind_arguments(&input, ctx, &mut out.arguments).await {
            Ok(()) => self.bind_options(&input, ctx, &mut out).await,
            Err(mismatch) => Err(mismatch),
        };

        match bound {
            Ok(()) => Some(out),
            Err(mismatch) => {
                tracing::debug!(%mismatch, "input does not match schema");
                None
            }
        }
    }

    async fn bind_arguments<'a>(
        &self,
        input: &Extracted<'a>,
        ctx: &mut C,
        out: &mut Arguments<'a>,
    ) -> Result<(), Mismatch> {
        let mut queue: VecDeque<&'a str> = input.args.iter().copied().collect();

        for (position, spec) in self.arguments.iter().enumerate() {
            let named = spec
                .name
                .as_deref()
                .and_then(|name| input.flags.get(format!("+{name}").as_str()));
            let supplied = match named {
                Some(value) => Some(value.as_text()),
                None => queue.pop_front().map(Cow::Borrowed),
            };

            let Some(mut value) = supplied.filter(|v| !v.is_empty()) else {
                if spec.required {
                    return Err(Mismatch::MissingArgument(position));
                }
                for skipped in &self.arguments[position..] {
                    out.ordered.push(OMITTED);
                    if let Some(name) = &skipped.name {
                        out.named.insert(name.clone(), OMITTED);
                    }
                }
                break;
            };

            if self.rest == Some(position) {
                let reserved = self.after_rest.min(queue.len());
                let folded: Vec<&str> = queue.drain(..queue.len() - reserved).collect();
                if !folded.is_empty() {
                    value = Cow::Owned(format!("{value} {}", folded.join(" ")));
                }
            }

            if !spec.converter.matches(&value, ctx).await {
                return Err(Mismatch::ArgumentRejected {
                    position,
                    value: value.into_owned(),
                });
            }
            let calculated = spec.converter.calculate(&value, ctx).await;
            tracing::trace!(position, %value, "bound argument");

            if let Some(name) = &spec.name {
                out.named.insert(name.clone(), Slot::Filled(calculated.clone()));
            }
            out.ordered.push(Slot::Filled(calculated));
        }

        if self.rest.is_none() {
            out.leftover.extend(queue);
        }
        Ok(())
    }

    async fn bind_options(
        &self,
        input: &Extracted<'_>,
        ctx: &mut C,
        out: &mut Matches<'_>,
    ) -> Result<(), Mismatch> {
        let mut exhausted = false;

        for option in &self.options {
            let converter = match &option.kind {
                OptionKind::Flag => {
                    let on = !exhausted
                        && option
                            .names()
                            .find_map(|name| input.flags.get(name).and_then(FlagValue::as_switch))
                            .unwrap_or(false);
                    for name in option.names() {
                        out.flags.insert(name.to_string(), on);
                    }
                    continue;
                }
                OptionKind::Value(converter) => converter,
            };

            let found = if exhausted {
                None
            } else {
                option.names().find_map(|name| input.flags.get(name))
            };
            let Some(found) = found else {
                // Later options and flags are not looked at once one is missing.
                exhausted = true;
                for name in option.names() {
                    out.options.insert(name.to_string(), OMITTED);
                }
                continue;
            };

            let value = found.as_text();
            if !converter.matches(&value, ctx).await {
                return Err(Mismatch::OptionRejected {
                    name: option.key.clone(),
                    value: value.into_owned(),
                });
            }
            let calculated = converter.calculate(&value, ctx).await;
            tracing::trace!(option = %option.key, %value, "bound option");

            for name in option.names() {
                out.options.insert(name.to_string(), Slot::Filled(calculated.clone()));
            }
        }
        Ok(())
    }
}
