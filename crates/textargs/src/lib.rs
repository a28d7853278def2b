//! Schema-driven parsing of free-form command text.
//!
//! A chat command such as `remind 10 stretch your legs --channel=general -s`
//! goes through three stages:
//! - [`lexer`] splits the text into argument and flag tokens
//! - [`extract`] folds the tokens into positional strings and a flag map
//! - [`Parser`] binds those against a compiled schema of argument, option and
//!   flag specs, producing [`Matches`] or `None` when the text does not fit
//!
//! Schemas are validated once when the [`Parser`] is built; the parser itself
//! never changes afterwards and can be shared freely.
//!
//! Converters (`matches` / `calculate`) return futures and are awaited one at a
//! time, in declaration order, so a converter may depend on context changed by
//! an earlier one. Ready-made converters live in [`simple`].

pub mod extract;
pub mod lexer;
pub mod matcher;
pub mod schema;
pub mod simple;
mod slot;

pub use extract::{Extracted, extract};
pub use lexer::{FlagValue, Lexer, Rule, Token, tokenize};
pub use matcher::{Arguments, Matches};
pub use schema::{
    ArgumentSpec, CompiledOption, Converter, FlagSpec, FnConverter, OptionSpec, Parser,
    SchemaBuilder, SchemaError, Spec, converter_fn, normalize_name,
};
pub use serde_json::Value;
pub use slot::{OMITTED, Slot};
