//! Ready-made number, boolean and string specs.
//!
//! Numbers are whatever [`f64`] parses from the whole token, as long as the
//! result is finite: values are stored as JSON, which has no NaN or infinity,
//! so `NaN`, `inf` and `1e999` are rejected rather than bound as `null`.
//!
//! ```
//! use textargs::{Parser, simple};
//!
//! # async fn run() -> Result<(), textargs::SchemaError> {
//! let parser: Parser = Parser::builder()
//!     .argument(simple::number())
//!     .argument(simple::string().rest().named("message"))
//!     .flag(simple::flag("silent").alt("s"))
//!     .option(simple::string_option("channel").alt("c"))
//!     .build()?;
//!
//! let matches = parser.parse("10 stretch your legs -c=general").await;
//! assert!(matches.is_some());
//! # Ok(()) }
//! ```

use crate::schema::{ArgumentSpec, Converter, FlagSpec, OptionSpec};
use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::Value;

/// Parse a finite floating point number. See the module docs.
pub fn parse_number(input: &str) -> Option<f64> {
    input.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse one of the accepted boolean words. Matching is exact and case-sensitive.
pub fn parse_boolean(input: &str) -> Option<bool> {
    match input {
        "true" | "1" | "yes" | "yep" | "yup" | "y" => Some(true),
        "false" | "0" | "no" | "nope" | "nah" | "n" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NumberConverter;

impl<C> Converter<C> for NumberConverter {
    fn matches<'a>(&'a self, input: &'a str, _ctx: &'a mut C) -> BoxFuture<'a, bool> {
        future::ready(parse_number(input).is_some()).boxed()
    }

    fn calculate<'a>(&'a self, input: &'a str, _ctx: &'a mut C) -> BoxFuture<'a, Value> {
        future::ready(parse_number(input).map_or(Value::Null, Value::from)).boxed()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BooleanConverter;

impl<C> Converter<C> for BooleanConverter {
    fn matches<'a>(&'a self, input: &'a str, _ctx: &'a mut C) -> BoxFuture<'a, bool> {
        future::ready(parse_boolean(input).is_some()).boxed()
    }

    fn calculate<'a>(&'a self, input: &'a str, _ctx: &'a mut C) -> BoxFuture<'a, Value> {
        future::ready(parse_boolean(input).map_or(Value::Null, Value::Bool)).boxed()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StringConverter;

impl<C> Converter<C> for StringConverter {
    fn matches<'a>(&'a self, _input: &'a str, _ctx: &'a mut C) -> BoxFuture<'a, bool> {
        future::ready(true).boxed()
    }

    fn calculate<'a>(&'a self, input: &'a str, _ctx: &'a mut C) -> BoxFuture<'a, Value> {
        future::ready(Value::String(input.to_string())).boxed()
    }
}

pub fn number<C>() -> ArgumentSpec<C> {
    ArgumentSpec::new(NumberConverter)
}

pub fn boolean<C>() -> ArgumentSpec<C> {
    ArgumentSpec::new(BooleanConverter)
}

pub fn string<C>() -> ArgumentSpec<C> {
    ArgumentSpec::new(StringConverter)
}

pub fn number_option<C>(key: impl Into<String>) -> OptionSpec<C> {
    OptionSpec::new(key, NumberConverter)
}

pub fn boolean_option<C>(key: impl Into<String>) -> OptionSpec<C> {
    OptionSpec::new(key, BooleanConverter)
}

pub fn string_option<C>(key: impl Into<String>) -> OptionSpec<C> {
    OptionSpec::new(key, StringConverter)
}

pub fn flag(key: impl Into<String>) -> FlagSpec {
    FlagSpec::new(key)
}
