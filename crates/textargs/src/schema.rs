//! Spec declarations and the schema compiler.

use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Validation and conversion of one input string.
///
/// `matches` decides whether the input is acceptable; `calculate` is only
/// called after `matches` returned `true` and produces the bound value. Both
/// may suspend and both see the caller's context.
pub trait Converter<C>: Send + Sync {
    fn matches<'a>(&'a self, input: &'a str, ctx: &'a mut C) -> BoxFuture<'a, bool>;
    fn calculate<'a>(&'a self, input: &'a str, ctx: &'a mut C) -> BoxFuture<'a, Value>;
}

/// A [`Converter`] built from two synchronous closures. See [`converter_fn`].
#[derive(Clone)]
pub struct FnConverter<M, F> {
    matches: M,
    calculate: F,
}

/// Build a converter from synchronous `matches` and `calculate` closures.
pub fn converter_fn<C, M, F>(matches: M, calculate: F) -> FnConverter<M, F>
where
    M: Fn(&str, &mut C) -> bool + Send + Sync,
    F: Fn(&str, &mut C) -> Value + Send + Sync,
{
    FnConverter { matches, calculate }
}

impl<C, M, F> Converter<C> for FnConverter<M, F>
where
    M: Fn(&str, &mut C) -> bool + Send + Sync,
    F: Fn(&str, &mut C) -> Value + Send + Sync,
{
    fn matches<'a>(&'a self, input: &'a str, ctx: &'a mut C) -> BoxFuture<'a, bool> {
        future::ready((self.matches)(input, ctx)).boxed()
    }

    fn calculate<'a>(&'a self, input: &'a str, ctx: &'a mut C) -> BoxFuture<'a, Value> {
        future::ready((self.calculate)(input, ctx)).boxed()
    }
}

/// A positional argument.
pub struct ArgumentSpec<C = ()> {
    pub(crate) required: bool,
    pub(crate) name: Option<String>,
    pub(crate) rest: bool,
    pub(crate) converter: Arc<dyn Converter<C>>,
}

impl<C> ArgumentSpec<C> {
    /// A required, unnamed, non-rest argument.
    pub fn new(converter: impl Converter<C> + 'static) -> Self {
        Self {
            required: true,
            name: None,
            rest: false,
            converter: Arc::new(converter),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// Bind under `name` as well, and accept `--+name=value` as an override.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Collect every positional not claimed by the specs around this one.
    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_rest(&self) -> bool {
        self.rest
    }
}

impl<C> Clone for ArgumentSpec<C> {
    fn clone(&self) -> Self {
        Self {
            required: self.required,
            name: self.name.clone(),
            rest: self.rest,
            converter: Arc::clone(&self.converter),
        }
    }
}

impl<C> fmt::Debug for ArgumentSpec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("required", &self.required)
            .field("name", &self.name)
            .field("rest", &self.rest)
            .finish_non_exhaustive()
    }
}

/// A value-taking option such as `--count=3`.
pub struct OptionSpec<C = ()> {
    pub(crate) key: String,
    pub(crate) alt: Option<String>,
    pub(crate) converter: Arc<dyn Converter<C>>,
}

impl<C> OptionSpec<C> {
    pub fn new(key: impl Into<String>, converter: impl Converter<C> + 'static) -> Self {
        Self {
            key: key.into(),
            alt: None,
            converter: Arc::new(converter),
        }
    }

    pub fn alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

impl<C> Clone for OptionSpec<C> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            alt: self.alt.clone(),
            converter: Arc::clone(&self.converter),
        }
    }
}

impl<C> fmt::Debug for OptionSpec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("key", &self.key)
            .field("alt", &self.alt)
            .finish_non_exhaustive()
    }
}

/// A boolean flag such as `--verbose` / `--!verbose`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    pub(crate) key: String,
    pub(crate) alt: Option<String>,
}

impl FlagSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            alt: None,
        }
    }

    pub fn alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

/// One entry of a schema.
pub enum Spec<C = ()> {
    Argument(ArgumentSpec<C>),
    Option(OptionSpec<C>),
    Flag(FlagSpec),
}

impl<C> Clone for Spec<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Argument(spec) => Self::Argument(spec.clone()),
            Self::Option(spec) => Self::Option(spec.clone()),
            Self::Flag(spec) => Self::Flag(spec.clone()),
        }
    }
}

impl<C> fmt::Debug for Spec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument(spec) => fmt::Debug::fmt(spec, f),
            Self::Option(spec) => fmt::Debug::fmt(spec, f),
            Self::Flag(spec) => fmt::Debug::fmt(spec, f),
        }
    }
}

impl<C> From<ArgumentSpec<C>> for Spec<C> {
    fn from(spec: ArgumentSpec<C>) -> Self {
        Self::Argument(spec)
    }
}

impl<C> From<OptionSpec<C>> for Spec<C> {
    fn from(spec: OptionSpec<C>) -> Self {
        Self::Option(spec)
    }
}

impl<C> From<FlagSpec> for Spec<C> {
    fn from(spec: FlagSpec) -> Self {
        Self::Flag(spec)
    }
}

/// A schema that cannot be compiled. Positions count argument specs only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid option name '{0}'")]
    InvalidOptionName(String),
    #[error("too many rest arguments, can only have one (found {0})")]
    MultipleRest(usize),
    #[error("optional argument at position {0} cannot follow the rest argument")]
    OptionalAfterRest(usize),
    #[error("required argument at position {0} cannot follow an optional argument")]
    RequiredAfterOptional(usize),
}

/// Strip characters not allowed in option names.
///
/// Single-character names keep `[A-Za-z0-9]`; longer names also keep `-`. The
/// length is measured before stripping.
pub fn normalize_name(raw: &str) -> String {
    let multi = raw.chars().count() > 1;
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || (multi && *c == '-'))
        .collect()
}

fn normalize_checked(raw: &str) -> Result<String, SchemaError> {
    let name = normalize_name(raw);
    if name.is_empty() {
        return Err(SchemaError::InvalidOptionName(raw.to_string()));
    }
    Ok(name)
}

pub(crate) enum OptionKind<C> {
    Flag,
    Value(Arc<dyn Converter<C>>),
}

/// An option or flag after name normalization. Both names resolve to it.
pub struct CompiledOption<C = ()> {
    pub(crate) key: String,
    pub(crate) alt: Option<String>,
    pub(crate) kind: OptionKind<C>,
}

impl<C> CompiledOption<C> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn alt(&self) -> Option<&str> {
        self.alt.as_deref()
    }

    pub fn is_flag(&self) -> bool {
        matches!(self.kind, OptionKind::Flag)
    }

    /// Key first, then alt.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.alt.as_deref())
    }
}

/// A compiled schema, reusable across any number of parses.
///
/// Built with [`Parser::new`] or [`Parser::builder`]; parsing lives in
/// [`crate::matcher`].
pub struct Parser<C = ()> {
    pub(crate) arguments: Vec<ArgumentSpec<C>>,
    pub(crate) options: Vec<CompiledOption<C>>,
    pub(crate) rest: Option<usize>,
    pub(crate) after_rest: usize,
}

impl<C> Parser<C> {
    /// Validate and compile `specs`.
    pub fn new(specs: Vec<Spec<C>>) -> Result<Self, SchemaError> {
        let mut arguments = Vec::new();
        let mut options = Vec::new();
        for spec in specs {
            match spec {
                Spec::Argument(spec) => arguments.push(spec),
                Spec::Option(spec) => options.push(CompiledOption {
                    key: spec.key,
                    alt: spec.alt,
                    kind: OptionKind::Value(spec.converter),
                }),
                Spec::Flag(spec) => options.push(CompiledOption {
                    key: spec.key,
                    alt: spec.alt,
                    kind: OptionKind::Flag,
                }),
            }
        }

        for option in &mut options {
            option.key = normalize_checked(&option.key)?;
            option.alt = option.alt.as_deref().map(normalize_checked).transpose()?;
        }

        let rest_count = arguments.iter().filter(|a| a.rest).count();
        if rest_count > 1 {
            return Err(SchemaError::MultipleRest(rest_count));
        }
        let rest = arguments.iter().position(|a| a.rest);
        if let Some(r) = rest {
            if let Some(offset) = arguments[r + 1..].iter().position(|a| !a.required) {
                return Err(SchemaError::OptionalAfterRest(r + 1 + offset));
            }
        }
        if let Some(first_optional) = arguments.iter().position(|a| !a.required) {
            if let Some(offset) = arguments[first_optional..].iter().position(|a| a.required) {
                return Err(SchemaError::RequiredAfterOptional(first_optional + offset));
            }
        }

        let after_rest = rest.map_or(0, |r| arguments.len() - r - 1);
        tracing::debug!(
            arguments = arguments.len(),
            options = options.len(),
            rest = ?rest,
            after_rest,
            "compiled schema"
        );

        Ok(Self {
            arguments,
            options,
            rest,
            after_rest,
        })
    }

    pub fn builder() -> SchemaBuilder<C> {
        SchemaBuilder::default()
    }

    pub fn arguments(&self) -> &[ArgumentSpec<C>] {
        &self.arguments
    }

    pub fn options(&self) -> &[CompiledOption<C>] {
        &self.options
    }

    /// Position of the rest argument, if any.
    pub fn rest_position(&self) -> Option<usize> {
        self.rest
    }
}

impl<C> fmt::Debug for Parser<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options: Vec<_> = self.options.iter().map(|o| o.names().collect::<Vec<_>>()).collect();
        f.debug_struct("Parser")
            .field("arguments", &self.arguments)
            .field("options", &options)
            .field("rest", &self.rest)
            .finish()
    }
}

/// Collects specs in declaration order before compiling them.
pub struct SchemaBuilder<C = ()> {
    specs: Vec<Spec<C>>,
}

impl<C> Default for SchemaBuilder<C> {
    fn default() -> Self {
        Self { specs: Vec::new() }
    }
}

impl<C> SchemaBuilder<C> {
    pub fn spec(mut self, spec: impl Into<Spec<C>>) -> Self {
        self.specs.push(spec.into());
        self
    }

    pub fn argument(self, spec: ArgumentSpec<C>) -> Self {
        self.spec(spec)
    }

    pub fn option(self, spec: OptionSpec<C>) -> Self {
        self.spec(spec)
    }

    pub fn flag(self, spec: FlagSpec) -> Self {
        self.spec(spec)
    }

    pub fn build(self) -> Result<Parser<C>, SchemaError> {
        Parser::new(self.specs)
    }
}
