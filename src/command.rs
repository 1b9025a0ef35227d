//! The command-construction contract shared by every tool binding.
//!
//! A binding is built once from a [`CommandArgs`] by a pure constructor that
//! converts every semantic parameter into an ordered token group. After that
//! the binding is immutable: it can be validated, assembled into a command
//! line, and run, but never re-assigned.
//!
//! ```text
//! CommandArgs ──new()──▶ binding ──validate──▶ prepare_command ──▶ ProcessRunner
//!                           │
//!                           └─ is_noop() ──▶ health_check (e.g. `pdftk --version`)
//! ```

use crate::args::{ArgMap, ArgValue, Platform};
use crate::error::{Pdf2TxtError, ValidationFailure};
use crate::runner::{ProcessOutput, ProcessRunner};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Input files for a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A single path (or tool-specific pattern / sentinel).
    Path(String),
    /// Several paths, passed in order.
    Paths(Vec<String>),
    /// Named sources, e.g. pdftk handles `A=one.pdf B=two.pdf`.
    Named(IndexMap<String, String>),
}

impl Input {
    /// Apply the platform's path-separator convention to every path.
    pub fn localized(&self, platform: Platform) -> Input {
        match self {
            Input::Path(p) => Input::Path(platform.localize(p)),
            Input::Paths(ps) => Input::Paths(ps.iter().map(|p| platform.localize(p)).collect()),
            Input::Named(m) => Input::Named(
                m.iter()
                    .map(|(k, v)| (k.clone(), platform.localize(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_value(&self) -> ArgValue {
        match self {
            Input::Path(p) => ArgValue::Text(p.clone()),
            Input::Paths(ps) => ArgValue::List(ps.iter().cloned().map(ArgValue::Text).collect()),
            Input::Named(m) => ArgValue::Map(
                m.iter()
                    .map(|(k, v)| (k.clone(), ArgValue::Text(v.clone())))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Path(s.to_string())
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Path(s)
    }
}

impl From<&Path> for Input {
    fn from(p: &Path) -> Self {
        Input::Path(p.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Input {
    fn from(p: PathBuf) -> Self {
        Input::from(p.as_path())
    }
}

impl From<Vec<String>> for Input {
    fn from(ps: Vec<String>) -> Self {
        Input::Paths(ps)
    }
}

impl From<Vec<&str>> for Input {
    fn from(ps: Vec<&str>) -> Self {
        Input::Paths(ps.into_iter().map(str::to_string).collect())
    }
}

impl From<&[PathBuf]> for Input {
    fn from(ps: &[PathBuf]) -> Self {
        Input::Paths(ps.iter().map(|p| p.to_string_lossy().into_owned()).collect())
    }
}

impl From<IndexMap<String, String>> for Input {
    fn from(m: IndexMap<String, String>) -> Self {
        Input::Named(m)
    }
}

/// Everything a binding constructor consumes. All parts are optional; the
/// default value describes an invocation with no work.
///
/// `O` is the binding's operator representation and `P` its option
/// representation.
#[derive(Debug, Clone)]
pub struct CommandArgs<O = ArgMap, P = ArgMap> {
    pub input: Option<Input>,
    pub output: Option<String>,
    pub operators: Option<O>,
    pub options: Option<P>,
    pub platform: Platform,
}

impl<O, P> Default for CommandArgs<O, P> {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            operators: None,
            options: None,
            platform: Platform::default(),
        }
    }
}

impl<O, P> CommandArgs<O, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, input: impl Into<Input>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn operators(mut self, operators: O) -> Self {
        self.operators = Some(operators);
        self
    }

    pub fn options(mut self, options: P) -> Self {
        self.options = Some(options);
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Input after platform localisation.
    pub(crate) fn localized_input(&self) -> Option<Input> {
        self.input.as_ref().map(|i| i.localized(self.platform))
    }

    /// Output after platform localisation.
    pub(crate) fn localized_output(&self) -> Option<String> {
        self.output.as_deref().map(|o| self.platform.localize(o))
    }
}

impl<P> CommandArgs<ArgMap, P> {
    /// Set one named operator.
    pub fn operator(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.operators
            .get_or_insert_with(ArgMap::new)
            .insert(name.into(), value.into());
        self
    }
}

impl<O> CommandArgs<O, ArgMap> {
    /// Set one named option.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.options
            .get_or_insert_with(ArgMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// The lifecycle every tool binding follows.
///
/// Implementors provide the grammar-specific parts; the execution protocol
/// ([`CommandSpec::command_line`] and [`CommandSpec::run`]) is shared.
pub trait CommandSpec {
    /// Executable name; the first token of every command line.
    fn program(&self) -> &'static str;

    /// Minimal side-effect-free invocation used for no-op commands.
    fn health_check(&self) -> Vec<String>;

    fn validate_input(&self) -> Result<(), ValidationFailure>;
    fn validate_output(&self) -> Result<(), ValidationFailure>;
    fn validate_operators(&self) -> Result<(), ValidationFailure>;
    fn validate_options(&self) -> Result<(), ValidationFailure>;

    /// Concatenate the token groups in the tool's fixed argument order.
    fn prepare_command(&self) -> Vec<String>;

    /// True when the invocation carries no real work.
    fn is_noop(&self) -> bool;

    /// Run every validator, input → output → operators → options, stopping
    /// at the first failure.
    fn validate(&self) -> Result<(), ValidationFailure> {
        self.validate_input()?;
        self.validate_output()?;
        self.validate_operators()?;
        self.validate_options()
    }

    /// The token sequence that [`CommandSpec::run`] would execute.
    fn command_line(&self) -> Result<Vec<String>, ValidationFailure> {
        if self.is_noop() {
            debug!("{}: no arguments, substituting health check", self.program());
            return Ok(self.health_check());
        }
        self.validate()?;
        let tokens = self.prepare_command();
        debug!("{}: assembled {:?}", self.program(), tokens);
        Ok(tokens)
    }

    /// Validate, assemble and execute.
    ///
    /// Nothing is spawned unless validation passed. A non-zero exit code is
    /// returned as-is in the [`ProcessOutput`].
    fn run(&self, runner: &dyn ProcessRunner) -> Result<ProcessOutput, Pdf2TxtError> {
        let tokens = self.command_line()?;
        runner.execute(&tokens)
    }
}

/// `[output]`, or nothing. Shared by the tools whose output is positional.
pub(crate) fn positional_output(output: Option<String>) -> Vec<String> {
    output.into_iter().collect()
}
