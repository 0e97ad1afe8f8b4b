//! Tracer configuration.
//!
//! A [`TracerConfig`] is validated when it is built and never changes
//! afterwards; the hook shares it by `Arc` for its whole lifetime. It can be
//! built three ways:
//!
//! - [`TracerConfig::builder`] with `with_*` methods
//! - [`TracerConfig::from_options`] from a dynamically shaped option list
//! - [`TracerConfig::from_env`] from `SPEWER_*` environment variables

use crate::error::ConfigError;

/// Environment variable holding a comma-separated module filter.
pub const ENV_MODULES: &str = "SPEWER_MODULES";
/// Environment variable for [`TracerConfig::show_values`].
pub const ENV_SHOW_VALUES: &str = "SPEWER_SHOW_VALUES";
/// Environment variable for [`TracerConfig::functions_only`].
pub const ENV_FUNCTIONS_ONLY: &str = "SPEWER_FUNCTIONS_ONLY";
/// Environment variable for [`TracerConfig::trace_returns`].
pub const ENV_TRACE_RETURNS: &str = "SPEWER_TRACE_RETURNS";
/// Environment variable for [`TracerConfig::trace_exceptions`].
pub const ENV_TRACE_EXCEPTIONS: &str = "SPEWER_TRACE_EXCEPTIONS";
/// Environment variable for [`TracerConfig::trace_natives`].
pub const ENV_TRACE_NATIVES: &str = "SPEWER_TRACE_NATIVES";

/// Compiled-artifact suffixes mapped back to their source suffix.
const DEFAULT_COMPILED_SUFFIXES: [(&str, &str); 2] = [(".spwc", ".spw"), (".spwo", ".spw")];

// =============================================================================
// Tracer Configuration
// =============================================================================

/// Immutable tracer settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracerConfig {
    module_filter: Option<Vec<String>>,
    show_values: bool,
    functions_only: bool,
    trace_returns: bool,
    trace_exceptions: bool,
    trace_natives: bool,
    compiled_suffixes: Vec<(String, String)>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            module_filter: None,
            show_values: true,
            functions_only: false,
            trace_returns: true,
            trace_exceptions: true,
            trace_natives: false,
            compiled_suffixes: DEFAULT_COMPILED_SUFFIXES
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
        }
    }
}

impl TracerConfig {
    /// Starts a builder from the default settings.
    #[must_use]
    pub fn builder() -> TracerConfigBuilder {
        TracerConfigBuilder::default()
    }

    /// Starts a builder from these settings.
    #[must_use]
    pub fn to_builder(&self) -> TracerConfigBuilder {
        TracerConfigBuilder {
            draft: self.clone(),
        }
    }

    /// Module names to trace. `None` traces every module.
    #[must_use]
    pub fn module_filter(&self) -> Option<&[String]> {
        self.module_filter.as_deref()
    }

    /// Whether records include rendered values.
    #[must_use]
    pub fn show_values(&self) -> bool {
        self.show_values
    }

    /// Whether to trace function calls instead of lines.
    #[must_use]
    pub fn functions_only(&self) -> bool {
        self.functions_only
    }

    /// Whether to report returns.
    #[must_use]
    pub fn trace_returns(&self) -> bool {
        self.trace_returns
    }

    /// Whether to report exceptions.
    #[must_use]
    pub fn trace_exceptions(&self) -> bool {
        self.trace_exceptions
    }

    /// Whether to report builtin calls in functions-only mode.
    #[must_use]
    pub fn trace_natives(&self) -> bool {
        self.trace_natives
    }

    /// Suffix rewrites applied to file paths before reading source.
    #[must_use]
    pub fn compiled_suffixes(&self) -> &[(String, String)] {
        &self.compiled_suffixes
    }

    /// Returns true if records for `module` pass the filter.
    #[must_use]
    pub fn traces_module(&self, module: &str) -> bool {
        self.module_filter
            .as_ref()
            .is_none_or(|filter| filter.iter().any(|m| m == module))
    }

    /// Builds a configuration from an option list.
    ///
    /// Recognized options are `module_filter` (alias `trace_names`, a list),
    /// and the booleans `show_values`, `functions_only`, `trace_returns`,
    /// `trace_exceptions` and `trace_natives`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownOption`] for an unrecognized name,
    /// [`ConfigError::WrongShape`] for a value of the wrong shape, and
    /// [`ConfigError::InvalidModuleName`] for a bad filter entry.
    pub fn from_options(options: &[(&str, OptionValue)]) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();
        for (name, value) in options {
            builder = match *name {
                "module_filter" | "trace_names" => builder.with_modules(value.as_list(name)?),
                "show_values" => builder.with_show_values(value.as_bool(name)?),
                "functions_only" => builder.with_functions_only(value.as_bool(name)?),
                "trace_returns" => builder.with_trace_returns(value.as_bool(name)?),
                "trace_exceptions" => builder.with_trace_exceptions(value.as_bool(name)?),
                "trace_natives" => builder.with_trace_natives(value.as_bool(name)?),
                other => return Err(ConfigError::UnknownOption(other.to_string())),
            };
        }
        builder.build()
    }

    /// Builds a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// As [`TracerConfig::from_env_vars`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_vars(std::env::vars())
    }

    /// Builds a configuration from `SPEWER_*` variables in `vars`.
    ///
    /// `SPEWER_MODULES` is a comma-separated list; blank entries are skipped.
    /// Boolean variables accept `1/0`, `true/false`, `yes/no` and `on/off` in
    /// any case. Unrelated variables are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBool`] for an unparseable boolean and
    /// [`ConfigError::InvalidModuleName`] for a bad module name.
    pub fn from_env_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = Self::builder();
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            builder = match key {
                ENV_MODULES => builder.with_modules(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty()),
                ),
                ENV_SHOW_VALUES => builder.with_show_values(parse_bool(key, value)?),
                ENV_FUNCTIONS_ONLY => builder.with_functions_only(parse_bool(key, value)?),
                ENV_TRACE_RETURNS => builder.with_trace_returns(parse_bool(key, value)?),
                ENV_TRACE_EXCEPTIONS => builder.with_trace_exceptions(parse_bool(key, value)?),
                ENV_TRACE_NATIVES => builder.with_trace_natives(parse_bool(key, value)?),
                _ => builder,
            };
        }
        builder.build()
    }
}

/// Parses a boolean environment value.
fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}

// =============================================================================
// Option Values
// =============================================================================

/// A dynamically shaped option value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    /// A flag.
    Bool(bool),
    /// A single string.
    Text(String),
    /// A list of strings.
    List(Vec<String>),
}

impl OptionValue {
    /// Describes the shape, for error messages.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Bool(_) => "a boolean",
            Self::Text(_) => "text",
            Self::List(_) => "a list",
        }
    }

    fn as_bool(&self, option: &str) -> Result<bool, ConfigError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(wrong_shape(option, "a boolean", other)),
        }
    }

    fn as_list(&self, option: &str) -> Result<Vec<String>, ConfigError> {
        match self {
            Self::List(items) => Ok(items.clone()),
            other => Err(wrong_shape(option, "a list", other)),
        }
    }
}

fn wrong_shape(option: &str, expected: &'static str, found: &OptionValue) -> ConfigError {
    ConfigError::WrongShape {
        option: option.to_string(),
        expected,
        found: found.shape(),
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(items: Vec<&str>) -> Self {
        Self::List(items.into_iter().map(String::from).collect())
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`TracerConfig`].
#[derive(Clone, Debug, Default)]
pub struct TracerConfigBuilder {
    draft: TracerConfig,
}

impl TracerConfigBuilder {
    /// Restricts tracing to the given modules. An empty list traces all.
    #[must_use]
    pub fn with_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter: Vec<String> = Vec::new();
        for module in modules {
            let module = module.into();
            if !filter.contains(&module) {
                filter.push(module);
            }
        }
        self.draft.module_filter = if filter.is_empty() { None } else { Some(filter) };
        self
    }

    /// Sets whether records include rendered values.
    #[must_use]
    pub fn with_show_values(mut self, show: bool) -> Self {
        self.draft.show_values = show;
        self
    }

    /// Sets functions-only mode.
    #[must_use]
    pub fn with_functions_only(mut self, functions_only: bool) -> Self {
        self.draft.functions_only = functions_only;
        self
    }

    /// Sets whether returns are reported.
    #[must_use]
    pub fn with_trace_returns(mut self, trace: bool) -> Self {
        self.draft.trace_returns = trace;
        self
    }

    /// Sets whether exceptions are reported.
    #[must_use]
    pub fn with_trace_exceptions(mut self, trace: bool) -> Self {
        self.draft.trace_exceptions = trace;
        self
    }

    /// Sets whether builtin calls are reported in functions-only mode.
    #[must_use]
    pub fn with_trace_natives(mut self, trace: bool) -> Self {
        self.draft.trace_natives = trace;
        self
    }

    /// Adds a compiled-artifact suffix that maps back to a source suffix.
    #[must_use]
    pub fn with_compiled_suffix(mut self, compiled: &str, source: &str) -> Self {
        self.draft
            .compiled_suffixes
            .push((compiled.to_string(), source.to_string()));
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidModuleName`] if a filter entry is empty
    /// or contains whitespace.
    pub fn build(self) -> Result<TracerConfig, ConfigError> {
        if let Some(filter) = &self.draft.module_filter {
            if let Some(bad) = filter
                .iter()
                .find(|m| m.is_empty() || m.chars().any(char::is_whitespace))
            {
                return Err(ConfigError::InvalidModuleName(bad.clone()));
            }
        }
        Ok(self.draft)
    }
}

// =============================================================================
// Tests
// =============================================================================
