//! Turns a [`UserCommandData`] chain back into a command line.
//!
//! Values equal to their declared defaults are suppressed, repeated options
//! are emitted together, and unsupplied values inside an emitted occurrence
//! become [`CliArg::Missing`] so an incomplete command stays visible.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{UserCommandData, UserOptionData};
use crate::schema::OptionSchema;
use crate::value::{Scalar, Value, sorted_forms, supplied_sorted_forms};

/// Marker rendered in display strings for a value the user has not supplied.
pub const MISSING_VALUE_MARKER: &str = "???";

/// Default upper bound for repeated counting flags.
pub const DEFAULT_MAX_COUNT: u32 = 5;

/// Rendering knobs for the reconstructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Largest count emitted for a counting option.
    pub max_count: u32,
    /// Text shown in place of a missing value.
    pub missing_marker: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_count: DEFAULT_MAX_COUNT,
            missing_marker: MISSING_VALUE_MARKER.to_string(),
        }
    }
}

/// One reconstructed command-line token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliArg {
    /// A literal argument.
    Text(String),
    /// An unsupplied value inside an emitted occurrence.
    Missing,
}

impl CliArg {
    fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    fn from_value(value: &Value) -> Self {
        value.string_form().map_or(Self::Missing, Self::Text)
    }

    /// Returns `true` for [`CliArg::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl fmt::Display for CliArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Missing => f.write_str(MISSING_VALUE_MARKER),
        }
    }
}

/// Reconstructs the token list for a command-data chain.
///
/// With `include_root == false` the outermost command name is dropped.
///
/// # Examples
///
/// ```
/// use cmdform_core::*;
///
/// let mut tree = SchemaTree::new();
/// let id = tree
///     .add_root(
///         CommandSchema::new("greet")
///             .with_option(OptionSchema::new(&["-n", "--name"], ParamType::String))
///             .with_argument(ArgumentSchema::new("target", ParamType::String)),
///     )
///     .unwrap();
/// let schema = tree.get(id).unwrap();
///
/// let mut data = UserCommandData::for_command(tree.command(id));
/// data.push_option(&schema.options[0], vec![Value::NotSupplied, Value::from("x")]);
/// data.push_argument(&schema.arguments[0], vec![Value::from("world")]);
///
/// let tokens = to_cli_tokens(&data, true, &RenderConfig::default());
/// assert_eq!(
///     tokens,
///     vec![
///         CliArg::Text("greet".into()),
///         CliArg::Text("--name".into()),
///         CliArg::Missing,
///         CliArg::Text("x".into()),
///         CliArg::Text("world".into()),
///     ]
/// );
/// ```
pub fn to_cli_tokens(
    data: &UserCommandData<'_>,
    include_root: bool,
    config: &RenderConfig,
) -> Vec<CliArg> {
    let mut tokens = Vec::new();
    for level in data.levels() {
        push_level(level, config, &mut tokens);
    }
    if !include_root && !tokens.is_empty() {
        tokens.remove(0);
    }
    tokens
}

fn push_level(level: &UserCommandData<'_>, config: &RenderConfig, out: &mut Vec<CliArg>) {
    out.push(CliArg::text(level.name.as_str()));

    let mut repeated: Vec<(&str, Vec<&UserOptionData<'_>>)> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();

    for option in &level.options {
        if option.schema.param.multiple {
            let key = option.primary_name();
            let index = *group_index.entry(key).or_insert_with(|| {
                repeated.push((key, Vec::new()));
                repeated.len() - 1
            });
            if let Some((_, group)) = repeated.get_mut(index) {
                group.push(option);
            }
            continue;
        }

        let supplied = option.value.iter().any(Value::is_supplied);
        let matches_default =
            sorted_forms(&option.value) == option.schema.param.default.sorted_forms();
        if supplied && !matches_default {
            push_occurrence(option.schema, &option.value, config, out);
        }
    }

    for (_, group) in &repeated {
        let Some(schema) = group.first().map(|o| o.schema) else {
            continue;
        };
        let values = supplied_sorted_forms(group.iter().flat_map(|o| o.value.iter()));
        if values.is_empty() || values == schema.param.default.supplied_sorted_forms() {
            continue;
        }
        for occurrence in group {
            if occurrence.value.iter().any(Value::is_supplied) {
                push_occurrence(schema, &occurrence.value, config, out);
            }
        }
    }

    let known = level.command_schema.and_then(|c| c.schema());
    for argument in &level.arguments {
        if known.is_some_and(|schema| schema.find_argument(&argument.name).is_none()) {
            continue;
        }
        out.extend(
            argument
                .value
                .iter()
                .filter_map(Value::string_form)
                .map(CliArg::Text),
        );
    }
}

fn push_occurrence(
    schema: &OptionSchema,
    value: &[Value],
    config: &RenderConfig,
    out: &mut Vec<CliArg>,
) {
    let spelling = schema.emitted_spelling();

    if schema.is_flag {
        let is_true = matches!(value, [only] if only.as_bool() == Some(true));
        if is_true {
            out.push(CliArg::text(spelling));
        } else if let Some(negative) = schema.negative_spelling() {
            out.push(CliArg::text(negative));
        }
        return;
    }

    if schema.counting {
        let count = value.iter().find(|v| v.is_supplied()).map_or(1, count_of);
        let count = count.clamp(1, config.max_count.max(1));
        let count = usize::try_from(count).unwrap_or(1);
        if spelling.starts_with("--") {
            out.extend(std::iter::repeat_n(CliArg::text(spelling), count));
        } else {
            let letters = spelling.trim_start_matches('-');
            out.push(CliArg::Text(format!("-{}", letters.repeat(count))));
        }
        return;
    }

    out.push(CliArg::text(spelling));
    out.extend(value.iter().map(CliArg::from_value));
}

fn count_of(value: &Value) -> u32 {
    let parsed = match value.as_scalar() {
        Some(Scalar::Int(n)) => Some(*n),
        Some(Scalar::Str(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.map_or(1, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}

fn quote(token: &str) -> String {
    match shlex::try_quote(token) {
        Ok(quoted) => quoted.into_owned(),
        // NUL bytes cannot be part of an argument.
        Err(_) => quote(&token.replace('\0', "")),
    }
}

impl UserCommandData<'_> {
    /// Token list with default rendering options.
    pub fn to_cli_tokens(&self, include_root: bool) -> Vec<CliArg> {
        to_cli_tokens(self, include_root, &RenderConfig::default())
    }

    /// Argument vector for process execution.
    ///
    /// A missing value becomes an empty argument.
    pub fn to_cli_args(&self, include_root: bool) -> Vec<String> {
        self.to_cli_args_with(include_root, &RenderConfig::default())
    }

    /// [`to_cli_args`](Self::to_cli_args) with explicit rendering options.
    pub fn to_cli_args_with(&self, include_root: bool, config: &RenderConfig) -> Vec<String> {
        to_cli_tokens(self, include_root, config)
            .into_iter()
            .map(|token| match token {
                CliArg::Text(text) => text,
                CliArg::Missing => String::new(),
            })
            .collect()
    }

    /// Display string with every token shell-quoted.
    ///
    /// A missing value renders as [`MISSING_VALUE_MARKER`].
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdform_core::*;
    ///
    /// let mut tree = SchemaTree::new();
    /// let id = tree
    ///     .add_root(CommandSchema::new("echo").with_argument(ArgumentSchema::new("text", ParamType::String)))
    ///     .unwrap();
    /// let schema = tree.get(id).unwrap();
    /// let mut data = UserCommandData::for_command(tree.command(id));
    /// data.push_argument(&schema.arguments[0], vec![Value::from("hello world")]);
    ///
    /// assert_eq!(data.to_cli_string(true), "echo 'hello world'");
    /// ```
    pub fn to_cli_string(&self, include_root: bool) -> String {
        self.to_cli_string_with(include_root, &RenderConfig::default())
    }

    /// [`to_cli_string`](Self::to_cli_string) with explicit rendering options.
    pub fn to_cli_string_with(&self, include_root: bool, config: &RenderConfig) -> String {
        to_cli_tokens(self, include_root, config)
            .iter()
            .map(|token| match token {
                CliArg::Text(text) => quote(text),
                CliArg::Missing => config.missing_marker.clone(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns `true` when no emitted token is missing a value.
    pub fn is_complete(&self) -> bool {
        !self.to_cli_tokens(true).iter().any(CliArg::is_missing)
    }
}
