//! Normalized schema model for command trees.
//!
//! The schema is parser independent: introspection adapters populate it, the
//! form renderer reads it, and the reconstructor consults it. Commands live
//! in an arena ([`SchemaTree`]) and refer to each other through
//! [`CommandId`]s, so parent back-references never own anything.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::{MultiValueParamData, RawValue, Value};

/// Placeholder shown for parameters whose value is prompted for later.
pub const PROMPT_PLACEHOLDER: &str = "< You will be prompted. >";

/// Opaque, unique identifier of a command or subcommand node.
///
/// # Examples
///
/// ```
/// use cmdform_core::CommandName;
///
/// let name = CommandName::from("deploy");
/// assert_eq!(name.as_str(), "deploy");
/// assert_eq!(name.to_string(), "deploy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandName(String);

impl CommandName {
    /// Creates a command name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CommandName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::borrow::Borrow<str> for CommandName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Primitive parameter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Free text (the fallback kind).
    #[default]
    String,
    /// Integer.
    Int,
    /// Floating point number.
    Float,
    /// Boolean.
    Bool,
    /// One of a fixed set of strings.
    Choice,
}

impl ParamType {
    /// Maps a declared type name to a kind.
    ///
    /// Returns `None` for names it does not know; callers decide how to
    /// degrade.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdform_core::ParamType;
    ///
    /// assert_eq!(ParamType::from_name("INTEGER"), Some(ParamType::Int));
    /// assert_eq!(ParamType::from_name("path"), Some(ParamType::String));
    /// assert_eq!(ParamType::from_name("uuid4-ish"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "text" | "path" | "file" | "directory" | "dir" | "uuid" | "url"
            | "datetime" => Self::String,
            "int" | "integer" | "int_range" | "count" => Self::Int,
            "float" | "number" | "float_range" => Self::Float,
            "bool" | "boolean" | "flag" => Self::Bool,
            "choice" | "enum" => Self::Choice,
            _ => return None,
        };
        Some(kind)
    }

    /// Converts widget text into a typed value.
    ///
    /// Empty text is the sentinel. Text that does not parse as the kind is
    /// kept as a string; comparison happens on string forms anyway.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdform_core::{ParamType, Value};
    ///
    /// assert_eq!(ParamType::Int.coerce("7"), Value::from(7));
    /// assert_eq!(ParamType::Bool.coerce("false"), Value::from(false));
    /// assert_eq!(ParamType::Int.coerce("seven"), Value::from("seven"));
    /// assert_eq!(ParamType::String.coerce(""), Value::NotSupplied);
    /// ```
    pub fn coerce(&self, raw: &str) -> Value {
        if raw.is_empty() {
            return Value::NotSupplied;
        }
        match self {
            Self::Int => raw.parse::<i64>().map_or_else(|_| Value::from(raw), Value::from),
            Self::Float => raw.parse::<f64>().map_or_else(|_| Value::from(raw), Value::from),
            Self::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" => Value::from(true),
                "false" => Value::from(false),
                _ => Value::from(raw),
            },
            Self::String | Self::Choice => Value::from(raw),
        }
    }
}

/// The control a form should render for a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    /// Text input.
    Text,
    /// Checkbox.
    Boolean,
    /// Selection among choices.
    Choice,
    /// One control per tuple position.
    Tuple(Vec<ControlKind>),
}

/// Maps parameter types to the control kind a form needs.
///
/// # Examples
///
/// ```
/// use cmdform_core::{ControlKind, ParamType, classify};
///
/// assert_eq!(classify(&[ParamType::Bool]), ControlKind::Boolean);
/// assert_eq!(classify(&[ParamType::Int]), ControlKind::Text);
/// assert_eq!(
///     classify(&[ParamType::String, ParamType::Choice]),
///     ControlKind::Tuple(vec![ControlKind::Text, ControlKind::Choice]),
/// );
/// ```
pub fn classify(types: &[ParamType]) -> ControlKind {
    fn single(kind: ParamType) -> ControlKind {
        match kind {
            ParamType::Bool => ControlKind::Boolean,
            ParamType::Choice => ControlKind::Choice,
            ParamType::String | ParamType::Int | ParamType::Float => ControlKind::Text,
        }
    }

    match types {
        [] => ControlKind::Text,
        [kind] => single(*kind),
        kinds => ControlKind::Tuple(kinds.iter().copied().map(single).collect()),
    }
}

/// Stable id binding form controls to schema entries.
///
/// Keys are assigned by [`SchemaTree`] when a command is registered, as the
/// command path joined by `/` followed by the parameter identifier: the
/// first declared spelling of an option, or the name of an argument.
///
/// # Examples
///
/// ```
/// use cmdform_core::{ArgumentSchema, CommandSchema, OptionSchema, ParamType, SchemaTree};
///
/// let mut tree = SchemaTree::new();
/// let root = tree.add_root(CommandSchema::new("git")).unwrap();
/// let add = tree
///     .add_subcommand(
///         root,
///         CommandSchema::new("add")
///             .with_option(OptionSchema::flag(&["-f", "--force"]))
///             .with_argument(ArgumentSchema::new("path", ParamType::String)),
///     )
///     .unwrap();
///
/// let add = tree.command(add);
/// assert_eq!(add.options[0].param.key.as_str(), "git/add/-f");
/// assert_eq!(add.arguments[0].param.key.as_str(), "git/add/path");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamKey(String);

impl ParamKey {
    /// Creates a key from raw text.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields shared by options and positional arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSchema {
    /// Form binding key.
    pub key: ParamKey,
    /// One kind per tuple position.
    #[serde(rename = "type")]
    pub types: Vec<ParamType>,
    /// Whether a value is required.
    pub required: bool,
    /// Declared default.
    pub default: MultiValueParamData,
    /// Allowed string forms, for choice parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    /// May be supplied more than once.
    pub multiple: bool,
    /// One occurrence carries several values.
    pub multi_value: bool,
    /// Values per occurrence; `-1` is unbounded.
    pub nargs: i32,
    /// Visible help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Value must be masked when entered.
    pub secret: bool,
    /// Value is prompted for rather than typed into the form.
    pub read_only: bool,
    /// Hint text for the control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl ParamSchema {
    /// Creates a parameter accepting the given kinds.
    ///
    /// An empty list means a single string. Several kinds form a tuple whose
    /// `nargs` is the number of kinds.
    pub fn new(types: Vec<ParamType>) -> Self {
        let types = if types.is_empty() {
            vec![ParamType::String]
        } else {
            types
        };
        let nargs = if types.len() > 1 {
            i32::try_from(types.len()).unwrap_or(-1)
        } else {
            1
        };
        let mut param = Self {
            key: ParamKey::default(),
            types,
            required: false,
            default: MultiValueParamData::default(),
            choices: None,
            multiple: false,
            multi_value: false,
            nargs,
            help: None,
            secret: false,
            read_only: false,
            placeholder: None,
        };
        param.normalize();
        param
    }

    /// Re-establishes the multiplicity invariants after a field changed.
    ///
    /// `multi_value` follows `nargs` and the tuple width, and `multi_value`
    /// implies `multiple`.
    pub fn normalize(&mut self) {
        self.multi_value = self.nargs < 0 || self.nargs > 1 || self.types.len() > 1;
        if self.multi_value {
            self.multiple = true;
        }
    }

    /// The control kind a form should use.
    pub fn control_kind(&self) -> ControlKind {
        classify(&self.types)
    }

    /// Returns `true` when the declared kind is a choice.
    pub fn is_choice(&self) -> bool {
        self.types.contains(&ParamType::Choice)
    }
}

macro_rules! param_builders {
    () => {
        /// Sets the default, normalizing the raw value.
        pub fn with_default(mut self, raw: impl Into<RawValue>) -> Self {
            self.param.default = MultiValueParamData::process(raw);
            self
        }

        /// Sets the help text.
        pub fn with_help(mut self, help: &str) -> Self {
            self.param.help = Some(help.to_string());
            self
        }

        /// Marks the parameter as required.
        pub fn required(mut self) -> Self {
            self.param.required = true;
            self
        }

        /// Marks the parameter as repeatable.
        pub fn allow_multiple(mut self) -> Self {
            self.param.multiple = true;
            self
        }

        /// Sets the number of values per occurrence.
        pub fn with_nargs(mut self, nargs: i32) -> Self {
            self.param.nargs = nargs;
            self.param.normalize();
            self
        }

        /// Restricts values to the given choices (stored as string forms).
        pub fn with_choices<I, S>(mut self, choices: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: ToString,
        {
            self.param.choices = Some(choices.into_iter().map(|c| c.to_string()).collect());
            self
        }

        /// Marks the value as secret (masked input).
        pub fn secret(mut self) -> Self {
            self.param.secret = true;
            self
        }

        /// Marks the value as prompted for later.
        pub fn prompt(mut self) -> Self {
            self.param.read_only = true;
            self.param.placeholder = Some(PROMPT_PLACEHOLDER.to_string());
            self
        }
    };
}

/// A positional argument.
///
/// # Examples
///
/// ```
/// use cmdform_core::{ArgumentSchema, ParamType};
///
/// let arg = ArgumentSchema::new("files", ParamType::String).with_nargs(-1);
/// assert!(arg.param.multi_value);
/// assert!(arg.param.multiple);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSchema {
    /// Argument name.
    pub name: String,
    /// Shared parameter fields.
    #[serde(flatten)]
    pub param: ParamSchema,
}

impl ArgumentSchema {
    /// Creates an argument of a single kind.
    pub fn new(name: &str, kind: ParamType) -> Self {
        Self::with_types(name, vec![kind])
    }

    /// Creates an argument with one kind per tuple position.
    pub fn with_types(name: &str, types: Vec<ParamType>) -> Self {
        Self {
            name: name.to_string(),
            param: ParamSchema::new(types),
        }
    }

    param_builders!();

    /// Case-folded substring match on the argument name.
    pub fn matches_filter(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        query.is_empty() || self.name.to_lowercase().contains(&query)
    }
}

/// An option: a parameter introduced by one of its flag spellings.
///
/// # Examples
///
/// ```
/// use cmdform_core::{OptionSchema, ParamType};
///
/// let verbose = OptionSchema::counter(&["-v", "--verbose"]);
/// assert_eq!(verbose.emitted_spelling(), "-v");
///
/// let output = OptionSchema::new(&["-o", "--output"], ParamType::String);
/// assert_eq!(output.emitted_spelling(), "--output");
///
/// let all = OptionSchema::flag(&["--all"]).with_secondary(&["--not-all"]).with_default(true);
/// assert!(all.is_flag);
/// assert_eq!(all.secondary_opts, vec!["--not-all"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSchema {
    /// Flag spellings, e.g. `["-v", "--verbose"]`.
    #[serde(rename = "name")]
    pub names: Vec<String>,
    /// Shared parameter fields.
    #[serde(flatten)]
    pub param: ParamSchema,
    /// Boolean on/off option taking no value token.
    pub is_flag: bool,
    /// Occurrences are counted (`-vvv`).
    pub counting: bool,
    /// Negative spellings, e.g. `--no-color`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_opts: Vec<String>,
}

impl OptionSchema {
    /// Creates a value-bearing option of a single kind.
    pub fn new(names: &[&str], kind: ParamType) -> Self {
        Self::with_types(names, vec![kind])
    }

    /// Creates a value-bearing option with one kind per tuple position.
    pub fn with_types(names: &[&str], types: Vec<ParamType>) -> Self {
        Self {
            names: names.iter().map(|n| (*n).to_string()).collect(),
            param: ParamSchema::new(types),
            is_flag: false,
            counting: false,
            secondary_opts: Vec::new(),
        }
    }

    /// Creates a boolean flag defaulting to `false`.
    pub fn flag(names: &[&str]) -> Self {
        let mut option = Self::new(names, ParamType::Bool).with_default(false);
        option.is_flag = true;
        option
    }

    /// Creates a counting option defaulting to `0`.
    pub fn counter(names: &[&str]) -> Self {
        let mut option = Self::new(names, ParamType::Int).with_default(0);
        option.counting = true;
        option
    }

    /// Adds negative spellings.
    pub fn with_secondary(mut self, opts: &[&str]) -> Self {
        self.secondary_opts
            .extend(opts.iter().map(|o| (*o).to_string()));
        self
    }

    param_builders!();

    /// First declared spelling; used to group repeated occurrences.
    pub fn primary_name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }

    /// Spelling used when reconstructing the command line.
    ///
    /// Counting options use their shortest spelling (for `-vvv`), every other
    /// option its longest. The first spelling wins ties.
    pub fn emitted_spelling(&self) -> &str {
        if self.counting {
            shortest(&self.names)
        } else {
            longest(&self.names)
        }
        .unwrap_or_else(|| self.primary_name())
    }

    /// Longest negative spelling, if any.
    pub fn negative_spelling(&self) -> Option<&str> {
        longest(&self.secondary_opts)
    }

    /// Returns `true` if `flag` is one of the primary or secondary spellings.
    pub fn matches(&self, flag: &str) -> bool {
        self.names.iter().chain(&self.secondary_opts).any(|n| n == flag)
    }

    /// Case-folded substring match on any spelling or on the help text.
    pub fn matches_filter(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.names.iter().any(|n| n.to_lowercase().contains(&query))
            || self
                .param
                .help
                .as_deref()
                .is_some_and(|h| h.to_lowercase().contains(&query))
    }
}

fn longest(names: &[String]) -> Option<&str> {
    names
        .iter()
        .fold(None::<&String>, |best, n| match best {
            Some(b) if b.len() >= n.len() => Some(b),
            _ => Some(n),
        })
        .map(String::as_str)
}

fn shortest(names: &[String]) -> Option<&str> {
    names
        .iter()
        .fold(None::<&String>, |best, n| match best {
            Some(b) if b.len() <= n.len() => Some(b),
            _ => Some(n),
        })
        .map(String::as_str)
}

/// Index of a command inside a [`SchemaTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(usize);

impl CommandId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Schema of one command node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSchema {
    /// Arena id (set on registration).
    pub id: CommandId,
    /// Command name.
    pub name: CommandName,
    /// Help/description text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Options in declaration order.
    pub options: Vec<OptionSchema>,
    /// Positional arguments in declaration order.
    pub arguments: Vec<ArgumentSchema>,
    /// Subcommands by name.
    pub subcommands: BTreeMap<CommandName, CommandId>,
    /// Parent command, if this is a subcommand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommandId>,
}

impl CommandSchema {
    /// Creates an empty, unregistered command.
    pub fn new(name: impl Into<CommandName>) -> Self {
        Self {
            id: CommandId(0),
            name: name.into(),
            docstring: None,
            options: Vec::new(),
            arguments: Vec::new(),
            subcommands: BTreeMap::new(),
            parent: None,
        }
    }

    /// Sets the docstring.
    pub fn with_docstring(mut self, doc: &str) -> Self {
        self.docstring = Some(doc.to_string());
        self
    }

    /// Adds an option.
    pub fn with_option(mut self, option: OptionSchema) -> Self {
        self.options.push(option);
        self
    }

    /// Adds a positional argument.
    pub fn with_argument(mut self, argument: ArgumentSchema) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Finds an option by any of its spellings.
    pub fn find_option(&self, flag: &str) -> Option<&OptionSchema> {
        self.options.iter().find(|o| o.matches(flag))
    }

    /// Finds an argument by name.
    pub fn find_argument(&self, name: &str) -> Option<&ArgumentSchema> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Iterates over every parameter's shared fields, options first.
    pub fn params(&self) -> impl Iterator<Item = &ParamSchema> {
        self.options
            .iter()
            .map(|o| &o.param)
            .chain(self.arguments.iter().map(|a| &a.param))
    }
}

/// Errors raised while registering commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A root with this name is already registered.
    #[error("duplicate root command: {0}")]
    DuplicateRoot(CommandName),
    /// The parent already has a subcommand with this name.
    #[error("duplicate subcommand '{name}' under '{parent}'")]
    DuplicateSubcommand {
        /// Parent command name.
        parent: CommandName,
        /// Rejected subcommand name.
        name: CommandName,
    },
    /// The referenced parent id is not part of this tree.
    #[error("unknown command id: {0:?}")]
    UnknownCommand(CommandId),
}

/// Arena holding a forest of command schemas.
///
/// # Examples
///
/// ```
/// use cmdform_core::*;
///
/// let mut tree = SchemaTree::new();
/// let git = tree.add_root(CommandSchema::new("git")).unwrap();
/// let remote = tree.add_subcommand(git, CommandSchema::new("remote")).unwrap();
/// let add = tree
///     .add_subcommand(
///         remote,
///         CommandSchema::new("add").with_argument(ArgumentSchema::new("url", ParamType::String)),
///     )
///     .unwrap();
///
/// let path: Vec<_> = tree.command(add).path_from_root().iter().map(|c| c.name.to_string()).collect();
/// assert_eq!(path, vec!["git", "remote", "add"]);
/// assert_eq!(tree.find_path(&["git", "remote", "add"]), Some(add));
/// assert_eq!(tree.command(add).arguments[0].param.key.as_str(), "git/remote/add/url");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaTree {
    nodes: Vec<CommandSchema>,
    roots: BTreeMap<CommandName, CommandId>,
}

impl SchemaTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a top-level command.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateRoot`] if the name is taken.
    pub fn add_root(&mut self, schema: CommandSchema) -> Result<CommandId, SchemaError> {
        if self.roots.contains_key(&schema.name) {
            return Err(SchemaError::DuplicateRoot(schema.name));
        }
        let name = schema.name.clone();
        let id = self.insert(None, schema);
        self.roots.insert(name, id);
        Ok(id)
    }

    /// Registers a subcommand under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownCommand`] for a foreign parent id and
    /// [`SchemaError::DuplicateSubcommand`] if the name is taken.
    pub fn add_subcommand(
        &mut self,
        parent: CommandId,
        schema: CommandSchema,
    ) -> Result<CommandId, SchemaError> {
        let parent_node = self
            .nodes
            .get(parent.0)
            .ok_or(SchemaError::UnknownCommand(parent))?;
        if parent_node.subcommands.contains_key(&schema.name) {
            return Err(SchemaError::DuplicateSubcommand {
                parent: parent_node.name.clone(),
                name: schema.name,
            });
        }
        let name = schema.name.clone();
        let id = self.insert(Some(parent), schema);
        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.subcommands.insert(name, id);
        }
        Ok(id)
    }

    fn insert(&mut self, parent: Option<CommandId>, mut schema: CommandSchema) -> CommandId {
        let id = CommandId(self.nodes.len());
        schema.id = id;
        schema.parent = parent;
        schema.subcommands.clear();

        let mut prefix: Vec<&str> = parent
            .map(|p| self.path_from_root(p))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| self.nodes.get(p.0))
            .map(|node| node.name.as_str())
            .collect();
        prefix.push(schema.name.as_str());
        let prefix = prefix.join("/");

        for option in &mut schema.options {
            option.param.key = ParamKey(format!("{prefix}/{}", option.primary_name()));
        }
        for argument in &mut schema.arguments {
            argument.param.key = ParamKey(format!("{prefix}/{}", argument.name));
        }

        self.nodes.push(schema);
        id
    }

    /// Returns the command with the given id.
    pub fn get(&self, id: CommandId) -> Option<&CommandSchema> {
        self.nodes.get(id.0)
    }

    /// Returns a borrowed handle to a command.
    ///
    /// # Panics
    ///
    /// Dereferencing the handle panics if `id` does not belong to this tree.
    /// Use [`get`](Self::get) for unchecked ids.
    pub fn command(&self, id: CommandId) -> CommandRef<'_> {
        CommandRef { tree: self, id }
    }

    /// Looks up a root command.
    pub fn root(&self, name: &str) -> Option<CommandRef<'_>> {
        self.roots.get(name).map(|id| self.command(*id))
    }

    /// Iterates over the root commands in name order.
    pub fn roots(&self) -> impl Iterator<Item = CommandRef<'_>> {
        self.roots.values().map(|id| self.command(*id))
    }

    /// Resolves a path of command names starting at a root.
    pub fn find_path(&self, path: &[&str]) -> Option<CommandId> {
        let (first, rest) = path.split_first()?;
        let mut current = *self.roots.get(*first)?;
        for name in rest {
            current = *self.get(current)?.subcommands.get(*name)?;
        }
        Some(current)
    }

    /// Ids from the root down to `id` (inclusive).
    pub fn path_from_root(&self, id: CommandId) -> Vec<CommandId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else {
                break;
            };
            path.push(node_id);
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// Number of command nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when no command is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every node in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandSchema> {
        self.nodes.iter()
    }

    /// Copies the subtree rooted at `root` in `other` into this tree.
    ///
    /// With `parent == None` the copy becomes a new root. Keys are reassigned
    /// for the new position.
    ///
    /// # Errors
    ///
    /// Propagates registration errors for clashing names.
    pub fn graft(
        &mut self,
        parent: Option<CommandId>,
        other: &SchemaTree,
        root: CommandId,
    ) -> Result<CommandId, SchemaError> {
        let source = other.get(root).ok_or(SchemaError::UnknownCommand(root))?;
        let copy = source.clone();
        let id = match parent {
            Some(parent) => self.add_subcommand(parent, copy)?,
            None => self.add_root(copy)?,
        };
        for child in source.subcommands.values() {
            self.graft(Some(id), other, *child)?;
        }
        Ok(id)
    }

    /// Assembles independently built trees under one synthetic root.
    ///
    /// Every root of every tree becomes a subcommand of the new root.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateSubcommand`] when two trees share a
    /// root name.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdform_core::*;
    ///
    /// let mut a = SchemaTree::new();
    /// a.add_root(CommandSchema::new("build")).unwrap();
    /// let mut b = SchemaTree::new();
    /// b.add_root(CommandSchema::new("deploy")).unwrap();
    ///
    /// let forest = SchemaTree::from_forest("root", None, [a, b]).unwrap();
    /// let root = forest.root("root").unwrap();
    /// assert_eq!(root.subcommands.len(), 2);
    /// assert!(forest.find_path(&["root", "deploy"]).is_some());
    /// ```
    pub fn from_forest(
        name: &str,
        docstring: Option<&str>,
        trees: impl IntoIterator<Item = SchemaTree>,
    ) -> Result<Self, SchemaError> {
        let mut forest = Self::new();
        let mut root = CommandSchema::new(name);
        root.docstring = docstring.map(String::from);
        let root_id = forest.add_root(root)?;
        for tree in trees {
            for id in tree.roots.values() {
                forest.graft(Some(root_id), &tree, *id)?;
            }
        }
        Ok(forest)
    }
}

/// Borrowed handle to one command of a [`SchemaTree`].
///
/// Dereferences to the [`CommandSchema`].
#[derive(Debug, Clone, Copy)]
pub struct CommandRef<'a> {
    tree: &'a SchemaTree,
    id: CommandId,
}

impl<'a> CommandRef<'a> {
    /// The command's id.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// The tree this command belongs to.
    pub fn tree(&self) -> &'a SchemaTree {
        self.tree
    }

    /// The schema itself, if the id is valid.
    pub fn schema(&self) -> Option<&'a CommandSchema> {
        self.tree.get(self.id)
    }

    /// Parent command, if any.
    pub fn parent(&self) -> Option<CommandRef<'a>> {
        self.schema()?.parent.map(|p| self.tree.command(p))
    }

    /// Commands from the root down to this one.
    pub fn path_from_root(&self) -> Vec<CommandRef<'a>> {
        self.tree
            .path_from_root(self.id)
            .into_iter()
            .map(|id| self.tree.command(id))
            .collect()
    }

    /// Subcommand with the given name.
    pub fn subcommand(&self, name: &str) -> Option<CommandRef<'a>> {
        let id = self.schema()?.subcommands.get(name)?;
        Some(self.tree.command(*id))
    }

    /// All subcommands in name order.
    pub fn subcommands(&self) -> impl Iterator<Item = CommandRef<'a>> + 'a {
        let tree = self.tree;
        self.schema()
            .into_iter()
            .flat_map(|s| s.subcommands.values())
            .map(move |id| tree.command(*id))
    }
}

impl Deref for CommandRef<'_> {
    type Target = CommandSchema;

    #[allow(clippy::indexing_slicing)]
    fn deref(&self) -> &Self::Target {
        &self.tree.nodes[self.id.0]
    }
}

impl PartialEq for CommandRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.tree, other.tree)
    }
}
