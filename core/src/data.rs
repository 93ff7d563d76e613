//! User-entered command data, built from form values.
//!
//! A [`UserCommandData`] chain mirrors one root-to-leaf path through the
//! schema tree. Each level holds one entry per supplied occurrence of an
//! option or argument; repeated options appear as several entries.

use std::collections::HashMap;

use serde::Serialize;

use crate::schema::{
    ArgumentSchema, CommandId, CommandName, CommandRef, OptionSchema, ParamKey, SchemaTree,
};
use crate::value::{MultiValueParamData, ValueTuple};

/// Values produced by a form, one per schema key.
pub type FormValues = HashMap<ParamKey, MultiValueParamData>;

/// Reserved name of the temporary root used while assembling a chain.
const ASSEMBLY_ROOT: &str = "_";

/// One occurrence of an option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOptionData<'s> {
    /// Spellings of the option, copied from its schema.
    pub names: Vec<String>,
    /// The values of this occurrence.
    pub value: ValueTuple,
    /// Schema the entry belongs to.
    #[serde(skip)]
    pub schema: &'s OptionSchema,
}

impl<'s> UserOptionData<'s> {
    /// Creates an occurrence of `schema` carrying `value`.
    pub fn new(schema: &'s OptionSchema, value: ValueTuple) -> Self {
        Self {
            names: schema.names.clone(),
            value,
            schema,
        }
    }

    /// First spelling; occurrences are grouped by it.
    pub fn primary_name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }
}

/// One occurrence of a positional argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserArgumentData<'s> {
    /// Argument name.
    pub name: String,
    /// The values of this occurrence.
    pub value: ValueTuple,
    /// Schema the entry belongs to.
    #[serde(skip)]
    pub schema: &'s ArgumentSchema,
}

impl<'s> UserArgumentData<'s> {
    /// Creates an occurrence of `schema` carrying `value`.
    pub fn new(schema: &'s ArgumentSchema, value: ValueTuple) -> Self {
        Self {
            name: schema.name.clone(),
            value,
            schema,
        }
    }
}

/// User input for one command level, linked to its selected subcommand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCommandData<'s> {
    /// Command name.
    pub name: CommandName,
    /// Option occurrences in entry order.
    pub options: Vec<UserOptionData<'s>>,
    /// Argument occurrences in entry order.
    pub arguments: Vec<UserArgumentData<'s>>,
    /// Selected subcommand, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcommand: Option<Box<UserCommandData<'s>>>,
    /// Name of the enclosing level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommandName>,
    /// Schema of this level, once known.
    #[serde(skip)]
    pub command_schema: Option<CommandRef<'s>>,
}

impl<'s> UserCommandData<'s> {
    /// Creates an empty level with no schema attached.
    pub fn new(name: impl Into<CommandName>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
            arguments: Vec::new(),
            subcommand: None,
            parent: None,
            command_schema: None,
        }
    }

    /// Creates an empty level bound to `command`.
    pub fn for_command(command: CommandRef<'s>) -> Self {
        let mut data = Self::new(command.name.clone());
        data.command_schema = Some(command);
        data
    }

    /// Appends an option occurrence.
    pub fn push_option(&mut self, schema: &'s OptionSchema, value: ValueTuple) -> &mut Self {
        self.options.push(UserOptionData::new(schema, value));
        self
    }

    /// Appends an argument occurrence.
    pub fn push_argument(&mut self, schema: &'s ArgumentSchema, value: ValueTuple) -> &mut Self {
        self.arguments.push(UserArgumentData::new(schema, value));
        self
    }

    /// Attaches `child` as the selected subcommand.
    pub fn set_subcommand(&mut self, mut child: UserCommandData<'s>) -> &mut Self {
        child.parent = Some(self.name.clone());
        self.subcommand = Some(Box::new(child));
        self
    }

    /// Builds the chain for the command `selected` from form values.
    ///
    /// One level is created for every command on the path from the root to
    /// `selected`. Each tuple of a parameter's form value becomes one
    /// occurrence. Parameters without a form entry are left for
    /// [`fill_defaults`](Self::fill_defaults).
    ///
    /// Returns `None` if `selected` is not part of `tree`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdform_core::*;
    ///
    /// let mut tree = SchemaTree::new();
    /// let root = tree
    ///     .add_root(CommandSchema::new("app").with_option(OptionSchema::new(&["--name"], ParamType::String)))
    ///     .unwrap();
    /// let run = tree.add_subcommand(root, CommandSchema::new("run")).unwrap();
    ///
    /// let mut values = FormValues::new();
    /// values.insert(ParamKey::new("app/--name"), MultiValueParamData::process("demo"));
    ///
    /// let data = UserCommandData::from_form(&tree, run, &values).unwrap();
    /// assert_eq!(data.name.as_str(), "app");
    /// assert!(data.parent.is_none());
    /// assert_eq!(data.options.len(), 1);
    /// assert_eq!(data.subcommand.as_ref().unwrap().parent, Some(CommandName::from("app")));
    /// ```
    pub fn from_form(
        tree: &'s SchemaTree,
        selected: CommandId,
        values: &FormValues,
    ) -> Option<Self> {
        tree.get(selected)?;

        let mut root = Self::new(ASSEMBLY_ROOT);
        let mut cursor = &mut root;
        for id in tree.path_from_root(selected) {
            let command = tree.command(id);
            let Some(schema) = command.schema() else {
                continue;
            };

            let mut level = Self::for_command(command);
            for option in &schema.options {
                if let Some(value) = values.get(&option.param.key) {
                    for tuple in &value.values {
                        level.push_option(option, tuple.clone());
                    }
                }
            }
            for argument in &schema.arguments {
                if let Some(value) = values.get(&argument.param.key) {
                    for tuple in &value.values {
                        level.push_argument(argument, tuple.clone());
                    }
                }
            }

            level.parent = Some(cursor.name.clone());
            cursor = &mut **cursor.subcommand.insert(Box::new(level));
        }

        let mut first = *root.subcommand?;
        first.parent = None;
        Some(first)
    }

    /// Fills every parameter that has no entry yet with its defaults.
    ///
    /// Options are matched by their spellings and arguments by name; one
    /// entry is appended per default tuple. The schema is attached when
    /// missing, and the selected subcommand is filled from the schema's
    /// subcommand of the same name (left untouched when there is none).
    /// Calling this twice has no further effect.
    pub fn fill_defaults(&mut self, command: CommandRef<'s>) {
        let Some(schema) = command.schema() else {
            return;
        };

        for option in &schema.options {
            if self.options.iter().any(|o| o.names == option.names) {
                continue;
            }
            for tuple in &option.param.default.values {
                self.push_option(option, tuple.clone());
            }
        }

        for argument in &schema.arguments {
            if self.arguments.iter().any(|a| a.name == argument.name) {
                continue;
            }
            for tuple in &argument.param.default.values {
                self.push_argument(argument, tuple.clone());
            }
        }

        if self.command_schema.is_none() {
            self.command_schema = Some(command);
        }

        if let Some(sub) = self.subcommand.as_deref_mut() {
            if let Some(sub_schema) = command.subcommand(sub.name.as_str()) {
                sub.fill_defaults(sub_schema);
            }
        }
    }

    /// Walks the chain from this level down to the deepest subcommand.
    pub fn levels(&self) -> impl Iterator<Item = &UserCommandData<'s>> {
        std::iter::successors(Some(self), |level| level.subcommand.as_deref())
    }
}
