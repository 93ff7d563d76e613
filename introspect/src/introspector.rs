//! Builds a [`SchemaTree`] from any [`CommandSource`].

use cmdform_core::{
    ArgumentSchema, CommandId, CommandSchema, MultiValueParamData, OptionSchema, ParamSchema,
    ParamType, RawValue, Scalar, SchemaTree, Value, json_scalar,
};
use tracing::{debug, warn};

use crate::config::{DEFAULT_IGNORED_COMMAND, FormConfig};
use crate::declaration::ParamDecl;
use crate::source::CommandSource;
use crate::tags::{DEFAULT_PLACEHOLDER, extract_tags, substitute_default};

/// Reads command sources into normalized schemas.
///
/// # Examples
///
/// ```
/// use cmdform_introspect::{CommandDecl, Introspector};
///
/// let decl = CommandDecl::from_yaml(
///     "name: app\nsubcommands:\n  - name: run\n  - name: tui\n",
/// )
/// .unwrap();
///
/// let tree = Introspector::default().introspect(&decl);
/// let app = tree.root("app").unwrap();
/// assert!(app.subcommand("run").is_some());
/// assert!(app.subcommand("tui").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Introspector {
    ignore: Vec<String>,
}

impl Default for Introspector {
    fn default() -> Self {
        Self {
            ignore: vec![DEFAULT_IGNORED_COMMAND.to_string()],
        }
    }
}

impl Introspector {
    /// Creates an introspector that ignores the given command names.
    pub fn new<I, S>(ignore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignore: ignore.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an introspector from tool configuration.
    pub fn from_config(config: &FormConfig) -> Self {
        Self::new(config.ignore_commands.iter().cloned())
    }

    /// Command names excluded below the root.
    pub fn ignored(&self) -> &[String] {
        &self.ignore
    }

    /// Builds the schema tree rooted at `source`.
    ///
    /// The root is always kept. Hidden and ignored subcommands are left out,
    /// and when two subcommands share a name the first one wins.
    pub fn introspect<S: CommandSource>(&self, source: &S) -> SchemaTree {
        let mut tree = SchemaTree::new();
        self.walk(&mut tree, None, source);
        tree
    }

    fn walk<S: CommandSource>(&self, tree: &mut SchemaTree, parent: Option<CommandId>, source: &S) {
        let schema = self.command_schema(source);
        let registered = match parent {
            Some(parent) => tree.add_subcommand(parent, schema),
            None => tree.add_root(schema),
        };
        let id = match registered {
            Ok(id) => id,
            Err(err) => {
                warn!(command = %source.command_name(), error = %err, "Dropping duplicate command");
                return;
            }
        };

        for child in source.child_commands() {
            let name = child.command_name();
            if child.is_hidden() {
                debug!(command = %name, "Skipping hidden command");
                continue;
            }
            if self.ignore.iter().any(|ignored| *ignored == name) {
                debug!(command = %name, "Skipping ignored command");
                continue;
            }
            self.walk(tree, Some(id), child);
        }
    }

    fn command_schema<S: CommandSource>(&self, source: &S) -> CommandSchema {
        let mut schema = CommandSchema::new(source.command_name());
        schema.docstring = source.help_text();

        for decl in source.parameters() {
            if decl.hidden {
                debug!(command = %schema.name, param = %decl.name, "Skipping hidden parameter");
                continue;
            }
            let param = param_schema(&schema.name.to_string(), &decl);
            if decl.is_positional() {
                schema.arguments.push(ArgumentSchema {
                    name: decl.name.clone(),
                    param,
                });
            } else {
                let (names, secondary_opts) = decl.split_opts();
                schema.options.push(OptionSchema {
                    names,
                    param,
                    is_flag: decl.is_flag,
                    counting: decl.count,
                    secondary_opts,
                });
            }
        }

        schema
    }
}

fn param_types(command: &str, decl: &ParamDecl) -> Vec<ParamType> {
    let mut types: Vec<ParamType> = match &decl.type_decl {
        Some(type_decl) => type_decl
            .names()
            .into_iter()
            .map(|name| {
                ParamType::from_name(name).unwrap_or_else(|| {
                    debug!(
                        command,
                        param = %decl.name,
                        type_name = name,
                        "Unknown parameter type, using string"
                    );
                    ParamType::String
                })
            })
            .collect(),
        None if decl.is_flag => vec![ParamType::Bool],
        None if decl.count => vec![ParamType::Int],
        None => vec![ParamType::String],
    };

    if decl.choices.is_some() && types.len() == 1 {
        types = vec![ParamType::Choice];
    }
    types
}

fn param_schema(command: &str, decl: &ParamDecl) -> ParamSchema {
    let mut param = ParamSchema::new(param_types(command, decl));
    param.required = decl.required;
    param.multiple = decl.multiple;
    if param.types.len() == 1 {
        param.nargs = decl.nargs.resolve();
    }
    param.normalize();

    param.choices = decl.choices.as_ref().map(|choices| {
        choices
            .iter()
            .cloned()
            .filter_map(|c| json_scalar(c).string_form())
            .collect()
    });
    param.default = default_values(decl, &param);

    if let Some(help) = &decl.help {
        let help = if help.contains(DEFAULT_PLACEHOLDER) {
            let shown: Vec<String> = param
                .default
                .flattened()
                .filter_map(Value::string_form)
                .collect();
            let shown = shown.join(" ");
            substitute_default(help, &shown)
        } else {
            help.clone()
        };
        let (visible, tags) = extract_tags(&help);
        param.help = Some(visible);
        if tags.secret {
            param.secret = true;
        }
        if tags.prompt {
            param.read_only = true;
            param.placeholder = Some(cmdform_core::PROMPT_PLACEHOLDER.to_string());
        }
    }

    param
}

fn default_values(decl: &ParamDecl, param: &ParamSchema) -> MultiValueParamData {
    let raw = match &decl.default {
        serde_json::Value::Null if decl.is_flag => serde_json::Value::Bool(false),
        serde_json::Value::Null if decl.count => serde_json::Value::from(0),
        other => other.clone(),
    };

    let mut data = match raw {
        serde_json::Value::Array(items)
            if param.multi_value && !items.iter().any(serde_json::Value::is_array) =>
        {
            let values: Vec<Value> = items.into_iter().map(json_scalar).collect();
            if decl.multiple {
                MultiValueParamData::from_flat(values, param.nargs)
            } else {
                MultiValueParamData::process(RawValue::Tuple(values))
            }
        }
        other => MultiValueParamData::process(other),
    };

    for tuple in &mut data.values {
        for (position, value) in tuple.iter_mut().enumerate() {
            let kind = param
                .types
                .get(position)
                .or(param.types.last())
                .copied()
                .unwrap_or_default();
            if matches!(kind, ParamType::String | ParamType::Choice) {
                continue;
            }
            if let Value::Supplied(Scalar::Str(text)) = value {
                let coerced = kind.coerce(text);
                *value = coerced;
            }
        }
    }

    data
}
