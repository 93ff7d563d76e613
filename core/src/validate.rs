//! Schema tree validation.
//!
//! Catches structural problems such as malformed or duplicate option
//! spellings, defaults that do not fit their parameter, and colliding form
//! keys before a form is built on top of the tree.
//!
//! # Examples
//!
//! ```
//! use cmdform_core::*;
//!
//! let mut tree = SchemaTree::new();
//! tree.add_root(
//!     CommandSchema::new("git")
//!         .with_option(OptionSchema::flag(&["-v", "--verbose"])),
//! )
//! .unwrap();
//! assert!(validate_tree(&tree).is_empty());
//!
//! // Invalid: option spelling without a leading dash
//! let mut bad = SchemaTree::new();
//! bad.add_root(CommandSchema::new("git").with_option(OptionSchema::flag(&["verbose"])))
//!     .unwrap();
//! assert_eq!(
//!     validate_tree(&bad),
//!     vec![ValidationError::InvalidFlag("verbose".to_string())]
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::schema::{CommandSchema, ParamSchema, SchemaTree};

/// Schema validation errors.
///
/// Each variant describes one structural problem. The `Display` impl gives
/// a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// An option has no spelling at all.
    #[error("option must define at least one name")]
    MissingOptionName,
    /// Option spelling does not start with a dash.
    #[error("invalid option name: {0}")]
    InvalidFlag(String),
    /// Two options of one command share a spelling.
    #[error("duplicate option in command: {0}")]
    DuplicateFlag(String),
    /// Two parameters share a form key.
    #[error("duplicate parameter key: {0}")]
    DuplicateKey(String),
    /// A default tuple does not have `nargs` values.
    #[error("default for {key} has {found} values, expected {expected}")]
    DefaultArity {
        /// Parameter key.
        key: String,
        /// Declared `nargs`.
        expected: usize,
        /// Length of the offending tuple.
        found: usize,
    },
    /// A default value is not among the declared choices.
    #[error("default '{value}' for {key} is not one of the choices")]
    UnknownChoiceDefault {
        /// Parameter key.
        key: String,
        /// Offending value.
        value: String,
    },
}

/// Validates every command of a tree.
///
/// All findings are collected; validation does not stop at the first one.
pub fn validate_tree(tree: &SchemaTree) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut keys: HashSet<&str> = HashSet::new();

    for command in tree.iter() {
        errors.extend(validate_command(command));
        for param in command.params() {
            if !keys.insert(param.key.as_str()) {
                errors.push(ValidationError::DuplicateKey(param.key.to_string()));
            }
        }
    }

    errors
}

/// Validates one command in isolation.
pub fn validate_command(command: &CommandSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if command.name.as_str().trim().is_empty() {
        errors.push(ValidationError::EmptyCommandName);
    }

    let mut seen = HashSet::new();
    for option in &command.options {
        if option.names.is_empty() {
            errors.push(ValidationError::MissingOptionName);
        }
        for name in option.names.iter().chain(&option.secondary_opts) {
            if !name.starts_with('-') || name.trim_start_matches('-').is_empty() {
                errors.push(ValidationError::InvalidFlag(name.clone()));
            } else if !seen.insert(name.as_str()) {
                errors.push(ValidationError::DuplicateFlag(name.clone()));
            }
        }
    }

    for param in command.params() {
        errors.extend(validate_default(param));
    }

    errors
}

fn validate_default(param: &ParamSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Ok(expected) = usize::try_from(param.nargs) {
        if expected > 1 {
            for tuple in &param.default.values {
                if tuple.len() != expected {
                    errors.push(ValidationError::DefaultArity {
                        key: param.key.to_string(),
                        expected,
                        found: tuple.len(),
                    });
                }
            }
        }
    }

    if let Some(choices) = &param.choices {
        for value in param.default.flattened().filter_map(|v| v.string_form()) {
            if !choices.contains(&value) {
                errors.push(ValidationError::UnknownChoiceDefault {
                    key: param.key.to_string(),
                    value,
                });
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArgumentSchema, OptionSchema, ParamType};
    use crate::value::{MultiValueParamData, Value};

    fn tree_with(command: CommandSchema) -> SchemaTree {
        let mut tree = SchemaTree::new();
        tree.add_root(command).unwrap();
        tree
    }

    #[test]
    fn test_validate_tree_rejects_duplicate_flags() {
        let tree = tree_with(
            CommandSchema::new("tool")
                .with_option(OptionSchema::new(&["-o", "--output"], ParamType::String))
                .with_option(OptionSchema::flag(&["--overwrite", "-o"])),
        );
        let errors = validate_tree(&tree);
        assert_eq!(errors, vec![ValidationError::DuplicateFlag("-o".to_string())]);
    }

    #[test]
    fn test_validate_tree_rejects_duplicate_keys() {
        let tree = tree_with(
            CommandSchema::new("tool")
                .with_argument(ArgumentSchema::new("path", ParamType::String))
                .with_argument(ArgumentSchema::new("path", ParamType::String)),
        );
        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::DuplicateKey("tool/path".to_string())]
        );
    }

    #[test]
    fn test_validate_tree_reports_default_arity() {
        let mut option = OptionSchema::new(&["--size"], ParamType::Int).with_nargs(2);
        option.param.default = MultiValueParamData::new(vec![vec![Value::from(1)]]);
        let tree = tree_with(CommandSchema::new("tool").with_option(option));
        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::DefaultArity {
                key: "tool/--size".to_string(),
                expected: 2,
                found: 1,
            }]
        );
    }

    #[test]
    fn test_validate_tree_reports_unknown_choice_default() {
        let option = OptionSchema::new(&["--mode"], ParamType::Choice)
            .with_choices(["fast", "slow"])
            .with_default("medium");
        let tree = tree_with(CommandSchema::new("tool").with_option(option));
        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::UnknownChoiceDefault {
                key: "tool/--mode".to_string(),
                value: "medium".to_string(),
            }]
        );
    }

    #[test]
    fn test_validate_tree_collects_every_finding() {
        let mut tree = SchemaTree::new();
        let root = tree
            .add_root(CommandSchema::new("tool").with_option(OptionSchema::flag(&["bad"])))
            .unwrap();
        tree.add_subcommand(
            root,
            CommandSchema::new("  ").with_option(OptionSchema {
                names: Vec::new(),
                ..OptionSchema::flag(&["-x"])
            }),
        )
        .unwrap();

        let errors = validate_tree(&tree);
        assert!(errors.contains(&ValidationError::InvalidFlag("bad".to_string())));
        assert!(errors.contains(&ValidationError::EmptyCommandName));
        assert!(errors.contains(&ValidationError::MissingOptionName));
    }

    #[test]
    fn test_validate_tree_accepts_valid_tree() {
        let mut tree = SchemaTree::new();
        let root = tree
            .add_root(
                CommandSchema::new("git")
                    .with_option(OptionSchema::counter(&["-v", "--verbose"]))
                    .with_option(
                        OptionSchema::flag(&["--color"]).with_secondary(&["--no-color"]),
                    ),
            )
            .unwrap();
        tree.add_subcommand(
            root,
            CommandSchema::new("commit").with_option(OptionSchema::new(&["-m"], ParamType::String)),
        )
        .unwrap();
        assert!(validate_tree(&tree).is_empty());
    }
}
