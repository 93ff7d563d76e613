//! Form schema model, value normalization and command-line reconstruction.
//!
//! This crate holds the parser-independent half of a form generator for
//! command-line applications:
//!
//! - [`SchemaTree`]: an arena of [`CommandSchema`] nodes, each with ordered
//!   [`OptionSchema`]s and [`ArgumentSchema`]s and named subcommands.
//! - [`MultiValueParamData`]: the canonical list-of-tuples shape every
//!   parameter value is normalized into, with [`Value::NotSupplied`] marking
//!   blanks.
//! - [`UserCommandData`]: what the user entered, one level per command on the
//!   selected path, prefilled from defaults with
//!   [`UserCommandData::fill_defaults`].
//! - Reconstruction ([`to_cli_tokens`], [`UserCommandData::to_cli_args`],
//!   [`UserCommandData::to_cli_string`]): the argument vector and quoted
//!   display string the user would have typed, with defaults suppressed.
//!
//! Validation ([`validate_tree`]) catches malformed spellings, duplicate
//! keys and defaults that do not fit their parameter.
//!
//! # Example
//!
//! ```
//! use cmdform_core::*;
//!
//! let mut tree = SchemaTree::new();
//! let id = tree
//!     .add_root(
//!         CommandSchema::new("deploy")
//!             .with_option(OptionSchema::new(&["-e", "--env"], ParamType::String).with_default("dev"))
//!             .with_option(OptionSchema::counter(&["-v", "--verbose"]))
//!             .with_argument(ArgumentSchema::new("service", ParamType::String).required()),
//!     )
//!     .unwrap();
//! assert!(validate_tree(&tree).is_empty());
//!
//! let mut form = FormValues::new();
//! form.insert(ParamKey::new("deploy/-e"), MultiValueParamData::process("prod"));
//! form.insert(ParamKey::new("deploy/-v"), MultiValueParamData::process(2));
//! form.insert(ParamKey::new("deploy/service"), MultiValueParamData::process("api"));
//!
//! let mut data = UserCommandData::from_form(&tree, id, &form).unwrap();
//! data.fill_defaults(tree.command(id));
//!
//! assert_eq!(data.to_cli_args(false), vec!["--env", "prod", "-vv", "api"]);
//! assert_eq!(data.to_cli_string(true), "deploy --env prod -vv api");
//! ```

mod data;
mod reconstruct;
mod schema;
mod validate;
mod value;

pub use data::{FormValues, UserArgumentData, UserCommandData, UserOptionData};
pub use reconstruct::{CliArg, DEFAULT_MAX_COUNT, MISSING_VALUE_MARKER, RenderConfig, to_cli_tokens};
pub use schema::*;
pub use validate::{ValidationError, validate_command, validate_tree};
pub use value::*;
