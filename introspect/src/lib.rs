//! Form schemas from command declarations.
//!
//! This crate reads a command tree and produces the normalized
//! [`SchemaTree`] a form is built from. Sources implement [`CommandSource`]:
//!
//! - [`CommandDecl`]: JSON or YAML declarations, loaded with
//!   [`load_declaration`].
//! - `clap::Command`: builder or derive commands (feature `clap`, on by
//!   default).
//!
//! # Main entry points
//!
//! - [`Introspector::introspect`]: build a tree from any source.
//! - [`introspect_file`]: load a declaration file and build its tree.
//! - [`format_tree`]: render a tree as JSON, YAML, Markdown or a table.
//!
//! # Example
//!
//! ```
//! use cmdform_introspect::{CommandDecl, Introspector};
//!
//! let decl = CommandDecl::from_yaml(r#"
//! name: backup
//! params:
//!   - name: compress
//!     opts: ["--compress/--no-compress"]
//!     is_flag: true
//!     default: true
//!   - name: source
//! "#).unwrap();
//!
//! let tree = Introspector::default().introspect(&decl);
//! let backup = tree.root("backup").unwrap();
//! assert_eq!(backup.options[0].secondary_opts, vec!["--no-compress"]);
//! assert_eq!(backup.arguments[0].param.key.as_str(), "backup/source");
//! ```
//!
//! [`SchemaTree`]: cmdform_core::SchemaTree

#[cfg(feature = "clap")]
mod clap_source;
pub mod config;
pub mod declaration;
pub mod error;
pub mod introspector;
pub mod output;
pub mod source;
pub mod tags;

use std::path::Path;

use cmdform_core::SchemaTree;

pub use config::FormConfig;
pub use declaration::{CommandDecl, Nargs, ParamDecl, TypeDecl, load_declaration};
pub use error::{IntrospectError, Result};
pub use introspector::Introspector;
pub use output::{OutputFormat, format_tree};
pub use source::CommandSource;
pub use tags::{HelpTags, extract_tags};

/// Loads a declaration file and introspects it.
///
/// # Errors
///
/// Propagates the errors of [`load_declaration`].
pub fn introspect_file(path: impl AsRef<Path>, introspector: &Introspector) -> Result<SchemaTree> {
    let decl = load_declaration(path)?;
    Ok(introspector.introspect(&decl))
}
