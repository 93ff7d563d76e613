//! Declarative command trees in JSON or YAML.
//!
//! A declaration describes a command the way an argument parser would:
//! parameters with option spellings (or none, for positionals), types,
//! defaults and multiplicity, plus nested subcommands.
//!
//! # Example YAML
//!
//! ```yaml
//! name: backup
//! help: Back up directories
//! params:
//!   - name: verbose
//!     opts: ["-v", "--verbose"]
//!     count: true
//!   - name: compress
//!     opts: ["--compress/--no-compress"]
//!     is_flag: true
//!     default: true
//!   - name: source
//!     nargs: "+"
//! subcommands:
//!   - name: prune
//!     params:
//!       - name: keep
//!         opts: ["--keep"]
//!         type: int
//!         default: 7
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IntrospectError, Result};

/// Declared type: one type name, or one name per tuple position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDecl {
    /// A single type, e.g. `"int"`.
    Single(String),
    /// A tuple type, e.g. `["string", "int"]`.
    Tuple(Vec<String>),
}

impl TypeDecl {
    /// Type names in position order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Tuple(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl Default for TypeDecl {
    fn default() -> Self {
        Self::Single("string".to_string())
    }
}

/// Declared value count per occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nargs {
    /// An explicit count; `-1` means unbounded.
    Count(i32),
    /// An argparse-style pattern: `?`, `+` or `*`.
    Pattern(String),
}

impl Nargs {
    /// Resolves to a count, where `-1` is unbounded.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdform_introspect::Nargs;
    ///
    /// assert_eq!(Nargs::Pattern("?".into()).resolve(), 1);
    /// assert_eq!(Nargs::Pattern("*".into()).resolve(), -1);
    /// assert_eq!(Nargs::Count(3).resolve(), 3);
    /// ```
    pub fn resolve(&self) -> i32 {
        match self {
            Self::Count(n) => *n,
            Self::Pattern(pattern) => match pattern.trim() {
                "?" => 1,
                "+" | "*" => -1,
                other => other.parse().unwrap_or(1),
            },
        }
    }
}

impl Default for Nargs {
    fn default() -> Self {
        Self::Count(1)
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamDecl {
    /// Parameter name (the argument name for positionals).
    pub name: String,
    /// Option spellings; empty for positionals.
    pub opts: Vec<String>,
    /// Negative spellings.
    pub secondary_opts: Vec<String>,
    /// Declared type, if any.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_decl: Option<TypeDecl>,
    /// Allowed values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<serde_json::Value>>,
    /// Declared default, in any JSON shape.
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub default: serde_json::Value,
    /// A value is required.
    pub required: bool,
    /// May be given more than once.
    pub multiple: bool,
    /// Values per occurrence.
    pub nargs: Nargs,
    /// Boolean flag taking no value.
    pub is_flag: bool,
    /// Counting option (`-vvv`).
    pub count: bool,
    /// Left out of the form.
    pub hidden: bool,
    /// Help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl ParamDecl {
    /// Returns `true` for parameters without option spellings.
    pub fn is_positional(&self) -> bool {
        self.opts.is_empty()
    }

    /// Splits `--on/--off` spellings into primary and secondary lists.
    ///
    /// Explicit `secondary_opts` are kept after any split-off spellings.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdform_introspect::ParamDecl;
    ///
    /// let decl = ParamDecl {
    ///     opts: vec!["-a".into(), "--all/--not-all".into()],
    ///     ..ParamDecl::default()
    /// };
    /// let (primary, secondary) = decl.split_opts();
    /// assert_eq!(primary, vec!["-a", "--all"]);
    /// assert_eq!(secondary, vec!["--not-all"]);
    /// ```
    pub fn split_opts(&self) -> (Vec<String>, Vec<String>) {
        let mut primary = Vec::new();
        let mut secondary = Vec::new();
        for opt in &self.opts {
            match opt.split_once('/') {
                Some((on, off)) if on.starts_with('-') && off.starts_with('-') => {
                    primary.push(on.to_string());
                    secondary.push(off.to_string());
                }
                _ => primary.push(opt.clone()),
            }
        }
        for opt in &self.secondary_opts {
            if !secondary.contains(opt) {
                secondary.push(opt.clone());
            }
        }
        (primary, secondary)
    }
}

/// One declared command and its subcommands.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandDecl {
    /// Command name.
    pub name: String,
    /// Help/description text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Left out of the form.
    pub hidden: bool,
    /// Parameters in declaration order.
    pub params: Vec<ParamDecl>,
    /// Nested commands in declaration order.
    pub subcommands: Vec<CommandDecl>,
}

impl CommandDecl {
    /// Parses a declaration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectError::Json`] if parsing fails.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses a declaration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectError::Yaml`] if parsing fails.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Loads a declaration file, picking the format from the extension.
///
/// `.json` is read as JSON, `.yaml` and `.yml` as YAML.
///
/// # Errors
///
/// Returns [`IntrospectError::UnsupportedFormat`] for any other extension,
/// [`IntrospectError::Io`] if the file cannot be read, and a parse error if
/// the contents are malformed.
///
/// # Examples
///
/// ```no_run
/// use cmdform_introspect::load_declaration;
///
/// let decl = load_declaration("backup.yaml").unwrap();
/// println!("{} has {} parameters", decl.name, decl.params.len());
/// ```
pub fn load_declaration(path: impl AsRef<Path>) -> Result<CommandDecl> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => {
            let reader = BufReader::new(std::fs::File::open(path)?);
            Ok(serde_json::from_reader(reader)?)
        }
        "yaml" | "yml" => {
            let reader = BufReader::new(std::fs::File::open(path)?);
            Ok(serde_yaml::from_reader(reader)?)
        }
        _ => Err(IntrospectError::UnsupportedFormat(path.display().to_string())),
    }
}
