//! Output formatting for schema trees.

use cmdform_core::{ArgumentSchema, CommandRef, OptionSchema, ParamType, SchemaTree};
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

/// Nested view of one command, used for JSON and YAML output.
#[derive(Debug, Serialize)]
struct CommandView<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    docstring: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty")]
    options: &'a [OptionSchema],
    #[serde(skip_serializing_if = "is_empty")]
    arguments: &'a [ArgumentSchema],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    subcommands: Vec<CommandView<'a>>,
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

impl<'a> CommandView<'a> {
    fn new(command: CommandRef<'a>) -> Option<Self> {
        let schema = command.schema()?;
        Some(Self {
            name: schema.name.as_str(),
            docstring: schema.docstring.as_deref(),
            options: &schema.options,
            arguments: &schema.arguments,
            subcommands: command.subcommands().filter_map(Self::new).collect(),
        })
    }
}

/// Formats every root of a tree in the requested output format.
///
/// # Examples
///
/// ```
/// use cmdform_core::{CommandSchema, OptionSchema, SchemaTree};
/// use cmdform_introspect::{OutputFormat, format_tree};
///
/// let mut tree = SchemaTree::new();
/// tree.add_root(CommandSchema::new("tool").with_option(OptionSchema::flag(&["--dry-run"]))).unwrap();
///
/// let table = format_tree(&tree, OutputFormat::Table).unwrap();
/// assert!(table.contains("Command: tool"));
/// assert!(table.contains("--dry-run"));
/// ```
pub fn format_tree(tree: &SchemaTree, format: OutputFormat) -> Result<String, String> {
    let views: Vec<CommandView<'_>> = tree.roots().filter_map(CommandView::new).collect();
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&views)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(&views).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(tree
            .roots()
            .map(|root| {
                let mut out = String::new();
                command_to_markdown(root, 1, &mut out);
                out
            })
            .collect()),
        OutputFormat::Table => Ok(tree
            .roots()
            .map(|root| {
                let mut out = String::new();
                command_to_table(root, &mut out);
                out
            })
            .collect()),
    }
}

fn path_label(command: CommandRef<'_>) -> String {
    command
        .path_from_root()
        .iter()
        .map(|c| c.name.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn type_label(types: &[ParamType]) -> String {
    types
        .iter()
        .map(|t| format!("{t:?}").to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

fn option_label(option: &OptionSchema) -> String {
    let mut label = option.names.join(", ");
    if !option.secondary_opts.is_empty() {
        label.push_str(" / ");
        label.push_str(&option.secondary_opts.join(", "));
    }
    label
}

fn default_label(forms: &[String]) -> String {
    forms.join(" ")
}

fn command_to_markdown(command: CommandRef<'_>, depth: usize, out: &mut String) {
    let heading = "#".repeat(depth.min(6));
    out.push_str(&format!("{heading} {}\n\n", path_label(command)));

    if let Some(ref doc) = command.docstring {
        out.push_str(&format!("{doc}\n\n"));
    }

    if !command.options.is_empty() {
        out.push_str("| Option | Type | Default | Description |\n");
        out.push_str("|--------|------|---------|-------------|\n");
        for option in &command.options {
            let help = option.param.help.as_deref().unwrap_or("");
            out.push_str(&format!(
                "| `{}` | {} | {} | {help} |\n",
                option_label(option),
                type_label(&option.param.types),
                default_label(&option.param.default.supplied_sorted_forms()),
            ));
        }
        out.push('\n');
    }

    if !command.arguments.is_empty() {
        out.push_str("| Argument | Type | Required | Default |\n");
        out.push_str("|----------|------|----------|---------|\n");
        for arg in &command.arguments {
            let required = if arg.param.required { "yes" } else { "no" };
            out.push_str(&format!(
                "| `{}` | {} | {required} | {} |\n",
                arg.name,
                type_label(&arg.param.types),
                default_label(&arg.param.default.supplied_sorted_forms()),
            ));
        }
        out.push('\n');
    }

    for sub in command.subcommands() {
        command_to_markdown(sub, depth + 1, out);
    }
}

fn command_to_table(command: CommandRef<'_>, out: &mut String) {
    out.push_str(&format!("Command: {}\n", path_label(command)));
    if let Some(ref doc) = command.docstring {
        out.push_str(&format!("  {doc}\n"));
    }

    if !command.options.is_empty() {
        out.push_str("\nOptions:\n");
        let labels: Vec<String> = command.options.iter().map(option_label).collect();
        let width = labels.iter().map(String::len).max().unwrap_or(6);
        for (label, option) in labels.iter().zip(&command.options) {
            let help = option.param.help.as_deref().unwrap_or("");
            out.push_str(&format!("  {label:<width$}  {help}\n"));
        }
    }

    if !command.arguments.is_empty() {
        out.push_str("\nArguments:\n");
        let width = command
            .arguments
            .iter()
            .map(|a| a.name.len())
            .max()
            .unwrap_or(8);
        for arg in &command.arguments {
            let kind = type_label(&arg.param.types);
            out.push_str(&format!("  {:<width$}  {kind}\n", arg.name));
        }
    }

    out.push('\n');
    for sub in command.subcommands() {
        command_to_table(sub, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdform_core::CommandSchema;

    fn sample_tree() -> SchemaTree {
        let mut tree = SchemaTree::new();
        let root = tree
            .add_root(
                CommandSchema::new("test")
                    .with_docstring("Test tool")
                    .with_option(
                        OptionSchema::flag(&["--all"])
                            .with_secondary(&["--not-all"])
                            .with_help("Everything"),
                    )
                    .with_argument(
                        ArgumentSchema::new("file", ParamType::String)
                            .required()
                            .with_default("in.txt"),
                    ),
            )
            .unwrap();
        tree.add_subcommand(root, CommandSchema::new("build")).unwrap();
        tree
    }

    #[test]
    fn test_format_tree_json_nests_subcommands() {
        let json = format_tree(&sample_tree(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["name"], "test");
        assert_eq!(parsed[0]["subcommands"][0]["name"], "build");
        assert_eq!(parsed[0]["arguments"][0]["key"], "test/file");
    }

    #[test]
    fn test_format_tree_yaml() {
        let yaml = format_tree(&sample_tree(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("name: test"));
        assert!(yaml.contains("docstring: Test tool"));
    }

    #[test]
    fn test_format_tree_markdown() {
        let md = format_tree(&sample_tree(), OutputFormat::Markdown).unwrap();
        assert!(md.contains("# test"));
        assert!(md.contains("## test build"));
        assert!(md.contains("`--all / --not-all`"));
        assert!(md.contains("| `file` | string | yes | in.txt |"));
    }

    #[test]
    fn test_format_tree_table() {
        let table = format_tree(&sample_tree(), OutputFormat::Table).unwrap();
        assert!(table.contains("Command: test\n"));
        assert!(table.contains("Command: test build"));
        assert!(table.contains("Everything"));
    }
}
