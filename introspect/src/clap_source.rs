//! [`CommandSource`] for `clap` commands.
//!
//! Commands are read as declared, without calling `Command::build`, so the
//! generated `--help`/`--version` arguments never appear in the schema.

use std::any::TypeId;

use clap::{Arg, ArgAction, Command};

use crate::declaration::{Nargs, ParamDecl, TypeDecl};
use crate::source::CommandSource;

impl CommandSource for Command {
    fn command_name(&self) -> String {
        self.get_name().to_string()
    }

    fn help_text(&self) -> Option<String> {
        self.get_long_about()
            .or_else(|| self.get_about())
            .map(ToString::to_string)
    }

    fn is_hidden(&self) -> bool {
        self.is_hide_set()
    }

    fn parameters(&self) -> Vec<ParamDecl> {
        let mut params: Vec<(ParamDecl, bool)> = self
            .get_arguments()
            .filter_map(|arg| {
                let is_set_false = matches!(arg.get_action(), ArgAction::SetFalse);
                param_decl(arg).map(|decl| (decl, is_set_false))
            })
            .collect();

        // A `--no-x` SetFalse next to a `--x` SetTrue becomes the latter's
        // negative spelling.
        let mut folded = Vec::new();
        for index in 0..params.len() {
            let Some((decl, true)) = params.get(index) else {
                continue;
            };
            let negatives = decl.opts.clone();
            let target = negatives.iter().find_map(|negative| {
                let positive = format!("--{}", negative.strip_prefix("--no-")?);
                params.iter().position(|(other, is_set_false)| {
                    !*is_set_false && other.is_flag && other.opts.contains(&positive)
                })
            });
            if let Some(target) = target {
                if let Some((positive, _)) = params.get_mut(target) {
                    positive.secondary_opts.extend(negatives);
                }
                folded.push(index);
            }
        }

        params
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !folded.contains(index))
            .map(|(_, (decl, _))| decl)
            .collect()
    }

    fn child_commands(&self) -> Vec<&Self> {
        self.get_subcommands().collect()
    }
}

fn param_decl(arg: &Arg) -> Option<ParamDecl> {
    let action = arg.get_action();
    if matches!(
        action,
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
    ) {
        return None;
    }

    let mut opts = Vec::new();
    if let Some(short) = arg.get_short() {
        opts.push(format!("-{short}"));
    }
    if let Some(long) = arg.get_long() {
        opts.push(format!("--{long}"));
    }
    for alias in arg.get_visible_short_aliases().unwrap_or_default() {
        opts.push(format!("-{alias}"));
    }
    for alias in arg.get_visible_aliases().unwrap_or_default() {
        opts.push(format!("--{alias}"));
    }

    let mut decl = ParamDecl {
        name: arg.get_id().as_str().to_string(),
        required: arg.is_required_set(),
        hidden: arg.is_hide_set(),
        help: arg
            .get_long_help()
            .or_else(|| arg.get_help())
            .map(ToString::to_string),
        ..ParamDecl::default()
    };

    match action {
        ArgAction::SetTrue => {
            decl.is_flag = true;
            decl.default = serde_json::Value::Bool(false);
        }
        ArgAction::SetFalse => {
            decl.is_flag = true;
            decl.secondary_opts = opts.clone();
            decl.default = serde_json::Value::Bool(true);
        }
        ArgAction::Count => decl.count = true,
        _ => {
            decl.multiple = matches!(action, ArgAction::Append);
            decl.nargs = Nargs::Count(nargs(arg));
            decl.type_decl = Some(TypeDecl::Single(type_name(arg).to_string()));
            decl.choices = choices(arg);
            decl.default = default_value(arg);
        }
    }
    decl.opts = opts;

    Some(decl)
}

fn nargs(arg: &Arg) -> i32 {
    match arg.get_num_args() {
        Some(range) => {
            let (min, max) = (range.min_values(), range.max_values());
            if max <= 1 {
                1
            } else if max == usize::MAX || min != max {
                -1
            } else {
                i32::try_from(max).unwrap_or(-1)
            }
        }
        None => arg
            .get_value_names()
            .map_or(1, |names| i32::try_from(names.len().max(1)).unwrap_or(1)),
    }
}

fn type_name(arg: &Arg) -> &'static str {
    let id = arg.get_value_parser().type_id();
    let is = |candidates: &[TypeId]| candidates.iter().any(|t| id == *t);

    // Values clap lists (including `true`/`false` for bool parsers) must be
    // emitted verbatim.
    if !arg.get_possible_values().is_empty() {
        "choice"
    } else if is(&[TypeId::of::<bool>()]) {
        "bool"
    } else if is(&[
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<isize>(),
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<usize>(),
    ]) {
        "int"
    } else if is(&[TypeId::of::<f32>(), TypeId::of::<f64>()]) {
        "float"
    } else {
        "string"
    }
}

fn choices(arg: &Arg) -> Option<Vec<serde_json::Value>> {
    let values: Vec<serde_json::Value> = arg
        .get_possible_values()
        .iter()
        .filter(|v| !v.is_hide_set())
        .map(|v| serde_json::Value::String(v.get_name().to_string()))
        .collect();
    if values.is_empty() || type_name(arg) != "choice" {
        None
    } else {
        Some(values)
    }
}

fn default_value(arg: &Arg) -> serde_json::Value {
    let defaults: Vec<serde_json::Value> = arg
        .get_default_values()
        .iter()
        .map(|v| serde_json::Value::String(v.to_string_lossy().into_owned()))
        .collect();
    match defaults.len() {
        0 => serde_json::Value::Null,
        1 => defaults.into_iter().next().unwrap_or_default(),
        _ => serde_json::Value::Array(defaults),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Introspector;
    use clap::Parser;
    use cmdform_core::{MultiValueParamData, ParamType, UserCommandData, Value};

    fn sample() -> Command {
        Command::new("tool")
            .about("Sample tool")
            .arg(Arg::new("verbose").short('v').long("verbose").action(ArgAction::Count))
            .arg(Arg::new("color").long("color").action(ArgAction::SetTrue))
            .arg(Arg::new("no-color").long("no-color").action(ArgAction::SetFalse))
            .arg(
                Arg::new("level")
                    .long("level")
                    .value_parser(clap::value_parser!(u32))
                    .default_value("2"),
            )
            .arg(
                Arg::new("mode")
                    .long("mode")
                    .value_parser(["fast", "slow"])
                    .default_value("fast"),
            )
            .arg(Arg::new("tag").long("tag").visible_alias("label").action(ArgAction::Append))
            .arg(Arg::new("secret-knob").long("knob").hide(true))
            .arg(Arg::new("files").num_args(1..).required(true))
            .subcommand(Command::new("run").arg(Arg::new("point").long("point").num_args(2)))
            .subcommand(Command::new("internal").hide(true))
    }

    #[test]
    fn test_clap_options_and_arguments() {
        let tree = Introspector::default().introspect(&sample());
        let tool = tree.root("tool").unwrap();

        assert_eq!(tool.docstring.as_deref(), Some("Sample tool"));
        let names: Vec<_> = tool.options.iter().map(|o| o.primary_name().to_string()).collect();
        assert_eq!(names, vec!["-v", "--color", "--level", "--mode", "--tag"]);

        let files = &tool.arguments[0];
        assert_eq!(files.name, "files");
        assert!(files.param.required);
        assert_eq!(files.param.nargs, -1);
        assert!(files.param.multi_value);
    }

    #[test]
    fn test_clap_actions_map_to_flags_counts_and_repeats() {
        let tree = Introspector::default().introspect(&sample());
        let tool = tree.root("tool").unwrap();

        let verbose = tool.find_option("--verbose").unwrap();
        assert!(verbose.counting);
        assert_eq!(verbose.emitted_spelling(), "-v");

        let color = tool.find_option("--color").unwrap();
        assert!(color.is_flag);
        assert_eq!(color.secondary_opts, vec!["--no-color"]);
        assert_eq!(color.param.default, MultiValueParamData::process(false));

        let tag = tool.find_option("--label").unwrap();
        assert!(tag.param.multiple);
        assert_eq!(tag.names, vec!["--tag", "--label"]);
    }

    #[test]
    fn test_clap_types_defaults_and_choices() {
        let tree = Introspector::default().introspect(&sample());
        let tool = tree.root("tool").unwrap();

        let level = tool.find_option("--level").unwrap();
        assert_eq!(level.param.types, vec![ParamType::Int]);
        assert_eq!(level.param.default.values, vec![vec![Value::from(2)]]);

        let mode = tool.find_option("--mode").unwrap();
        assert_eq!(mode.param.types, vec![ParamType::Choice]);
        assert_eq!(mode.param.choices, Some(vec!["fast".to_string(), "slow".to_string()]));

        assert!(tool.find_option("--knob").is_none());
    }

    #[test]
    fn test_clap_subcommands() {
        let tree = Introspector::default().introspect(&sample());
        let tool = tree.root("tool").unwrap();
        assert!(tool.subcommand("internal").is_none());

        let run = tool.subcommand("run").unwrap();
        let point = run.find_option("--point").unwrap();
        assert_eq!(point.param.nargs, 2);
        assert!(point.param.multi_value);
    }

    #[test]
    fn test_standalone_set_false_renders_its_own_spelling() {
        let command = Command::new("paint").arg(
            Arg::new("no-dither")
                .long("no-dither")
                .action(ArgAction::SetFalse),
        );
        let tree = Introspector::default().introspect(&command);
        let id = tree.find_path(&["paint"]).unwrap();
        let schema = tree.get(id).unwrap();

        let mut data = UserCommandData::for_command(tree.command(id));
        data.push_option(&schema.options[0], vec![Value::from(false)]);
        assert_eq!(data.to_cli_args(false), vec!["--no-dither"]);
    }

    #[test]
    fn test_clap_bool_value_is_parsed_back_by_clap() {
        let command = Command::new("app").arg(
            Arg::new("cache")
                .long("cache")
                .value_parser(clap::value_parser!(bool))
                .default_value("true"),
        );
        let tree = Introspector::default().introspect(&command);
        let id = tree.find_path(&["app"]).unwrap();
        let schema = tree.get(id).unwrap();

        let cache = &schema.options[0];
        assert_eq!(cache.param.types, vec![ParamType::Choice]);
        assert_eq!(
            cache.param.choices,
            Some(vec!["true".to_string(), "false".to_string()])
        );
        assert_eq!(cache.param.default.values, vec![vec![Value::from("true")]]);

        let mut data = UserCommandData::for_command(tree.command(id));
        data.push_option(cache, vec![Value::from("false")]);
        let args = data.to_cli_args(true);
        assert_eq!(args, vec!["app", "--cache", "false"]);

        let matches = command.try_get_matches_from(args).unwrap();
        assert_eq!(matches.get_one::<bool>("cache"), Some(&false));
    }

    #[derive(Parser)]
    #[command(name = "derived", about = "Derived command")]
    struct Derived {
        /// Output path
        #[arg(short, long, default_value = "out.txt")]
        output: String,
        /// Dry run
        #[arg(long)]
        dry_run: bool,
    }

    #[test]
    fn test_clap_derive_command() {
        use clap::CommandFactory;

        let tree = Introspector::default().introspect(&Derived::command());
        let root = tree.root("derived").unwrap();
        let output = root.find_option("-o").unwrap();
        assert_eq!(output.emitted_spelling(), "--output");
        assert_eq!(output.param.help.as_deref(), Some("Output path"));
        assert_eq!(output.param.default.values, vec![vec![Value::from("out.txt")]]);
        assert!(root.find_option("--dry-run").unwrap().is_flag);
        assert!(root.find_option("--help").is_none());
    }
}
