use std::path::PathBuf;

use cmdform_core::{
    FormValues, MultiValueParamData, ParamKey, ParamType, UserCommandData, Value, validate_tree,
};
use cmdform_introspect::{FormConfig, Introspector, OutputFormat, format_tree, introspect_file};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_backup_fixture_builds_expected_tree() {
    let tree = introspect_file(fixture("backup.yaml"), &Introspector::default())
        .expect("fixture should load");
    assert!(validate_tree(&tree).is_empty());

    let backup = tree.root("backup").unwrap();
    assert_eq!(backup.docstring.as_deref(), Some("Back up directories to an archive"));
    let subs: Vec<_> = backup.subcommands().map(|c| c.name.to_string()).collect();
    assert_eq!(subs, vec!["prune"]);

    let password = backup.find_option("--password").unwrap();
    assert!(password.param.secret);
    assert!(password.param.read_only);
    assert_eq!(password.param.help.as_deref(), Some("Archive password"));

    let exclude = backup.find_option("-x").unwrap();
    assert!(exclude.param.multiple);
    assert!(!exclude.param.multi_value);
    assert_eq!(exclude.param.default.values.len(), 2);

    let prune = backup.subcommand("prune").unwrap();
    let keep = prune.find_option("--keep").unwrap();
    assert_eq!(keep.param.types, vec![ParamType::Int]);
    assert_eq!(keep.param.default.values, vec![vec![Value::from(7)]]);
    assert_eq!(keep.param.help.as_deref(), Some("Archives to keep (default: 7)"));
    assert_eq!(prune.find_option("--mode").unwrap().param.types, vec![ParamType::Choice]);
}

#[test]
fn test_backup_fixture_defaults_reconstruct_to_arguments_only() {
    let tree = introspect_file(fixture("backup.yaml"), &Introspector::default()).unwrap();
    let prune = tree.find_path(&["backup", "prune"]).unwrap();

    let mut values = FormValues::new();
    values.insert(
        ParamKey::new("backup/sources"),
        MultiValueParamData::from_flat(vec![Value::from("/etc"), Value::from("/home")], -1),
    );

    let mut data = UserCommandData::from_form(&tree, prune, &values).unwrap();
    data.fill_defaults(tree.command(tree.find_path(&["backup"]).unwrap()));

    assert_eq!(data.to_cli_args(true), vec!["backup", "/etc", "/home", "prune"]);
}

#[test]
fn test_backup_fixture_user_changes_reconstruct() {
    let tree = introspect_file(fixture("backup.yaml"), &Introspector::default()).unwrap();
    let prune = tree.find_path(&["backup", "prune"]).unwrap();

    let mut values = FormValues::new();
    values.insert(ParamKey::new("backup/-v"), MultiValueParamData::process(2));
    values.insert(ParamKey::new("backup/--compress"), MultiValueParamData::process(false));
    values.insert(
        ParamKey::new("backup/-x"),
        MultiValueParamData::from_flat(vec![Value::from("*.bak")], 1),
    );
    values.insert(ParamKey::new("backup/sources"), MultiValueParamData::process("/srv"));
    values.insert(ParamKey::new("backup/prune/--keep"), MultiValueParamData::process(3));

    let root = tree.find_path(&["backup"]).unwrap();
    let mut data = UserCommandData::from_form(&tree, prune, &values).unwrap();
    data.fill_defaults(tree.command(root));

    assert_eq!(
        data.to_cli_args(false),
        vec!["-vv", "--no-compress", "--exclude", "*.bak", "/srv", "prune", "--keep", "3"]
    );
    assert_eq!(
        data.to_cli_string(true),
        "backup -vv --no-compress --exclude '*.bak' /srv prune --keep 3"
    );
}

#[test]
fn test_json_fixture_tuple_defaults() {
    let tree = introspect_file(fixture("tool.json"), &Introspector::default()).unwrap();
    let tool = tree.root("tool").unwrap();

    let size = tool.find_option("--size").unwrap();
    assert_eq!(size.param.nargs, 2);
    assert_eq!(size.param.default.values, vec![vec![Value::from(80), Value::from(24)]]);
    assert_eq!(tool.arguments[0].param.types, vec![ParamType::String]);
}

#[test]
fn test_config_ignore_list_applies() {
    let config = FormConfig {
        ignore_commands: vec!["prune".to_string()],
        ..FormConfig::default()
    };
    let tree =
        introspect_file(fixture("backup.yaml"), &Introspector::from_config(&config)).unwrap();
    let subs: Vec<_> = tree
        .root("backup")
        .unwrap()
        .subcommands()
        .map(|c| c.name.to_string())
        .collect();
    assert_eq!(subs, vec!["tui"]);
}

#[test]
fn test_fixture_formats_as_markdown() {
    let tree = introspect_file(fixture("backup.yaml"), &Introspector::default()).unwrap();
    let md = format_tree(&tree, OutputFormat::Markdown).unwrap();
    assert!(md.contains("# backup"));
    assert!(md.contains("## backup prune"));
    assert!(md.contains("--compress / --no-compress"));
}
