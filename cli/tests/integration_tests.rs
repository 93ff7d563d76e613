use std::fs;
use std::path::PathBuf;
use std::process::Output;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn cmdform(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_cmdform"))
        .args(args)
        .output()
        .expect("failed to run cmdform")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn path_str(path: &PathBuf) -> &str {
    path.to_str().expect("fixture path should be UTF-8")
}

// ---------------------------------------------------------------------------
// schema
// ---------------------------------------------------------------------------

#[test]
fn schema_table_lists_nested_commands() {
    let decl = fixture("backup.yaml");
    let out = cmdform(&["schema", "--decl", path_str(&decl), "--format", "table"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let text = stdout(&out);
    assert!(text.contains("Command: backup\n"));
    assert!(text.contains("Command: backup prune"));
    assert!(!text.contains("debug-dump"));
    assert!(!text.contains("Command: backup tui"));
}

#[test]
fn schema_without_declaration_describes_itself() {
    let out = cmdform(&["schema"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(parsed[0]["name"], "cmdform");
    let subcommands: Vec<_> = parsed[0]["subcommands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(subcommands, vec!["render", "schema", "validate"]);
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_clean_declarations() {
    let backup = fixture("backup.yaml");
    let tool = fixture("tool.json");
    let out = cmdform(&["validate", "--decl", path_str(&backup), "--decl", path_str(&tool)]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Validated 2 declaration file(s) for 3 command(s)."));
}

#[test]
fn validate_reports_findings_and_fails() {
    let decl = fixture("broken.yaml");
    let out = cmdform(&["validate", "--decl", path_str(&decl)]);
    assert!(!out.status.success());

    let text = stdout(&out);
    assert!(text.contains("duplicate option in command: -o"));
    assert!(text.contains("default 'medium' for broken/--mode is not one of the choices"));
    assert!(stderr(&out).contains("error: 2 validation finding(s)"));
}

#[test]
fn validate_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("decl.toml");
    fs::write(&path, "name = 'x'").unwrap();

    let out = cmdform(&["validate", "--decl", path.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unsupported declaration format"));
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn render_suppresses_defaults() {
    let decl = fixture("backup.yaml");
    let out = cmdform(&[
        "render",
        "--decl",
        path_str(&decl),
        "--command",
        "prune",
        "--set",
        "sources=/etc",
        "--include-root",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "backup /etc prune");
}

#[test]
fn render_applies_user_changes() {
    let decl = fixture("backup.yaml");
    let out = cmdform(&[
        "render",
        "--decl",
        path_str(&decl),
        "--command",
        "prune",
        "--set",
        "-v=2",
        "--set",
        "--compress=false",
        "--set",
        "--exclude=*.bak",
        "--set",
        "backup/sources=/srv",
        "--set",
        "--keep=3",
        "--include-root",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        stdout(&out).trim(),
        "backup -vv --no-compress --exclude '*.bak' /srv prune --keep 3"
    );
}

#[test]
fn render_args_prints_one_argument_per_line() {
    let decl = fixture("backup.yaml");
    let out = cmdform(&[
        "render",
        "--decl",
        path_str(&decl),
        "--set",
        "sources=my files",
        "--output",
        "args",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "my files\n");
}

#[test]
fn render_json_reports_missing_values() {
    let decl = fixture("tool.json");
    let out = cmdform(&[
        "render",
        "--decl",
        path_str(&decl),
        "--set",
        "--size=100",
        "--set",
        "--size=",
        "--include-root",
        "--output",
        "json",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let report: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(report["args"], serde_json::json!(["tool", "--size", "100", ""]));
    assert_eq!(report["display"], "tool --size 100 ???");
    assert_eq!(report["complete"], false);
    assert_eq!(report["missing"], 1);
}

#[test]
fn render_joins_several_declarations() {
    let backup = fixture("backup.yaml");
    let tool = fixture("tool.json");
    let out = cmdform(&[
        "render",
        "--decl",
        path_str(&backup),
        "--decl",
        path_str(&tool),
        "--command",
        "tool",
        "--set",
        "--size=1",
        "--set",
        "--size=2",
        "--include-root",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "cmdform tool --size 1 2");
}

#[test]
fn render_uses_config_file() {
    let decl = fixture("tool.json");
    let config = fixture("cmdform.yml");
    let out = cmdform(&[
        "--config",
        path_str(&config),
        "render",
        "--decl",
        path_str(&decl),
        "--set",
        "--size=",
        "--set",
        "--size=5",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "--size <missing> 5");

    let backup = fixture("backup.yaml");
    let ignored = cmdform(&[
        "render",
        "--config",
        path_str(&config),
        "--decl",
        path_str(&backup),
        "--command",
        "prune",
    ]);
    assert!(!ignored.status.success());
    assert!(stderr(&ignored).contains("unknown command: backup prune"));
}

#[test]
fn render_rejects_unknown_parameter() {
    let decl = fixture("backup.yaml");
    let out = cmdform(&["render", "--decl", path_str(&decl), "--set", "--nope=1"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("error: unknown parameter: --nope"));
}

#[test]
fn render_reads_declaration_written_at_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("greet.yaml");
    fs::write(
        &path,
        concat!(
            "name: greet\n",
            "params:\n",
            "  - name: loud\n",
            "    opts: [\"--loud\"]\n",
            "    is_flag: true\n",
            "  - name: who\n",
            "    default: world\n",
        ),
    )
    .unwrap();

    let out = cmdform(&[
        "render",
        "--decl",
        path.to_str().unwrap(),
        "--set",
        "--loud=true",
        "--include-root",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "greet --loud world");
}
