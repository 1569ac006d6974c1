use assert_cmd::Command;
use std::io::Write;
use tempfile::NamedTempFile;

fn pipeline_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const PIPELINE: &str = r#"
[database]
path = ":memory:"

[[steps]]
kind = "no_auto_commit"

[[steps]]
kind = "statement"
sql = "CREATE TABLE TEST (ID INTEGER PRIMARY KEY, NAME VARCHAR(16))"

[[steps]]
kind = "update"

[[steps]]
kind = "statement"
sql = "INSERT INTO TEST (ID, NAME) VALUES (?, ?)"

[[steps]]
kind = "update"
params = [1, "A"]

[[steps]]
kind = "update"
params = [2, "B"]

[[steps]]
kind = "commit"

[[steps]]
kind = "statement"
sql = "SELECT * FROM TEST"

[[steps]]
kind = "query"
"#;

#[test]
fn test_prints_rows_as_json_lines() {
    let file = pipeline_file(PIPELINE);
    let output = Command::cargo_bin("sqlchain")
        .unwrap()
        .arg(file.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec![r#"[1,"A"]"#, r#"[2,"B"]"#]);
}

#[test]
fn test_failing_pipeline_exits_with_error() {
    let file = pipeline_file(&PIPELINE.replace("CREATE TABLE", "CREAT TABLE"));
    let output = Command::cargo_bin("sqlchain")
        .unwrap()
        .arg(file.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Pipeline failed: failed to prepare statement"));
}

#[test]
fn test_invalid_config_exits_with_error() {
    let file = pipeline_file("[database]\npath = \":memory:\"\n[[steps]]\nkind = \"explode\"\n");
    Command::cargo_bin("sqlchain")
        .unwrap()
        .arg(file.path())
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_missing_config_file_exits_with_error() {
    Command::cargo_bin("sqlchain")
        .unwrap()
        .arg("/nonexistent/pipeline.toml")
        .assert()
        .failure();
}
