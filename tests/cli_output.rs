use std::path::Path;
use std::process::{Command, Output};

use kagglekit::app_dirs::CONFIG_HOME_ENV;
use kagglekit::ml::linear::LinearModel;

fn run_tool(exe: &str, config_home: &Path, args: &[&str]) -> Output {
    Command::new(exe)
        .args(args)
        .env(CONFIG_HOME_ENV, config_home)
        .env("RUST_LOG", "info")
        .output()
        .expect("run tool")
}

#[test]
fn submit_prints_only_the_written_path_on_stdout() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let model_path = temp.path().join("model.json");
    let model = LinearModel::new(vec!["x".into()], vec![2.0], 0.0);
    std::fs::write(&model_path, serde_json::to_vec(&model).unwrap()).unwrap();
    let data_path = temp.path().join("d.csv");
    std::fs::write(&data_path, "id,x\na,1\nb,2\n").unwrap();
    let out = temp.path().join("o.csv");

    let output = run_tool(
        env!("CARGO_BIN_EXE_kagglekit-submit"),
        temp.path(),
        &[
            "--model",
            model_path.to_str().unwrap(),
            "--data",
            data_path.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
        ],
    );

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, format!("{}\n", out.display()));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Wrote submission with 2 rows"), "{stderr}");
    assert!(!stderr.contains('\u{1b}'), "{stderr}");
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "id,target\na,2.0\nb,4.0\n");
}

#[test]
fn submit_reads_settings_from_config_home() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let app_dir = temp.path().join(kagglekit::app_dirs::APP_DIR_NAME);
    std::fs::create_dir_all(&app_dir).unwrap();
    let data_dir = temp.path().join("inputs");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::write(data_dir.join("holdout.csv"), "row_id,x\nr1,0.5\n").unwrap();
    std::fs::write(
        app_dir.join(kagglekit::config::CONFIG_FILE_NAME),
        format!(
            "[submission]\ndata_dir = {:?}\ntest_file = \"holdout.csv\"\nid_column = \"row_id\"\n",
            data_dir.display().to_string()
        ),
    )
    .unwrap();
    let model_path = temp.path().join("model.json");
    let model = LinearModel::new(vec!["x".into()], vec![4.0], 1.0);
    std::fs::write(&model_path, serde_json::to_vec(&model).unwrap()).unwrap();

    let output = run_tool(
        env!("CARGO_BIN_EXE_kagglekit-submit"),
        temp.path(),
        &["--model", model_path.to_str().unwrap()],
    );

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    let written = Path::new(stdout.trim_end());
    assert_eq!(written.parent(), Some(data_dir.as_path()));
    assert_eq!(std::fs::read_to_string(written).unwrap(), "row_id,target\nr1,3.0\n");
}

#[test]
fn hist_stdout_is_plain_csv() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let input = temp.path().join("samples.txt");
    std::fs::write(&input, "1\n2\n2\n3\n3\n3\n").unwrap();

    let output = run_tool(
        env!("CARGO_BIN_EXE_kagglekit-hist"),
        temp.path(),
        &["--input", input.to_str().unwrap(), "--bins", "3"],
    );

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "{stdout}");
    assert_eq!(lines[0], "center,count");
    assert!(lines[1..].iter().all(|line| line.split(',').count() == 2));
    assert!(!stdout.contains('\u{1b}'));
}
