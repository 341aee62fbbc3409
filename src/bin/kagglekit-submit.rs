//! Developer utility to run a saved model over a dataset and write a submission file.

use std::path::PathBuf;

use kagglekit::config::Settings;
use kagglekit::dataset::load_dataset;
use kagglekit::logging;
use kagglekit::ml::linear::LinearModel;
use kagglekit::ml::submission::SubmissionWriter;

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    model_path: PathBuf,
    data_path: Option<PathBuf>,
    id_column: Option<String>,
    out: Option<PathBuf>,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let settings = Settings::load_or_default().map_err(|err| err.to_string())?;
    let writer = SubmissionWriter::new(settings.submission.into());
    let model = LinearModel::load_json(&options.model_path).map_err(|err| err.to_string())?;

    let data = match &options.data_path {
        Some(path) => {
            let id_column = options
                .id_column
                .as_deref()
                .unwrap_or(writer.defaults().id_column.as_str());
            Some(load_dataset(path, id_column).map_err(|err| err.to_string())?)
        }
        None => None,
    };

    let written = writer
        .write(&model, data.as_ref(), options.out.as_deref())
        .map_err(|err| err.to_string())?;
    println!("{}", written.display());
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut model_path: Option<PathBuf> = None;
    let mut data_path: Option<PathBuf> = None;
    let mut id_column: Option<String> = None;
    let mut out: Option<PathBuf> = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--model" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model requires a value".to_string())?;
                model_path = Some(PathBuf::from(value));
            }
            "--data" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--data requires a value".to_string())?;
                data_path = Some(PathBuf::from(value));
            }
            "--id-column" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--id-column requires a value".to_string())?;
                id_column = Some(value.to_string());
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                out = Some(PathBuf::from(value));
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let model_path = model_path.ok_or_else(|| "--model is required".to_string())?;
    Ok(CliOptions {
        model_path,
        data_path,
        id_column,
        out,
    })
}

fn help_text() -> String {
    [
        "kagglekit-submit",
        "",
        "Usage:",
        "  kagglekit-submit --model <model.json> [options]",
        "",
        "Options:",
        "  --data <csv>         Dataset to predict on (default: <data_dir>/<test_file> from settings).",
        "  --id-column <name>   Identifier column of --data (default: settings id_column).",
        "  --out <csv>          Output file (default: timestamped file in data_dir).",
    ]
    .join("\n")
}
