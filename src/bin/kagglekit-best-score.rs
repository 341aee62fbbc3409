//! Developer utility to print the best cross-validation score of a grid search.

use std::path::PathBuf;

use kagglekit::logging;
use kagglekit::ml::grid::{CvResults, DEFAULT_METRIC, best_score_for_metric};

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
    results_path: PathBuf,
    metric: String,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let results = CvResults::load(&options.results_path).map_err(|err| err.to_string())?;
    let best = best_score_for_metric(&results, &options.metric).map_err(|err| err.to_string())?;
    if best.is_empty() {
        println!("no configuration ranked first");
    }
    for entry in &best {
        match &entry.params {
            Some(params) => println!("row {:>4}  score={:.6}  params={params}", entry.row, entry.score),
            None => println!("row {:>4}  score={:.6}", entry.row, entry.score),
        }
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut results_path: Option<PathBuf> = None;
    let mut metric = DEFAULT_METRIC.to_string();

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--results" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--results requires a value".to_string())?;
                results_path = Some(PathBuf::from(value));
            }
            "--metric" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--metric requires a value".to_string())?;
                metric = value.to_string();
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let results_path = results_path.ok_or_else(|| "--results is required".to_string())?;
    Ok(CliOptions {
        results_path,
        metric,
    })
}

fn help_text() -> String {
    [
        "kagglekit-best-score",
        "",
        "Prints sqrt(-mean_test_score) for every configuration ranked first.",
        "",
        "Usage:",
        "  kagglekit-best-score --results <cv_results.json|cv_results.csv> [options]",
        "",
        "Options:",
        "  --metric <name>   Scorer name for multi-metric searches (default: score).",
    ]
    .join("\n")
}
