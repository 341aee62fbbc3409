//! Developer utility to print a histogram of a numeric column as center/count pairs.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use kagglekit::logging;
use kagglekit::stats::histogram::{Bins, HistogramOptions, hist};

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
    input: PathBuf,
    column: Option<String>,
    histogram: HistogramOptions,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let samples = match &options.column {
        Some(column) => read_csv_column(&options.input, column)?,
        None => read_lines(&options.input)?,
    };
    let series = hist(&samples, &options.histogram).map_err(|err| err.to_string())?;
    println!("center,count");
    for bin in &series {
        println!("{},{}", bin.center, bin.count);
    }
    Ok(())
}

fn read_csv_column(path: &Path, column: &str) -> Result<Vec<f64>, String> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| err.to_string())?;
    let position = reader
        .headers()
        .map_err(|err| err.to_string())?
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| format!("Column '{column}' not found in {}", path.display()))?;
    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| err.to_string())?;
        let Some(field) = record.get(position).map(str::trim) else {
            continue;
        };
        if field.is_empty() {
            continue;
        }
        samples.push(parse_sample(field)?);
    }
    Ok(samples)
}

fn read_lines(path: &Path) -> Result<Vec<f64>, String> {
    let file = File::open(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let mut samples = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|err| err.to_string())?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        samples.push(parse_sample(trimmed)?);
    }
    Ok(samples)
}

fn parse_sample(text: &str) -> Result<f64, String> {
    text.parse::<f64>()
        .map_err(|_| format!("Invalid sample value: {text}"))
}

fn parse_range(value: &str) -> Result<(f64, f64), String> {
    let (min, max) = value
        .split_once(',')
        .ok_or_else(|| format!("Invalid --range value: {value}"))?;
    let min = min
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid --range value: {value}"))?;
    let max = max
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid --range value: {value}"))?;
    Ok((min, max))
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut input: Option<PathBuf> = None;
    let mut column: Option<String> = None;
    let mut histogram = HistogramOptions::default();

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--input" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--input requires a value".to_string())?;
                input = Some(PathBuf::from(value));
            }
            "--column" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--column requires a value".to_string())?;
                column = Some(value.to_string());
            }
            "--bins" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--bins requires a value".to_string())?;
                histogram.bins = value
                    .parse::<Bins>()
                    .map_err(|err| format!("Invalid --bins value: {err}"))?;
            }
            "--range" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--range requires a value".to_string())?;
                histogram.range = Some(parse_range(value)?);
            }
            "--density" => histogram.density = true,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let input = input.ok_or_else(|| "--input is required".to_string())?;
    Ok(CliOptions {
        input,
        column,
        histogram,
    })
}

fn help_text() -> String {
    [
        "kagglekit-hist",
        "",
        "Usage:",
        "  kagglekit-hist --input <file> [options]",
        "",
        "Without --column the input holds one number per line.",
        "",
        "Options:",
        "  --column <name>   Read samples from this CSV column.",
        "  --bins <spec>     Bin count, comma-separated edges, or sqrt|sturges|rice|scott (default: 10).",
        "  --range <min,max> Ignore samples outside this range.",
        "  --density         Normalize counts to a probability density.",
    ]
    .join("\n")
}
