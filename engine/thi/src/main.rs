use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thi_label::{health_score, synthesize, triggered_penalties, PenaltyRule, SynthConfig};
use thi_model::{train_to_path, HoldoutMetrics, TrainedModel, Weighting};
use thi_schema::FeatureVector;
use thi_service::{HealthIndexService, ServiceError};

mod config;

use config::ThiConfig;

const EXIT_FAILURE: i32 = 1;
const EXIT_INVALID_INPUT: i32 = 2;
const EXIT_MODEL_UNAVAILABLE: i32 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "thi",
    version,
    about = "Train Health Index: train a nearest-neighbor model and score sensor readings",
    long_about = "thi trains a k-nearest-neighbor approximation of the rail vehicle\n\
        health rule on synthetic sensor data and scores live readings with it.\n\n\
        EXAMPLES:\n\
        \n  thi train --seed 7                       Train and write thi_model.json\n\
        \n  thi score readings.json                  Score one JSON object of readings\n\
        \n  echo '{...}' | thi score --model m.json  Score readings from stdin\n\
        \n  thi synth --samples 10 --seed 1          Print labeled samples as NDJSON\n\
        \n  thi rule readings.json                   Explain the ground-truth rule score"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (defaults to ./thi.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Synthesize a corpus, fit the model and persist the artifact
    Train(TrainArgs),
    /// Score one set of readings with a trained model
    Score(ScoreArgs),
    /// Print a labeled synthetic corpus as NDJSON
    Synth(SynthArgs),
    /// Report held-out metrics, optionally re-checking against fresh data
    Evaluate(EvaluateArgs),
    /// Score readings with the ground-truth penalty rule
    Rule(InputArgs),
}

#[derive(Debug, Args, Clone)]
struct TrainArgs {
    /// Number of samples to synthesize
    #[arg(long, value_name = "N")]
    samples: Option<usize>,

    /// Seed for reproducible synthesis
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Neighbor count
    #[arg(short = 'k', long, value_name = "K")]
    neighbors: Option<usize>,

    /// Weight neighbors by inverse distance instead of uniformly
    #[arg(long)]
    distance_weighted: bool,

    /// Output artifact path
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
struct ScoreArgs {
    /// Model artifact (defaults to the configured model path)
    #[arg(short, long, value_name = "FILE")]
    model: Option<PathBuf>,

    #[command(flatten)]
    input: InputArgs,
}

#[derive(Debug, Args, Clone)]
struct InputArgs {
    /// JSON object of readings (reads stdin if omitted or '-')
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
struct SynthArgs {
    #[arg(long, value_name = "N")]
    samples: Option<usize>,

    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

#[derive(Debug, Args, Clone)]
struct EvaluateArgs {
    #[arg(short, long, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Also score this many freshly synthesized samples against the rule
    #[arg(long, value_name = "N")]
    samples: Option<usize>,

    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct RuleReport {
    thi_score: f64,
    penalties: Vec<&'static PenaltyRule>,
}

#[derive(Debug, Serialize)]
struct EvaluationReport {
    rows: usize,
    neighbors: usize,
    weighting: Weighting,
    holdout: HoldoutMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    fresh: Option<HoldoutMetrics>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn read_input(input: &Option<PathBuf>) -> Result<String, String> {
    match input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {e}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read from stdin: {e}"))?;
            Ok(buf)
        }
    }
}

fn parse_readings(text: &str) -> Result<JsonValue, String> {
    serde_json::from_str(text).map_err(|e| format!("input is not valid JSON: {e}"))
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match serde_json::to_writer(&mut out, value).and_then(|_| {
        out.write_all(b"\n").map_err(serde_json::Error::io)
    }) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: failed to write output: {e}");
            EXIT_FAILURE
        }
    }
}

fn service_exit_code(err: &ServiceError) -> i32 {
    match err {
        ServiceError::InvalidInput(_) => EXIT_INVALID_INPUT,
        ServiceError::ModelUnavailable(_) => EXIT_MODEL_UNAVAILABLE,
    }
}

fn run_train(args: &TrainArgs, mut cfg: ThiConfig) -> i32 {
    if let Some(n) = args.samples {
        cfg.synth.samples = n;
    }
    if args.seed.is_some() {
        cfg.synth.seed = args.seed;
    }
    if let Some(k) = args.neighbors {
        cfg.trainer.neighbors = k;
    }
    if args.distance_weighted {
        cfg.trainer.weighting = Weighting::Distance;
    }
    let out = args.out.clone().unwrap_or(cfg.model_path);

    match train_to_path(&cfg.synth, &cfg.trainer, &out) {
        Ok(trained) => {
            let h = trained.metadata.holdout;
            println!(
                "wrote {} ({} rows, k = {}); held-out MAE {:.3}, RMSE {:.3}, R² {:.3}",
                out.display(),
                trained.model.len(),
                trained.model.k(),
                h.mae,
                h.rmse,
                h.r2
            );
            0
        }
        Err(e) => {
            eprintln!("error: training failed: {e}");
            EXIT_FAILURE
        }
    }
}

fn run_score(args: &ScoreArgs, cfg: &ThiConfig) -> i32 {
    let model_path = args.model.as_deref().unwrap_or(&cfg.model_path);
    // Load before reading input so a broken deployment is reported as such.
    let service = match HealthIndexService::load(model_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return service_exit_code(&e);
        }
    };
    let readings = match read_input(&args.input.input).and_then(|t| parse_readings(&t)) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: invalid input: {e}");
            return EXIT_INVALID_INPUT;
        }
    };
    match service.score_json(&readings) {
        Ok(assessment) => print_json(&assessment),
        Err(e) => {
            eprintln!("error: {e}");
            service_exit_code(&e)
        }
    }
}

fn run_synth(args: &SynthArgs, cfg: &ThiConfig) -> i32 {
    let synth = SynthConfig {
        samples: args.samples.unwrap_or(cfg.synth.samples),
        seed: args.seed.or(cfg.synth.seed),
    };
    let dataset = match synthesize(&synth) {
        Ok(ds) => ds,
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_FAILURE;
        }
    };
    match dataset.write_ndjson(io::stdout().lock()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: failed to write output: {e}");
            EXIT_FAILURE
        }
    }
}

fn run_evaluate(args: &EvaluateArgs, cfg: &ThiConfig) -> i32 {
    let model_path: &Path = args.model.as_deref().unwrap_or(&cfg.model_path);
    let trained = match TrainedModel::load(model_path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: model unavailable: {e}");
            return EXIT_MODEL_UNAVAILABLE;
        }
    };

    let fresh = match args.samples {
        Some(samples) => {
            let dataset = match synthesize(&SynthConfig {
                samples,
                seed: args.seed,
            }) {
                Ok(ds) => ds,
                Err(e) => {
                    eprintln!("error: {e}");
                    return EXIT_FAILURE;
                }
            };
            let predictions = trained.model.predict_batch(&dataset.features());
            HoldoutMetrics::compute(&predictions, &dataset.targets())
        }
        None => None,
    };

    print_json(&EvaluationReport {
        rows: trained.model.len(),
        neighbors: trained.model.k(),
        weighting: trained.model.weighting(),
        holdout: trained.metadata.holdout,
        fresh,
    })
}

fn run_rule(args: &InputArgs) -> i32 {
    let vector = match read_input(&args.input)
        .and_then(|t| parse_readings(&t))
        .and_then(|v| FeatureVector::from_json(&v).map_err(|e| e.to_string()))
    {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: invalid input: {e}");
            return EXIT_INVALID_INPUT;
        }
    };
    print_json(&RuleReport {
        thi_score: health_score(&vector),
        penalties: triggered_penalties(&vector),
    })
}

fn run_cli(cli: Cli) -> i32 {
    init_logging(cli.verbose);
    let cfg = match ThiConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return EXIT_FAILURE;
        }
    };
    match cli.command {
        Command::Train(args) => run_train(&args, cfg),
        Command::Score(args) => run_score(&args, &cfg),
        Command::Synth(args) => run_synth(&args, &cfg),
        Command::Evaluate(args) => run_evaluate(&args, &cfg),
        Command::Rule(args) => run_rule(&args),
    }
}

fn main() {
    std::process::exit(run_cli(Cli::parse()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_verbose_flag() {
        let cli = Cli::try_parse_from(["thi", "-vvv", "rule"]).unwrap();
        assert_eq!(cli.verbose, 3, "verbose count should be 3 for -vvv");
    }

    #[test]
    fn cli_parses_train_overrides() {
        let cli = Cli::try_parse_from([
            "thi",
            "train",
            "--samples",
            "800",
            "--seed",
            "7",
            "-k",
            "3",
            "--distance-weighted",
            "--out",
            "m.json",
        ])
        .unwrap();
        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.samples, Some(800));
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.neighbors, Some(3));
                assert!(args.distance_weighted);
                assert_eq!(args.out, Some(PathBuf::from("m.json")));
            }
            other => panic!("expected Train command, got {other:?}"),
        }
    }

    #[test]
    fn cli_parses_score_with_model_and_file() {
        let cli = Cli::try_parse_from(["thi", "score", "--model", "m.json", "in.json"]).unwrap();
        match cli.command {
            Command::Score(args) => {
                assert_eq!(args.model, Some(PathBuf::from("m.json")));
                assert_eq!(args.input.input, Some(PathBuf::from("in.json")));
            }
            other => panic!("expected Score command, got {other:?}"),
        }
    }

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["thi"]).is_err());
    }

    #[test]
    fn exit_codes_distinguish_error_kinds() {
        let invalid = ServiceError::InvalidInput(thi_schema::SchemaError::MissingField("speed"));
        let unavailable =
            ServiceError::ModelUnavailable(thi_service::UnavailableReason::NotInstalled);
        assert_eq!(service_exit_code(&invalid), EXIT_INVALID_INPUT);
        assert_eq!(service_exit_code(&unavailable), EXIT_MODEL_UNAVAILABLE);
    }

    #[test]
    fn train_then_evaluate_in_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("thi_model.json");
        let rc = run_train(
            &TrainArgs {
                samples: Some(200),
                seed: Some(3),
                neighbors: None,
                distance_weighted: false,
                out: Some(out.clone()),
            },
            ThiConfig::default(),
        );
        assert_eq!(rc, 0);
        assert!(out.exists());

        let rc = run_evaluate(
            &EvaluateArgs {
                model: Some(out),
                samples: Some(50),
                seed: Some(4),
            },
            &ThiConfig::default(),
        );
        assert_eq!(rc, 0);
    }

    #[test]
    fn score_without_model_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let rc = run_score(
            &ScoreArgs {
                model: Some(dir.path().join("missing.json")),
                input: InputArgs { input: None },
            },
            &ThiConfig::default(),
        );
        assert_eq!(rc, EXIT_MODEL_UNAVAILABLE);
    }
}
