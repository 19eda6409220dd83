use capcode::matcher::{Correction, Gating, SubstitutionTable};
use capcode::preprocess::PRESET_NAMES;
use capcode::recognizer::{self, Recognizer};
use capcode::tools::{
    bench_limit_from_env, dataset_iter, dataset_root_from_env, label_path, load_image,
    parse_expected_code,
};
use capcode::{
    BatchSummary, CancelFlag, CodeRule, ExtractionResult, PipelineConfig, PreprocessConfig,
    RecognizerError,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::GenericImageView;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "captool", version, about = "Bottle-cap code extraction tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the code from a single image
    Extract {
        #[arg(long)]
        image: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Extract codes from every image under a directory
    Batch {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Write the preprocessed image for inspection
    Preprocess {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        preset: Option<String>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the built-in preprocessing presets as JSON
    Presets,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Engine {
    /// Local Tesseract (feature `tesseract`)
    Tesseract,
    /// Remote OpenAI-compatible vision model (feature `remote`)
    Vision,
}

#[derive(Args)]
struct PipelineArgs {
    /// JSON pipeline config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Preprocessing preset
    #[arg(long)]
    preset: Option<String>,
    /// Required code length
    #[arg(long)]
    length: Option<usize>,
    /// Allowed digit counts, comma separated
    #[arg(long, value_delimiter = ',')]
    digits: Option<Vec<usize>>,
    /// Add letter-to-digit corrected variants of invalid candidates
    #[arg(long)]
    correct: bool,
    /// Read all four orientations even after an exact match
    #[arg(long)]
    exhaustive: bool,
    #[arg(long, value_enum, default_value_t = Engine::Tesseract)]
    engine: Engine,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Extract { image, pipeline } => extract_cmd(&image, &pipeline),
        Command::Batch { root, limit, pipeline } => batch_cmd(root, limit, &pipeline),
        Command::Preprocess {
            image,
            out,
            preset,
            config,
        } => preprocess_cmd(&image, &out, preset.as_deref(), config.as_deref()),
        Command::Presets => presets_cmd(),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::from(2)
        }
    }
}

fn build_config(args: &PipelineArgs) -> Result<PipelineConfig, String> {
    let config = match &args.config {
        Some(path) => {
            PipelineConfig::from_json_file(path).map_err(|e| format!("{}: {e}", path.display()))?
        }
        None => PipelineConfig::default(),
    };
    apply_overrides(config, args)
}

/// Layer command-line flags over a loaded config. Unset flags keep the
/// config's values.
fn apply_overrides(
    mut config: PipelineConfig,
    args: &PipelineArgs,
) -> Result<PipelineConfig, String> {
    if let Some(name) = &args.preset {
        config.preprocess = PreprocessConfig::preset(name).map_err(|e| e.to_string())?;
    }
    if let Some(length) = args.length {
        let mut rule = CodeRule::new(length)
            .map_err(|e| e.to_string())?
            .with_tolerance(config.rule.tolerance());
        if let Some(counts) = config.rule.digit_counts() {
            rule = rule.with_digit_counts(counts.iter().copied());
        }
        config.rule = rule;
    }
    if let Some(digits) = &args.digits {
        config.rule = config.rule.clone().with_digit_counts(digits.iter().copied());
    }
    config.rule.validate().map_err(|e| e.to_string())?;
    if args.correct {
        config.correction = Some(Correction {
            table: SubstitutionTable::letters_to_digits(),
            gating: Gating::WhenInvalid,
        });
    }
    if args.exhaustive {
        config.sweep.short_circuit = false;
    }
    Ok(config)
}

fn build_recognizer(engine: Engine) -> Result<&'static dyn Recognizer, RecognizerError> {
    recognizer::shared(|| match engine {
        #[cfg(feature = "tesseract")]
        Engine::Tesseract => {
            let config = recognizer::TesseractConfig::default();
            let tesseract = recognizer::TesseractRecognizer::new(config)?;
            Ok(Box::new(tesseract) as Box<dyn Recognizer>)
        }
        #[cfg(feature = "remote")]
        Engine::Vision => {
            let model = recognizer::OpenAiVisionModel::from_env()?;
            Ok(Box::new(recognizer::VisionRecognizer::new(model)) as Box<dyn Recognizer>)
        }
        #[allow(unreachable_patterns)]
        other => Err(RecognizerError::Init(format!(
            "engine {other:?} is not compiled in; rebuild with --features {}",
            match other {
                Engine::Tesseract => "tesseract",
                Engine::Vision => "remote",
            }
        ))),
    })
}

fn print_result(label: &str, result: &ExtractionResult, config: &PipelineConfig) {
    match result.code() {
        Some(code) => println!(
            "{label}: {code} [{}] ({})",
            result.orientation().map(|o| o.to_string()).unwrap_or_default(),
            result.caption(&config.rule)
        ),
        None => println!("{label}: - ({})", result.caption(&config.rule)),
    }
}

fn extract_cmd(image: &Path, args: &PipelineArgs) -> Result<(), String> {
    let config = build_config(args)?;
    let recognizer = build_recognizer(args.engine).map_err(|e| e.to_string())?;
    let img = load_image(image)
        .map_err(|e| format!("failed to load image {}: {e}", image.display()))?;

    let start = Instant::now();
    let result =
        capcode::pipeline::run(&img, &config, recognizer).map_err(|e| e.to_string())?;
    print_result(&image.display().to_string(), &result, &config);
    println!("  time: {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

fn batch_cmd(
    root: Option<PathBuf>,
    limit: Option<usize>,
    args: &PipelineArgs,
) -> Result<(), String> {
    let config = build_config(args)?;
    let recognizer = build_recognizer(args.engine).map_err(|e| e.to_string())?;
    let root = root.unwrap_or_else(dataset_root_from_env);
    let limit = limit.or_else(bench_limit_from_env);

    let mut paths = Vec::new();
    let mut images = Vec::new();
    for path in dataset_iter(&root, limit) {
        match load_image(&path) {
            Ok(img) => {
                paths.push(path);
                images.push(img);
            }
            Err(err) => eprintln!("skipping {}: {err}", path.display()),
        }
    }
    if images.is_empty() {
        return Err(format!("no readable images under {}", root.display()));
    }

    let start = Instant::now();
    let results = capcode::extract_batch(&images, &config, recognizer, &CancelFlag::new());
    let elapsed = start.elapsed();

    let mut labelled = 0usize;
    let mut correct = 0usize;
    for (path, result) in paths.iter().zip(&results) {
        let name = path.strip_prefix(&root).unwrap_or(path).display().to_string();
        match result {
            Ok(result) => {
                print_result(&name, result, &config);
                if let Some(expected) = parse_expected_code(label_path(path)) {
                    labelled += 1;
                    if result.code() == Some(expected.as_str()) {
                        correct += 1;
                    } else {
                        println!("  expected {expected}");
                    }
                }
            }
            Err(err) => println!("{name}: error: {err}"),
        }
    }

    println!("{}", BatchSummary::from_results(&results));
    if labelled > 0 {
        println!(
            "accuracy: {correct}/{labelled} ({:.1}%)",
            correct as f64 / labelled as f64 * 100.0
        );
    }
    println!(
        "time: {:.1}ms total, {:.1}ms/image",
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_secs_f64() * 1000.0 / images.len() as f64
    );
    Ok(())
}

fn preprocess_cmd(
    image: &Path,
    out: &Path,
    preset: Option<&str>,
    config: Option<&Path>,
) -> Result<(), String> {
    let cfg = match (preset, config) {
        (Some(name), _) => PreprocessConfig::preset(name).map_err(|e| e.to_string())?,
        (None, Some(path)) => {
            PipelineConfig::from_json_file(path)
                .map_err(|e| format!("{}: {e}", path.display()))?
                .preprocess
        }
        (None, None) => PreprocessConfig::default(),
    };
    let img = load_image(image)
        .map_err(|e| format!("failed to load image {}: {e}", image.display()))?;
    let processed = capcode::preprocess(&img, &cfg).map_err(|e| e.to_string())?;
    processed
        .save(out)
        .map_err(|e| format!("failed to write {}: {e}", out.display()))?;
    let (width, height) = processed.dimensions();
    println!("wrote {} ({width}x{height})", out.display());
    Ok(())
}

fn presets_cmd() -> Result<(), String> {
    for name in PRESET_NAMES {
        let cfg = PreprocessConfig::preset(name).map_err(|e| e.to_string())?;
        let json = serde_json::to_string_pretty(&cfg).map_err(|e| e.to_string())?;
        println!("{name}:\n{json}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PipelineArgs {
        PipelineArgs {
            config: None,
            preset: None,
            length: None,
            digits: None,
            correct: false,
            exhaustive: false,
            engine: Engine::Tesseract,
        }
    }

    fn loaded() -> PipelineConfig {
        let json = r#"{"rule": {"length": 9, "digit_counts": [0, 2], "tolerance": 3}}"#;
        PipelineConfig::from_json(json).unwrap()
    }

    #[test]
    fn test_length_flag_keeps_config_digit_counts() {
        let longer = PipelineArgs {
            length: Some(10),
            ..args()
        };
        let config = apply_overrides(loaded(), &longer).unwrap();
        assert_eq!(config.rule.length(), 10);
        assert_eq!(config.rule.digit_counts(), Some(&[0, 2][..]));
        assert_eq!(config.rule.tolerance(), 3);
    }

    #[test]
    fn test_length_flag_revalidates_digit_counts() {
        let shorter = PipelineArgs { length: Some(1), ..args() };
        assert!(apply_overrides(loaded(), &shorter).is_err());

        let replaced = PipelineArgs {
            length: Some(1),
            digits: Some(vec![1]),
            ..args()
        };
        let config = apply_overrides(loaded(), &replaced).unwrap();
        assert_eq!(config.rule.digit_counts(), Some(&[1][..]));
    }

    #[test]
    fn test_unset_flags_leave_config_alone() {
        assert_eq!(apply_overrides(loaded(), &args()).unwrap(), loaded());
    }
}
