//! MindScope CLI - command-line interface for the fusion engine
//!
//! Commands:
//! - assess: fuse pre-classified modality inputs into assessment payloads
//! - behavior: analyze a behavioral profile on its own
//! - config: print the default engine configuration
//! - doctor: diagnose configuration and history files

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use mindscope_fusion::behavior::{EmojiCounts, UserHistory};
use mindscope_fusion::encoder::{AssessmentPayload, ReportEncoder, PAYLOAD_SCHEMA_VERSION};
use mindscope_fusion::{
    BehavioralPatternAnalyzer, BehavioralProfile, EngineConfig, FusionError, FusionProcessor,
    ModalityInputs, PRODUCER_NAME, VERSION,
};

/// MindScope - multimodal stress risk assessment
#[derive(Parser)]
#[command(name = "mindscope")]
#[command(version = VERSION)]
#[command(about = "Fuse text, image and behavioral signals into a stress risk assessment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess pre-classified modality inputs
    Assess {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Load user history from file
        #[arg(long)]
        load_history: Option<PathBuf>,

        /// Save user history to file after processing
        #[arg(long)]
        save_history: Option<PathBuf>,
    },

    /// Analyze a behavioral profile
    Behavior {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the default engine configuration
    Config,

    /// Diagnose configuration and history files
    Doctor {
        /// Check an engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Check a history file
        #[arg(long)]
        history: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// A single inputs object
    Json,
    /// One inputs object per line, assessed in order against the same history
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One payload per line
    Ndjson,
    /// JSON array of payloads
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), MindscopeCliError> {
    match cli.command {
        Commands::Assess {
            input,
            output,
            input_format,
            output_format,
            config,
            load_history,
            save_history,
        } => cmd_assess(
            &input,
            &output,
            input_format,
            output_format,
            config.as_deref(),
            load_history.as_deref(),
            save_history.as_deref(),
        ),
        Commands::Behavior { input } => cmd_behavior(&input),
        Commands::Config => {
            println!("{}", EngineConfig::default().to_json()?);
            Ok(())
        }
        Commands::Doctor {
            config,
            history,
            json,
        } => cmd_doctor(config.as_deref(), history.as_deref(), json),
    }
}

fn read_input(input: &Path) -> Result<String, MindscopeCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, MindscopeCliError> {
    match path {
        Some(path) => Ok(EngineConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

fn cmd_assess(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
    load_history: Option<&Path>,
    save_history: Option<&Path>,
) -> Result<(), MindscopeCliError> {
    let input_data = read_input(input)?;

    let requests: Vec<ModalityInputs> = match input_format {
        InputFormat::Json => vec![serde_json::from_str(&input_data)?],
        InputFormat::Ndjson => input_data
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<ModalityInputs>(line))
            .collect::<Result<_, _>>()?,
    };

    if requests.is_empty() {
        return Err(MindscopeCliError::NoInputs);
    }

    let mut processor = FusionProcessor::with_config(load_config(config)?)?;
    if let Some(path) = load_history {
        processor.load_history(&fs::read_to_string(path)?)?;
    }

    let encoder = ReportEncoder::new();
    let mut payloads = Vec::with_capacity(requests.len());
    for inputs in requests {
        let report = processor.process(inputs, Utc::now(), EmojiCounts::new())?;
        payloads.push(encoder.encode(report, processor.history().alert_severity()));
    }

    tracing::info!(
        count = payloads.len(),
        history = processor.history().len(),
        "assessed inputs"
    );

    if let Some(path) = save_history {
        fs::write(path, processor.save_history()?)?;
    }

    let output_data = format_output(&payloads, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_behavior(input: &Path) -> Result<(), MindscopeCliError> {
    let profile: BehavioralProfile = serde_json::from_str(&read_input(input)?)?;
    let analysis = BehavioralPatternAnalyzer.analyze(&profile);
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, history: Option<&Path>, json: bool) -> Result<(), MindscopeCliError> {
    let mut checks: Vec<DoctorCheck> = vec![
        DoctorCheck {
            name: "version".to_string(),
            status: CheckStatus::Ok,
            message: format!("MindScope fusion version {}", VERSION),
        },
        DoctorCheck {
            name: "payload_schema".to_string(),
            status: CheckStatus::Ok,
            message: format!("Payload schema: {}", PAYLOAD_SCHEMA_VERSION),
        },
    ];

    if let Some(path) = config {
        checks.push(check_file(path, "config", |content| {
            EngineConfig::from_json(content)
                .map(|c| format!("Config valid (timeout {} ms, window {})", c.modality_timeout_ms, c.history_window))
                .map_err(|e| e.to_string())
        }));
    }

    if let Some(path) = history {
        checks.push(check_file(path, "history", |content| {
            UserHistory::from_json(content)
                .map(|h| format!("History valid ({} entries, {} open alerts)", h.len(), h.high_stress_alerts()))
                .map_err(|e| e.to_string())
        }));
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for `assess -i -`)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("MindScope Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    if report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error)) {
        Err(MindscopeCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_file(
    path: &Path,
    name: &str,
    validate: impl Fn(&str) -> Result<String, String>,
) -> DoctorCheck {
    let (status, message) = if !path.exists() {
        (CheckStatus::Warning, format!("{} file does not exist", name))
    } else {
        match fs::read_to_string(path) {
            Ok(content) => match validate(&content) {
                Ok(message) => (CheckStatus::Ok, message),
                Err(e) => (CheckStatus::Error, format!("Invalid {} file: {}", name, e)),
            },
            Err(e) => (CheckStatus::Error, format!("Cannot read {} file: {}", name, e)),
        }
    };

    DoctorCheck {
        name: name.to_string(),
        status,
        message,
    }
}

fn format_output(payloads: &[AssessmentPayload], format: &OutputFormat) -> Result<String, MindscopeCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut out = String::new();
            for payload in payloads {
                out.push_str(&serde_json::to_string(payload)?);
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string(payloads)?)),
        OutputFormat::JsonPretty => match payloads {
            [single] => Ok(format!("{}\n", serde_json::to_string_pretty(single)?)),
            _ => Ok(format!("{}\n", serde_json::to_string_pretty(payloads)?)),
        },
    }
}

// Error types

#[derive(Debug)]
enum MindscopeCliError {
    Io(io::Error),
    Fusion(FusionError),
    Json(serde_json::Error),
    NoInputs,
    DoctorFailed,
}

impl From<io::Error> for MindscopeCliError {
    fn from(e: io::Error) -> Self {
        MindscopeCliError::Io(e)
    }
}

impl From<FusionError> for MindscopeCliError {
    fn from(e: FusionError) -> Self {
        MindscopeCliError::Fusion(e)
    }
}

impl From<serde_json::Error> for MindscopeCliError {
    fn from(e: serde_json::Error) -> Self {
        MindscopeCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MindscopeCliError> for CliError {
    fn from(e: MindscopeCliError) -> Self {
        match e {
            MindscopeCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MindscopeCliError::Fusion(e) => {
                let hint = match e {
                    FusionError::NoModalities => "Provide at least one of text, image or behavioral",
                    FusionError::InvalidConfig(_) => "Run 'mindscope config' for a valid starting point",
                    _ => "Check input values against the expected labels",
                };
                CliError {
                    code: "FUSION_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            MindscopeCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MindscopeCliError::NoInputs => CliError {
                code: "NO_INPUTS".to_string(),
                message: "No inputs found".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            MindscopeCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
