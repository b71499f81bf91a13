//! CLI entry point for data quality analysis and repair.

use anyhow::{Result, anyhow};
use clap::Parser;
use data_doctor::reporting::{FixReport, write_csv};
use data_doctor::{
    AggregateResult, AnalyzeChunk, ChunkProcessor, ChunkedProcessor, DataQualityAnalyzer,
    DatasetReader, FileReader, FixChunk, FixEngine, FixRequest, Issue, PipelineConfig,
    QualityReport, generate_comparison,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Data quality analysis and automated repair",
    long_about = "Detects missing values, duplicates, format errors, case inconsistencies, \
                  numeric text and outliers in CSV, JSON and Parquet files, scores overall \
                  quality and optionally repairs what it found.\n\n\
                  EXAMPLES:\n  \
                  # Analyze a file\n  \
                  data-doctor -i data.csv\n\n  \
                  # Repair and write the fixed dataset\n  \
                  data-doctor -i data.csv --fix -o fixed.csv\n\n  \
                  # Analyze a large file in chunks of 50k rows on 4 workers\n  \
                  data-doctor -i big.csv --chunked --chunk-size 50000 --workers 4\n\n  \
                  # Machine-readable output\n  \
                  data-doctor -i data.csv --json | jq .report.quality_score"
)]
struct Args {
    /// Path to the CSV, JSON or Parquet file to analyze
    #[arg(short, long)]
    input: PathBuf,

    /// Process the file in row chunks on a worker pool
    #[arg(long)]
    chunked: bool,

    /// Rows per chunk in chunked mode
    #[arg(long, default_value_t = data_doctor::config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Worker threads in chunked mode (default: min(CPUs, 4))
    #[arg(short, long)]
    workers: Option<usize>,

    /// Repair every detected issue
    #[arg(long)]
    fix: bool,

    /// Convert numeric text columns to numbers when fixing
    #[arg(long)]
    convert_numeric_text: bool,

    /// Rewrite case variants to their most frequent spelling when fixing
    #[arg(long)]
    standardize_case: bool,

    /// Write the repaired dataset to this CSV file (requires --fix)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs; only the final JSON report is written.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the result)
    #[arg(short, long)]
    quiet: bool,
}

/// JSON document printed with `--json`.
#[derive(Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
enum CliOutput {
    Dataset {
        input: String,
        report: QualityReport,
        #[serde(skip_serializing_if = "Option::is_none")]
        fixes: Option<FixReport>,
        #[serde(skip_serializing_if = "Option::is_none")]
        output_file: Option<String>,
    },
    Chunked {
        input: String,
        report: AggregateResult,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }
    if args.output.is_some() && !args.fix {
        return Err(anyhow!("--output requires --fix"));
    }
    if args.output.is_some() && args.chunked {
        return Err(anyhow!(
            "--output is not available in chunked mode; chunks are repaired independently"
        ));
    }

    let mut config_builder = PipelineConfig::builder()
        .chunk_size(args.chunk_size)
        .convert_numeric_text(args.convert_numeric_text)
        .standardize_case(args.standardize_case);
    if let Some(workers) = args.workers {
        config_builder = config_builder.max_workers(workers);
    }
    let config = config_builder.build()?;

    let output = if args.chunked {
        run_chunked(&args, config)?
    } else {
        run_dataset(&args, &config)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_human_readable_summary(&output, args.quiet);
    }
    Ok(())
}

fn run_dataset(args: &Args, config: &PipelineConfig) -> Result<CliOutput> {
    info!("Loading dataset from: {}", args.input.display());
    let df = FileReader::new().load(&args.input)?;
    info!("Dataset loaded successfully: {:?}", df.shape());

    let report = DataQualityAnalyzer::analyze_quality(&df)?;

    let mut fixes = None;
    let mut output_file = None;
    if args.fix {
        let requests = FixRequest::from_issues(&report.issues);
        let (mut fixed, fixes_applied) =
            FixEngine::from_config(config).apply_fixes(&df, &requests)?;
        let comparison = generate_comparison(&df, &fixed)?;

        if let Some(path) = &args.output {
            write_csv(&mut fixed, path)?;
            output_file = Some(path.display().to_string());
        }
        fixes = Some(FixReport {
            fixes_applied,
            comparison,
        });
    }

    Ok(CliOutput::Dataset {
        input: args.input.display().to_string(),
        report,
        fixes,
        output_file,
    })
}

fn run_chunked(args: &Args, config: PipelineConfig) -> Result<CliOutput> {
    let engine = FixEngine::from_config(&config);
    let processor = ChunkedProcessor::builder().config(config).build()?;

    let chunk_processor: Arc<dyn ChunkProcessor> = if args.fix {
        Arc::new(FixChunk::detect_first(engine))
    } else {
        Arc::new(AnalyzeChunk)
    };

    let report = processor.process_large_file(&args.input, chunk_processor)?;
    processor.shutdown();

    Ok(CliOutput::Chunked {
        input: args.input.display().to_string(),
        report,
    })
}

/// Print a human-readable summary of the results.
///
/// This is the default output when `--json` is not specified.
fn print_human_readable_summary(output: &CliOutput, quiet: bool) {
    println!();
    println!("{}", "=".repeat(80));
    println!("DATA QUALITY REPORT");
    println!("{}", "=".repeat(80));
    println!();

    match output {
        CliOutput::Dataset {
            input,
            report,
            fixes,
            output_file,
        } => {
            println!(
                "Input: {} ({} rows x {} columns)",
                input, report.total_rows, report.total_columns
            );
            println!("Quality Score: {:.1}%", report.quality_score * 100.0);
            println!();
            print_issues(&report.issues, quiet);

            if let Some(fixes) = fixes {
                let summary = &fixes.comparison.summary;
                println!("Fixes Applied: {}", fixes.fixes_applied.len());
                for fix in &fixes.fixes_applied {
                    println!("  - [{}] {}", fix.column, fix.description);
                }
                println!(
                    "  Rows: {} -> {} ({} removed)",
                    fixes.comparison.original_shape.0,
                    fixes.comparison.fixed_shape.0,
                    fixes.comparison.rows_removed
                );
                println!(
                    "  Missing values: {} -> {}",
                    summary.original_missing_values, summary.fixed_missing_values
                );
                println!(
                    "  Duplicate rows: {} -> {}",
                    summary.original_duplicates, summary.fixed_duplicates
                );
                println!();
            }
            if let Some(path) = output_file {
                println!("Output: {}", path);
                println!();
            }
            print_recommendations(&report.recommendations);
        }
        CliOutput::Chunked { input, report } => {
            println!("Input: {}", input);
            if !report.success {
                println!(
                    "Processing failed: {} ({} of {} chunks failed)",
                    report.error.as_deref().unwrap_or("unknown error"),
                    report.failed_chunks,
                    report.total_chunks
                );
                for err in &report.chunk_errors {
                    println!("  ! {}", err);
                }
                println!("{}", "=".repeat(80));
                return;
            }

            println!(
                "Chunks: {} succeeded, {} failed, {} rows processed",
                report.successful_chunks, report.failed_chunks, report.total_rows_processed
            );
            println!(
                "Time: {:.2}s total, {:.3}s per chunk",
                report.total_processing_time, report.average_chunk_time
            );
            println!("Quality Score: {:.1}%", report.quality_score * 100.0);
            println!();
            print_issues(&report.issues, quiet);
            if !report.chunk_errors.is_empty() {
                println!("Chunk Errors:");
                for err in &report.chunk_errors {
                    println!("  ! {}", err);
                }
                println!();
            }
            print_recommendations(&report.recommendations);
        }
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}

fn print_issues(issues: &[Issue], quiet: bool) {
    let total = issues.len();
    if total == 0 {
        println!("No issues found");
        println!();
        return;
    }

    println!("Issues ({}):", total);
    println!(
        "  {:<10} {:<20} {:<20} Description",
        "Severity", "Type", "Column"
    );
    let limit = if quiet { 10 } else { 50 };
    for issue in issues.iter().take(limit) {
        println!(
            "  {:<10} {:<20} {:<20} {}",
            issue.severity.as_str(),
            issue.issue_type.as_str(),
            truncate_str(&issue.column, 19),
            issue.description
        );
    }
    if total > limit {
        println!("  ... and {} more issues", total - limit);
    }
    println!();
}

fn print_recommendations(recommendations: &[String]) {
    println!("Recommendations:");
    for rec in recommendations {
        println!("  - {}", rec);
    }
    println!();
}

/// Truncate a string to a maximum length, adding "..." if truncated.
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
