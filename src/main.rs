use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use coursestruct::config::ExtractionTuning;
use coursestruct::pipeline::{
    build_document, export_report, extract_course, resolve_from_files, PipelineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "coursestruct")]
#[command(version, about = "Course outline structure recovery: assessments, schedules and deadlines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract a structured course record from an outline
    Extract {
        /// Layout dump (.json) or PDF file (.pdf, read through poppler)
        input: PathBuf,

        /// Output directory (default: ./<input_name>_output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file overriding heuristic constants
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Keep relative due rules instead of expanding them into dated tasks
        #[arg(long)]
        no_resolve: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Extract several outlines
    Batch {
        inputs: Vec<PathBuf>,

        /// Output directory for all results
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        tuning: Option<PathBuf>,
    },

    /// Show structure counts for an outline
    Info {
        input: PathBuf,

        #[arg(long)]
        tuning: Option<PathBuf>,
    },

    /// Re-run deadline resolution on corrected tasks, term and sections
    Resolve {
        /// JSON array of assessment tasks
        #[arg(long)]
        tasks: PathBuf,

        /// JSON course term
        #[arg(long)]
        term: Option<PathBuf>,

        /// JSON array of lecture/lab sections
        #[arg(long)]
        sections: PathBuf,

        /// Write resolved tasks here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coursestruct=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            output,
            tuning,
            no_resolve,
            quiet,
        } => extract_single(input, output, tuning.as_deref(), !no_resolve, quiet),
        Commands::Batch {
            inputs,
            output,
            tuning,
        } => extract_batch(inputs, output, tuning.as_deref()),
        Commands::Info { input, tuning } => show_info(input, tuning.as_deref()),
        Commands::Resolve {
            tasks,
            term,
            sections,
            output,
        } => resolve(&tasks, term.as_deref(), &sections, output),
    }
}

fn load_tuning(path: Option<&Path>) -> Result<ExtractionTuning> {
    match path {
        Some(path) => ExtractionTuning::from_json_file(path)
            .with_context(|| format!("Failed to load tuning: {}", path.display())),
        None => Ok(ExtractionTuning::default()),
    }
}

fn check_input(input: &Path) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    if !input.is_file() {
        anyhow::bail!("Input is not a file: {}", input.display());
    }
    Ok(())
}

fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "outline".to_string())
}

fn extract_single(
    input: PathBuf,
    output: Option<PathBuf>,
    tuning: Option<&Path>,
    resolve_deadlines: bool,
    quiet: bool,
) -> Result<()> {
    check_input(&input)?;
    let tuning = load_tuning(tuning)?;

    let output_dir =
        output.unwrap_or_else(|| PathBuf::from(format!("{}_output", input_stem(&input))));

    if !quiet {
        println!("[*] Processing: {}", input.display());
        println!("[*] Output: {}", output_dir.display());
    }

    let mut config = PipelineConfig::new(input.clone(), output_dir.clone(), tuning);
    config.resolve_deadlines = resolve_deadlines;

    if !quiet {
        println!("\n[+] Extracting course data...");
    }

    let report = extract_course(&config)
        .with_context(|| format!("Failed to process outline: {}", input.display()))?;

    if !quiet {
        println!(
            "[+] {} assessments, {:.1}% total weight",
            report.data.assessments.len(),
            report.completeness.total_weight
        );
        if report.stats.under_extracted {
            println!("[!] Weight sum is under the expected total; some items may be missing");
        }
        println!("[+] Exporting results...");
    }

    export_report(&report, &config.output)
        .with_context(|| format!("Failed to export to: {}", output_dir.display()))?;

    if !quiet {
        println!("\n[✓] Done! Results saved to: {}", output_dir.display());
    }

    Ok(())
}

fn extract_batch(inputs: Vec<PathBuf>, output: Option<PathBuf>, tuning: Option<&Path>) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    let base_output = output.unwrap_or_else(|| PathBuf::from("batch_output"));

    println!("[*] Batch processing {} file(s)", inputs.len());
    println!("[*] Base output: {}\n", base_output.display());

    let mut success = 0;
    let mut failed = 0;

    for (i, input) in inputs.iter().enumerate() {
        println!("[{}/{}] Processing: {}", i + 1, inputs.len(), input.display());

        let output_dir = base_output.join(input_stem(input));
        match extract_single(input.clone(), Some(output_dir), tuning, true, true) {
            Ok(_) => {
                println!("  [✓] Success");
                success += 1;
            }
            Err(e) => {
                eprintln!("  [✗] Failed: {:#}", e);
                failed += 1;
            }
        }
    }

    println!("\n[*] Summary: {} succeeded, {} failed", success, failed);

    if failed > 0 {
        anyhow::bail!("{} file(s) failed to process", failed);
    }

    Ok(())
}

fn show_info(input: PathBuf, tuning: Option<&Path>) -> Result<()> {
    check_input(&input)?;
    let config = PipelineConfig::new(input.clone(), PathBuf::new(), load_tuning(tuning)?);
    let doc = build_document(&config)
        .with_context(|| format!("Failed to read outline: {}", input.display()))?;

    println!("Outline Information");
    println!("===================");
    println!("File: {}", input.display());
    println!("Pages: {}", doc.pages.len());
    println!("Fragments: {}", doc.fragments.len());
    println!("Lines: {}", doc.lines.len());
    println!("Tables: {}", doc.tables.len());
    println!("Sections:");
    for section in &doc.sections {
        println!(
            "  [{}] {} (page {})",
            section.category.label(),
            section.heading,
            section.start.page + 1
        );
    }

    Ok(())
}

fn resolve(
    tasks: &Path,
    term: Option<&Path>,
    sections: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    let resolved = resolve_from_files(tasks, term, sections)
        .with_context(|| format!("Failed to resolve tasks from: {}", tasks.display()))?;
    let data = serde_json::to_string_pretty(&resolved)?;
    match output {
        Some(path) => {
            fs::write(&path, data).with_context(|| format!("Failed to write: {}", path.display()))?
        }
        None => println!("{data}"),
    }
    Ok(())
}
