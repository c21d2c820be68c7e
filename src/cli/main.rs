use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use exif_scrub::metadata::{self, IfdDirectory, MetadataSnapshot};
use exif_scrub::policy::OutputFormat;
use exif_scrub::{config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exif-scrub",
    version,
    about = "EXIF metadata inspector and scrubber — report every embedded tag and rebuild pixel-identical copies carrying none"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Directory to write cleaned images into (default: next to each source)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Downscale images wider than this many pixels (0 disables)
    #[arg(long, value_name = "PIXELS")]
    max_width: Option<u32>,

    /// Force the output format (jpeg or png) instead of keeping the source's
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Display all embedded metadata and exit, without writing anything
    #[arg(long = "show-metadata")]
    show_metadata: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    // Load config and apply CLI overrides
    let mut config = config::Config::load(cli.config.as_deref())?;
    if let Some(max_width) = cli.max_width {
        config.output.max_width = max_width;
    }
    if let Some(ref format) = cli.format {
        config.output.format = Some(parse_format(format)?);
    }
    if cli.output_dir.is_some() {
        config.output.dir = cli.output_dir.clone();
    }

    // Validate inputs
    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    // Collect images
    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    // Handle --show-metadata
    if cli.show_metadata {
        for image_path in &images {
            print_metadata(image_path)?;
        }
        return Ok(());
    }

    let policy = config.policy();

    log::info!("Found {} image(s) to process", images.len());

    // Process each image
    let mut results = Vec::new();
    let total = images.len();

    for (i, image_path) in images.iter().enumerate() {
        log::info!(
            "[{}/{}] Processing: {}",
            i + 1,
            total,
            image_path.display()
        );

        let output_dir = config
            .output
            .dir
            .clone()
            .or_else(|| image_path.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        let result = pipeline::process_file(image_path, &output_dir, &policy);

        if let Some(ref err) = result.error {
            log::error!("  Error: {err}");
        } else {
            log::info!("  Removed {} tag(s)", result.tags_removed);
            if let (Some((w, h)), Some(format)) = (result.dimensions, result.output_format) {
                log::info!("  Output: {w}x{h} {}", format.extension());
            }
            if let Some(ref output) = result.output_path {
                log::info!("  Wrote: {}", output.display());
            }
        }

        results.push(result);
    }

    // JSON output
    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "output_path": r.output_path.as_ref().map(|p| p.display().to_string()),
                    "tags_removed": r.tags_removed,
                    "metadata_before": r.metadata_before.as_ref().map(|m| m.to_json()),
                    "metadata_after": r.metadata_before.as_ref().map(pipeline::redacted_summary),
                    "error": r.error,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    // Summary
    let success = results.iter().filter(|r| r.error.is_none()).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    log::info!("Done: {success} succeeded, {failed} failed out of {total} images");

    Ok(())
}

fn parse_format(s: &str) -> Result<OutputFormat> {
    match s.to_lowercase().as_str() {
        "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
        "png" => Ok(OutputFormat::Png),
        other => anyhow::bail!("Unknown output format '{other}' (expected jpeg or png)"),
    }
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Print all embedded metadata for a file, grouped by directory.
fn print_metadata(path: &std::path::Path) -> Result<()> {
    let bytes = std::fs::read(path)?;
    let snapshot = metadata::read_metadata(&bytes);

    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    match &snapshot {
        MetadataSnapshot::Tags(tags) if !tags.is_empty() => {
            let sections = [
                (IfdDirectory::Image, "Image (IFD0)"),
                (IfdDirectory::Exif, "Exif"),
                (IfdDirectory::Gps, "GPS"),
                (IfdDirectory::Interop, "Interoperability"),
                (IfdDirectory::Thumbnail, "Thumbnail (IFD1)"),
            ];

            for (directory, title) in sections {
                let in_section: Vec<_> =
                    tags.iter().filter(|t| t.directory == directory).collect();
                if in_section.is_empty() {
                    continue;
                }
                println!("  {BOLD}{title}{RESET}");
                println!("  {DIM}{}{RESET}", "─".repeat(70));
                for tag in in_section {
                    print_row(&tag.name, &tag.value.to_string());
                }
                println!();
            }
        }
        MetadataSnapshot::Tags(_) => {
            println!("  {DIM}(directory present, but no resolvable tags){RESET}");
            println!();
        }
        other => {
            let reason = other.error_reason().unwrap_or_default();
            println!("  {DIM}({reason}){RESET}");
            println!();
        }
    }

    Ok(())
}

/// Max width for the value column before wrapping.
const VAL_WIDTH: usize = 46;
/// Indent for continuation lines (tag column width + " : " = 25 chars + 2 leading spaces).
const INDENT: &str = "                           ";

/// Print a single row in the metadata display table.
fn print_row(tag: &str, val: &str) {
    let tag_col = format!("{:<22}", tag);
    let lines = wrap_text(val, VAL_WIDTH);
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("  {tag_col} : {line}");
        } else {
            println!("  {INDENT}{line}");
        }
    }
}

/// Wrap text at word boundaries to fit within max_width.
fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in s.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(s.to_string());
    }

    lines
}
