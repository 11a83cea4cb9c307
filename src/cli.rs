// ============================================================================
// Filterer CLI — headless batch filtering via command-line arguments
// ============================================================================
//
// Usage examples:
//   filterer -i photo.png -f grayscale -o gray.png
//   filterer -i photo.jpg -f red=200 -f contrast --output-dir out/
//   filterer -i "shots/*.jpg" --preset warm.flp --output-dir out/ --format png
//   filterer -f red=220 -f contrast --save-preset warm.flp
//   filterer --list
//
// All processing runs synchronously per file; each filter pass is
// row-parallel inside the processor.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::io::{SaveFormat, TiffCompression, load_buffer, save_buffer};
use crate::ops::filters::{Filter, FilterKind};
use crate::ops::processor::ImageProcessor;
use crate::ops::registry::FilterSpec;
use crate::preset::{PRESET_EXTENSION, Preset, PresetStep, load_preset, save_preset};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Filterer headless image filter.
///
/// Apply channel, grayscale, and contrast filters to image files.
#[derive(Parser, Debug)]
#[command(
    name = "filterer",
    about = "Apply simple photo filters to image files",
    long_about = "Run a chain of filters over image files. Filters are given by name,\n\
                  optionally with an intensity: red, green, blue, alpha, grayscale,\n\
                  contrast (e.g. -f red=200 -f grayscale). Chains can be stored as\n\
                  presets and reused.\n\n\
                  Example:\n  \
                  filterer -i photo.png -f grayscale -o gray.png\n  \
                  filterer -i *.jpg --preset warm.flp --output-dir out/"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(
        short,
        long,
        num_args = 1..,
        required_unless_present_any = ["list", "save_preset"]
    )]
    pub input: Vec<String>,

    /// Filter to apply, as NAME or NAME=INTENSITY. Repeat to build a chain;
    /// filters run in the order given, after any preset steps.
    #[arg(short = 'f', long = "filter", value_name = "NAME[=INTENSITY]")]
    pub filters: Vec<FilterSpec>,

    /// Preset file whose steps run before any --filter.
    #[arg(short, long, value_name = "FILE")]
    pub preset: Option<PathBuf>,

    /// Store the resulting chain (preset steps + filters) as a preset file.
    #[arg(long, value_name = "FILE")]
    pub save_preset: Option<PathBuf>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    /// Files are written here with the original stem and the target format's extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, bmp, tiff.
    /// When omitted, the format is inferred from --output's extension, defaulting to png.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// TIFF compression mode: none, lzw, deflate (default: none).
    #[arg(long, default_value = "none", value_name = "MODE")]
    pub tiff_compression: String,

    /// Apply exactly one filter as a single pass instead of a chain.
    #[arg(long)]
    pub single: bool,

    /// List the available filters and their default intensities.
    #[arg(short, long)]
    pub list: bool,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the run log here instead of the default data directory.
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = anything failed.
pub fn run(args: CliArgs) -> ExitCode {
    if args.list {
        print_filter_list();
    }

    // Preset steps first, then --filter specs
    let mut steps: Vec<PresetStep> = Vec::new();
    if let Some(path) = &args.preset {
        match load_preset(path) {
            Ok(preset) => steps.extend(preset.steps),
            Err(e) => {
                eprintln!("error: could not load preset '{}': {}", path.display(), e);
                log_err!("Preset load failed for {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }
    steps.extend(args.filters.iter().map(PresetStep::from));

    let preset = Preset { name: preset_name(args.save_preset.as_deref()), steps };
    let chain = match preset.build_chain() {
        Ok(chain) => chain,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &args.save_preset {
        let path = with_preset_extension(path);
        if let Err(e) = save_preset(&preset, &path) {
            eprintln!("error: could not save preset '{}': {}", path.display(), e);
            log_err!("Preset save failed for {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        println!("Saved preset ({} steps) to {}", preset.steps.len(), path.display());
    }

    if args.input.is_empty() {
        return ExitCode::SUCCESS;
    }

    if args.single && chain.len() != 1 {
        eprintln!(
            "error: --single needs exactly one filter, got {}.",
            chain.len()
        );
        return ExitCode::FAILURE;
    }
    if chain.is_empty() {
        eprintln!("warning: no filters given; images are re-encoded unchanged.");
        log_warn!("Running with an empty filter chain");
    }

    // Resolve glob patterns / literal paths → concrete PathBufs
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let save_format = parse_format(args.format.as_deref(), args.output.as_deref());
    let tiff_compression = TiffCompression::from_name(&args.tiff_compression);

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!(
            "error: could not create output directory '{}': {}",
            dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let job = Job {
        chain: &chain,
        single: args.single,
        format: save_format,
        quality: args.quality,
        tiff_compression,
    };

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let Some(output_path) = build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            save_format,
        ) else {
            eprintln!(
                "  error: cannot determine output path for '{}'.",
                input_path.display()
            );
            any_failure = true;
            continue;
        };

        match run_one(input_path, &output_path, &job) {
            Ok(()) => {
                log_info!("{} -> {}", input_path.display(), output_path.display());
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                log_err!("{}: {}", input_path.display(), e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

struct Job<'a> {
    chain: &'a [Filter],
    single: bool,
    format: SaveFormat,
    quality: u8,
    tiff_compression: TiffCompression,
}

fn run_one(input: &Path, output: &Path, job: &Job<'_>) -> Result<(), String> {
    // -- Step 1: Load ----------------------------------------------------
    let buffer = load_buffer(input).map_err(|e| format!("load failed: {}", e))?;
    let mut processor = ImageProcessor::new(buffer);

    // -- Step 2: Filter --------------------------------------------------
    if job.single {
        processor
            .apply_single_filter(&job.chain[0])
            .map_err(|e| format!("filter failed: {}", e))?;
    } else if !job.chain.is_empty() {
        for filter in job.chain {
            processor.add_filter(*filter);
        }
        processor
            .apply_filters()
            .map_err(|e| format!("filter failed: {}", e))?;
    }

    // -- Step 3: Save ----------------------------------------------------
    let image = processor
        .take_image()
        .ok_or_else(|| "no image after filtering".to_string())?;
    save_buffer(&image, output, job.format, job.quality, job.tiff_compression)
        .map_err(|e| format!("save failed: {}", e))
}

// ============================================================================
// Helpers
// ============================================================================

fn print_filter_list() {
    println!("Available filters:");
    for kind in FilterKind::ALL {
        println!("  {:<10} (default intensity {})", kind.name(), kind.default_intensity());
    }
}

/// Preset name taken from the target file stem.
fn preset_name(path: Option<&Path>) -> String {
    path.and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}

fn with_preset_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(PRESET_EXTENSION)
    }
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                    log_warn!("Pattern '{}' matched no files", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Choose the [`SaveFormat`] from the `--format` string or infer it from the
/// output file extension. Defaults to PNG when neither is known.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> SaveFormat {
    if let Some(f) = format_arg {
        return SaveFormat::from_name(f).unwrap_or_else(|| {
            eprintln!("warning: unknown format '{}', using png.", f);
            SaveFormat::Png
        });
    }
    output.and_then(SaveFormat::from_path).unwrap_or_default()
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: same directory as input, same stem, new extension
///    (appends `_out` to stem if it would collide with the input path)
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: SaveFormat,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.{}", stem, ext));

    if candidate == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filter_chain_in_order() {
        let args = CliArgs::parse_from([
            "filterer", "-i", "a.png", "-f", "red=200", "-f", "grayscale", "-o", "b.jpg",
        ]);
        assert_eq!(args.filters.len(), 2);
        assert_eq!(args.filters[0].to_filter(), Filter::red(200));
        assert_eq!(args.filters[1].to_filter(), Filter::grayscale());
        assert_eq!(args.output.as_deref(), Some(Path::new("b.jpg")));
    }

    #[test]
    fn rejects_unknown_filter_name() {
        let result = CliArgs::try_parse_from(["filterer", "-i", "a.png", "-f", "sepia"]);
        assert!(result.is_err());
    }

    #[test]
    fn input_optional_with_list() {
        let args = CliArgs::try_parse_from(["filterer", "--list"]).unwrap();
        assert!(args.list);
        assert!(args.input.is_empty());
        assert!(CliArgs::try_parse_from(["filterer"]).is_err());
    }

    #[test]
    fn log_flag_sets_log_path() {
        let args = CliArgs::parse_from(["filterer", "--list", "--log", "run.log"]);
        assert_eq!(args.log.as_deref(), Some(Path::new("run.log")));
        let args = CliArgs::parse_from(["filterer", "--list"]);
        assert!(args.log.is_none());
    }

    #[test]
    fn format_inference() {
        assert_eq!(parse_format(Some("JPEG"), None), SaveFormat::Jpeg);
        assert_eq!(parse_format(None, Some(Path::new("x/out.bmp"))), SaveFormat::Bmp);
        assert_eq!(parse_format(None, Some(Path::new("x/out"))), SaveFormat::Png);
        assert_eq!(parse_format(None, None), SaveFormat::Png);
    }

    #[test]
    fn output_path_rules() {
        let input = Path::new("shots/cat.png");
        assert_eq!(
            build_output_path(input, Some(Path::new("x.png")), None, SaveFormat::Png),
            Some(PathBuf::from("x.png"))
        );
        assert_eq!(
            build_output_path(input, None, Some(Path::new("out")), SaveFormat::Jpeg),
            Some(Path::new("out").join("cat.jpg"))
        );
        assert_eq!(
            build_output_path(input, None, None, SaveFormat::Png),
            Some(Path::new("shots").join("cat_out.png"))
        );
        assert_eq!(
            build_output_path(input, None, None, SaveFormat::Bmp),
            Some(Path::new("shots").join("cat.bmp"))
        );
    }

    #[test]
    fn preset_paths_and_names() {
        assert_eq!(with_preset_extension(Path::new("warm")), PathBuf::from("warm.flp"));
        assert_eq!(with_preset_extension(Path::new("warm.bin")), PathBuf::from("warm.bin"));
        assert_eq!(preset_name(Some(Path::new("dir/warm.flp"))), "warm");
        assert_eq!(preset_name(None), "Untitled");
    }
}
