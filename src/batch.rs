use crate::constants::{
    FILE_PREFIX, OPTIMIZE_EXTENSIONS, PHOTO_PREFIX, PROGRESS_BAR_TEMPLATE, REPORT_PREFIX,
    SAVINGS_PREFIX, SIZE_PREFIX, SUCCESS_PREFIX, TOOLS_PREFIX, WEBP_PREFIX,
};
use crate::error::{ProcessingError, Result};
use crate::formats::ImageKind;
use crate::processing::{check_codecs, convert_to_modern, optimize_image, OptimizeOptions};
use crate::stats::{save_stats, OptimizationStats};
use crate::utils::{format_bytes, savings_percent};
use crate::walker::{ImageWalker, SourceImage};
use crate::{error, info, verbose, warn};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// The two encode operations run for every source image.
pub trait ImageEncoder {
    /// Resized, flattened JPEG. Returns the written size.
    fn optimize(&self, input: &Path, output: &Path) -> Result<u64>;
    /// WebP copy. Returns the written size.
    fn convert(&self, input: &Path, output: &Path) -> Result<u64>;
}

/// [`ImageEncoder`] backed by the real codecs.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecPipeline {
    pub options: OptimizeOptions,
}

impl CodecPipeline {
    pub fn new(options: OptimizeOptions) -> Self {
        Self { options }
    }
}

impl ImageEncoder for CodecPipeline {
    fn optimize(&self, input: &Path, output: &Path) -> Result<u64> {
        optimize_image(
            input,
            output,
            self.options.jpeg_quality,
            self.options.max_width,
        )
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<u64> {
        convert_to_modern(input, output, self.options.webp_quality)
    }
}

/// Where a file dropped out of the batch before any encode ran. Encode
/// failures live in [`FileOutcome`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Walk,
    Collision,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Walk => "scan",
            Stage::Collision => "output naming",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug)]
pub struct FileFailure {
    pub path: Option<PathBuf>,
    pub stage: Stage,
    pub error: ProcessingError,
}

/// Result of both encodes for one source image.
#[derive(Debug)]
pub struct FileOutcome {
    pub relative: PathBuf,
    pub original_size: u64,
    pub jpeg: Result<u64>,
    pub webp: Result<u64>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub stats: OptimizationStats,
    pub outcomes: Vec<FileOutcome>,
    pub failures: Vec<FileFailure>,
}

/// Output locations for one source: `<out>/<rel dir>/<stem>.jpg` and `.webp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub jpeg: PathBuf,
    pub webp: PathBuf,
}

pub fn output_paths(relative: &Path, output_root: &Path) -> Result<OutputPaths> {
    let stem = relative
        .file_stem()
        .ok_or_else(|| ProcessingError::OutsideRoot {
            path: relative.to_path_buf(),
            root: output_root.to_path_buf(),
        })?
        .to_string_lossy();
    let dir = match relative.parent() {
        Some(parent) => output_root.join(parent),
        None => output_root.to_path_buf(),
    };
    Ok(OutputPaths {
        jpeg: dir.join(format!("{}.{}", stem, ImageKind::Jpeg.extension())),
        webp: dir.join(format!("{}.{}", stem, ImageKind::WebP.extension())),
    })
}

/// Folds a sequence of source images into a [`BatchReport`].
///
/// A failure in one encode never stops the other encode or the rest of the
/// batch. Sources whose outputs would overwrite an earlier source's outputs
/// (same stem, different extension, same directory) are skipped and recorded
/// as collisions. `on_file` is called after each processed file.
pub fn optimize_batch<I, E, F>(
    input_root: &Path,
    output_root: &Path,
    sources: I,
    encoder: &E,
    mut on_file: F,
) -> BatchReport
where
    I: IntoIterator<Item = Result<SourceImage>>,
    E: ImageEncoder + ?Sized,
    F: FnMut(&FileOutcome),
{
    let mut report = BatchReport::default();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

    for source in sources {
        let source = match source {
            Ok(source) => source,
            Err(error) => {
                report.stats.failed_files += 1;
                report.failures.push(FileFailure {
                    path: error.path().map(Path::to_path_buf),
                    stage: Stage::Walk,
                    error,
                });
                continue;
            }
        };

        let relative = match source.path.strip_prefix(input_root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => {
                report.stats.failed_files += 1;
                report.failures.push(FileFailure {
                    path: Some(source.path.clone()),
                    stage: Stage::Walk,
                    error: ProcessingError::OutsideRoot {
                        path: source.path,
                        root: input_root.to_path_buf(),
                    },
                });
                continue;
            }
        };

        let outputs = match output_paths(&relative, output_root) {
            Ok(outputs) => outputs,
            Err(error) => {
                report.stats.failed_files += 1;
                report.failures.push(FileFailure {
                    path: Some(source.path),
                    stage: Stage::Walk,
                    error,
                });
                continue;
            }
        };

        if let Some(previous) = claimed.get(&outputs.jpeg) {
            report.stats.failed_files += 1;
            report.failures.push(FileFailure {
                path: Some(source.path.clone()),
                stage: Stage::Collision,
                error: ProcessingError::OutputCollision {
                    input: source.path,
                    previous: previous.clone(),
                },
            });
            continue;
        }
        claimed.insert(outputs.jpeg.clone(), source.path.clone());

        let jpeg = encoder.optimize(&source.path, &outputs.jpeg);
        let webp = encoder.convert(&source.path, &outputs.webp);

        report.stats.files_processed += 1;
        report.stats.original_bytes += source.size;
        if let Ok(size) = &jpeg {
            report.stats.optimized_bytes += *size;
        }
        if webp.is_ok() {
            report.stats.webp_files += 1;
        }
        if jpeg.is_err() || webp.is_err() {
            report.stats.failed_files += 1;
        }

        let outcome = FileOutcome {
            relative,
            original_size: source.size,
            jpeg,
            webp,
        };
        on_file(&outcome);
        report.outcomes.push(outcome);
    }

    report
}

#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub options: OptimizeOptions,
}

/// Entry point of the `optimize` command.
///
/// A missing input directory or unusable codec prints guidance and returns
/// `Ok(None)` without touching the filesystem.
pub fn run_optimizer(config: &OptimizerConfig) -> Result<Option<BatchReport>> {
    info!("🚀 IMAGE OPTIMIZER\n");

    if let Err(e) = check_codecs() {
        error!("{}", e);
        info!("The JPEG and WebP encoders are required. Rebuild picture-kit with its default");
        info!("features (libwebp is compiled through the `webp` crate) and run again.");
        return Ok(None);
    }

    let walker = match ImageWalker::new(&config.input, OPTIMIZE_EXTENSIONS) {
        Ok(walker) => walker,
        Err(ProcessingError::DirectoryNotFound(path)) => {
            error!("Directory not found: {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    fs::create_dir_all(&config.output)
        .map_err(|_| ProcessingError::DirectoryCreationFailed(config.output.clone()))?;

    let start_time = Instant::now();
    // Counting first keeps the bar accurate; the walk is restartable.
    let total = walker.iter().count() as u64;
    let progress = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
        progress.set_style(style.progress_chars("=> "));
    }
    if crate::logger::is_quiet() {
        progress.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    info!("🔍 Processing images...\n");
    let encoder = CodecPipeline::new(config.options);
    let report = optimize_batch(
        walker.root(),
        &config.output,
        with_progress(walker.sources(), &progress),
        &encoder,
        |outcome| progress.suspend(|| print_outcome(outcome)),
    );
    progress.finish_and_clear();

    for failure in &report.failures {
        match &failure.path {
            Some(path) => error!(
                "{} failed for {}: {}",
                failure.stage,
                path.display(),
                failure.error
            ),
            None => error!("{} failed: {}", failure.stage, failure.error),
        }
    }

    match save_stats(&config.output, &report.stats) {
        Ok(path) => verbose!("statistics written to {}", path.display()),
        Err(e) => warn!("Could not write statistics file: {}", e),
    }

    print_summary(&report.stats, &config.output);
    verbose!("finished in {:.2?}", start_time.elapsed());
    Ok(Some(report))
}

/// Ticks `progress` once per source pulled, whether it ends up processed,
/// skipped as a collision or failed during the walk.
fn with_progress<'a, I>(sources: I, progress: &'a ProgressBar) -> impl Iterator<Item = I::Item> + 'a
where
    I: Iterator + 'a,
{
    sources.inspect(move |_| progress.inc(1))
}

fn print_outcome(outcome: &FileOutcome) {
    info!("{} {}", PHOTO_PREFIX, outcome.relative.display());
    info!("   Original: {}", format_bytes(outcome.original_size));
    match &outcome.jpeg {
        Ok(size) => info!(
            "   {} JPEG optimized: {} ({:.1}% smaller)",
            SIZE_PREFIX,
            format_bytes(*size),
            savings_percent(outcome.original_size, *size)
        ),
        Err(e) => error!("Failed to optimize {}: {}", outcome.relative.display(), e),
    }
    match &outcome.webp {
        Ok(size) => info!(
            "   {} WebP: {} ({:.1}% smaller)",
            WEBP_PREFIX,
            format_bytes(*size),
            savings_percent(outcome.original_size, *size)
        ),
        Err(e) => error!(
            "Failed to convert {} to WebP: {}",
            outcome.relative.display(),
            e
        ),
    }
    info!("");
}

pub fn print_summary(stats: &OptimizationStats, output: &Path) {
    let separator = "=".repeat(50);
    info!("\n{}", separator);
    info!("{} FINAL OPTIMIZATION REPORT", REPORT_PREFIX);
    info!("{}", separator);
    info!("{} Files processed: {}", PHOTO_PREFIX, stats.files_processed);
    info!("{} Original size: {}", SIZE_PREFIX, format_bytes(stats.original_bytes));
    info!("{} Optimized size: {}", WEBP_PREFIX, format_bytes(stats.optimized_bytes));
    info!(
        "{} Total savings: {} ({:.1}%)",
        SAVINGS_PREFIX,
        format_bytes(stats.saved_bytes()),
        stats.savings_percent()
    );
    info!("🌐 WebP files created: {}", stats.webp_files);
    if stats.failed_files > 0 {
        info!("⚠️  Files with failures: {}", stats.failed_files);
    }
    info!("{} Images saved to: {}", FILE_PREFIX, output.display());

    info!("\n{} NEXT STEPS:", TOOLS_PREFIX);
    info!("1. Review the optimized images");
    info!("2. Replace the originals with the optimized versions");
    info!("3. Generate <picture> tags with `picture-kit markup`");
    info!("4. Enable lazy loading");
    info!("{} Done", SUCCESS_PREFIX);
}
