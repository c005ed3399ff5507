use crate::constants::{
    FILE_PREFIX, HIGH_PRIORITY_THRESHOLD, PHOTO_PREFIX, REPORT_EXTENSIONS, REPORT_PREFIX,
    SAVINGS_PREFIX, SECONDS_PER_MIB, SIZE_PREFIX, SUCCESS_PREFIX, TOOLS_PREFIX, WEBP_PREFIX,
};
use crate::error::{ProcessingError, Result};
use crate::formats::ImageKind;
use crate::utils::{bytes_to_mib, estimate_size, format_bytes, savings_percent};
use crate::walker::{ImageWalker, SourceImage};
use crate::{error, info};
use std::path::PathBuf;

/// Per-file result of the size analysis. `estimated` is `None` for files
/// already in WebP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEstimate {
    pub path: PathBuf,
    pub size: u64,
    pub estimated: Option<u64>,
}

impl FileEstimate {
    pub fn from_source(source: SourceImage) -> Self {
        let is_modern = ImageKind::from_path(&source.path)
            .map(|kind| kind.is_modern())
            .unwrap_or(false);
        let estimated = if is_modern {
            None
        } else {
            Some(estimate_size(source.size))
        };
        Self {
            path: source.path,
            size: source.size,
            estimated,
        }
    }

    pub fn estimated_savings(&self) -> Option<u64> {
        self.estimated.map(|estimated| self.size - estimated)
    }
}

#[derive(Debug, Default)]
pub struct AnalysisReport {
    pub files: Vec<FileEstimate>,
    pub failures: Vec<ProcessingError>,
    pub total_bytes: u64,
}

impl AnalysisReport {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn already_optimized(&self) -> usize {
        self.files.iter().filter(|f| f.estimated.is_none()).count()
    }

    /// Aggregate estimate, applied once to the total.
    pub fn estimated_total(&self) -> u64 {
        estimate_size(self.total_bytes)
    }

    pub fn estimated_savings(&self) -> u64 {
        self.total_bytes - self.estimated_total()
    }

    pub fn savings_percent(&self) -> f64 {
        savings_percent(self.total_bytes, self.estimated_total())
    }

    /// Seconds saved on a slow connection.
    pub fn load_time_savings(&self) -> f64 {
        bytes_to_mib(self.estimated_savings()) * SECONDS_PER_MIB
    }

    pub fn is_high_priority(&self) -> bool {
        self.total_bytes > HIGH_PRIORITY_THRESHOLD
    }
}

/// Folds walked files into a report. Unreadable entries are kept as
/// failures and the fold continues.
pub fn analyze<I, F>(sources: I, mut on_file: F) -> AnalysisReport
where
    I: IntoIterator<Item = Result<SourceImage>>,
    F: FnMut(std::result::Result<&FileEstimate, &ProcessingError>),
{
    let mut report = AnalysisReport::default();
    for source in sources {
        match source {
            Ok(source) => {
                let estimate = FileEstimate::from_source(source);
                report.total_bytes += estimate.size;
                on_file(Ok(&estimate));
                report.files.push(estimate);
            }
            Err(e) => {
                on_file(Err(&e));
                report.failures.push(e);
            }
        }
    }
    report
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub input: PathBuf,
}

/// Entry point of the `report` command. Console output only.
pub fn run_report(config: &ReportConfig) -> Result<Option<AnalysisReport>> {
    info!("🖼️  IMAGE ANALYZER\n");

    let walker = match ImageWalker::new(&config.input, REPORT_EXTENSIONS) {
        Ok(walker) => walker,
        Err(ProcessingError::DirectoryNotFound(path)) => {
            error!("Directory not found: {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    info!("🔍 Scanning images...\n");
    let report = analyze(walker.sources(), |entry| match entry {
        Ok(estimate) => print_file_estimate(estimate),
        Err(e) => error!("Failed to read entry: {}", e),
    });

    print_summary(&report);
    print_recommendations(&report);
    print_benefits(&report);
    Ok(Some(report))
}

fn print_file_estimate(estimate: &FileEstimate) {
    info!("{} {}", FILE_PREFIX, estimate.path.display());
    info!("   Current size: {}", format_bytes(estimate.size));
    match (estimate.estimated, estimate.estimated_savings()) {
        (Some(estimated), Some(saved)) => info!(
            "   {} Estimated WebP: {} ({} saved)",
            WEBP_PREFIX,
            format_bytes(estimated),
            format_bytes(saved)
        ),
        _ => info!("   {} Already optimized (WebP)", SUCCESS_PREFIX),
    }
    info!("");
}

fn print_summary(report: &AnalysisReport) {
    info!("{} ANALYSIS REPORT:\n", REPORT_PREFIX);
    info!("{} Images found: {}", PHOTO_PREFIX, report.file_count());
    if report.already_optimized() > 0 {
        info!("{} Already WebP: {}", SUCCESS_PREFIX, report.already_optimized());
    }
    info!("{} Current total size: {}", SIZE_PREFIX, format_bytes(report.total_bytes));
    info!(
        "{} Estimated optimized size: {}",
        WEBP_PREFIX,
        format_bytes(report.estimated_total())
    );
    info!(
        "{} Estimated savings: {} ({:.0}% smaller)",
        SAVINGS_PREFIX,
        format_bytes(report.estimated_savings()),
        report.savings_percent()
    );
    if !report.failures.is_empty() {
        info!("⚠️  Unreadable entries: {}", report.failures.len());
    }
}

const RECOMMENDATIONS: &str = r#"
1. 🚀 Run the optimizer:
   picture-kit optimize

2. 📦 Build-time optimization for new assets:
   npm install --save-dev vite-plugin-imagemin imagemin-webp imagemin-mozjpeg

3. 🖼️  Serve WebP with a fallback:
   <picture>
     <source srcset="image.webp" type="image/webp">
     <img src="image.jpg" alt="Description" loading="lazy">
   </picture>

4. 📱 Lazy load below-the-fold images:
   Use an IntersectionObserver (see `picture-kit markup`)
"#;

fn print_recommendations(report: &AnalysisReport) {
    info!("\n{} RECOMMENDED TOOLS:\n", TOOLS_PREFIX);
    if report.is_high_priority() {
        info!("⚠️  HIGH PRIORITY - images are very large!");
        info!("📋 Apply IMMEDIATELY:");
    } else {
        info!("📋 Optimization recommendations:");
    }
    info!("{}", RECOMMENDATIONS);
}

fn print_benefits(report: &AnalysisReport) {
    info!("✨ EXPECTED BENEFITS:");
    if report.total_bytes > 0 {
        info!(
            "• Site {:.1}s faster on a slow mobile connection",
            report.load_time_savings()
        );
        info!("• {} less data transferred", format_bytes(report.estimated_savings()));
        info!("• {:.0}% improvement in Core Web Vitals", report.savings_percent());
    }
    info!("• Better search ranking");
    info!("• Improved mobile experience");
    info!("• Lower bounce rate");
}
