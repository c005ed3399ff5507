pub const DEFAULT_INPUT_DIR: &str = "images";
pub const DEFAULT_OUTPUT_DIR: &str = "optimized-images";
pub const DEFAULT_MARKUP_FILE: &str = "picture-tags.html";
pub const STATS_FILE_NAME: &str = "optimization-stats.json";

pub const DEFAULT_JPEG_QUALITY: u8 = 85;
pub const DEFAULT_WEBP_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;
pub const DEFAULT_MAX_WIDTH: u32 = 1920;

/// Largest side the JPEG encoder accepts.
pub const MAX_JPEG_DIMENSION: u32 = u16::MAX as u32;

/// Estimated WebP size is 3/10 of the original (70% average reduction).
pub const ESTIMATE_NUMERATOR: u64 = 3;
pub const ESTIMATE_DENOMINATOR: u64 = 10;

/// Seconds of page load saved per MiB on a slow mobile connection.
pub const SECONDS_PER_MIB: f64 = 2.0;

pub const HIGH_PRIORITY_THRESHOLD: u64 = 5 * 1024 * 1024;

pub const REPORT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
pub const OPTIMIZE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];
pub const MARKUP_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub const DEFAULT_CSS_CLASS: &str = "img-responsive";
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

pub const PROGRESS_BAR_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

// Common output message prefixes
pub const FILE_PREFIX: &str = "📁";
pub const PHOTO_PREFIX: &str = "📸";
pub const SIZE_PREFIX: &str = "📦";
pub const WEBP_PREFIX: &str = "🚀";
pub const SAVINGS_PREFIX: &str = "💾";
pub const REPORT_PREFIX: &str = "📊";
pub const SUCCESS_PREFIX: &str = "✅";
pub const TOOLS_PREFIX: &str = "🛠️ ";
