pub mod logger;

pub mod batch;
pub mod cli;
pub mod constants;
pub mod error;
pub mod formats;
pub mod markup;
pub mod processing;
pub mod report;
pub mod stats;
pub mod utils;
pub mod walker;

pub use batch::{optimize_batch, output_paths, run_optimizer, BatchReport, CodecPipeline, ImageEncoder};
pub use error::{ProcessingError, Result};
pub use markup::{alt_text_from_stem, make_fragment, run_markup};
pub use processing::{
    check_codecs, convert_to_modern, flatten_on_white, load_oriented, optimize_image,
    resize_to_max_width, scaled_dimensions, OptimizeOptions,
};
pub use report::{analyze, run_report, AnalysisReport};
pub use stats::OptimizationStats;
pub use utils::format_bytes;
pub use walker::{ImageWalker, SourceImage};
