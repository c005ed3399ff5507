use anyhow::Context;
use clap::Parser;
use picture_kit::batch::{run_optimizer, OptimizerConfig};
use picture_kit::cli::{Args, Commands};
use picture_kit::logger::{self, Verbosity};
use picture_kit::markup::{run_markup, MarkupConfig};
use picture_kit::processing::OptimizeOptions;
use picture_kit::report::{run_report, ReportConfig};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(Verbosity::from_flags(args.quiet, args.verbose));

    match args.command {
        Commands::Report { input } => {
            run_report(&ReportConfig { input }).context("image analysis failed")?;
        }
        Commands::Optimize {
            input,
            output,
            quality,
            webp_quality,
            max_width,
        } => {
            let options = OptimizeOptions::new(quality, webp_quality, max_width)?;
            let config = OptimizerConfig {
                input,
                output,
                options,
            };
            run_optimizer(&config).context("image optimization failed")?;
        }
        Commands::Markup {
            input,
            output,
            web_prefix,
        } => {
            let config = MarkupConfig {
                input,
                output_file: output,
                web_prefix,
            };
            run_markup(&config)
                .with_context(|| format!("failed to write {}", config.output_file.display()))?;
        }
    }

    Ok(())
}
