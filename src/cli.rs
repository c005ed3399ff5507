use crate::constants::{DEFAULT_INPUT_DIR, DEFAULT_MARKUP_FILE, DEFAULT_OUTPUT_DIR};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "picture-kit",
    about = "Batch image tooling for websites",
    long_about = "picture-kit prepares a website's image folder for the web. It reports how much \
                  could be saved, writes an optimized JPEG and a WebP copy of every image, and \
                  generates <picture> markup that serves the WebP with a JPEG fallback. \
                  Every command works without arguments using the default folder layout.",
    version,
    after_help = "EXAMPLES:\n  \
    picture-kit report\n  \
    picture-kit optimize\n  \
    picture-kit optimize -i photos -o web/photos -q 80 -w 1600\n  \
    picture-kit markup"
)]
pub struct Args {
    #[arg(short = 'Q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print per-stage details")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Estimate the savings of converting images to WebP",
        long_about = "Scan the image folder and print each file's size with an estimated WebP \
                      size (70% average reduction), followed by totals and recommendations. \
                      No files are written."
    )]
    Report {
        #[arg(short = 'i', long, default_value = DEFAULT_INPUT_DIR, help = "Image folder to scan")]
        input: PathBuf,
    },

    #[command(
        about = "Write an optimized JPEG and a WebP copy of every image",
        long_about = "Mirror the image folder into the output folder. Every JPEG/PNG/GIF is \
                      orientation-corrected, downscaled to the maximum width, flattened onto \
                      white and saved as a progressive JPEG; a WebP copy is saved next to it."
    )]
    Optimize {
        #[arg(short = 'i', long, default_value = DEFAULT_INPUT_DIR, help = "Image folder to read")]
        input: PathBuf,

        #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR, help = "Folder for optimized images")]
        output: PathBuf,

        #[arg(
            short = 'q',
            long,
            help = "JPEG quality (1-100, default: 85)"
        )]
        quality: Option<u8>,

        #[arg(long, help = "WebP quality (1-100, default: 80)")]
        webp_quality: Option<u8>,

        #[arg(
            short = 'w',
            long,
            help = "Maximum width in pixels (default: 1920)",
            long_help = "Images wider than this are downscaled, preserving the aspect ratio. \
                         Narrower images keep their size."
        )]
        max_width: Option<u32>,
    },

    #[command(
        about = "Generate <picture> tags for the optimized images",
        long_about = "Scan the optimized folder and write one HTML file with a <picture> tag per \
                      image, plus recommended CSS and a lazy-loading script. The file is \
                      overwritten on every run."
    )]
    Markup {
        #[arg(short = 'i', long, default_value = DEFAULT_OUTPUT_DIR, help = "Optimized image folder")]
        input: PathBuf,

        #[arg(short = 'o', long, default_value = DEFAULT_MARKUP_FILE, help = "HTML file to write")]
        output: PathBuf,

        #[arg(
            long,
            help = "URL prefix for image paths (default: the folder name)"
        )]
        web_prefix: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_without_arguments() {
        let args = Args::try_parse_from(["picture-kit", "optimize"]).unwrap();
        match args.command {
            Commands::Optimize {
                input,
                output,
                quality,
                webp_quality,
                max_width,
            } => {
                assert_eq!(input, PathBuf::from("images"));
                assert_eq!(output, PathBuf::from("optimized-images"));
                assert_eq!(quality, None);
                assert_eq!(webp_quality, None);
                assert_eq!(max_width, None);
            }
            _ => panic!("expected optimize"),
        }

        let args = Args::try_parse_from(["picture-kit", "markup"]).unwrap();
        match args.command {
            Commands::Markup { input, output, web_prefix } => {
                assert_eq!(input, PathBuf::from("optimized-images"));
                assert_eq!(output, PathBuf::from("picture-tags.html"));
                assert_eq!(web_prefix, None);
            }
            _ => panic!("expected markup"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = Args::try_parse_from(["picture-kit", "report", "--quiet"]).unwrap();
        assert!(args.quiet);
        assert!(!args.verbose);
    }
}
