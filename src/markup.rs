//! `<picture>` markup for an optimized image tree.
//!
//! Every JPEG/PNG found under the optimizer's output root gets a fragment
//! pointing at its WebP sibling with the JPEG as fallback. The fragments are
//! written into one HTML file along with CSS and a lazy-loading script meant
//! to be pasted into the site by hand.

use crate::constants::{
    DEFAULT_CSS_CLASS, FILE_PREFIX, MARKUP_EXTENSIONS, SUCCESS_PREFIX, TIMESTAMP_FORMAT,
};
use crate::error::{ProcessingError, Result};
use crate::formats::ImageKind;
use crate::stats::{load_stats, StatsRecord};
use crate::utils::format_bytes;
use crate::walker::ImageWalker;
use crate::{error, info, warn};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Escapes text for use inside a double-quoted HTML attribute.
pub fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `path` with its extension (if any) removed.
fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

/// Builds a `<picture>` element with a WebP source and a JPEG fallback,
/// both derived from `path` by swapping its extension.
pub fn make_fragment(path: &str, alt: &str, css_classes: &str, lazy: bool) -> String {
    let base = strip_extension(path);
    let webp_path = format!("{}.{}", base, ImageKind::WebP.extension());
    let jpg_path = format!("{}.{}", base, ImageKind::Jpeg.extension());

    let lazy_attr = if lazy { r#" loading="lazy""# } else { "" };
    let class_attr = if css_classes.is_empty() {
        String::new()
    } else {
        format!(r#" class="{}""#, escape_attr(css_classes))
    };

    format!(
        "<picture>\n    <source srcset=\"{}\" type=\"{}\">\n    <img src=\"{}\" alt=\"{}\"{}{}>\n</picture>",
        escape_attr(&webp_path),
        ImageKind::WebP.mime_type(),
        escape_attr(&jpg_path),
        escape_attr(alt),
        class_attr,
        lazy_attr
    )
}

/// Human label from a file stem: separators become spaces, then each
/// alphabetic run is capitalized (`dica-especialista_2x` -> `Dica Especialista 2X`).
pub fn alt_text_from_stem(stem: &str) -> String {
    let mut label = String::with_capacity(stem.len());
    let mut previous_cased = false;
    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if previous_cased {
                label.extend(c.to_lowercase());
            } else {
                label.extend(c.to_uppercase());
            }
            previous_cased = true;
        } else {
            label.push(c);
            previous_cased = false;
        }
    }
    label
}

/// Joins a prefix and a relative path with forward slashes.
pub fn web_path(prefix: &str, relative: &Path) -> String {
    let relative = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        relative
    } else {
        format!("{}/{}", prefix, relative)
    }
}

fn savings_comment(stats: Option<&StatsRecord>) -> String {
    match stats {
        Some(record) if record.stats.original_bytes > 0 => format!(
            "<!-- {:.1}% smaller - {} saved across {} images (optimized {}) -->",
            record.stats.savings_percent(),
            format_bytes(record.stats.saved_bytes()),
            record.stats.files_processed,
            record.generated_at.format(TIMESTAMP_FORMAT)
        ),
        _ => "<!-- No optimization statistics found: run `picture-kit optimize` first -->"
            .to_string(),
    }
}

/// Builds the complete HTML document for every image under `walker`.
pub fn generate(
    walker: &ImageWalker,
    web_prefix: &str,
    stats: Option<&StatsRecord>,
    generated_at: DateTime<Local>,
) -> Result<(String, usize)> {
    let mut output = String::from("<!-- 🚀 OPTIMIZED PICTURE TAGS -->\n");
    output.push_str(&format!(
        "<!-- Generated automatically on {} -->\n",
        generated_at.format(TIMESTAMP_FORMAT)
    ));
    output.push_str(&savings_comment(stats));
    output.push_str("\n\n");

    let mut count = 0;
    for path in walker.iter() {
        let path = match path {
            Ok(path) => path,
            Err(e) => {
                error!("Failed to read entry: {}", e);
                continue;
            }
        };
        let relative = path
            .strip_prefix(walker.root())
            .map_err(|_| ProcessingError::OutsideRoot {
                path: path.clone(),
                root: walker.root().to_path_buf(),
            })?;
        let stem = relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let alt = alt_text_from_stem(&stem);
        let fragment = make_fragment(&web_path(web_prefix, relative), &alt, DEFAULT_CSS_CLASS, true);

        output.push_str(&format!("<!-- {} -->\n{}\n\n", web_path("", relative), fragment));
        info!("{} {}", SUCCESS_PREFIX, relative.display());
        count += 1;
    }

    output.push_str(STYLE_BLOCK);
    output.push_str(SCRIPT_BLOCK);
    output.push_str(USAGE_BLOCK);
    Ok((output, count))
}

#[derive(Debug, Clone)]
pub struct MarkupConfig {
    /// The optimizer's output root.
    pub input: PathBuf,
    pub output_file: PathBuf,
    /// Prefix for generated URLs; the input directory name when `None`.
    pub web_prefix: Option<String>,
}

impl MarkupConfig {
    pub fn resolved_prefix(&self) -> String {
        match &self.web_prefix {
            Some(prefix) => prefix.clone(),
            None => self
                .input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Entry point of the `markup` command. Returns the number of fragments
/// written, or `None` when the input directory does not exist.
pub fn run_markup(config: &MarkupConfig) -> Result<Option<usize>> {
    info!("🖼️  PICTURE TAG GENERATOR\n");

    let walker = match ImageWalker::new(&config.input, MARKUP_EXTENSIONS) {
        Ok(walker) => walker,
        Err(ProcessingError::DirectoryNotFound(path)) => {
            error!("Directory not found: {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let stats = match load_stats(walker.root()) {
        Ok(stats) => stats,
        Err(e) => {
            warn!("Ignoring unreadable statistics file: {}", e);
            None
        }
    };

    let (document, count) = generate(
        &walker,
        &config.resolved_prefix(),
        stats.as_ref(),
        Local::now(),
    )?;
    fs::write(&config.output_file, document)?;

    info!("\n{} File generated: {}", FILE_PREFIX, config.output_file.display());
    info!("🎯 Copy the tags into your HTML!");
    if let Some(record) = &stats {
        info!(
            "💡 Images are {:.1}% smaller after optimization!",
            record.stats.savings_percent()
        );
    }
    Ok(Some(count))
}

const STYLE_BLOCK: &str = r#"
<!-- 🎨 RECOMMENDED CSS -->
<style>
.img-responsive {
    max-width: 100%;
    height: auto;
    display: block;
}

/* Card container for images with captions */
.tip {
    display: flex;
    flex-direction: column;
    gap: 15px;
    padding: 20px;
    border-radius: 10px;
    background: var(--bg-secondary);
}

.tip picture {
    width: 100%;
    border-radius: 8px;
    overflow: hidden;
}

.tip img {
    width: 100%;
    height: 200px;
    object-fit: contain;
    background: #f8f9fa;
}

/* Lazy loading fade-in */
img[loading="lazy"] {
    opacity: 0;
    transition: opacity 0.3s ease-in-out;
}

img[loading="lazy"].loaded {
    opacity: 1;
}

/* Browsers without WebP fall back to the <img> */
.no-webp picture source[type="image/webp"] {
    display: none;
}

@media (min-width: 768px) {
    .tips-container {
        display: grid;
        grid-template-columns: repeat(2, 1fr);
        gap: 20px;
    }
}

@media (min-width: 1024px) {
    .tips-container {
        grid-template-columns: repeat(3, 1fr);
    }
}
</style>
"#;

const SCRIPT_BLOCK: &str = r#"
<!-- 📱 JAVASCRIPT FOR LAZY LOADING AND WEBP DETECTION -->
<script>
function supportsWebP() {
    const canvas = document.createElement('canvas');
    canvas.width = canvas.height = 1;
    return canvas.toDataURL('image/webp').startsWith('data:image/webp');
}

if (!supportsWebP()) {
    document.documentElement.classList.add('no-webp');
}

const imageObserver = new IntersectionObserver((entries, observer) => {
    entries.forEach(entry => {
        if (entry.isIntersecting) {
            const img = entry.target;
            img.classList.add('loaded');
            observer.unobserve(img);
        }
    });
}, {
    // start loading 50px before the image scrolls into view
    rootMargin: '50px 0px',
    threshold: 0.01
});

document.addEventListener('DOMContentLoaded', () => {
    document.querySelectorAll('img[loading="lazy"]').forEach(img => {
        imageObserver.observe(img);
    });
});

window.addEventListener('load', () => {
    console.log('📊 Performance:', {
        'Total images': document.querySelectorAll('img').length,
        'Lazy images': document.querySelectorAll('img[loading="lazy"]').length,
        'WebP support': supportsWebP()
    });
});
</script>
"#;

const USAGE_BLOCK: &str = r#"
<!-- 📋 USAGE EXAMPLE -->
<!--
<div class="tips-container">
    <div class="tip">
        <picture>
            <source srcset="optimized-images/store/keep-your-laptop-cool.webp" type="image/webp">
            <img src="optimized-images/store/keep-your-laptop-cool.jpg"
                 alt="Keep Your Laptop Cool"
                 class="img-responsive"
                 loading="lazy">
        </picture>
        <h3>Avoid overheating</h3>
        <p>Keep the fans clean and use the laptop on a firm surface.</p>
    </div>
</div>
-->
"#;
