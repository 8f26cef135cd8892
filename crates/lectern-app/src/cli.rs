//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use kurbo::Size;
use lectern_core::ContainerRect;
use std::path::PathBuf;

/// Render paged documents and capture page regions
#[derive(Parser, Debug, Clone)]
#[command(name = "lectern", version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Config file path (TOML)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory holding one sub-directory of page images per document
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub library: Option<PathBuf>,

    /// Directory for the region memory (default: platform data dir)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub storage: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render one page and optionally save it as an image
    Render {
        /// Document identifier
        document: String,

        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Number of zoom-in steps after fitting
        #[arg(long, default_value_t = 0)]
        zoom_in: u32,

        /// Number of zoom-out steps after fitting
        #[arg(long, default_value_t = 0)]
        zoom_out: u32,

        /// Viewport size as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_size)]
        container: Option<Size>,

        /// Print the page's selectable text
        #[arg(long)]
        text: bool,

        /// Save the rendered page to this file
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        out: Option<PathBuf>,
    },

    /// Capture a region of a fitted page into the region memory
    Capture {
        /// Document identifier
        document: String,

        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Selection in viewport pixels as LEFT,TOP,WIDTH,HEIGHT
        #[arg(short, long, value_parser = parse_rect)]
        rect: ContainerRect,

        /// Viewport size as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_size)]
        container: Option<Size>,

        /// Also save the captured image to this file
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        out: Option<PathBuf>,
    },

    /// List the documents in the library
    Documents,

    /// Inspect or reset the region memory
    Regions {
        #[command(subcommand)]
        action: RegionsCommand,
    },

    /// Print the chat request a message would send
    Ask {
        /// The question
        message: String,

        /// Language the answer should be written in
        #[arg(long)]
        language: Option<String>,

        /// Attach a remembered region
        #[arg(long, value_name = "REGION_ID")]
        reuse: Option<String>,
    },
}

/// Region memory subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum RegionsCommand {
    /// List remembered regions, newest first
    List {
        /// Show every region instead of the most recent few
        #[arg(short, long)]
        all: bool,
    },
    /// Show one remembered region
    Reuse {
        /// Region identifier
        id: String,
    },
    /// Forget all remembered regions
    Clear,
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_size(value: &str) -> Result<Size, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{}`", value))?;
    let width = parse_positive(w)?;
    let height = parse_positive(h)?;
    Ok(Size::new(width, height))
}

/// Parse `LEFT,TOP,WIDTH,HEIGHT`.
pub fn parse_rect(value: &str) -> Result<ContainerRect, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [left, top, width, height] = parts.as_slice() else {
        return Err(format!("expected LEFT,TOP,WIDTH,HEIGHT, got `{}`", value));
    };
    Ok(ContainerRect::new(
        parse_number(left)?,
        parse_number(top)?,
        parse_positive(width)?,
        parse_positive(height)?,
    ))
}

fn parse_number(value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("`{}` is not a number", value))
}

fn parse_positive(value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(format!("`{}` is not a positive number", value)),
    }
}
