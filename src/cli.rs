use std::ops::RangeInclusive;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Figure numbers accepted by `--figure-num`.
pub const FIGURES: RangeInclusive<i64> = 4..=12;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Choose one of the figures to reproduce
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(FIGURES))]
    pub figure_num: u32,

    /// Directory holding the precomputed result arrays
    #[arg(long, default_value = "./Learning Curves")]
    pub results_dir: PathBuf,

    /// Directory the reproduced figure is written to (created if missing)
    #[arg(long, default_value = "./Learning Figures")]
    pub fig_dir: PathBuf,

    /// JSON file with extra or replacement figure settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output image format
    #[arg(long, value_enum, default_value_t = ImageKind::Jpg)]
    pub format: ImageKind,

    /// Save the figure without opening the viewer window
    #[arg(long, default_value_t = false)]
    pub no_show: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpg,
    Png,
}

impl ImageKind {
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpg => "jpg",
            ImageKind::Png => "png",
        }
    }
}
