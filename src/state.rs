use std::path::{Path, PathBuf};

use crate::figure::prepare::PreparedFigure;
use crate::render;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Zoomable egui plot of the figure.
    Interactive,
    /// The image file written to disk.
    Saved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// The figure being shown.
    pub figure: PreparedFigure,

    /// Most recent image file written for this figure.
    pub saved_path: Option<PathBuf>,

    pub tab: Tab,

    /// Status / error message shown in the top bar.
    pub status: Option<Status>,
}

impl ViewerState {
    pub fn new(figure: PreparedFigure, saved_path: Option<PathBuf>) -> Self {
        Self {
            figure,
            saved_path,
            tab: Tab::Interactive,
            status: None,
        }
    }

    pub fn title(&self) -> String {
        format!("Figure {} (reproduced)", self.figure.number)
    }

    /// Render the figure to `path`; on success it becomes the saved image.
    pub fn export(&mut self, path: &Path) {
        match render::save_figure(&self.figure, path) {
            Ok(()) => {
                self.status = Some(Status::Info(format!("Saved {}", path.display())));
                self.saved_path = Some(path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to save figure: {e:#}");
                self.status = Some(Status::Error(format!("Error: {e:#}")));
            }
        }
    }

    /// `file://` URI of the saved image, for egui's image loaders.
    pub fn saved_uri(&self) -> Option<String> {
        self.saved_path
            .as_ref()
            .map(|p| format!("file://{}", p.display()))
    }
}
