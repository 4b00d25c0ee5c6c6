use anyhow::{Result, anyhow};
use eframe::egui;

use crate::state::{Tab, ViewerState};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FigureViewerApp {
    pub state: ViewerState,
}

impl FigureViewerApp {
    pub fn new(state: ViewerState) -> Self {
        Self { state }
    }
}

impl eframe::App for FigureViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: figure ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.tab {
            Tab::Interactive => plot::figure_plot(ui, &self.state),
            Tab::Saved => plot::saved_image(ui, &self.state),
        });
    }
}

/// Open the viewer window and block until it is closed.
pub fn show(state: ViewerState) -> Result<()> {
    let (w, h) = state.figure.style.pixel_size();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([w as f32, h as f32])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let title = state.title();
    eframe::run_native(
        &title,
        options,
        Box::new(|cc| {
            // Install image loaders so the saved jpg/png can be displayed.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(FigureViewerApp::new(state)))
        }),
    )
    .map_err(|e| anyhow!("viewer window failed: {e}"))
}
