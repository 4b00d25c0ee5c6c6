use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{Status, Tab, ViewerState};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Save as…").clicked() {
                save_file_dialog(ui.ctx(), state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.tab, Tab::Interactive, "Interactive");
        ui.selectable_value(&mut state.tab, Tab::Saved, "Saved image");

        ui.separator();

        let n_series = state.figure.series.len();
        ui.label(format!("Figure {}, {n_series} series", state.figure.number));

        match &state.status {
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(ctx: &egui::Context, state: &mut ViewerState) {
    let default_name = state
        .saved_path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}_reproduced.jpg", state.figure.number));

    let file = rfd::FileDialog::new()
        .set_title("Save figure")
        .set_file_name(default_name)
        .add_filter("JPEG", &["jpg", "jpeg"])
        .add_filter("PNG", &["png"])
        .save_file();

    if let Some(path) = file {
        // Drop the cached texture so the "Saved image" tab shows the new file.
        if let Some(uri) = state.saved_uri() {
            ctx.forget_image(&uri);
        }
        state.export(&path);
        if let Some(uri) = state.saved_uri() {
            ctx.forget_image(&uri);
        }
    }
}
