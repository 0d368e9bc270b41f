//! Main application struct and eframe integration

use crate::ui::components::{AlertDialog, QueryForm, ResponsePanel, SpeechControls};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{CentralPanel, RichText, TopBottomPanel};
use std::time::Duration;
use tracing::info;

/// Main assistant application
pub struct AssistantApp {
    state: AppState,
    theme: Theme,
}

impl AssistantApp {
    /// Create the application and style the egui context
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        let theme = Theme::light();
        theme.apply(&cc.egui_ctx);

        Self { state, theme }
    }

    /// Create the application without an eframe context
    pub fn with_state(state: AppState) -> Self {
        Self {
            state,
            theme: Theme::light(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Poll background work and draw one frame
    pub fn ui(&mut self, ctx: &egui::Context) {
        self.state.poll_events();

        self.show_header(ctx);
        self.show_input_area(ctx);
        self.show_content(ctx);
        AlertDialog::new(&mut self.state, &self.theme).show(ctx);

        // Completions arrive off the UI thread
        if self.state.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.primary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new("AI Assistant")
                            .size(22.0)
                            .strong()
                            .color(self.theme.text_on_accent),
                    );
                });
            });
    }

    fn show_input_area(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                QueryForm::new(&mut self.state, &self.theme).show(ui);
                ui.add_space(self.theme.spacing_sm);
                SpeechControls::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                ResponsePanel::new(&self.state, &self.theme).show(ui);
            });
    }
}

impl eframe::App for AssistantApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Assistant window closed");
    }
}
