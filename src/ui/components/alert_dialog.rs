//! Blocking alert window

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::RichText;

/// Shows the oldest pending alert until it is acknowledged
pub struct AlertDialog<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> AlertDialog<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ctx: &egui::Context) {
        let Some(message) = self.state.current_alert().map(str::to_owned) else {
            return;
        };

        let queued = self.state.alert_count().saturating_sub(1);
        let mut acknowledged = false;

        egui::Modal::new(egui::Id::new("alert_dialog")).show(ctx, |ui| {
            ui.set_max_width(320.0);
            ui.heading("Alert");
            ui.add_space(self.theme.spacing_sm);
            ui.label(RichText::new(&message).color(self.theme.text_primary));
            if queued > 0 {
                ui.label(
                    RichText::new(format!("{} more pending", queued))
                        .small()
                        .color(self.theme.text_muted),
                );
            }
            ui.add_space(self.theme.spacing_sm);

            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    acknowledged = true;
                }
            });
        });

        if acknowledged {
            self.state.dismiss_alert();
        }
    }
}
