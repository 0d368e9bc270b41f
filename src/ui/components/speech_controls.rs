//! Read-aloud and microphone buttons

use crate::ui::components::{MICROPHONE_LABEL, SPEAK_LABEL};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{RichText, Vec2};

pub struct SpeechControls<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> SpeechControls<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            self.show_speak_button(ui);
            self.show_microphone_button(ui);
        });
    }

    fn show_speak_button(&mut self, ui: &mut egui::Ui) {
        let enabled = self.state.speech_output.is_available();

        let button = egui::Button::new(RichText::new("🔊 Speak").color(self.theme.text_primary))
            .min_size(Vec2::new(96.0, 36.0))
            .rounding(self.theme.button_rounding);

        let response = ui.add_enabled(enabled, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, SPEAK_LABEL)
        });

        let clicked = response.clicked();
        match self.state.speech_output.unavailable_reason() {
            Some(reason) => {
                response.on_disabled_hover_text(reason);
            }
            None => {
                response.on_hover_text("Read the last response aloud");
            }
        }

        if clicked {
            self.state.speak_last_response();
        }
    }

    fn show_microphone_button(&mut self, ui: &mut egui::Ui) {
        let listening = self.state.speech_input.is_listening();
        let enabled = self.state.speech_input.is_available() && !listening;

        let (text, fill) = if listening {
            ("🎤 Listening...", self.theme.listening.gamma_multiply(0.3))
        } else {
            ("🎤 Dictate", self.theme.bg_tertiary)
        };

        let button = egui::Button::new(RichText::new(text).color(self.theme.text_primary))
            .min_size(Vec2::new(120.0, 36.0))
            .rounding(self.theme.button_rounding)
            .fill(fill);

        let response = ui.add_enabled(enabled, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, MICROPHONE_LABEL)
        });

        let clicked = response.clicked();
        match self.state.speech_input.unavailable_reason() {
            Some(reason) => {
                response.on_disabled_hover_text(reason);
            }
            None if listening => {
                response.on_disabled_hover_text("Listening...");
            }
            None => {
                response.on_hover_text("Fill the query from your voice");
            }
        }

        if clicked {
            self.state.start_dictation();
        }
    }
}
