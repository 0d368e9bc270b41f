//! Query input form

use crate::ui::components::{QUERY_INPUT_LABEL, SEND_LABEL};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{Key, RichText, Vec2};

/// Single-line query field with a send button
///
/// Enter inside the field and a click on the button both submit. The
/// current text is sent as typed, including when it is empty.
pub struct QueryForm<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> QueryForm<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            // Reserve space for the send button
            let available_width = ui.available_width() - 80.0;

            let text_edit = egui::TextEdit::singleline(&mut self.state.input_text)
                .hint_text("Ask me anything...")
                .desired_width(available_width)
                .font(egui::TextStyle::Body)
                .margin(egui::Margin::symmetric(12.0, 8.0))
                .id(egui::Id::new("query_input"));

            let response = ui.add(text_edit);
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, QUERY_INPUT_LABEL)
            });

            let enter_submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));

            let button = egui::Button::new(
                RichText::new(SEND_LABEL)
                    .strong()
                    .color(self.theme.text_on_accent),
            )
            .min_size(Vec2::new(64.0, 36.0))
            .rounding(self.theme.button_rounding)
            .fill(self.theme.action);

            let send = ui.add(button);
            send.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Button, true, SEND_LABEL)
            });

            if enter_submitted || send.clicked() {
                self.state.submit_query();
            }
        });
    }
}
