//! Response display region

use crate::markup::{Inline, TextStyle};
use crate::ui::state::{AppState, ResponseView, THINKING_TEXT};
use crate::ui::theme::Theme;
use egui::{Color32, RichText};

/// Shown in the bubble when a reply has no visible content
pub const EMPTY_REPLY_TEXT: &str = "(empty response)";

/// Shows the placeholder, the assistant bubble or the last error
pub struct ResponsePanel<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> ResponsePanel<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .id_salt("response_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| match &self.state.response {
                ResponseView::Empty => self.show_empty_state(ui),
                ResponseView::Thinking => {
                    self.show_bubble(ui, "Assistant status: thinking", |ui| {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(
                                RichText::new(THINKING_TEXT)
                                    .italics()
                                    .color(self.theme.text_muted),
                            );
                        });
                    });
                }
                ResponseView::Reply(reply) => {
                    let label = format!("Assistant response: {}", reply.plain_text);
                    self.show_bubble(ui, &label, |ui| {
                        if reply.document.is_empty() {
                            ui.label(
                                RichText::new(EMPTY_REPLY_TEXT)
                                    .italics()
                                    .color(self.theme.text_muted),
                            );
                        } else {
                            self.show_inlines(ui, reply.document.inlines());
                        }
                    });
                }
                ResponseView::Failed(message) => {
                    let label = format!("Assistant error: {}", message);
                    self.show_bubble(ui, &label, |ui| {
                        ui.label(RichText::new(message).color(self.theme.error));
                    });
                }
            });
    }

    fn show_empty_state(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.label(
                RichText::new("How can I help?")
                    .size(18.0)
                    .color(self.theme.text_muted),
            );
        });
    }

    /// Assistant bubble; `label` is exposed to accessibility
    fn show_bubble(&self, ui: &mut egui::Ui, label: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        ui.add_space(self.theme.spacing_sm);

        let response = egui::Frame::none()
            .fill(self.theme.assistant_bubble)
            .rounding(self.theme.bubble_rounding)
            .inner_margin(egui::Margin::symmetric(14.0, 10.0))
            .show(ui, |ui| {
                ui.set_max_width(ui.available_width());
                add_contents(ui);
            })
            .response;

        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, label));
    }

    fn show_inlines(&self, ui: &mut egui::Ui, inlines: &[Inline]) {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;

            for inline in inlines {
                match inline {
                    Inline::Text { text, style } => {
                        ui.label(self.styled(text, *style, self.theme.text_primary));
                    }
                    Inline::Link { text, href, style } => {
                        ui.hyperlink_to(self.styled(text, *style, self.theme.primary), href)
                            .on_hover_text(href);
                    }
                    Inline::LineBreak => ui.end_row(),
                }
            }
        });
    }

    fn styled(&self, text: &str, style: TextStyle, color: Color32) -> RichText {
        let mut rich = RichText::new(text).color(color);
        if style.bold {
            rich = rich.strong();
        }
        if style.italic {
            rich = rich.italics();
        }
        if style.underline {
            rich = rich.underline();
        }
        if style.code {
            rich = rich.code();
        }
        rich
    }
}
