//! Theme and styling for the assistant window

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Vec2, Visuals};

/// Application theme configuration
#[derive(Clone, Debug)]
pub struct Theme {
    /// Header and accent color
    pub primary: Color32,
    /// Send button color
    pub action: Color32,
    /// Error color
    pub error: Color32,

    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,

    pub text_primary: Color32,
    pub text_muted: Color32,
    pub text_on_accent: Color32,

    /// Fill of the assistant bubble
    pub assistant_bubble: Color32,
    /// Microphone color while listening
    pub listening: Color32,

    pub button_rounding: Rounding,
    pub bubble_rounding: Rounding,

    pub spacing: f32,
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    /// Light theme in the assistant's house colors
    pub fn light() -> Self {
        Self {
            primary: Color32::from_rgb(74, 144, 226), // #4A90E2
            action: Color32::from_rgb(76, 175, 80),   // #4CAF50
            error: Color32::from_rgb(220, 38, 38),

            bg_primary: Color32::from_rgb(244, 244, 249), // #F4F4F9
            bg_secondary: Color32::from_rgb(255, 255, 255),
            bg_tertiary: Color32::from_rgb(229, 231, 235),

            text_primary: Color32::from_rgb(51, 51, 51), // #333333
            text_muted: Color32::from_rgb(107, 114, 128),
            text_on_accent: Color32::WHITE,

            assistant_bubble: Color32::from_rgb(232, 234, 246), // #E8EAF6
            listening: Color32::from_rgb(220, 38, 38),

            button_rounding: Rounding::same(8.0),
            bubble_rounding: Rounding::same(14.0),

            spacing: 16.0,
            spacing_sm: 8.0,
        }
    }

    /// Apply this theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::light();

        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        visuals.extreme_bg_color = self.bg_secondary;

        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text_primary);
        visuals.widgets.inactive.bg_fill = self.bg_tertiary;
        visuals.widgets.hovered.bg_fill = self.primary.gamma_multiply(0.8);
        visuals.widgets.active.bg_fill = self.primary;

        visuals.selection.bg_fill = self.primary.gamma_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, self.primary);
        visuals.hyperlink_color = self.primary;

        visuals.window_rounding = self.bubble_rounding;
        visuals.window_stroke = Stroke::new(1.0, self.bg_tertiary);

        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::splat(self.spacing_sm);
        style.spacing.button_padding = Vec2::new(self.spacing_sm * 1.5, self.spacing_sm);
        style.text_styles.insert(
            egui::TextStyle::Heading,
            FontId::new(20.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Body,
            FontId::new(15.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            FontId::new(15.0, FontFamily::Proportional),
        );
        ctx.set_style(style);
    }
}
