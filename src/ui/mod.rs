//! Desktop user interface
//!
//! An eframe window with a query form, the response region and the
//! speech controls.

mod app;
pub mod components;
mod state;
mod theme;

pub use app::AssistantApp;
pub use state::{failure_text, AppState, ResponseView, THINKING_TEXT};
pub use theme::Theme;

use crate::config::AssistConfig;
use tracing::{error, info};

/// Open the assistant window and block until it is closed
pub fn run(config: AssistConfig) -> eframe::Result<()> {
    let state = AppState::connect(&config).map_err(|e| {
        error!("Failed to start assistant: {}", e);
        eframe::Error::AppCreation(Box::new(e))
    })?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(&config.window.title)
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([320.0, 400.0]),
        ..Default::default()
    };

    info!("Opening window \"{}\"", config.window.title);
    eframe::run_native(
        &config.window.title,
        options,
        Box::new(|cc| Ok(Box::new(AssistantApp::new(cc, state)))),
    )
}
