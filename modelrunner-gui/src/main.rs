//! Model Runner GUI Application
//!
//! A native desktop editor for local model server presets.

mod app;
mod ui;

use eframe::egui;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("modelrunner=debug".parse().unwrap())
                .add_directive("modelrunner_core=debug".parse().unwrap())
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Model Runner v{}", modelrunner_core::VERSION);

    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    // Window configuration
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 720.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Model Runner - Configs"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Model Runner",
        options,
        Box::new(|cc| Ok(Box::new(app::ModelRunnerApp::new(cc, runtime)))),
    )
}
