//! UI components for Model Runner.

pub mod configs;
pub mod menu;
pub mod notifications;
pub mod settings;
pub mod status;

// Theme-aware colors for the UI
pub mod colors {
    use eframe::egui::{Color32, Visuals};

    /// Accent blue (same for both themes)
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);

    /// Success green
    pub const SUCCESS: Color32 = Color32::from_rgb(34, 197, 94);

    /// Error red
    pub const ERROR: Color32 = Color32::from_rgb(239, 68, 68);

    /// Get muted text color based on theme
    pub fn muted(visuals: &Visuals) -> Color32 {
        if visuals.dark_mode {
            Color32::from_rgb(156, 163, 175)
        } else {
            Color32::from_rgb(100, 100, 110)
        }
    }

    /// Get section card background based on theme
    pub fn card_bg(visuals: &Visuals) -> Color32 {
        if visuals.dark_mode {
            Color32::from_rgb(40, 40, 45)
        } else {
            Color32::from_rgb(245, 245, 250)
        }
    }

    /// Get notification background based on theme
    pub fn toast_bg(visuals: &Visuals) -> Color32 {
        if visuals.dark_mode {
            Color32::from_rgb(55, 55, 60)
        } else {
            Color32::from_rgb(240, 240, 245)
        }
    }

    /// Get border color based on theme
    pub fn border(visuals: &Visuals) -> Color32 {
        if visuals.dark_mode {
            Color32::from_rgb(70, 70, 75)
        } else {
            Color32::from_rgb(200, 200, 210)
        }
    }
}
