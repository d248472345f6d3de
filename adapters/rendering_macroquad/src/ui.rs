//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use dungeon_crawl_rendering::StatusPresentation;
use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Caption of the button that discards the round.
pub(crate) const REGENERATE_BUTTON_LABEL: &str = "Generate New Dungeon";

/// Outcome of rendering the status panel for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct StatusPanelUiResult {
    /// Whether the regenerate button was pressed during this frame.
    pub(crate) regenerate_pressed: bool,
}

/// Snapshot of the status panel's layout for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StatusPanelUiContext {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour applied to the window skin so the UI matches the
    /// adapter's solid rectangle.
    pub(crate) background: Color,
}

/// Renders the status labels and the regenerate button.
pub(crate) fn draw_status_panel_ui(
    ui: &mut Ui,
    context: StatusPanelUiContext,
    status: &StatusPresentation,
) -> StatusPanelUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(16.0, 16.0, 16.0, 16.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .color_selected(Color::from_rgba(70, 70, 70, 255))
        .color_selected_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_inactive(Color::from_rgba(56, 56, 56, 200))
        .margin(RectOffset::new(0.0, 0.0, 8.0, 8.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut regenerate_pressed = false;
    let _ = ui.window(hash!("status_panel"), context.origin, context.size, |ui| {
        for line in status.lines() {
            ui.label(None, line.as_str());
        }
        ui.label(None, "Arrows or WASD move, R regenerates.");

        regenerate_pressed = ui.button(None, REGENERATE_BUTTON_LABEL);
    });

    ui.pop_skin();

    StatusPanelUiResult { regenerate_pressed }
}
