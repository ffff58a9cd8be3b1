//! Screen-space status text.

use std::time::Duration;

use boss_arena_rendering::HudOverlay;
use macroquad::{
    camera::set_default_camera,
    color::{Color, RED, WHITE},
    text::{draw_text, measure_text},
    window::{screen_height, screen_width},
};

const MARGIN: f32 = 12.0;

/// Status lines listed in the top-left corner, top to bottom.
pub(crate) fn status_lines(hud: &HudOverlay) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);
    if !hud.banner.is_empty() {
        lines.push(hud.banner.clone());
    }
    if let Some((current, max)) = hud.boss_hit_points {
        lines.push(format!("Boss HP: {current}/{max}"));
    }
    lines.push(heavy_status(hud.heavy_cooldown));
    lines
}

fn heavy_status(remaining: Duration) -> String {
    if remaining.is_zero() {
        "Heavy ready".to_owned()
    } else {
        format!("Heavy: {:.1}s", remaining.as_secs_f32())
    }
}

/// Draws the overlay without the world camera.
pub(crate) fn draw_overlay(hud: &HudOverlay, font_size: f32) {
    set_default_camera();

    let line_height = font_size * 1.2;
    for (row, line) in status_lines(hud).iter().enumerate() {
        let baseline = MARGIN + line_height * (row as f32 + 1.0);
        draw_text(line, MARGIN, baseline, font_size, WHITE);
    }

    if let Some(message) = &hud.game_over {
        let size = font_size * 2.0;
        let extent = measure_text(message, None, size as u16, 1.0);
        let x = (screen_width() - extent.width) * 0.5;
        let y = screen_height() * 0.5;
        draw_text(message, x, y, size, banner_color());
    }
}

fn banner_color() -> Color {
    Color::new(RED.r, RED.g, RED.b, 0.9)
}
