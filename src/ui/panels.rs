use egui::{Color32, Context, RichText, ScrollArea, Ui};

use crate::scene::{LoadStatus, SceneKind};
use crate::ui::state::{FrameStats, UiState};
use crate::ui::theme::*;

#[derive(Default)]
pub struct UiActions {
    pub switch_scene: Option<SceneKind>,
    pub toggle_music: bool,
    pub reset_camera: bool,
}

pub fn draw_side_panel(
    ctx: &Context,
    state: &mut UiState,
    stats: &FrameStats,
    status: Option<&LoadStatus>,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(260.0)
        .max_width(340.0)
        .default_width(280.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(RichText::new("heart3d").color(ACCENT_PINK).strong());
                ui.label(RichText::new(state.scene.label()).color(TEXT_MUTED).size(11.0));
                ui.add_space(16.0);

                section_header(ui, "SCENE");
                for kind in SceneKind::ALL {
                    let selected = state.scene == kind;
                    let button = egui::Button::new(RichText::new(kind.label()).color(if selected {
                        BG_NIGHT
                    } else {
                        TEXT_PRIMARY
                    }))
                    .fill(if selected { ACCENT_PINK } else { BG_WIDGET })
                    .min_size(egui::vec2(ui.available_width(), 28.0));

                    if ui.add(button).clicked() && !selected {
                        actions.switch_scene = Some(kind);
                    }
                }
                ui.add_space(16.0);

                section_header(ui, "CONTROLS");
                scene_controls(ui, state, &mut actions);
                ui.add_space(16.0);

                if let Some(status) = status {
                    load_panel(ui, status);
                    ui.add_space(16.0);
                }

                ui.separator();
                ui.add_space(12.0);

                section_header(ui, "DISPLAY");
                ui.horizontal(|ui| {
                    ui.checkbox(&mut state.vsync_enabled, "VSync");
                    ui.checkbox(&mut state.show_stats, "Stats");
                    ui.checkbox(&mut state.show_help, "Help");
                });
                ui.add_space(16.0);

                if state.show_stats {
                    stats_panel(ui, stats);
                }
            });
        });

    actions
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn toggle_button(ui: &mut Ui, label: &str, on: bool, accent: Color32) -> bool {
    let text = format!("{label}: {}", if on { "on" } else { "off" });
    ui.add(
        egui::Button::new(RichText::new(text).color(if on { BG_NIGHT } else { TEXT_PRIMARY }))
            .fill(if on { accent } else { BG_WIDGET })
            .min_size(egui::vec2(ui.available_width(), 28.0)),
    )
    .clicked()
}

fn scene_controls(ui: &mut Ui, state: &mut UiState, actions: &mut UiActions) {
    if toggle_button(ui, "Auto-rotate", state.auto_rotate, ACCENT_LAVENDER) {
        state.auto_rotate = !state.auto_rotate;
    }

    // Only the heart scenes follow the theme.
    let themed = matches!(state.scene, SceneKind::Heart | SceneKind::HeartTrail);
    let next = state.next_background();
    let response = ui.add_enabled(
        themed,
        egui::Button::new(format!("Background: {}", next.name))
            .min_size(egui::vec2(ui.available_width(), 28.0)),
    );
    if response.clicked() {
        state.cycle_background();
    }

    if toggle_button(ui, "Music", state.music_enabled, ACCENT_ROSE) {
        actions.toggle_music = true;
    }

    if ui
        .add(egui::Button::new("Reset camera").min_size(egui::vec2(ui.available_width(), 28.0)))
        .clicked()
    {
        actions.reset_camera = true;
    }
}

fn load_panel(ui: &mut Ui, status: &LoadStatus) {
    section_header(ui, "MODELS");
    let (done, total) = status.progress;

    if status.is_loading() {
        let fraction = if total == 0 { 1.0 } else { done as f32 / total as f32 };
        ui.add(
            egui::ProgressBar::new(fraction)
                .text(format!("loading {done}/{total}"))
                .fill(ACCENT_PINK),
        );
    } else {
        let loaded = total.saturating_sub(status.errors.len());
        ui.label(RichText::new(format!("{loaded}/{total} loaded")).color(TEXT_MUTED));
    }

    for error in &status.errors {
        egui::Frame::default()
            .fill(Color32::from_rgb(40, 12, 18))
            .stroke(egui::Stroke::new(1.0, ACCENT_RED))
            .rounding(4.0)
            .inner_margin(6.0)
            .show(ui, |ui| {
                ui.label(RichText::new(error).color(ACCENT_RED).size(11.0));
            });
    }
}

fn stats_panel(ui: &mut Ui, stats: &FrameStats) {
    section_header(ui, "STATISTICS");
    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(8.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id =
                Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            let fps_color = if stats.fps >= 60.0 {
                ACCENT_GREEN
            } else if stats.fps >= 30.0 {
                ACCENT_GOLD
            } else {
                ACCENT_RED
            };

            egui::Grid::new("stats").num_columns(2).spacing([20.0, 4.0]).show(ui, |ui| {
                ui.label(RichText::new("FPS").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{:.0}", stats.fps)).color(fps_color));
                ui.end_row();

                ui.label(RichText::new("Frame ms").color(TEXT_MUTED));
                ui.label(format!("{:.2}", stats.frame_ms));
                ui.end_row();

                ui.label(RichText::new("Particles").color(TEXT_MUTED));
                ui.label(RichText::new(fmt_num(stats.particles)).color(ACCENT_PINK));
                ui.end_row();

                ui.label(RichText::new("Mesh draws").color(TEXT_MUTED));
                ui.label(fmt_num(stats.mesh_draws));
                ui.end_row();

                ui.label(RichText::new("Meshes").color(TEXT_MUTED));
                ui.label(fmt_num(stats.meshes));
                ui.end_row();
            });
        });
}

pub fn draw_help_overlay(ctx: &Context) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(160))
                .rounding(8.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id =
                        Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new("Drag - Orbit | Scroll - Zoom").color(TEXT_MUTED));
                    ui.label(
                        RichText::new("1-4 - Scene | R - Rotate | B - Background | M - Music")
                            .color(TEXT_MUTED),
                    );
                });
        });
}

fn fmt_num(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{n}")
    }
}
