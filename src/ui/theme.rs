use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};
use egui::style::WidgetVisuals;

pub const BG_NIGHT: Color32 = Color32::from_rgb(8, 4, 10);
pub const BG_PANEL: Color32 = Color32::from_rgba_premultiplied(14, 6, 16, 235);
pub const BG_WIDGET: Color32 = Color32::from_rgb(32, 14, 34);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(52, 20, 50);
pub const BG_WIDGET_ACTIVE: Color32 = Color32::from_rgb(76, 26, 66);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(236, 214, 228);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(160, 126, 150);
pub const TEXT_BRIGHT: Color32 = Color32::from_rgb(255, 240, 248);

pub const ACCENT_PINK: Color32 = Color32::from_rgb(255, 105, 180);
pub const ACCENT_ROSE: Color32 = Color32::from_rgb(255, 20, 147);
pub const ACCENT_LAVENDER: Color32 = Color32::from_rgb(186, 146, 255);
pub const ACCENT_GOLD: Color32 = Color32::from_rgb(255, 196, 87);
pub const ACCENT_RED: Color32 = Color32::from_rgb(224, 64, 80);
pub const ACCENT_GREEN: Color32 = Color32::from_rgb(96, 200, 120);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgba_premultiplied(90, 40, 80, 90);

fn widget(bg: Color32, stroke: Stroke, fg: Color32, expansion: f32) -> WidgetVisuals {
    WidgetVisuals {
        bg_fill: bg,
        weak_bg_fill: bg,
        bg_stroke: stroke,
        rounding: Rounding::same(8.0),
        fg_stroke: Stroke::new(1.0, fg),
        expansion,
    }
}

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = Style::default();

    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.widgets.noninteractive =
        widget(BG_PANEL, Stroke::new(1.0, BORDER_SUBTLE), TEXT_MUTED, 0.0);
    visuals.widgets.inactive =
        widget(BG_WIDGET, Stroke::new(1.0, BORDER_SUBTLE), TEXT_PRIMARY, 0.0);
    visuals.widgets.hovered =
        widget(BG_WIDGET_HOVER, Stroke::new(1.0, ACCENT_PINK), TEXT_BRIGHT, 1.0);
    visuals.widgets.active =
        widget(BG_WIDGET_ACTIVE, Stroke::new(2.0, ACCENT_ROSE), TEXT_BRIGHT, 1.0);
    visuals.widgets.open =
        widget(BG_WIDGET_ACTIVE, Stroke::new(1.0, ACCENT_PINK), TEXT_BRIGHT, 0.0);

    visuals.selection = egui::style::Selection {
        bg_fill: ACCENT_PINK.gamma_multiply(0.35),
        stroke: Stroke::new(1.0, ACCENT_PINK),
    };
    visuals.hyperlink_color = ACCENT_LAVENDER;
    visuals.warn_fg_color = ACCENT_GOLD;
    visuals.error_fg_color = ACCENT_RED;
    visuals.extreme_bg_color = BG_NIGHT;
    visuals.window_fill = BG_PANEL;
    visuals.panel_fill = BG_PANEL;
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.window_rounding = Rounding::same(12.0);
    visuals.slider_trailing_fill = true;
    visuals.handle_shape = egui::style::HandleShape::Circle;
    style.visuals = visuals;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(14.0);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);

    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(20.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}
