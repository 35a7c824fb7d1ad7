//! Two-segment risk pie painted with the egui painter.

use eframe::egui;

pub const RISK_COLOR: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
pub const REMAINDER_COLOR: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);

/// Sweep fraction of the risk segment; scores outside 0-100 are clamped so a
/// misbehaving service can't paint past a full turn.
pub fn risk_fraction(risk_score: f64) -> f32 {
    (risk_score.clamp(0.0, 100.0) / 100.0) as f32
}

/// The two chart segments: risk and 100-minus-risk.
pub fn segment_values(risk_score: f64) -> (f64, f64) {
    let clamped = risk_score.clamp(0.0, 100.0);
    (clamped, 100.0 - clamped)
}

pub fn draw_risk_pie(ui: &mut egui::Ui, risk_score: f64) {
    let diameter = 220.0;
    let (response, painter) =
        ui.allocate_painter(egui::vec2(diameter, diameter), egui::Sense::hover());
    let rect = response.rect;
    let center = rect.center();
    let radius = rect.width().min(rect.height()) * 0.5 - 4.0;

    let fraction = risk_fraction(risk_score);
    let start = -std::f32::consts::FRAC_PI_2;
    let split = start + fraction * std::f32::consts::TAU;
    let end = start + std::f32::consts::TAU;

    fill_segment(&painter, center, radius, start, split, RISK_COLOR);
    fill_segment(&painter, center, radius, split, end, REMAINDER_COLOR);

    // Percentage labels at each segment's midpoint; skipped for slivers that
    // can't fit the text.
    let (risk_value, remainder_value) = segment_values(risk_score);
    if fraction >= 0.06 {
        label_segment(&painter, center, radius, (start + split) * 0.5, risk_value);
    }
    if fraction <= 0.94 {
        label_segment(&painter, center, radius, (split + end) * 0.5, remainder_value);
    }
}

/// Legend row matching the pie colors.
pub fn draw_legend(ui: &mut egui::Ui, risk_score: f64) {
    let (risk_value, remainder_value) = segment_values(risk_score);
    ui.horizontal(|ui| {
        legend_entry(ui, RISK_COLOR, &format!("Risk Score ({risk_value:.0})"));
        ui.add_space(12.0);
        legend_entry(ui, REMAINDER_COLOR, &format!("Remaining ({remainder_value:.0})"));
    });
}

fn legend_entry(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 2.0, color);
    ui.label(text);
}

/// Triangle fan over the sweep; each step stays far below a half turn so
/// every triangle is convex.
fn fill_segment(
    painter: &egui::Painter,
    center: egui::Pos2,
    radius: f32,
    from: f32,
    to: f32,
    color: egui::Color32,
) {
    let sweep = to - from;
    if sweep <= f32::EPSILON {
        return;
    }
    let steps = (sweep / 0.05).ceil().max(1.0) as usize;
    let mut prev = point_on_circle(center, radius, from);
    for step in 1..=steps {
        let angle = from + sweep * (step as f32 / steps as f32);
        let next = point_on_circle(center, radius, angle);
        painter.add(egui::Shape::convex_polygon(
            vec![center, prev, next],
            color,
            egui::Stroke::NONE,
        ));
        prev = next;
    }
}

fn label_segment(
    painter: &egui::Painter,
    center: egui::Pos2,
    radius: f32,
    angle: f32,
    value: f64,
) {
    let pos = point_on_circle(center, radius * 0.62, angle);
    painter.text(
        pos,
        egui::Align2::CENTER_CENTER,
        format!("{value:.0}%"),
        egui::FontId::proportional(15.0),
        egui::Color32::WHITE,
    );
}

fn point_on_circle(center: egui::Pos2, radius: f32, angle: f32) -> egui::Pos2 {
    center + radius * egui::vec2(angle.cos(), angle.sin())
}
