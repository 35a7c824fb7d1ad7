use clap::Parser;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::domain::{StudentField, StudentForm};
use shared::protocol::PredictionOutcome;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::chart;

pub const SETTINGS_STORAGE_KEY: &str = "risk_dashboard.settings";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

const MIN_TEXT_SCALE: f32 = 0.8;
const MAX_TEXT_SCALE: f32 = 1.6;

#[derive(Debug, Clone, Parser)]
#[command(name = "risk-dashboard", about = "Student risk prediction dashboard")]
pub struct StartupConfig {
    /// Base URL of the prediction service.
    #[arg(long)]
    pub server_url: Option<String>,
    /// Prefill the Student ID field.
    #[arg(long, default_value = "")]
    pub student_id: String,
}

/// Settings that survive restarts via eframe storage. Form data and past
/// predictions are deliberately never part of this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedDashboardSettings {
    pub server_url: String,
    pub text_scale: f32,
}

impl Default for PersistedDashboardSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            text_scale: 1.0,
        }
    }
}

/// The three mutually exclusive views. Loading is not a view of its own: it
/// is the orthogonal `in_flight` flag, which keeps the form visible while a
/// request is outstanding.
#[derive(Debug, Clone, PartialEq)]
enum AppViewState {
    Form,
    Result(PredictionOutcome),
    ErrorDisplay(UiError),
}

pub struct RiskDashboardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    form: StudentForm,
    server_url: String,

    view_state: AppViewState,
    in_flight: bool,
    /// Bumped on every submission; worker events echo it and stale ones are
    /// dropped in [`RiskDashboardApp::apply_event`].
    request_seq: u64,

    status: String,
    text_scale: f32,
    applied_text_scale: Option<f32>,
}

impl RiskDashboardApp {
    pub fn bootstrap(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        persisted: Option<PersistedDashboardSettings>,
        startup: StartupConfig,
    ) -> Self {
        let persisted = persisted.unwrap_or_default();
        let server_url = startup
            .server_url
            .unwrap_or(persisted.server_url);

        let mut form = StudentForm::default();
        if !startup.student_id.is_empty() {
            form.set(StudentField::StudentId, startup.student_id);
        }

        Self {
            cmd_tx,
            ui_rx,
            form,
            server_url,
            view_state: AppViewState::Form,
            in_flight: false,
            request_seq: 0,
            status: "Backend worker starting...".to_string(),
            text_scale: persisted
                .text_scale
                .clamp(MIN_TEXT_SCALE, MAX_TEXT_SCALE),
            applied_text_scale: None,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }
    }

    /// Form -> Loading. Returns the command to queue, or None when a request
    /// is already outstanding (a second trigger while loading is a no-op).
    fn begin_submission(&mut self) -> Option<BackendCommand> {
        if self.in_flight {
            return None;
        }
        self.request_seq += 1;
        self.in_flight = true;
        // Submitting clears any prior result or error.
        self.view_state = AppViewState::Form;
        self.status = "Submitting prediction request...".to_string();
        Some(BackendCommand::Predict {
            seq: self.request_seq,
            server_url: self.server_url.clone(),
            request: self.form.to_request(),
        })
    }

    /// Rolls back the Loading transition when the command never reached the
    /// worker queue.
    fn submission_rejected(&mut self) {
        self.in_flight = false;
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => self.status = message,
            UiEvent::PredictionReady { seq, outcome } => {
                if seq != self.request_seq || !self.in_flight {
                    tracing::debug!(seq, current = self.request_seq, "dropping stale result");
                    return;
                }
                self.in_flight = false;
                self.status = "Prediction received".to_string();
                self.view_state = AppViewState::Result(outcome);
            }
            UiEvent::PredictionFailed { seq, error } => {
                if seq != self.request_seq || !self.in_flight {
                    tracing::debug!(seq, current = self.request_seq, "dropping stale failure");
                    return;
                }
                self.in_flight = false;
                self.status = "Prediction failed".to_string();
                self.view_state = AppViewState::ErrorDisplay(error);
            }
        }
    }

    /// Result/ErrorDisplay -> Form. Field values are intentionally left as
    /// they were before submission.
    fn return_to_form(&mut self) {
        self.view_state = AppViewState::Form;
    }

    fn submit(&mut self) {
        let Some(cmd) = self.begin_submission() else {
            return;
        };
        if !dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.submission_rejected();
        }
    }

    fn apply_text_scale_if_needed(&mut self, ctx: &egui::Context) {
        if self.applied_text_scale != Some(self.text_scale) {
            ctx.set_zoom_factor(self.text_scale);
            self.applied_text_scale = Some(self.text_scale);
        }
    }

    fn card_frame(ui: &egui::Ui) -> egui::Frame {
        egui::Frame::NONE
            .fill(ui.visuals().panel_fill)
            .corner_radius(14.0)
            .stroke(egui::Stroke::new(
                1.0,
                ui.visuals().widgets.noninteractive.bg_stroke.color,
            ))
            .inner_margin(egui::Margin::symmetric(24, 20))
    }

    fn show_form_view(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(16.0);
                ui.vertical_centered(|ui| {
                    let card_width = ui.available_width().clamp(560.0, 840.0);
                    ui.set_width(card_width);

                    Self::card_frame(ui).show(ui, |ui| {
                        ui.style_mut().spacing.item_spacing = egui::vec2(10.0, 10.0);
                        ui.heading("Student Risk Prediction");
                        ui.weak("Enter the student's profile and request a dropout risk score.");
                        ui.add_space(8.0);

                        let column_width = (ui.available_width() - 24.0) * 0.5;
                        egui::Grid::new("intake_form")
                            .num_columns(2)
                            .min_col_width(column_width)
                            .spacing(egui::vec2(24.0, 14.0))
                            .show(ui, |ui| {
                                for (index, field) in StudentField::ALL.into_iter().enumerate() {
                                    self.form_field(ui, field);
                                    if index % 2 == 1 {
                                        ui.end_row();
                                    }
                                }
                            });

                        ui.add_space(12.0);
                        let submit_label = if self.in_flight {
                            "Predicting..."
                        } else {
                            "Predict Risk"
                        };
                        let button = egui::Button::new(
                            egui::RichText::new(submit_label).strong().size(16.0),
                        )
                        .min_size(egui::vec2(ui.available_width(), 40.0));
                        if ui.add_enabled(!self.in_flight, button).clicked() {
                            self.submit();
                        }

                        ui.add_space(8.0);
                        ui.separator();
                        ui.horizontal(|ui| {
                            ui.label("Service URL");
                            ui.add(
                                egui::TextEdit::singleline(&mut self.server_url)
                                    .id_salt("service_url")
                                    .desired_width(280.0),
                            );
                            ui.add_space(16.0);
                            ui.label("Text size");
                            ui.add(
                                egui::Slider::new(
                                    &mut self.text_scale,
                                    MIN_TEXT_SCALE..=MAX_TEXT_SCALE,
                                )
                                .show_value(false),
                            );
                        });
                        ui.horizontal_wrapped(|ui| {
                            ui.small("Status:");
                            ui.small(egui::RichText::new(&self.status).weak());
                        });
                    });
                });
                ui.add_space(16.0);
            });
        });
    }

    fn form_field(&mut self, ui: &mut egui::Ui, field: StudentField) {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(field.label()).strong());
            let mut buffer = self.form.get(field).to_string();
            let hint = if field.is_identifier() { "S1" } else { "0" };
            let edit = egui::TextEdit::singleline(&mut buffer)
                .id_salt(field.label())
                .hint_text(hint)
                .desired_width(f32::INFINITY);
            let response = ui.add_sized([ui.available_width(), 30.0], edit);
            if response.changed() {
                self.form.set(field, buffer);
            }
        });
    }

    fn show_result_view(&mut self, ctx: &egui::Context, outcome: &PredictionOutcome) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(16.0);
                ui.vertical_centered(|ui| {
                    let card_width = ui.available_width().clamp(480.0, 680.0);
                    ui.set_width(card_width);

                    Self::card_frame(ui).show(ui, |ui| {
                        ui.style_mut().spacing.item_spacing = egui::vec2(8.0, 8.0);
                        ui.heading("Prediction Result");
                        ui.add_space(4.0);

                        ui.label(
                            egui::RichText::new(format!(
                                "Risk Score: {}",
                                format_risk_score(outcome.risk_score)
                            ))
                            .strong()
                            .size(18.0),
                        );
                        ui.label(format!("Prediction: {}", outcome.prediction_label));

                        ui.add_space(8.0);
                        ui.vertical_centered(|ui| {
                            chart::draw_risk_pie(ui, outcome.risk_score);
                            ui.add_space(4.0);
                            chart::draw_legend(ui, outcome.risk_score);
                        });

                        ui.add_space(8.0);
                        ui.label(egui::RichText::new("Recommendations:").strong());
                        for (index, recommendation) in outcome.recommendations.iter().enumerate() {
                            ui.label(format!("{}. {recommendation}", index + 1));
                        }

                        ui.add_space(6.0);
                        ui.small(
                            egui::RichText::new(format!(
                                "Generated {}",
                                outcome.received_at.format("%Y-%m-%d %H:%M:%S UTC")
                            ))
                            .weak(),
                        );

                        ui.add_space(10.0);
                        let back = egui::Button::new(egui::RichText::new("Back to Form").strong())
                            .min_size(egui::vec2(ui.available_width(), 36.0));
                        if ui.add(back).clicked() {
                            self.return_to_form();
                        }
                    });
                });
                ui.add_space(16.0);
            });
        });
    }

    fn show_error_view(&mut self, ctx: &egui::Context, error: &UiError) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                let card_width = ui.available_width().clamp(440.0, 620.0);
                ui.set_width(card_width);

                Self::card_frame(ui)
                    .stroke(egui::Stroke::new(1.0, ui.visuals().error_fg_color))
                    .show(ui, |ui| {
                        ui.style_mut().spacing.item_spacing = egui::vec2(8.0, 8.0);
                        ui.heading(error.headline());
                        ui.label(error.message());

                        ui.add_space(10.0);
                        let back = egui::Button::new(egui::RichText::new("Back to Form").strong())
                            .min_size(egui::vec2(ui.available_width(), 36.0));
                        if ui.add(back).clicked() {
                            self.return_to_form();
                        }
                    });
            });
        });
    }
}

fn format_risk_score(score: f64) -> String {
    let text = format!("{score:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl eframe::App for RiskDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.apply_text_scale_if_needed(ctx);

        let view = self.view_state.clone();
        match view {
            AppViewState::Form => self.show_form_view(ctx),
            AppViewState::Result(outcome) => self.show_result_view(ctx, &outcome),
            AppViewState::ErrorDisplay(error) => self.show_error_view(ctx, &error),
        }

        // Poll faster while a response may arrive at any moment.
        if self.in_flight {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(200));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedDashboardSettings {
            server_url: self.server_url.clone(),
            text_scale: self.text_scale,
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}
