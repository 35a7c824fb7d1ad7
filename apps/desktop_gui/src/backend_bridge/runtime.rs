//! Backend worker: a dedicated thread owning a tokio runtime and the HTTP
//! client. Commands arrive over the bounded queue; every command produces
//! exactly one UI event tagged with the submission's `seq`.

use std::thread;

use client_core::PredictionClient;
use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Info(format!(
                    "Backend worker startup failure: failed to build runtime: {err}"
                )));
                error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Predict {
                        seq,
                        server_url,
                        request,
                    } => {
                        info!(seq, student_id = %request.student_id, "backend: predict");
                        let client = match PredictionClient::new(&server_url) {
                            Ok(client) => client,
                            Err(err) => {
                                let _ = ui_tx.try_send(UiEvent::PredictionFailed {
                                    seq,
                                    error: UiError::from_prediction_error(&err),
                                });
                                continue;
                            }
                        };
                        match client.predict_and_recommend(&request).await {
                            Ok(outcome) => {
                                let _ = ui_tx.try_send(UiEvent::PredictionReady { seq, outcome });
                            }
                            Err(err) => {
                                error!(seq, "backend: predict failed: {err}");
                                let _ = ui_tx.try_send(UiEvent::PredictionFailed {
                                    seq,
                                    error: UiError::from_prediction_error(&err),
                                });
                            }
                        }
                    }
                }
            }
        });
    });
}
