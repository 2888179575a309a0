//! Backend worker: owns the orchestrator and runs queued commands one at a time.

use std::thread;

use client_core::{Orchestrator, ResourceClient};
use crossbeam_channel::{Receiver, Sender};

use crate::{
    backend_bridge::commands::BackendCommand, config::Settings, controller::events::UiEvent,
};

fn build_http_client(settings: &Settings) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.connect_timeout() {
        builder = builder.connect_timeout(timeout);
    }
    builder.build()
}

pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::BackendFailed(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let http = match build_http_client(&settings) {
            Ok(http) => http,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::BackendFailed(format!(
                    "backend worker startup failure: failed to build http client: {err}"
                )));
                tracing::error!("failed to build http client: {err}");
                return;
            }
        };

        let api = ResourceClient::with_http_client(http, settings.api_base.clone());
        let mut orchestrator = Orchestrator::new(api, settings.retry_policy());
        tracing::info!(api_base = %settings.api_base, "backend worker ready");
        let _ = ui_tx.try_send(UiEvent::Info(format!(
            "Connected to {}",
            orchestrator.api().api_base()
        )));

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                let form = cmd.form();
                let notice = orchestrator.perform(cmd.into_intent()).await;

                let view = Box::new(orchestrator.view().clone());
                if ui_tx.send(UiEvent::ViewChanged(view)).is_err()
                    || ui_tx.send(UiEvent::ActionFinished { form, notice }).is_err()
                {
                    tracing::debug!("ui event receiver dropped; stopping backend worker");
                    break;
                }
            }
        });
    });
}
