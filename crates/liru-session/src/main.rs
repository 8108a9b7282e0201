//! liru loopback probe
//!
//! Publishes a placeholder texture id through the in-process loopback
//! transport and pulls it back once per tick, then prints session metrics.
//!
//! Usage: `liru-loopback [config.yaml]` (defaults to `liru.yaml`).

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use liru_core::error::{LiruError, Result};
use liru_session::{config, LoopbackHub, Receiver, Sender, SessionMetrics};

// Placeholder texture names; the loopback transport never dereferences them.
const SEND_TEXTURE: u64 = 1;
const RECV_TEXTURE: u64 = 2;

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.code().as_str(), "liru-loopback failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "liru.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let sender_cfg = cfg
        .sender
        .as_ref()
        .ok_or_else(|| LiruError::Config("sender section is required".into()))?;
    let receiver_cfg = cfg.receiver.clone().unwrap_or_default();

    let hub = Arc::new(LoopbackHub::new());
    let metrics = Arc::new(SessionMetrics::new());

    let mut sender = Sender::from_config(hub.sender(), sender_cfg)?.with_metrics(Arc::clone(&metrics));
    let mut receiver = Receiver::from_config(hub.receiver(), &receiver_cfg).with_metrics(Arc::clone(&metrics));

    tracing::info!(%sender, %receiver, frames = cfg.probe.frames, "liru-loopback starting");
    tracing::info!(publishers = ?receiver.sender_list(), "discovered");

    let interval = Duration::from_millis(cfg.probe.interval_ms);
    for _ in 0..cfg.probe.frames {
        sender.send(SEND_TEXTURE)?;
        if receiver.is_updated() {
            // A miss is retried on the next tick.
            if let Err(e) = receiver.receive(RECV_TEXTURE) {
                tracing::warn!(error = %e, "receive missed");
            }
        }
        thread::sleep(interval);
    }

    tracing::info!(
        %sender,
        %receiver,
        fps = sender.fps(),
        send_ms = sender.last_send_time_ms(),
        receive_ms = receiver.last_receive_time_ms(),
        "liru-loopback finished"
    );
    let stats = serde_json::json!({ "sender": sender.stats(), "receiver": receiver.stats() });
    println!("{stats}");
    print!("{}", metrics.render());

    receiver.release();
    sender.release();
    Ok(())
}
