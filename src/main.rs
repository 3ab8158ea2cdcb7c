//! orbd - ORB bridge daemon.
//!
//! Hosts the capability bridge between broadcast applications and a
//! simulated terminal, reachable over a JSON-lines TCP gateway.

mod bridge;
mod config;
mod error;
mod http;
mod metrics;
mod network;
mod security;
mod signalling;
mod telemetry;
mod terminal;

use crate::bridge::{BridgeDispatcher, EventDispatcher, MethodTable};
use crate::config::Config;
use crate::http::StatusSource;
use crate::network::{BroadcastEventSink, Gateway, Session};
use crate::security::{ContextPolicy, TokenAuthority};
use crate::signalling::{AitScenario, RecordingAitSink};
use crate::terminal::types::TuneOptions;
use crate::terminal::{BroadcastControl, Collaborators, MockTerminal};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = crate::config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    info!(
        bridge = %config.bridge.name,
        apps = config.apps.len(),
        channels = config.channels.len(),
        "Starting orbd"
    );

    // Operator HTTP endpoint and metrics are optional.
    // Convention: metrics_port = 0 disables both (used by tests).
    let metrics_port = config.bridge.metrics_port.unwrap_or(9090);
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        info!("Metrics initialized");
    }

    // Events fan out to every gateway client
    let sink = BroadcastEventSink::new(config.bridge.event_buffer);
    let events = EventDispatcher::new(Arc::new(sink.clone()));

    // Application lifecycle and capability tokens
    let tokens = Arc::new(TokenAuthority::new());
    let policy = Arc::new(ContextPolicy::new().with_events(events.clone()));
    for app in &config.apps {
        policy.register(app.app_id, app.context());
    }

    // Simulated terminal with synthetic AIT signalling
    let ait_sink = Arc::new(RecordingAitSink::new());
    let scenario = Arc::new(AitScenario::new(config.bridge.ait_pid, ait_sink.clone()));
    let terminal = Arc::new(
        MockTerminal::new(&config, events.clone())
            .with_signalling(scenario)
            .with_policy(policy.clone()),
    );

    if let Some(ccid) = &config.bridge.initial_channel {
        let status = terminal.set_channel_to_ccid(ccid, &TuneOptions::default());
        if status == crate::terminal::mock::status::PRESENTING {
            info!(%ccid, sections = ait_sink.count(), "Initial channel tuned");
        } else {
            warn!(%ccid, status, "Initial channel tune failed");
        }
        if let Some(section) = ait_sink.latest() {
            info!(
                pid = section.pid,
                service_id = section.service_id,
                len = section.bytes.len(),
                "Initial AIT signalled"
            );
        }
    }

    let methods = MethodTable::catalogue(config.bridge.test_reports);
    let method_count = methods.len();
    info!(
        methods = method_count,
        test_reports = config.bridge.test_reports,
        "Method table built"
    );
    debug!(names = ?methods.names(), "Registered methods");
    let dispatcher = Arc::new(BridgeDispatcher::new(
        methods,
        tokens.clone(),
        policy.clone(),
        Collaborators::from_terminal(terminal, events),
    ));

    if metrics_port != 0 {
        let source = Arc::new(StatusSource {
            name: config.bridge.name.clone(),
            methods: method_count,
            policy: policy.clone(),
            ait: ait_sink.clone(),
            started_at: chrono::Utc::now(),
        });
        tokio::spawn(async move {
            http::run_http_server(metrics_port, source).await;
        });
        info!(port = metrics_port, "Operator HTTP server started");
    }

    let session = Arc::new(Session::new(
        dispatcher,
        tokens,
        policy,
        config.apps.clone(),
        sink,
    ));

    // Start the Gateway
    let gateway = Gateway::bind(config.bridge.listen, session).await?;

    tokio::select! {
        result = gateway.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown requested"),
    }

    Ok(())
}
