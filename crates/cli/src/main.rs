//! Media controller driven over stdin/stdout.
//!
//! Every stdin line is one bus message addressed to the controller, e.g.
//! `{"type":"CREATE_MEDIA_POINT","pointId":"p1","sender":"sip-gw",...}`.
//! Every message the controller sends is written to stdout as
//! `{"channel":"sip-gw","message":{...}}`. Logs go to stderr.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use mediactl_infra_common::logging::{LoggingConfig, log_welcome, parse_log_level, setup_logging};
use mediactl_point_core::config::{ControllerConfig, ControllerSettings};
use mediactl_point_core::dispatcher::{MediaController, MediaControllerHandle};
use mediactl_point_core::environment::MediaEnvironment;
use mediactl_point_core::messaging::{Message, MessageTransport};
use mediactl_point_core::transport::recording::{RecordingKeyExchangeAgent, RecordingTranscodingFactory, TransportLog};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const APP_NAME: &str = "media-controller";

#[derive(Parser, Debug)]
#[command(name = APP_NAME)]
#[command(version, about = "SDP offer/answer and media bridging controller")]
struct Args {
    /// Settings file (TOML); `MEDIACTL_*` variables override it
    #[arg(short, long, env = "MEDIACTL_CONFIG")]
    config: Option<PathBuf>,

    /// Log level, overrides the settings file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log one JSON object per line
    #[arg(long)]
    json_logs: bool,

    /// Timer period in milliseconds, overrides the settings file
    #[arg(long)]
    timer_ms: Option<u64>,

    /// Channel the controller listens on, overrides the settings file
    #[arg(long)]
    channel: Option<String>,

    /// Terminate SRTP through a key exchange relay whose ports start here
    #[arg(long)]
    relay_port: Option<u16>,
}

/// Writes every outgoing message as one JSON line on stdout
struct StdoutTransport {
    out: Mutex<tokio::io::Stdout>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    channel: &'a str,
    message: &'a Message,
}

#[async_trait]
impl MessageTransport for StdoutTransport {
    async fn send(&self, channel: &str, message: &Message) -> mediactl_point_core::Result<()> {
        let mut line = serde_json::to_vec(&Envelope { channel, message })
            .map_err(|e| mediactl_point_core::Error::MessageTransport(e.to_string()))?;
        line.push(b'\n');

        let mut out = self.out.lock().await;
        out.write_all(&line)
            .await
            .map_err(|e| mediactl_point_core::Error::MessageTransport(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| mediactl_point_core::Error::MessageTransport(e.to_string()))
    }
}

fn init_logging(args: &Args, config: &ControllerConfig) -> Result<()> {
    let mut logging = LoggingConfig::from_settings(config.logging(), APP_NAME)?;
    if let Some(level) = &args.log_level {
        logging = logging.with_level(parse_log_level(level)?);
    }
    if args.json_logs {
        logging = logging.with_json();
    }
    setup_logging(&logging)?;
    log_welcome(APP_NAME, env!("CARGO_PKG_VERSION"));
    Ok(())
}

async fn read_messages(handle: MediaControllerHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Message>(line) {
            Ok(message) => handle.send_message(message)?,
            Err(err) => warn!("Ignoring malformed message: {}", err),
        }
    }
    debug!("End of input");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings = ControllerSettings::load(args.config.as_deref()).context("loading settings")?;
    let config = ControllerConfig::from_settings(&settings).context("invalid settings")?;
    init_logging(&args, &config)?;

    let period = args
        .timer_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.timer_interval());
    let mut mq = config.mq().clone();
    if let Some(channel) = &args.channel {
        mq.channel = channel.clone();
    }
    info!("Listening as {} (profiles: {:?})", mq, config.profile_names());

    let log = TransportLog::new();
    let factory = Arc::new(RecordingTranscodingFactory::new(log.clone()));
    let (mut env, ready) = MediaEnvironment::new(config, factory);
    if let Some(first_port) = args.relay_port {
        info!("Key exchange relay on ports from {}", first_port);
        env = env.with_key_exchange(Arc::new(RecordingKeyExchangeAgent::new(log, first_port)));
    }

    let transport = Arc::new(StdoutTransport {
        out: Mutex::new(tokio::io::stdout()),
    });
    let (controller, handle) = MediaController::new(env, ready, transport);
    let task = controller.with_timer(period).spawn();

    tokio::select! {
        result = read_messages(handle.clone()) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    handle.shutdown()?;
    task.await.context("controller task panicked")??;
    Ok(())
}
