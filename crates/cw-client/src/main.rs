//! CWCom/MorseKOB client entry point.
//!
//! Wires together configuration, the UDP transport, and the keying session,
//! then runs the dispatch loop:
//!
//! ```text
//! main()
//!  └─ ClientConfig::load_or_default()
//!  └─ UdpTransport::connect()
//!  └─ Session::identify()          -- CON + id packet
//!  └─ select! loop
//!       ├─ stdin line   -> send_latch / send_unlatch / quit
//!       ├─ inbound UDP  -> Session::observe
//!       ├─ keepalive    -> Session::identify (re-announce)
//!       └─ Ctrl-C       -> quit
//!  └─ Session::disconnect()        -- DIS packet
//! ```
//!
//! The session is owned by this one task; all engine operations run to
//! completion between `select!` arms, so the sequence counter and the
//! transmit template are never touched concurrently.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cw_client::config::ClientConfig;
use cw_client::keyer::KeyerCommand;
use cw_client::net::UdpTransport;
use cw_core::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Config path: first CLI argument, or ./cw-client.toml.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("cw-client.toml"), PathBuf::from);
    let config = ClientConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    info!(
        server = %config.server,
        channel = config.channel,
        id = %config.id,
        "cw-client starting"
    );

    let transport = UdpTransport::connect(&config.server)
        .await
        .context("connecting to relay server")?;
    let receiver = transport.clone();

    let mut session = Session::new(transport, config.channel, &config.id);
    session.identify().await.context("identifying on channel")?;
    info!(peer = %receiver.peer(), "on the air; type latch / unlatch / quit");

    // First keepalive tick a full period from now, not immediately.
    let period = Duration::from_secs(config.keepalive_secs.max(1));
    let mut keepalive = interval_at(Instant::now() + period, period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("reading stdin")? {
                    None => break, // stdin closed
                    Some(line) => match KeyerCommand::parse(&line) {
                        Some(KeyerCommand::Latch) => session.send_latch().await?,
                        Some(KeyerCommand::Unlatch) => session.send_unlatch().await?,
                        Some(KeyerCommand::Quit) => break,
                        None => {
                            if !line.trim().is_empty() {
                                warn!(input = %line.trim(), "unrecognised command");
                            }
                        }
                    },
                }
            }

            inbound = receiver.recv_packet() => {
                match inbound {
                    Ok(packet) => session.observe(&packet),
                    // Foreign or truncated traffic on the channel: log and
                    // keep listening.
                    Err(e) => warn!(error = %e, "dropping inbound datagram"),
                }
            }

            _ = keepalive.tick() => {
                session.identify().await.context("keepalive re-identify")?;
            }

            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    session.disconnect().await.context("disconnecting")?;
    info!("cw-client stopped");
    Ok(())
}
