// ICMP ping probe
// reason: surge-ping for raw/datagram ICMP sockets on tokio
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, Pinger, SurgeError, ICMP};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use netdiag_core::domain::PingStatistics;
use netdiag_core::port::{PingProbe, ProbeError};

/// Interval between echo requests
const PACKET_INTERVAL: Duration = Duration::from_secs(1);

/// Echo request payload size in bytes
const PAYLOAD_SIZE: usize = 56;

/// Sends ICMP echo requests through an OS socket.
///
/// Needs raw socket permissions outside Windows, which is why the suite is
/// usually run in an elevated child there.
pub struct IcmpPingProbe {
    payload: Vec<u8>,
}

impl IcmpPingProbe {
    pub fn new() -> Self {
        Self {
            payload: vec![0; PAYLOAD_SIZE],
        }
    }

    /// Resolve an IP literal or a hostname to the first address returned
    async fn resolve(address: &str) -> Result<IpAddr, ProbeError> {
        if let Ok(ip) = address.parse::<IpAddr>() {
            return Ok(ip);
        }

        let mut addrs = tokio::net::lookup_host((address, 0))
            .await
            .map_err(|e| ProbeError::Resolve {
                address: address.to_string(),
                reason: e.to_string(),
            })?;

        addrs
            .next()
            .map(|addr| addr.ip())
            .ok_or_else(|| ProbeError::Resolve {
                address: address.to_string(),
                reason: "no addresses found".to_string(),
            })
    }

    fn client_for(ip: &IpAddr) -> Result<Client, ProbeError> {
        let config = match ip {
            IpAddr::V4(_) => Config::default(),
            IpAddr::V6(_) => Config::builder().kind(ICMP::V6).build(),
        };
        Client::new(&config).map_err(|e| ProbeError::Socket(e.to_string()))
    }
}

impl Default for IcmpPingProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PingProbe for IcmpPingProbe {
    async fn ping(
        &self,
        address: &str,
        count: u32,
        timeout: Duration,
    ) -> Result<PingStatistics, ProbeError> {
        let ip = Self::resolve(address).await?;
        let client = Self::client_for(&ip)?;
        let mut echo = SocketEcho {
            pinger: client.pinger(ip, PingIdentifier(rand::random())).await,
            payload: &self.payload,
            address,
        };

        let outcome = send_echoes(&mut echo, count, timeout, PACKET_INTERVAL).await?;

        Ok(PingStatistics::from_rtts(
            address,
            ip.to_string(),
            outcome.sent,
            &outcome.rtts,
        ))
    }
}

/// One echo request/reply exchange
#[async_trait]
trait EchoSender: Send {
    /// Send request `seq` and wait at most `wait` for its reply.
    /// `Ok(None)` means the packet was lost.
    async fn echo(&mut self, seq: u16, wait: Duration) -> Result<Option<Duration>, ProbeError>;
}

struct SocketEcho<'a> {
    pinger: Pinger,
    payload: &'a [u8],
    address: &'a str,
}

#[async_trait]
impl EchoSender for SocketEcho<'_> {
    async fn echo(&mut self, seq: u16, wait: Duration) -> Result<Option<Duration>, ProbeError> {
        self.pinger.timeout(wait);
        match self.pinger.ping(PingSequence(seq), self.payload).await {
            Ok((_packet, rtt)) => {
                debug!(address = %self.address, seq = seq, rtt_us = rtt.as_micros() as u64, "Echo reply");
                Ok(Some(rtt))
            }
            Err(SurgeError::Timeout { .. }) => {
                debug!(address = %self.address, seq = seq, "Echo request timed out");
                Ok(None)
            }
            Err(SurgeError::IOError(e)) => Err(ProbeError::Io(e.to_string())),
            Err(e) => {
                warn!(address = %self.address, seq = seq, error = %e, "Echo request failed");
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Default)]
struct EchoOutcome {
    sent: u32,
    rtts: Vec<Duration>,
}

/// Send up to `count` requests, one per `spacing` tick, until `timeout`.
///
/// Sends are paced by the ticker, not by replies: an earlier request waits at
/// most one tick, so a lost packet never delays the next one. The last
/// request may use whatever budget is left.
async fn send_echoes<S: EchoSender>(
    sender: &mut S,
    count: u32,
    timeout: Duration,
    spacing: Duration,
) -> Result<EchoOutcome, ProbeError> {
    let deadline = Instant::now() + timeout;
    let mut ticks = interval(spacing);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut outcome = EchoOutcome::default();

    for seq in 0..count {
        ticks.tick().await;
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            debug!(sent = outcome.sent, requested = count, "Ping deadline reached");
            break;
        }

        let wait = if seq + 1 == count {
            remaining
        } else {
            remaining.min(spacing)
        };

        outcome.sent += 1;
        // Sequence numbers wrap like on the wire
        if let Some(rtt) = sender.echo(seq as u16, wait).await? {
            outcome.rtts.push(rtt);
        }
    }

    Ok(outcome)
}
