// Ping Domain Model

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::DiagnosticError;
use super::fallible::Fallible;

/// An ICMP ping check against a single address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ping {
    /// Address (IP or hostname) to ping
    pub address: String,

    /// Packets to send. Zero means one.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub count: u32,

    /// Run on non-Windows hosts too. Needs raw socket permissions there.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

fn is_zero(count: &u32) -> bool {
    *count == 0
}

impl Ping {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            count: 0,
            force: false,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Packets actually sent (at least one)
    pub fn effective_count(&self) -> u32 {
        self.count.max(1)
    }

    /// Packets go out one second apart, so wait one second past the last one.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.effective_count()) + 1)
    }

    /// Checks that can fail before any packet is sent.
    ///
    /// Outside Windows, ICMP needs elevated permissions; unless `force` is set
    /// the ping is refused up front instead of failing on socket creation.
    pub fn check(&self, on_windows: bool) -> Result<(), DiagnosticError> {
        if self.address.is_empty() {
            return Err(DiagnosticError::MissingAddress);
        }
        if !on_windows && !self.force {
            return Err(DiagnosticError::UnsupportedPlatform);
        }
        Ok(())
    }
}

/// Round-trip statistics collected by a ping run. Times are in nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PingStatistics {
    pub packets_recv: u32,
    pub packets_sent: u32,
    /// Percentage of packets lost (0.0 - 100.0)
    pub packet_loss: f64,
    /// Resolved IP address
    pub ip_addr: String,
    /// Address as requested
    pub addr: String,
    pub rtts: Vec<u64>,
    pub min_rtt: u64,
    pub max_rtt: u64,
    pub avg_rtt: u64,
    pub std_dev_rtt: u64,
}

impl PingStatistics {
    /// Build statistics from the round-trip times of the replies received.
    pub fn from_rtts(
        addr: impl Into<String>,
        ip_addr: impl Into<String>,
        packets_sent: u32,
        rtts: &[Duration],
    ) -> Self {
        let rtts: Vec<u64> = rtts
            .iter()
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .collect();
        let packets_recv = u32::try_from(rtts.len()).unwrap_or(u32::MAX);

        let packet_loss = if packets_sent == 0 {
            0.0
        } else {
            let lost = packets_sent.saturating_sub(packets_recv);
            f64::from(lost) / f64::from(packets_sent) * 100.0
        };

        let (min_rtt, max_rtt, avg_rtt, std_dev_rtt) = if rtts.is_empty() {
            (0, 0, 0, 0)
        } else {
            let min = rtts.iter().copied().min().unwrap_or(0);
            let max = rtts.iter().copied().max().unwrap_or(0);
            let n = rtts.len() as f64;
            let mean = rtts.iter().map(|&r| r as f64).sum::<f64>() / n;
            let variance = rtts
                .iter()
                .map(|&r| {
                    let delta = r as f64 - mean;
                    delta * delta
                })
                .sum::<f64>()
                / n;
            (min, max, mean.round() as u64, variance.sqrt().round() as u64)
        };

        Self {
            packets_recv,
            packets_sent,
            packet_loss,
            ip_addr: ip_addr.into(),
            addr: addr.into(),
            rtts,
            min_rtt,
            max_rtt,
            avg_rtt,
            std_dev_rtt,
        }
    }
}

/// Result of a completed ping: the request plus what came back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PingResult {
    pub ping: Ping,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<PingStatistics>,
}

// Packet loss is data, not an error.
impl Fallible for PingResult {
    fn has_errors(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_address() {
        let ping = Ping::new("").with_force(true);
        assert_eq!(ping.check(true), Err(DiagnosticError::MissingAddress));
    }

    #[test]
    fn test_unsupported_platform_without_force() {
        let ping = Ping::new("8.8.8.8");
        assert_eq!(ping.check(false), Err(DiagnosticError::UnsupportedPlatform));
        assert_eq!(ping.check(true), Ok(()));
        assert_eq!(ping.with_force(true).check(false), Ok(()));
    }

    #[test]
    fn test_count_defaults_to_one() {
        let ping = Ping::new("8.8.8.8");
        assert_eq!(ping.effective_count(), 1);
        assert_eq!(ping.timeout(), Duration::from_secs(2));

        let ping = ping.with_count(4);
        assert_eq!(ping.effective_count(), 4);
        assert_eq!(ping.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_statistics_from_rtts() {
        let rtts = [
            Duration::from_millis(10),
            Duration::from_millis(20),
            Duration::from_millis(30),
        ];
        let stats = PingStatistics::from_rtts("example.com", "93.184.216.34", 4, &rtts);

        assert_eq!(stats.packets_sent, 4);
        assert_eq!(stats.packets_recv, 3);
        assert_eq!(stats.packet_loss, 25.0);
        assert_eq!(stats.min_rtt, 10_000_000);
        assert_eq!(stats.max_rtt, 30_000_000);
        assert_eq!(stats.avg_rtt, 20_000_000);
        // population std dev of 10/20/30 ms = 8.1649658 ms
        assert_eq!(stats.std_dev_rtt, 8_164_966);
    }

    #[test]
    fn test_statistics_all_lost() {
        let stats = PingStatistics::from_rtts("10.255.255.1", "10.255.255.1", 2, &[]);
        assert_eq!(stats.packets_recv, 0);
        assert_eq!(stats.packet_loss, 100.0);
        assert_eq!(stats.avg_rtt, 0);
        assert!(stats.rtts.is_empty());
    }

    #[test]
    fn test_statistics_wire_format_uses_integer_nanoseconds() {
        let stats = PingStatistics::from_rtts(
            "8.8.8.8",
            "8.8.8.8",
            1,
            &[Duration::from_micros(12_500)],
        );

        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["Rtts"], serde_json::json!([12_500_000u64]));
        assert_eq!(json["AvgRtt"], serde_json::json!(12_500_000u64));
        assert!(json["MinRtt"].is_u64());
        assert!(json["PacketLoss"].is_f64());
    }

    #[test]
    fn test_ping_serializes_without_defaults() {
        let json = serde_json::to_value(Ping::new("8.8.8.8")).unwrap();
        assert_eq!(json, serde_json::json!({ "Address": "8.8.8.8" }));
    }
}
