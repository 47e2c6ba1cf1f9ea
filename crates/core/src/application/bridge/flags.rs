// Config <-> command-line flags of the diagnostics executable

use crate::domain::{Config, PingConfig};

pub const PING_ADDRESSES: &str = "ping-addresses";
pub const PING_COUNT: &str = "ping-count";
pub const INDENT: &str = "indent";

/// Long flags the executable understands (without leading dashes)
pub const KNOWN_FLAGS: &[&str] = &[PING_ADDRESSES, PING_COUNT, INDENT];

/// Express the configuration as flags, in the form expected by the
/// diagnostics executable. Deterministic; unconfigured families add nothing.
pub fn config_to_flags(config: &Config) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(ping) = &config.ping {
        args.extend(ping_config_to_flags(ping));
    }
    args
}

fn ping_config_to_flags(config: &PingConfig) -> Vec<String> {
    let mut args = Vec::new();
    if !config.addresses.is_empty() {
        args.push(format!("-{}", PING_ADDRESSES));
        args.push(config.addresses.join(","));
    }
    if config.count != 0 {
        args.push(format!("-{}", PING_COUNT));
        args.push(config.count.to_string());
    }
    args
}

/// Inverse of `config_to_flags`, used by the executable after argument
/// parsing. An empty address list means the ping family is off.
pub fn config_from_flags(ping_addresses: &str, ping_count: u32) -> Config {
    if ping_addresses.is_empty() {
        return Config::default();
    }
    Config::with_ping(
        ping_addresses.split(',').map(str::to_string).collect(),
        ping_count,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_has_no_flags() {
        assert!(config_to_flags(&Config::default()).is_empty());
    }

    #[test]
    fn test_ping_flags() {
        let config = Config::with_ping(vec!["8.8.8.8".to_string(), "1.1.1.1".to_string()], 3);
        assert_eq!(
            config_to_flags(&config),
            vec!["-ping-addresses", "8.8.8.8,1.1.1.1", "-ping-count", "3"]
        );
    }

    #[test]
    fn test_zero_count_and_empty_addresses_are_omitted() {
        let config = Config::with_ping(vec!["8.8.8.8".to_string()], 0);
        assert_eq!(config_to_flags(&config), vec!["-ping-addresses", "8.8.8.8"]);

        let config = Config::with_ping(Vec::new(), 2);
        assert_eq!(config_to_flags(&config), vec!["-ping-count", "2"]);
    }

    #[test]
    fn test_config_from_flags() {
        assert_eq!(config_from_flags("", 1), Config::default());
        assert_eq!(
            config_from_flags("8.8.8.8,example.com", 2),
            Config::with_ping(vec!["8.8.8.8".to_string(), "example.com".to_string()], 2)
        );
    }
}
