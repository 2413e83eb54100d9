//! Process bootstrap configuration.
//!
//! Distinct from the runtime [`crate::property`] store: this is read once
//! at startup and handed to [`crate::context::Context::init`]; the property
//! store is the per-session surface tasks consult while running.

use std::path::PathBuf;

const DEFAULT_ICP_SOCKET: &str = "/run/ogon/icp.sock";
const DEFAULT_ADMIN_ADDR: &str = "127.0.0.1:9091";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub icp_socket_path: PathBuf,
    pub admin_listen_addr: String,
    pub admin_tls_cert: Option<PathBuf>,
    pub admin_tls_key: Option<PathBuf>,
    pub sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            icp_socket_path: PathBuf::from(DEFAULT_ICP_SOCKET),
            admin_listen_addr: DEFAULT_ADMIN_ADDR.to_string(),
            admin_tls_cert: None,
            admin_tls_key: None,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Parse from `env::args()`-style arguments. Unrecognized flags are
    /// ignored the way command-line parsing itself is out of scope for the
    /// core (§1) — this only covers what the process needs to start.
    pub fn from_args(args: &[String]) -> Self {
        let mut cfg = Self::default();
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--icp-socket" => {
                    if let Some(v) = args.get(i + 1) {
                        cfg.icp_socket_path = PathBuf::from(v);
                        i += 1;
                    }
                }
                "--admin-listen" => {
                    if let Some(v) = args.get(i + 1) {
                        cfg.admin_listen_addr = v.clone();
                        i += 1;
                    }
                }
                "--admin-tls-cert" => {
                    if let Some(v) = args.get(i + 1) {
                        cfg.admin_tls_cert = Some(PathBuf::from(v));
                        i += 1;
                    }
                }
                "--admin-tls-key" => {
                    if let Some(v) = args.get(i + 1) {
                        cfg.admin_tls_key = Some(PathBuf::from(v));
                        i += 1;
                    }
                }
                "--sweep-interval" => {
                    if let Some(v) = args.get(i + 1).and_then(|s| s.parse().ok()) {
                        cfg.sweep_interval_secs = v;
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.admin_listen_addr, "127.0.0.1:9091");
        assert_eq!(cfg.sweep_interval_secs, 10);
    }

    #[test]
    fn parses_overrides_from_args() {
        let args: Vec<String> = [
            "--icp-socket",
            "/tmp/icp.sock",
            "--admin-listen",
            "0.0.0.0:9999",
            "--sweep-interval",
            "5",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let cfg = Config::from_args(&args);
        assert_eq!(cfg.icp_socket_path, PathBuf::from("/tmp/icp.sock"));
        assert_eq!(cfg.admin_listen_addr, "0.0.0.0:9999");
        assert_eq!(cfg.sweep_interval_secs, 5);
    }

    #[test]
    fn unknown_flags_are_ignored() {
        let args: Vec<String> = vec!["--bogus".into(), "value".into()];
        let cfg = Config::from_args(&args);
        assert_eq!(cfg.admin_listen_addr, "127.0.0.1:9091");
    }
}
