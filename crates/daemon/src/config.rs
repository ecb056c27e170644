// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line configuration for icepeakd.

use clap::Parser;
use icepeak_storage::StorageConfig;
use std::path::PathBuf;
use std::time::Duration;

/// In-memory JSON document store with live subscriptions.
#[derive(Debug, Clone, Parser)]
#[command(name = "icepeakd", version)]
pub struct Config {
    /// Snapshot file holding the document
    #[arg(long, default_value = "icepeak.json")]
    pub data_file: PathBuf,

    /// Keep an append-only journal next to the data file
    #[arg(long)]
    pub journaling: bool,

    /// Listen port for HTTP and WebSocket clients
    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Serve Prometheus metrics on this port when set
    #[arg(long)]
    pub metrics_port: Option<u16>,

    /// Seconds between periodic snapshot syncs
    #[arg(long = "sync-interval", default_value_t = 30)]
    pub sync_interval_secs: u64,

    /// HS256 secret; enables JWT auth when set (falls back to the
    /// ICEPEAK_JWT_SECRET environment variable)
    #[arg(long)]
    pub jwt_secret: Option<String>,

    /// Coordinator command queue capacity
    #[arg(long, default_value_t = 256)]
    pub queue_capacity: usize,

    /// Per-subscriber outbound buffer capacity
    #[arg(long, default_value_t = 16)]
    pub channel_capacity: usize,
}

impl Config {
    /// Journal path derived from the data file: `icepeak.json` →
    /// `icepeak.json.journal`. `None` when journaling is off.
    pub fn journal_file(&self) -> Option<PathBuf> {
        self.journaling.then(|| {
            let mut name = self.data_file.as_os_str().to_owned();
            name.push(".journal");
            PathBuf::from(name)
        })
    }

    pub fn storage(&self) -> StorageConfig {
        StorageConfig { data_file: self.data_file.clone(), journal_file: self.journal_file() }
    }

    pub fn sync_every(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    /// The JWT secret from the flag, or the environment as a fallback.
    pub fn resolved_jwt_secret(&self) -> Option<String> {
        self.jwt_secret
            .clone()
            .or_else(|| std::env::var("ICEPEAK_JWT_SECRET").ok())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
