// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! icepeakd: the Icepeak daemon binary.

use clap::Parser;
use icepeak_daemon::config::Config;
use icepeak_daemon::lifecycle;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    lifecycle::init_tracing();

    match lifecycle::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "icepeakd failed");
            ExitCode::FAILURE
        }
    }
}
