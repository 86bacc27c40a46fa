// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::{Parser, ValueEnum};
use ledger_transfer::Engine;
use ledger_transfer::seed::load_accounts;
use ledger_transfer::server::{AppState, create_router};
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Ledger Transfer - account balances and transfers over a double-entry ledger
///
/// Serves the ledger over HTTP/JSON. Log verbosity follows `RUST_LOG`.
#[derive(Parser, Debug)]
#[command(name = "ledger-transfer")]
#[command(about = "Serves account balances and transfers over HTTP", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "LEDGER_LISTEN", default_value = "127.0.0.1:8090")]
    listen: SocketAddr,

    /// CSV file with accounts to create on startup
    ///
    /// Expected format: id,customer_id,amount,currency
    #[arg(long, env = "LEDGER_SEED", value_name = "FILE")]
    seed: Option<PathBuf>,

    /// Log output format
    #[arg(long, env = "LEDGER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().with_target(false).try_init(),
    };
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.log_format);

    let engine = Arc::new(Engine::new());

    if let Some(path) = &args.seed {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "cannot open seed file");
                process::exit(1);
            }
        };
        match load_accounts(&engine, BufReader::new(file)) {
            Ok(report) => tracing::info!(
                created = report.created,
                skipped = report.skipped,
                "seed accounts loaded"
            ),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "cannot read seed file");
                process::exit(1);
            }
        }
    }

    let listener = match TcpListener::bind(args.listen).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %args.listen, error = %e, "cannot bind listener");
            process::exit(1);
        }
    };
    tracing::info!(addr = %args.listen, "ledger API listening");

    let app = create_router(AppState::new(engine));
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
        process::exit(1);
    }
}
