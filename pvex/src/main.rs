// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod config;
mod error;
mod server;

use crate::config::{Config, Opt};
use crate::error::{Error, Result};
use clap::Parser;
use pvex_client::{ApiClient, Fetch};
use pvex_collector::{Collector, TopologyCache};
use pvex_config::APP_NAME;
use pvex_obs::init_logging;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

fn main() -> ExitCode {
    let opt = Opt::parse();

    // Settings are checked before logging starts or any port is bound.
    let config = match Config::from_opt(opt) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{APP_NAME}: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{APP_NAME}: {err}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn run(config: Config) -> Result<()> {
    init_logging(&config.log_level)?;
    debug!(?config, "starting exporter");

    let api: Arc<dyn Fetch> = Arc::new(ApiClient::new(&config.client)?);

    let listener = TcpListener::bind(&config.listen_address)
        .await
        .map_err(|source| Error::Bind {
            address: config.listen_address.clone(),
            source,
        })?;

    let topology = Arc::new(TopologyCache::new(Arc::clone(&api)));
    if topology.refresh().await.is_err() {
        warn!(retry_in = ?config.discovery_interval, "starting with an empty node list");
    }

    let shutdown = CancellationToken::new();
    let refresher = topology.spawn_refresher(config.discovery_interval, &shutdown);

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        let signal = server::wait_for_shutdown().await;
        debug!(?signal, "shutting down");
        signal_token.cancel();
    });

    let collector = Arc::new(Collector::new(api, topology, config.scrape_concurrency));
    let served = server::serve(listener, server::router(collector), shutdown.clone()).await;

    shutdown.cancel();
    refresher.shutdown().await;
    info!("exporter stopped");
    served.map_err(Error::Serve)
}
