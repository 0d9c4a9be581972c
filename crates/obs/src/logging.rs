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

use crate::ObsError;
use crate::filter::{build_env_filter, level_directive};
use std::io::IsTerminal;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber: env filter, error layer and a stderr fmt
/// layer with ANSI colours only when stderr is a terminal.
pub fn init_logging(logger_level: &str) -> Result<(), ObsError> {
    let env_filter = build_env_filter(logger_level);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ObsError::SetSubscriber(e.to_string()))?;

    info!(
        "Init logging (level: {}, app: {})",
        level_directive(logger_level),
        pvex_config::APP_NAME
    );
    Ok(())
}
