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

use smallvec::SmallVec;
use tracing_subscriber::EnvFilter;

/// Maps the exporter's log level names onto `EnvFilter` directives.
///
/// `none` is accepted as an alias of `off`.
pub fn level_directive(logger_level: &str) -> &str {
    match logger_level.trim() {
        "" | "none" => "off",
        other => other,
    }
}

/// Builds the filter for the fmt layer.
///
/// `RUST_LOG` takes precedence over `logger_level` when it is set and valid.
pub fn build_env_filter(logger_level: &str) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_for(logger_level, rust_log.as_deref())
}

fn filter_for(logger_level: &str, rust_log: Option<&str>) -> EnvFilter {
    let level = level_directive(logger_level);
    let mut filter = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    // Suppress chatty infrastructure crates unless the operator explicitly
    // requests trace/debug output.
    if !matches!(level, "trace" | "debug") {
        let directives: SmallVec<[&str; 5]> = smallvec::smallvec!["hyper", "hyper_util", "reqwest", "h2", "tower"];
        for directive in directives {
            if let Ok(directive) = format!("{directive}=off").parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive_none_is_off() {
        assert_eq!(level_directive("none"), "off");
        assert_eq!(level_directive(""), "off");
        assert_eq!(level_directive("info"), "info");
        assert_eq!(level_directive("pvex=debug"), "pvex=debug");
    }

    #[test]
    fn test_build_env_filter_none_turns_logging_off() {
        let filter = filter_for("none", None);
        let dbg = format!("{filter:?}");
        assert!(
            dbg.contains("LevelFilter::OFF"),
            "Expected 'LevelFilter::OFF' in filter debug output: {dbg}"
        );
    }

    #[test]
    fn test_build_env_filter_suppresses_noisy_crates() {
        // For info level, hyper/reqwest/etc. should be suppressed with OFF.
        let filter = filter_for("info", None);
        let dbg = format!("{filter:?}");
        assert!(
            dbg.contains("LevelFilter::OFF"),
            "Expected 'LevelFilter::OFF' suppression directives in filter: {dbg}"
        );
    }

    #[test]
    fn test_build_env_filter_debug_no_suppression() {
        let filter = filter_for("debug", None);
        let dbg = format!("{filter:?}");
        assert!(
            dbg.contains("LevelFilter::DEBUG"),
            "Expected 'LevelFilter::DEBUG' in filter debug output: {dbg}"
        );
    }

    #[test]
    fn test_rust_log_overrides_level() {
        let dbg = format!("{:?}", filter_for("none", Some("pvex=trace")));
        assert!(dbg.contains("LevelFilter::TRACE"), "Expected RUST_LOG directive in filter: {dbg}");

        let dbg = format!("{:?}", filter_for("debug", Some("  ")));
        assert!(dbg.contains("LevelFilter::DEBUG"), "Blank RUST_LOG should fall back to the level: {dbg}");
    }
}
