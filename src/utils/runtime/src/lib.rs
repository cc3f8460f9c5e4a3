// Copyright 2025 SILO Contributors
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

//! Configures the SILO binary: logging and profiling.

use std::fs::File;
use std::path::Path;

use tracing::Level;
use tracing_subscriber::filter::{self, LevelFilter};
use tracing_subscriber::prelude::*;

/// Per-crate log targets. All SILO crates share the requested level;
/// third-party crates are capped at WARN so the engine internals stay
/// readable at debug and trace.
fn configure_silo_targets(targets: filter::Targets, level: Level) -> filter::Targets {
    targets
        .with_target("silo_cmd", level)
        .with_target("silo_common", level)
        .with_target("silo_core", level)
        .with_target("silo_rt", level)
        .with_target("silo_storage", level)
}

#[derive(Debug, Clone)]
pub struct LoggerSettings {
    /// One of `none|error|warn|info|debug|trace` or `0..5`.
    verbosity: String,
    /// Emit one JSON object per event instead of the compact format.
    json: bool,
    /// Colorful output on stderr; `None` resolves from the terminal.
    colorful: Option<bool>,
    /// Attach caller file and line to every event.
    caller: bool,
}

impl LoggerSettings {
    pub fn new(verbosity: impl Into<String>) -> Self {
        Self {
            verbosity: verbosity.into(),
            json: false,
            colorful: None,
            caller: false,
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_colorful(mut self, colorful: Option<bool>) -> Self {
        self.colorful = colorful;
        self
    }

    pub fn with_caller(mut self, caller: bool) -> Self {
        self.caller = caller;
        self
    }
}

fn parse_verbosity(verbosity: &str) -> Option<Level> {
    match verbosity.to_lowercase().as_str() {
        "trace" | "5" => Some(Level::TRACE),
        "debug" | "4" => Some(Level::DEBUG),
        "info" | "3" => Some(Level::INFO),
        "warn" | "2" => Some(Level::WARN),
        "error" | "1" => Some(Level::ERROR),
        _ => None,
    }
}

/// Init the logger for SILO binaries. Logs go to stderr; stdout carries
/// data. With verbosity `none` (or anything unrecognized) no subscriber is
/// installed and tracing stays disabled.
pub fn init_silo_logger(settings: LoggerSettings) {
    let Some(level) = parse_verbosity(&settings.verbosity) else {
        return;
    };

    let colorful = settings
        .colorful
        .unwrap_or_else(console::colors_enabled_stderr);

    let filter =
        configure_silo_targets(filter::Targets::new(), level).with_default(LevelFilter::WARN);

    if settings.json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_file(settings.caller)
            .with_line_number(settings.caller);
        tracing_subscriber::registry()
            .with(fmt_layer.with_filter(filter))
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(colorful)
            .with_writer(std::io::stderr)
            .with_file(settings.caller)
            .with_line_number(settings.caller);
        tracing_subscriber::registry()
            .with(fmt_layer.with_filter(filter))
            .init();
    }
}

/// A running CPU profiler. Dropped without [`CpuProfiler::write_flamegraph`]
/// the collected samples are discarded.
pub struct CpuProfiler {
    guard: pprof::ProfilerGuard<'static>,
}

/// Start sampling the whole process. Returns `None` when the profiler
/// cannot attach (already running, unsupported platform).
pub fn start_cpu_profiler() -> Option<CpuProfiler> {
    let guard = pprof::ProfilerGuardBuilder::default()
        .blocklist(&["libc", "libgcc", "pthread", "vdso"])
        .build();
    match guard {
        Ok(guard) => Some(CpuProfiler { guard }),
        Err(err) => {
            tracing::warn!("failed to start cpu profiler: {}", err);
            None
        }
    }
}

impl CpuProfiler {
    /// Stop sampling and write a flamegraph.
    pub fn write_flamegraph(self, path: &Path) {
        match self.guard.report().build() {
            Ok(report) => {
                let file = match File::create(path) {
                    Ok(file) => file,
                    Err(err) => {
                        tracing::warn!("failed to create {}: {}", path.display(), err);
                        return;
                    }
                };
                if let Err(err) = report.flamegraph(file) {
                    tracing::warn!("failed to write flamegraph: {}", err);
                    return;
                }
                tracing::info!("produced {}", path.display());
            }
            Err(err) => {
                tracing::warn!("failed to build profiler report: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_accepts_names_and_digits() {
        assert_eq!(parse_verbosity("trace"), Some(Level::TRACE));
        assert_eq!(parse_verbosity("5"), Some(Level::TRACE));
        assert_eq!(parse_verbosity("WARN"), Some(Level::WARN));
        assert_eq!(parse_verbosity("0"), None);
        assert_eq!(parse_verbosity("none"), None);
        assert_eq!(parse_verbosity("bogus"), None);
    }
}
