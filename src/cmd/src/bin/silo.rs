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

use std::path::Path;

use clap::Parser;
use silo_cmd::{ProfilingMode, SiloOpts};
use thiserror_ext::AsReport;

fn main() {
    let opts = SiloOpts::parse();

    silo_rt::init_silo_logger(
        silo_rt::LoggerSettings::new(&opts.verbosity)
            .with_json(opts.log_json)
            .with_colorful(opts.color.resolve())
            .with_caller(opts.debug),
    );

    tracing::info!(
        verbosity = %opts.verbosity,
        log_json = opts.log_json,
        debug = opts.debug,
        color = ?opts.color,
        "start SILO"
    );

    let profiler = match opts.profiling {
        ProfilingMode::Cpu => silo_rt::start_cpu_profiler(),
        ProfilingMode::Mem => {
            tracing::warn!("memory profiling requires a jemalloc-enabled build, ignoring");
            None
        }
        ProfilingMode::Empty => None,
    };

    let result = silo_cmd::run(opts.command);

    if let Some(profiler) = profiler {
        profiler.write_flamegraph(Path::new("cpu.svg"));
    }

    match result {
        Ok(()) => {
            tracing::info!(code = 0, "end SILO");
        }
        Err(err) => {
            tracing::error!(error = %err.as_report(), code = 1, "end SILO");
            std::process::exit(1);
        }
    }
}
