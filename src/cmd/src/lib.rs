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

//! Command-line front end for SILO.

pub mod jsonline;
pub mod observer;

use std::fmt;
use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use silo_common::Result;
use silo_core::{Config, Driver, NoopObserver};
use silo_storage::RocksBackend;

use crate::jsonline::{JsonLinesReader, JsonLinesWriter, PassthroughReader};
use crate::observer::{DumpProgress, ScanProgress};

#[derive(Debug, Parser)]
#[command(
    name = "silo",
    version,
    about = "SILO - Sparse Input Linked Output",
    long_about = "SILO reconciles sparse tabular records into entities by \
                  transitive equality of shared identifier values."
)]
pub struct SiloOpts {
    /// Set level of log verbosity: none (0), error (1), warn (2), info (3),
    /// debug (4), trace (5)
    #[arg(short = 'v', long, global = true, default_value = "warn")]
    pub verbosity: String,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Add caller information to logs (very slow)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use colors in log outputs: auto, yes or no
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Enable profiling and write a report on exit
    #[arg(long, global = true, value_enum, default_value_t = ProfilingMode::Empty)]
    pub profiling: ProfilingMode,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Yes,
    No,
}

impl ColorMode {
    /// `None` lets the logger probe the terminal.
    pub fn resolve(self) -> Option<bool> {
        match self {
            ColorMode::Auto => None,
            ColorMode::Yes => Some(true),
            ColorMode::No => Some(false),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorMode::Auto => "auto",
            ColorMode::Yes => "yes",
            ColorMode::No => "no",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfilingMode {
    Cpu,
    Mem,
    Empty,
}

impl fmt::Display for ProfilingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProfilingMode::Cpu => "cpu",
            ProfilingMode::Mem => "mem",
            ProfilingMode::Empty => "empty",
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest line-delimited JSON from stdin into the store at the given path
    Scan(ScanArgs),
    /// Write one JSON object per stored node to stdout, grouped by entity
    Dump(DumpArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Store directory
    pub path: PathBuf,

    /// Copy each input line verbatim to stdout before parsing
    #[arg(short, long)]
    pub passthrough: bool,

    /// Only scan these columns, exclude all others
    #[arg(short, long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Rename columns after the inclusion test, as <column>=<alias>
    #[arg(short, long, value_delimiter = ',', value_parser = parse_alias)]
    pub alias: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Store directory
    pub path: PathBuf,

    /// Restrict the entity status computation to these columns
    #[arg(short, long, value_delimiter = ',')]
    pub include: Vec<String>,
}

fn parse_alias(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(column, alias)| (column.to_owned(), alias.to_owned()))
        .ok_or_else(|| format!("expected <column>=<alias>, got [{}]", raw))
}

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Scan(args) => scan(args),
        Command::Dump(args) => dump(args),
    }
}

fn scan(args: ScanArgs) -> Result<()> {
    let config = Config::builder()
        .includes(args.only)
        .aliases(args.alias)
        .build()?;
    let backend = RocksBackend::open(&args.path)?;
    let mut driver = Driver::new(backend, config);

    let stdin = io::stdin().lock();
    let result = if args.passthrough {
        // Passthrough shares stdout with the echoed stream and runs without
        // progress reporting.
        let reader = PassthroughReader::new(stdin, io::stdout().lock());
        driver.scan(reader, &mut NoopObserver)
    } else {
        let mut progress = ScanProgress::new();
        let result = driver.scan(JsonLinesReader::new(stdin), &mut progress);
        progress.finish();
        result
    };

    let closed = driver.close();
    result?;
    closed
}

fn dump(args: DumpArgs) -> Result<()> {
    let config = Config::builder().includes(args.include).build()?;
    let backend = RocksBackend::open(&args.path)?;
    let mut driver = Driver::new(backend, config);

    let mut writer = JsonLinesWriter::new(io::stdout().lock());
    let mut progress = DumpProgress::new();
    let result = driver.dump(&mut writer, &mut progress);
    progress.finish();

    let closed = driver.close();
    result?;
    closed
}
