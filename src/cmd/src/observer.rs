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

//! Progress spinners on stderr. Stdout stays reserved for data.

use std::collections::BTreeMap;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use silo_common::{DataLink, DataRow};
use silo_core::{Observer, Status};

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_message(message);
    bar
}

/// Live row and link counters for the scan loop.
pub struct ScanProgress {
    rows: u64,
    links: u64,
    bar: ProgressBar,
}

impl ScanProgress {
    pub fn new() -> Self {
        Self {
            rows: 0,
            links: 0,
            bar: spinner("Scanning ..."),
        }
    }

    fn describe(&self) {
        self.bar.set_message(format!(
            "Scanned {} rows, found {} links",
            self.rows, self.links
        ));
    }

    pub fn finish(self) {
        self.describe();
        self.bar.finish();
    }
}

impl Observer for ScanProgress {
    fn on_row(&mut self, _row: &DataRow) {
        self.rows += 1;
        self.bar.inc(1);
        self.describe();
    }

    fn on_link(&mut self, _link: &DataLink) {
        self.links += 1;
        self.bar.inc(1);
        self.describe();
    }
}

/// Entity counter by status for the dump loop.
pub struct DumpProgress {
    total: u64,
    complete: u64,
    consistent: u64,
    inconsistent: u64,
    empty: u64,
    bar: ProgressBar,
}

impl DumpProgress {
    pub fn new() -> Self {
        Self {
            total: 0,
            complete: 0,
            consistent: 0,
            inconsistent: 0,
            empty: 0,
            bar: spinner("Dumping ..."),
        }
    }

    fn describe(&self) {
        self.bar.set_message(format!(
            "Dumped {} entities / complete={} / consistent={} / inconsistent={} / empty={}",
            self.total, self.complete, self.consistent, self.inconsistent, self.empty
        ));
    }

    pub fn finish(self) {
        self.describe();
        self.bar.finish();
    }
}

impl Observer for DumpProgress {
    fn on_entity(&mut self, status: Status, _counts: &BTreeMap<String, usize>) {
        self.total += 1;
        match status {
            Status::Complete => self.complete += 1,
            Status::Consistent => self.consistent += 1,
            Status::Inconsistent => self.inconsistent += 1,
            Status::Empty => self.empty += 1,
        }
        self.bar.inc(1);
        self.describe();
    }
}
