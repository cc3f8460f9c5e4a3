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

//! Line-delimited JSON adapters for the driver ports.

use std::io::{BufRead, Write};

use anyhow::Context;
use serde::Serialize;
use silo_common::{DataNode, DataRow};
use silo_core::{DataRowReader, DumpWriter};

/// Reads one JSON object per line. Blank lines are skipped; nulls and
/// missing columns are equivalent downstream.
pub struct JsonLinesReader<R> {
    input: R,
    line: String,
}

impl<R: BufRead> JsonLinesReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: String::new(),
        }
    }
}

impl<R: BufRead> DataRowReader for JsonLinesReader<R> {
    fn read_row(&mut self) -> anyhow::Result<Option<DataRow>> {
        loop {
            self.line.clear();
            let read = self
                .input
                .read_line(&mut self.line)
                .context("reading input line")?;
            if read == 0 {
                return Ok(None);
            }
            if self.line.trim().is_empty() {
                continue;
            }
            return parse_row(&self.line).map(Some);
        }
    }
}

/// Echoes every input line verbatim to the output before parsing it.
pub struct PassthroughReader<R, W> {
    input: R,
    output: W,
    line: String,
}

impl<R: BufRead, W: Write> PassthroughReader<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            line: String::new(),
        }
    }
}

impl<R: BufRead, W: Write> DataRowReader for PassthroughReader<R, W> {
    fn read_row(&mut self) -> anyhow::Result<Option<DataRow>> {
        loop {
            self.line.clear();
            let read = self
                .input
                .read_line(&mut self.line)
                .context("reading input line")?;
            if read == 0 {
                self.output.flush().context("flushing passthrough output")?;
                return Ok(None);
            }
            self.output
                .write_all(self.line.as_bytes())
                .context("passing input line through")?;
            if self.line.trim().is_empty() {
                continue;
            }
            return parse_row(&self.line).map(Some);
        }
    }
}

fn parse_row(line: &str) -> anyhow::Result<DataRow> {
    let value: serde_json::Value =
        serde_json::from_str(line).context("parsing input line as JSON")?;
    match value {
        serde_json::Value::Object(object) => Ok(DataRow::from_json_object(object)),
        _ => anyhow::bail!("expected one JSON object per line"),
    }
}

#[derive(Serialize)]
struct DumpRecord<'a> {
    uuid: &'a str,
    id: &'a str,
    key: serde_json::Value,
}

/// Writes one `{uuid, id, key}` object per emitted node, preserving the
/// original JSON type of the value.
pub struct JsonLinesWriter<W> {
    output: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> DumpWriter for JsonLinesWriter<W> {
    fn write_node(&mut self, node: &DataNode, uuid: &str) -> anyhow::Result<()> {
        let record = DumpRecord {
            uuid,
            id: &node.key,
            key: node.data.to_json(),
        };
        serde_json::to_writer(&mut self.output, &record).context("writing dump record")?;
        self.output.write_all(b"\n").context("writing dump record")?;
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.output.flush().context("flushing dump output")?;
        Ok(())
    }
}
