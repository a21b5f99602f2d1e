pub mod attribute;
pub mod block;
pub mod fmt;

pub use attribute::{attribute, AttributeArgs};
pub use block::{block, BlockArgs};
pub use fmt::fmt;

use anyhow::{anyhow, Result};
use hcledit_editor::{DeriveOperator, EditOperator, EditorError, Filter, Sink};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Where the document comes from, and where results go
#[derive(Debug, Clone)]
pub struct Context {
    /// Input path; `-` reads stdin
    pub file: String,
    /// Write edits back to `file`
    pub update: bool,
    /// Compose removals with the vertical formatter
    pub tidy: bool,
}

impl Context {
    pub fn new(file: String, update: bool, tidy: bool) -> Result<Self> {
        if update && file == "-" {
            return Err(anyhow!("--update requires --file; cannot update stdin in place"));
        }
        Ok(Self { file, update, tidy })
    }

    fn reads_stdin(&self) -> bool {
        self.file == "-"
    }

    fn filename(&self) -> &str {
        if self.reads_stdin() {
            "<stdin>"
        } else {
            &self.file
        }
    }

    fn read_source(&self) -> Result<Vec<u8>> {
        if self.reads_stdin() {
            let mut source = Vec::new();
            io::stdin().read_to_end(&mut source)?;
            Ok(source)
        } else {
            fs::read(&self.file).map_err(|e| anyhow!("Cannot read {}: {}", self.file, e))
        }
    }

    /// Run a filter over the document and emit the result.
    pub fn edit(&self, filter: Filter) -> Result<()> {
        let source = self.read_source()?;
        tracing::debug!(filter = filter.name(), file = self.filename(), "editing");

        let output = EditOperator::new(filter)
            .apply(&source, self.filename())
            .map_err(|e| describe(e, &source))?;

        if self.update {
            if output != source {
                fs::write(PathBuf::from(&self.file), &output)?;
            }
            Ok(())
        } else {
            write_stdout(&output)
        }
    }

    /// Run a read-only query; the input file is never written.
    pub fn derive(&self, sink: impl Sink + 'static) -> Result<()> {
        let source = self.read_source()?;
        let output = DeriveOperator::new(sink)
            .apply(&source, self.filename())
            .map_err(|e| describe(e, &source))?;
        write_stdout(&output)
    }
}

fn write_stdout(output: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(output)?;
    stdout.flush()?;
    Ok(())
}

/// Turn an editor error into a user-facing one, with source context for
/// syntax errors.
fn describe(err: EditorError, source: &[u8]) -> anyhow::Error {
    match err {
        EditorError::Syntax { filename, source: parse_error } => {
            // Use pretty error formatting
            let text = String::from_utf8_lossy(source);
            anyhow!(
                "\n{}",
                hcledit_parser::format_error(&text, &filename, &parse_error)
            )
        }
        other => anyhow!(other),
    }
}
