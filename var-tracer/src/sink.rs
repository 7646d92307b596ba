//! Record rendering
//!
//! Two interchangeable renderers consume a function's record when it
//! returns: a grid table over the flat change log, and a per-variable
//! lifecycle listing. The renderer is selected once, from the settings.

use std::io::{self, Write};

use crate::settings::Settings;
use crate::store::FunctionRecord;
use crate::types::Result;

/// Renders one function's record on emission
pub trait OutputSink {
    /// Render the record emitted for a tracking key
    fn print(&mut self, record: &FunctionRecord, key: &str) -> Result<()>;
}

/// Build the renderer selected by the settings, writing to stdout
pub fn sink_for(settings: &Settings) -> Box<dyn OutputSink> {
    if settings.print_table {
        Box::new(TablePrinter::stdout())
    } else {
        Box::new(LifecyclePrinter::stdout())
    }
}

/// Tabular renderer over the flat change log
pub struct TablePrinter<W: Write> {
    out: W,
}

impl TablePrinter<io::Stdout> {
    /// Table renderer writing to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TablePrinter<W> {
    /// Table renderer writing to the given writer
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> OutputSink for TablePrinter<W> {
    fn print(&mut self, record: &FunctionRecord, key: &str) -> Result<()> {
        if record.changes.is_empty() {
            return Ok(());
        }

        let headers = ["Variable", "Change Type", "Value"];
        let rows: Vec<[String; 3]> = record
            .changes
            .iter()
            .map(|c| [c.variable.clone(), c.kind.to_string(), c.value.to_string()])
            .collect();

        let mut widths = [headers[0].len(), headers[1].len(), headers[2].len()];
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.len());
            }
        }

        writeln!(self.out)?;
        writeln!(
            self.out,
            "-----------------Function '{}' data-----------------",
            key
        )?;
        write_rule(&mut self.out, &widths)?;
        write_row(&mut self.out, &headers.map(String::from), &widths)?;
        write_rule(&mut self.out, &widths)?;
        for row in &rows {
            write_row(&mut self.out, row, &widths)?;
            write_rule(&mut self.out, &widths)?;
        }
        Ok(())
    }
}

fn write_rule<W: Write>(out: &mut W, widths: &[usize; 3]) -> io::Result<()> {
    for width in widths {
        write!(out, "+{}", "-".repeat(width + 2))?;
    }
    writeln!(out, "+")
}

fn write_row<W: Write>(out: &mut W, cells: &[String; 3], widths: &[usize; 3]) -> io::Result<()> {
    for (cell, width) in cells.iter().zip(widths.iter()) {
        write!(out, "| {:<width$} ", cell, width = *width)?;
    }
    writeln!(out, "|")
}

/// Hierarchical renderer over the per-variable lifecycle view
pub struct LifecyclePrinter<W: Write> {
    out: W,
}

impl LifecyclePrinter<io::Stdout> {
    /// Lifecycle renderer writing to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> LifecyclePrinter<W> {
    /// Lifecycle renderer writing to the given writer
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> OutputSink for LifecyclePrinter<W> {
    fn print(&mut self, record: &FunctionRecord, key: &str) -> Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "-----------------Function '{}' Variable Lifecycles-----------------",
            key
        )?;
        for (var_name, history) in &record.lifecycle {
            writeln!(self.out, "  Variable: {}", var_name)?;
            for entry in history {
                writeln!(self.out, "    - {}: {}", entry.kind, entry.value)?;
            }
        }
        Ok(())
    }
}
