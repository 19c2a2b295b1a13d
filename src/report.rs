//! Per-community report tables: peak increase and panel replacement
//! fractions, one row per upgrade.

use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use comfy_table::{CellAlignment, Table, presets};
use tracing::info;

use crate::error::{PanelError, Result};
use crate::upgrade::evaluator::ScenarioOutcome;

/// Column header of the replacement table after `upgrade_name,n_applicable`.
const REPLACEMENT_COLUMNS: [&str; 3] = ["220.83 new_loads", "load_study", "average"];

/// `<dir>/fraction_of_peak_increase_<community>.csv`
pub fn peak_increase_path(dir: &Path, community: &str) -> PathBuf {
    dir.join(format!("fraction_of_peak_increase_{community}.csv"))
}

/// `<dir>/fraction_of_panel_upgrade_nec_<community>.csv`
pub fn replacement_path(dir: &Path, community: &str) -> PathBuf {
    dir.join(format!("fraction_of_panel_upgrade_nec_{community}.csv"))
}

fn fraction_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn count_cell(weight: f64) -> String {
    format!("{}", weight.trunc() as u64)
}

/// Accumulates scenario outcomes and renders the two report tables.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    community: String,
    thresholds_pct: Vec<f64>,
    outcomes: Vec<ScenarioOutcome>,
}

impl ReportAssembler {
    pub fn new(community: impl Into<String>, thresholds_pct: &[f64]) -> Self {
        Self {
            community: community.into(),
            thresholds_pct: thresholds_pct.to_vec(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: ScenarioOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }

    /// `upgrade_name,n_applicable,peak_increase>=25%,...`
    pub fn peak_increase_header(&self) -> Vec<String> {
        ["upgrade_name".to_string(), "n_applicable".to_string()]
            .into_iter()
            .chain(
                self.thresholds_pct
                    .iter()
                    .map(|t| format!("peak_increase>={t}%")),
            )
            .collect()
    }

    /// `upgrade_name,n_applicable,220.83 new_loads,load_study,average`
    pub fn replacement_header(&self) -> Vec<String> {
        ["upgrade_name", "n_applicable"]
            .into_iter()
            .chain(REPLACEMENT_COLUMNS)
            .map(str::to_string)
            .collect()
    }

    fn peak_increase_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.outcomes.iter().map(|o| {
            let mut row = vec![
                o.upgrade_name.clone(),
                count_cell(o.peak_increase.n_applicable),
            ];
            row.extend(o.peak_increase.fractions.iter().map(|(_, f)| fraction_cell(*f)));
            row
        })
    }

    fn replacement_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.outcomes.iter().map(|o| {
            let r = &o.replacement;
            vec![
                o.upgrade_name.clone(),
                count_cell(r.n_applicable),
                fraction_cell(r.new_load_220_83),
                fraction_cell(r.load_study),
                fraction_cell(r.average()),
            ]
        })
    }

    /// Writes the peak-increase table as CSV to any writer.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if writing fails.
    pub fn write_peak_increase(&self, writer: impl Write) -> io::Result<()> {
        write_rows(writer, self.peak_increase_header(), self.peak_increase_rows())
    }

    /// Writes the panel-replacement table as CSV to any writer.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if writing fails.
    pub fn write_replacement(&self, writer: impl Write) -> io::Result<()> {
        write_rows(writer, self.replacement_header(), self.replacement_rows())
    }

    /// Writes both CSV reports into `dir` and returns their paths
    /// `(peak_increase, replacement)`.
    ///
    /// # Errors
    ///
    /// Returns `PanelError::Io` if a file cannot be created or written.
    pub fn write_reports(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        let peak = peak_increase_path(dir, &self.community);
        let replacement = replacement_path(dir, &self.community);

        create(&peak)
            .and_then(|f| self.write_peak_increase(f))
            .map_err(|e| PanelError::io(&peak, e))?;
        create(&replacement)
            .and_then(|f| self.write_replacement(f))
            .map_err(|e| PanelError::io(&replacement, e))?;

        info!(path = %peak.display(), "wrote peak increase report");
        info!(path = %replacement.display(), "wrote panel replacement report");
        Ok((peak, replacement))
    }

    pub fn peak_increase_table(&self) -> Table {
        render(self.peak_increase_header(), self.peak_increase_rows())
    }

    pub fn replacement_table(&self) -> Table {
        render(self.replacement_header(), self.replacement_rows())
    }
}

impl fmt::Display for ReportAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Peak increase ({}) ---", self.community)?;
        writeln!(f, "{}", self.peak_increase_table())?;
        writeln!(f, "--- Panel replacement, NEC ({}) ---", self.community)?;
        write!(f, "{}", self.replacement_table())
    }
}

fn create(path: &Path) -> io::Result<io::BufWriter<File>> {
    File::create(path).map(io::BufWriter::new)
}

fn write_rows(
    writer: impl Write,
    header: Vec<String>,
    rows: impl Iterator<Item = Vec<String>>,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(&header)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn render(header: Vec<String>, rows: impl Iterator<Item = Vec<String>>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(header);
    for row in rows {
        let row: Vec<String> = row
            .into_iter()
            .enumerate()
            .map(|(i, cell)| match cell.parse::<f64>() {
                Ok(v) if i > 1 => format!("{v:.3}"),
                _ => cell,
            })
            .collect();
        table.add_row(row);
    }
    for column in table.column_iter_mut().skip(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}
