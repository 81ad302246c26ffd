use crate::application::service::{BalanceView, DebtView, MemberSummary};
use crate::error::{Result, SettleError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for ReportFormat {
    type Err = SettleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(SettleError::ValidationError(format!(
                "Unknown format '{other}', expected 'json' or 'csv'"
            ))),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Csv => f.write_str("csv"),
        }
    }
}

/// Writes balance and settlement reports.
///
/// JSON output is an array of camelCase objects. CSV output uses the same
/// field names as its header and prints amounts with two decimals.
pub struct ReportWriter<W: Write> {
    sink: W,
    format: ReportFormat,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W, format: ReportFormat) -> Self {
        Self { sink, format }
    }

    pub fn write_balances(&mut self, balances: &[BalanceView]) -> Result<()> {
        match self.format {
            ReportFormat::Json => self.write_json(balances),
            ReportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(&mut self.sink);
                wtr.write_record(["userId", "balance", "currency", "groupId"])?;
                for view in balances {
                    let balance = format!("{:.2}", view.balance);
                    wtr.write_record([
                        view.user_id.as_str(),
                        balance.as_str(),
                        view.currency.as_str(),
                        view.group_id.as_str(),
                    ])?;
                }
                wtr.flush()?;
                Ok(())
            }
        }
    }

    pub fn write_debts(&mut self, debts: &[DebtView]) -> Result<()> {
        match self.format {
            ReportFormat::Json => self.write_json(debts),
            ReportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(&mut self.sink);
                wtr.write_record(["from", "to", "amount", "currency", "groupId"])?;
                for view in debts {
                    let amount = format!("{:.2}", view.amount);
                    wtr.write_record([
                        view.from.as_str(),
                        view.to.as_str(),
                        amount.as_str(),
                        view.currency.as_str(),
                        view.group_id.as_str(),
                    ])?;
                }
                wtr.flush()?;
                Ok(())
            }
        }
    }

    /// In CSV a summary is just the member's transfers, incoming and outgoing.
    pub fn write_summary(&mut self, summary: &MemberSummary) -> Result<()> {
        match self.format {
            ReportFormat::Json => self.write_json(summary),
            ReportFormat::Csv => {
                let debts: Vec<DebtView> = summary
                    .owes
                    .iter()
                    .chain(&summary.owed_by)
                    .cloned()
                    .collect();
                self.write_debts(&debts)
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.sink, value)?;
        writeln!(self.sink)?;
        Ok(())
    }
}
