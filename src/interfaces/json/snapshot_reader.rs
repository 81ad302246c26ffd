use crate::domain::model::{Expense, Group, GroupId, MemberId, Payment, Split};
use crate::domain::money::Amount;
use crate::domain::split::SplitRule;
use crate::error::{Result, SettleError};
use serde::Deserialize;
use std::io::Read;

/// An expense as exported by the surrounding system.
///
/// Carries either resolved `splits` or a `splitRule` still to be resolved.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: String,
    pub group_id: GroupId,
    #[serde(default)]
    pub description: String,
    pub amount: Amount,
    #[serde(default)]
    pub currency: String,
    pub paid_by: MemberId,
    #[serde(default)]
    pub splits: Option<Vec<Split>>,
    #[serde(default)]
    pub split_rule: Option<SplitRule>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl TryFrom<ExpenseRecord> for Expense {
    type Error = SettleError;

    fn try_from(record: ExpenseRecord) -> Result<Self> {
        let splits = match (record.splits, record.split_rule) {
            (Some(splits), None) => splits,
            (None, Some(rule)) => rule.resolve(record.amount)?,
            (Some(_), Some(_)) => {
                return Err(SettleError::InvalidSplit(format!(
                    "expense {}: give either splits or splitRule, not both",
                    record.id
                )));
            }
            (None, None) => {
                return Err(SettleError::InvalidSplit(format!(
                    "expense {}: no splits",
                    record.id
                )));
            }
        };

        Ok(Expense {
            id: record.id,
            group_id: record.group_id,
            description: record.description,
            amount: record.amount,
            currency: record.currency,
            paid_by: record.paid_by,
            splits,
            active: record.active,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    payments: Vec<Payment>,
}

/// Everything read from a snapshot file, ready to be stored.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub groups: Vec<Group>,
    pub expenses: Vec<Expense>,
    pub payments: Vec<Payment>,
}

/// Reads a JSON export of groups, expenses and payments.
pub struct SnapshotReader<R: Read> {
    source: R,
    default_currency: String,
}

impl<R: Read> SnapshotReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            default_currency: String::new(),
        }
    }

    /// Currency given to groups that do not name one.
    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    pub fn read(self) -> Result<Snapshot> {
        let raw: RawSnapshot = serde_json::from_reader(self.source)?;

        let groups = raw
            .groups
            .into_iter()
            .map(|mut group| {
                if group.currency.is_empty() {
                    group.currency = self.default_currency.clone();
                }
                group
            })
            .collect();
        let expenses = raw
            .expenses
            .into_iter()
            .map(Expense::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Snapshot {
            groups,
            expenses,
            payments: raw.payments,
        })
    }
}
