use crate::domain::model::{Expense, GroupId, MemberId};
use crate::domain::money::Amount;
use crate::domain::split::SplitRule;
use crate::error::{Result, SettleError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::iter::Peekable;

/// One split of one expense, as laid out in the flat CSV format.
///
/// Consecutive rows sharing an `expense` id make up a single expense. When
/// every row leaves `share` empty the amount is split equally.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ExpenseRow {
    pub expense: String,
    pub group: String,
    pub payer: String,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub description: String,
    pub member: String,
    pub share: Option<Decimal>,
}

/// Turns flat split rows into expenses.
///
/// Each row names one member's share of an expense; the rows of one expense
/// must be adjacent. An id that shows up again after another expense's rows
/// is an error rather than a second expense.
pub struct ExpenseReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ExpenseReader<R> {
    /// Expects a header row. Fields are trimmed and the trailing `share`
    /// column may be left off entirely.
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads rows and assembles them into expenses.
    ///
    /// A malformed row or an inconsistent group of rows yields an error for
    /// that expense only; reading carries on with the next one.
    pub fn expenses(self) -> Expenses<R> {
        Expenses {
            rows: self.reader.into_deserialize().peekable(),
            seen: HashSet::new(),
        }
    }
}

pub struct Expenses<R: Read> {
    rows: Peekable<csv::DeserializeRecordsIntoIter<R, ExpenseRow>>,
    seen: HashSet<String>,
}

impl<R: Read> Iterator for Expenses<R> {
    type Item = Result<Expense>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.rows.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e.into())),
        };

        let mut rows = vec![first];
        while let Some(Ok(next)) = self.rows.peek() {
            if next.expense != rows[0].expense {
                break;
            }
            if let Some(Ok(row)) = self.rows.next() {
                rows.push(row);
            }
        }
        if !self.seen.insert(rows[0].expense.clone()) {
            return Some(Err(SettleError::ValidationError(format!(
                "expense {} appears again after other rows",
                rows[0].expense
            ))));
        }
        Some(assemble(rows))
    }
}

fn assemble(rows: Vec<ExpenseRow>) -> Result<Expense> {
    let head = &rows[0];
    if let Some(row) = rows
        .iter()
        .find(|row| row.group != head.group || row.payer != head.payer || row.amount != head.amount)
    {
        return Err(SettleError::ValidationError(format!(
            "expense {}: rows disagree on group, payer or amount (member {})",
            head.expense, row.member
        )));
    }

    let amount = Amount::new(head.amount)?;
    let shares: Option<Vec<(MemberId, Decimal)>> = rows
        .iter()
        .map(|row| row.share.map(|share| (MemberId::new(row.member.as_str()), share)))
        .collect();
    let rule = match shares {
        Some(shares) => SplitRule::Exact(shares),
        None if rows.iter().all(|row| row.share.is_none()) => SplitRule::Equal(
            rows.iter()
                .map(|row| MemberId::new(row.member.as_str()))
                .collect(),
        ),
        None => {
            return Err(SettleError::InvalidSplit(format!(
                "expense {}: either every row or no row must carry a share",
                head.expense
            )));
        }
    };

    Ok(Expense {
        id: head.expense.clone(),
        group_id: GroupId::new(head.group.as_str()),
        description: head.description.clone(),
        amount,
        currency: head.currency.clone(),
        paid_by: MemberId::new(head.payer.as_str()),
        splits: rule.resolve(amount)?,
        active: true,
    })
}
