//! Folds a group's expense and payment history into one net balance per member.

use super::model::{Expense, MemberBalances, MemberId, Payment};
use super::money::{Balance, SETTLEMENT_TOLERANCE, round_cents};
use rust_decimal::Decimal;

/// Computes each member's net balance.
///
/// Every listed member is present in the result, even with no activity.
/// Members that only show up in a split or a payment get an entry too.
/// Only completed, active payments count; scoping records to a group is the caller's
/// job. Values are rounded to cents once, at the end.
pub fn compute_balances(
    members: &[MemberId],
    expenses: &[Expense],
    payments: &[Payment],
) -> MemberBalances {
    let mut balances: MemberBalances = members
        .iter()
        .map(|member| (member.clone(), Balance::ZERO))
        .collect();

    for expense in expenses {
        *balances.entry(expense.paid_by.clone()).or_default() += expense.amount.value();
        for split in &expense.splits {
            *balances.entry(split.member.clone()).or_default() -= split.amount;
        }
    }

    for payment in payments.iter().filter(|p| p.counts()) {
        *balances.entry(payment.from.clone()).or_default() += payment.amount.value();
        *balances.entry(payment.to.clone()).or_default() -= payment.amount.value();
    }

    for balance in balances.values_mut() {
        *balance = balance.rounded();
    }
    balances
}

/// Aggregate view of a balance table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetPositions {
    /// Sum of all positive balances.
    pub owed_to_creditors: Decimal,
    /// Sum of the magnitudes of all negative balances.
    pub owed_by_debtors: Decimal,
    /// Signed sum of every balance. Zero for consistent input.
    pub residual: Decimal,
}

impl NetPositions {
    pub fn is_balanced(&self) -> bool {
        self.residual.abs() <= SETTLEMENT_TOLERANCE
    }
}

pub fn net_positions(balances: &MemberBalances) -> NetPositions {
    let (credit, debit) = balances.values().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(credit, debit), balance| {
            if balance.value() > Decimal::ZERO {
                (credit + balance.value(), debit)
            } else {
                (credit, debit - balance.value())
            }
        },
    );
    NetPositions {
        owed_to_creditors: round_cents(credit),
        owed_by_debtors: round_cents(debit),
        residual: round_cents(credit - debit),
    }
}
