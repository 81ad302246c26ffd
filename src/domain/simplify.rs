//! Reduces a balance table to a short list of point-to-point transfers.
//!
//! Both strategies are greedy and neither guarantees the minimum number of
//! transfers. They never emit a transfer of a cent or less. Balances already
//! within a cent of zero are left out, so the counterparty of several such
//! members can end up a few cents short.

use super::model::{Debt, MemberBalances, MemberId};
use super::money::{SETTLEMENT_TOLERANCE, round_cents};
use crate::error::SettleError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How creditors are matched against debtors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimplifyStrategy {
    /// Sort both sides by magnitude, largest first, and pair them off.
    #[default]
    LargestFirst,
    /// Scan every debtor for every creditor, in balance-table order.
    InOrder,
}

impl FromStr for SimplifyStrategy {
    type Err = SettleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "largest-first" => Ok(Self::LargestFirst),
            "in-order" => Ok(Self::InOrder),
            other => Err(SettleError::ValidationError(format!(
                "Unknown strategy '{other}', expected 'largest-first' or 'in-order'"
            ))),
        }
    }
}

impl fmt::Display for SimplifyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LargestFirst => f.write_str("largest-first"),
            Self::InOrder => f.write_str("in-order"),
        }
    }
}

/// Debt simplification service
#[derive(Debug, Clone, Copy, Default)]
pub struct DebtSimplifier {
    strategy: SimplifyStrategy,
}

impl DebtSimplifier {
    pub fn new(strategy: SimplifyStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SimplifyStrategy {
        self.strategy
    }

    /// Turns balances into transfers, in the order they are matched.
    ///
    /// Balances within a cent of zero are treated as settled and never appear
    /// in the output. Every emitted amount is rounded to cents.
    pub fn simplify(&self, balances: &MemberBalances, currency: &str) -> Vec<Debt> {
        let (creditors, debtors) = partition(balances);
        match self.strategy {
            SimplifyStrategy::LargestFirst => largest_first(creditors, debtors, currency),
            SimplifyStrategy::InOrder => in_order(creditors, debtors, currency),
        }
    }
}

/// Simplifies with the default [`SimplifyStrategy::LargestFirst`] policy.
pub fn simplify_debts(balances: &MemberBalances, currency: &str) -> Vec<Debt> {
    DebtSimplifier::default().simplify(balances, currency)
}

/// Applies transfers to a balance table: the payer moves up, the payee down.
pub fn apply_debts(balances: &MemberBalances, debts: &[Debt]) -> MemberBalances {
    let mut result = balances.clone();
    for debt in debts {
        *result.entry(debt.from.clone()).or_default() += debt.amount;
        *result.entry(debt.to.clone()).or_default() -= debt.amount;
    }
    result
}

type Side = Vec<(MemberId, Decimal)>;

fn partition(balances: &MemberBalances) -> (Side, Side) {
    let mut creditors = Vec::new();
    let mut debtors = Vec::new();
    for (member, balance) in balances {
        if balance.is_creditor() {
            creditors.push((member.clone(), balance.value()));
        } else if balance.is_debtor() {
            debtors.push((member.clone(), balance.abs()));
        }
    }
    (creditors, debtors)
}

fn debt(from: &MemberId, to: &MemberId, amount: Decimal, currency: &str) -> Debt {
    Debt {
        from: from.clone(),
        to: to.clone(),
        amount: round_cents(amount),
        currency: currency.to_string(),
    }
}

fn largest_first(mut creditors: Side, mut debtors: Side, currency: &str) -> Vec<Debt> {
    // Stable sorts keep table order among equal magnitudes.
    creditors.sort_by(|a, b| b.1.cmp(&a.1));
    debtors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut transfers = Vec::new();
    let (mut c, mut d) = (0, 0);
    while c < creditors.len() && d < debtors.len() {
        let settled = creditors[c].1.min(debtors[d].1);
        if settled > SETTLEMENT_TOLERANCE {
            transfers.push(debt(&debtors[d].0, &creditors[c].0, settled, currency));
        }
        creditors[c].1 -= settled;
        debtors[d].1 -= settled;

        if creditors[c].1 <= SETTLEMENT_TOLERANCE {
            c += 1;
        }
        if debtors[d].1 <= SETTLEMENT_TOLERANCE {
            d += 1;
        }
    }
    transfers
}

fn in_order(mut creditors: Side, mut debtors: Side, currency: &str) -> Vec<Debt> {
    let mut transfers = Vec::new();
    for (creditor, credit) in creditors.iter_mut() {
        for (debtor, owed) in debtors.iter_mut() {
            if *credit <= SETTLEMENT_TOLERANCE {
                break;
            }
            if *owed <= SETTLEMENT_TOLERANCE {
                continue;
            }
            let settled = (*credit).min(*owed);
            transfers.push(debt(debtor, creditor, settled, currency));
            *credit -= settled;
            *owed -= settled;
        }
    }
    transfers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Balance;
    use rust_decimal_macros::dec;

    fn table(entries: &[(&str, Decimal)]) -> MemberBalances {
        entries
            .iter()
            .map(|(id, amount)| (MemberId::new(*id), Balance::new(*amount)))
            .collect()
    }

    fn triples(debts: &[Debt]) -> Vec<(&str, &str, Decimal)> {
        debts
            .iter()
            .map(|d| (d.from.as_str(), d.to.as_str(), d.amount))
            .collect()
    }

    fn assert_closed(balances: &MemberBalances, debts: &[Debt]) {
        let after = apply_debts(balances, debts);
        for (member, balance) in &after {
            assert!(balance.is_settled(), "{member} left with {balance}");
        }
    }

    #[test]
    fn test_single_creditor_two_debtors() {
        let balances = table(&[("a", dec!(200)), ("b", dec!(-100)), ("c", dec!(-100))]);

        let debts = simplify_debts(&balances, "USD");

        assert_eq!(
            triples(&debts),
            vec![("b", "a", dec!(100)), ("c", "a", dec!(100))]
        );
        assert!(debts.iter().all(|d| d.currency == "USD"));
        assert_closed(&balances, &debts);
    }

    #[test]
    fn test_largest_first_multi_step_matching() {
        let balances = table(&[
            ("a", dec!(150)),
            ("b", dec!(50)),
            ("c", dec!(-100)),
            ("d", dec!(-100)),
        ]);

        let debts = simplify_debts(&balances, "USD");

        assert_eq!(
            triples(&debts),
            vec![
                ("c", "a", dec!(100)),
                ("d", "a", dec!(50)),
                ("d", "b", dec!(50)),
            ]
        );
        assert_closed(&balances, &debts);
    }

    #[test]
    fn test_largest_first_sorts_by_magnitude() {
        let balances = table(&[
            ("small", dec!(10)),
            ("big", dec!(90)),
            ("d1", dec!(-20)),
            ("d2", dec!(-80)),
        ]);

        let debts = simplify_debts(&balances, "USD");

        assert_eq!(
            triples(&debts),
            vec![
                ("d2", "big", dec!(80)),
                ("d1", "big", dec!(10)),
                ("d1", "small", dec!(10)),
            ]
        );
    }

    #[test]
    fn test_in_order_follows_table_order() {
        let balances = table(&[
            ("small", dec!(10)),
            ("big", dec!(90)),
            ("d1", dec!(-20)),
            ("d2", dec!(-80)),
        ]);

        let debts = DebtSimplifier::new(SimplifyStrategy::InOrder).simplify(&balances, "USD");

        assert_eq!(
            triples(&debts),
            vec![
                ("d1", "small", dec!(10)),
                ("d1", "big", dec!(10)),
                ("d2", "big", dec!(80)),
            ]
        );
        assert_closed(&balances, &debts);
    }

    #[test]
    fn test_all_zero_balances_yield_nothing() {
        let balances = table(&[("a", dec!(0)), ("b", dec!(0)), ("c", dec!(0))]);

        for strategy in [SimplifyStrategy::LargestFirst, SimplifyStrategy::InOrder] {
            assert!(DebtSimplifier::new(strategy).simplify(&balances, "USD").is_empty());
        }
    }

    #[test]
    fn test_near_zero_balances_are_settled() {
        let balances = table(&[
            ("a", dec!(0.01)),
            ("b", dec!(-0.01)),
            ("c", dec!(5)),
            ("d", dec!(-5)),
        ]);

        let debts = simplify_debts(&balances, "USD");

        assert_eq!(triples(&debts), vec![("d", "c", dec!(5))]);
    }

    #[test]
    fn test_dust_members_are_never_matched() {
        // d and e sit inside the tolerance, so b keeps the two cents they owe.
        let balances = table(&[
            ("a", dec!(1.01)),
            ("b", dec!(1.01)),
            ("c", dec!(-2.00)),
            ("d", dec!(-0.01)),
            ("e", dec!(-0.01)),
        ]);

        let debts = simplify_debts(&balances, "USD");

        assert_eq!(
            triples(&debts),
            vec![("c", "a", dec!(1.01)), ("c", "b", dec!(0.99))]
        );
        let after = apply_debts(&balances, &debts);
        assert_eq!(after[&MemberId::new("b")], Balance::new(dec!(0.02)));
    }

    #[test]
    fn test_emitted_amounts_are_rounded_to_cents() {
        let balances = table(&[("a", dec!(33.333)), ("b", dec!(-33.333))]);

        let debts = simplify_debts(&balances, "EUR");

        assert_eq!(triples(&debts), vec![("b", "a", dec!(33.33))]);
        assert_eq!(debts[0].currency, "EUR");
    }

    #[test]
    fn test_apply_debts_moves_both_sides() {
        let balances = table(&[("a", dec!(10)), ("b", dec!(-10))]);
        let debts = vec![Debt {
            from: MemberId::new("b"),
            to: MemberId::new("a"),
            amount: dec!(4),
            currency: "USD".to_string(),
        }];

        let after = apply_debts(&balances, &debts);

        assert_eq!(after[&MemberId::new("a")], Balance::new(dec!(6)));
        assert_eq!(after[&MemberId::new("b")], Balance::new(dec!(-6)));
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "largest-first".parse::<SimplifyStrategy>().unwrap(),
            SimplifyStrategy::LargestFirst
        );
        assert_eq!(
            "in-order".parse::<SimplifyStrategy>().unwrap(),
            SimplifyStrategy::InOrder
        );
        assert!("random".parse::<SimplifyStrategy>().is_err());
        assert_eq!(SimplifyStrategy::InOrder.to_string(), "in-order");
    }
}
