//! Resolves an expense's split rule into per-member amounts.
//!
//! The balance calculator only ever sees resolved amounts. This is where
//! equal, percentage and exact rules turn into them, with cent rounding that
//! keeps the split total equal to the expense amount.

use super::model::{MemberId, Split};
use super::money::{Amount, SETTLEMENT_TOLERANCE, round_cents};
use crate::error::{Result, SettleError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const CENT: Decimal = dec!(0.01);
const HUNDRED: Decimal = dec!(100);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "shares", rename_all = "lowercase")]
pub enum SplitRule {
    Equal(Vec<MemberId>),
    Percentage(Vec<(MemberId, Decimal)>),
    Exact(Vec<(MemberId, Decimal)>),
}

impl SplitRule {
    pub fn members(&self) -> Vec<&MemberId> {
        match self {
            Self::Equal(members) => members.iter().collect(),
            Self::Percentage(shares) | Self::Exact(shares) => {
                shares.iter().map(|(member, _)| member).collect()
            }
        }
    }

    pub fn resolve(&self, total: Amount) -> Result<Vec<Split>> {
        check_members(&self.members())?;
        match self {
            Self::Equal(members) => Ok(equal(members, total.value())),
            Self::Percentage(shares) => percentage(shares, total.value()),
            Self::Exact(shares) => exact(shares, total.value()),
        }
    }
}

fn check_members(members: &[&MemberId]) -> Result<()> {
    if members.is_empty() {
        return Err(SettleError::InvalidSplit(
            "at least one member is required".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for member in members {
        if !seen.insert(*member) {
            return Err(SettleError::InvalidSplit(format!(
                "member {member} appears more than once"
            )));
        }
    }
    Ok(())
}

fn equal(members: &[MemberId], total: Decimal) -> Vec<Split> {
    let count = Decimal::from(members.len());
    let base = (total / count).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut leftover_cents = ((total - base * count) / CENT).round();

    members
        .iter()
        .map(|member| {
            let mut amount = base;
            if leftover_cents > Decimal::ZERO {
                amount += CENT;
                leftover_cents -= Decimal::ONE;
            }
            Split::new(member.clone(), amount)
        })
        .collect()
}

fn percentage(shares: &[(MemberId, Decimal)], total: Decimal) -> Result<Vec<Split>> {
    if let Some((member, pct)) = shares.iter().find(|(_, pct)| *pct < Decimal::ZERO) {
        return Err(SettleError::InvalidSplit(format!(
            "negative percentage {pct} for {member}"
        )));
    }
    let pct_sum: Decimal = shares.iter().map(|(_, pct)| *pct).sum();
    if (pct_sum - HUNDRED).abs() > SETTLEMENT_TOLERANCE {
        return Err(SettleError::InvalidSplit(format!(
            "percentages add up to {pct_sum}, expected 100"
        )));
    }

    // Shares are taken relative to the actual sum so they cover the total
    // exactly. Each is truncated to cents and the leftover cents go to the
    // largest remainders, which keeps every share non-negative.
    let exact_shares: Vec<Decimal> = shares
        .iter()
        .map(|(_, pct)| total * *pct / pct_sum)
        .collect();
    let mut amounts: Vec<Decimal> = exact_shares
        .iter()
        .map(|share| share.round_dp_with_strategy(2, RoundingStrategy::ToZero))
        .collect();
    let assigned: Decimal = amounts.iter().sum();
    let leftover_cents = round_cents(total - assigned) / CENT;

    let mut by_remainder: Vec<usize> = (0..amounts.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        (exact_shares[b] - amounts[b]).cmp(&(exact_shares[a] - amounts[a]))
    });
    for &idx in by_remainder.iter().take(leftover_cents.to_usize().unwrap_or_default()) {
        amounts[idx] += CENT;
    }

    Ok(shares
        .iter()
        .zip(amounts)
        .map(|((member, pct), amount)| Split {
            member: member.clone(),
            amount,
            percentage: Some(*pct),
        })
        .collect())
}

fn exact(shares: &[(MemberId, Decimal)], total: Decimal) -> Result<Vec<Split>> {
    if let Some((member, amount)) = shares.iter().find(|(_, amount)| *amount < Decimal::ZERO) {
        return Err(SettleError::InvalidSplit(format!(
            "negative amount {amount} for {member}"
        )));
    }
    let sum: Decimal = shares.iter().map(|(_, amount)| *amount).sum();
    if (sum - total).abs() > SETTLEMENT_TOLERANCE {
        return Err(SettleError::InvalidSplit(format!(
            "split amounts add up to {sum}, expected {total}"
        )));
    }
    Ok(shares
        .iter()
        .map(|(member, amount)| Split::new(member.clone(), *amount))
        .collect())
}
