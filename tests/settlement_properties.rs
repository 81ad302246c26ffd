use groupsettle::domain::balance::{compute_balances, net_positions};
use groupsettle::domain::model::{
    Expense, GroupId, MemberBalances, MemberId, Payment, PaymentStatus, Split,
};
use groupsettle::domain::money::{Amount, Balance, SETTLEMENT_TOLERANCE};
use groupsettle::domain::simplify::{DebtSimplifier, SimplifyStrategy, apply_debts};
use groupsettle::domain::split::SplitRule;
use proptest::prelude::*;
use rust_decimal::Decimal;

const STRATEGIES: [SimplifyStrategy; 2] =
    [SimplifyStrategy::LargestFirst, SimplifyStrategy::InOrder];

fn member(idx: usize) -> MemberId {
    MemberId::new(format!("m{idx}"))
}

fn cents(value: u64) -> Decimal {
    Decimal::new(value as i64, 2)
}

/// Builds expenses split equally among a bitmask of members.
fn expenses(member_count: usize, raw: &[(u64, usize, usize)]) -> Vec<Expense> {
    raw.iter()
        .enumerate()
        .map(|(idx, &(amount_cents, payer, mask))| {
            let amount = Amount::new(cents(amount_cents)).unwrap();
            let mut sharing: Vec<MemberId> = (0..member_count)
                .filter(|m| mask & (1usize << *m) != 0)
                .map(member)
                .collect();
            if sharing.is_empty() {
                sharing.push(member(payer % member_count));
            }
            Expense {
                id: format!("e{idx}"),
                group_id: GroupId::new("g"),
                description: String::new(),
                amount,
                currency: "USD".to_string(),
                paid_by: member(payer % member_count),
                splits: SplitRule::Equal(sharing).resolve(amount).unwrap(),
                active: true,
            }
        })
        .collect()
}

fn payments(member_count: usize, raw: &[(u64, usize, usize, bool)]) -> Vec<Payment> {
    raw.iter()
        .enumerate()
        .map(|(idx, &(amount_cents, from, to, completed))| Payment {
            id: format!("p{idx}"),
            group_id: Some(GroupId::new("g")),
            from: member(from % member_count),
            to: member(to % member_count),
            amount: Amount::new(cents(amount_cents)).unwrap(),
            currency: "USD".to_string(),
            status: if completed {
                PaymentStatus::Completed
            } else {
                PaymentStatus::Pending
            },
            active: true,
        })
        .collect()
}

/// Ledgers priced in cents, shared equally among a random subset of members.
fn cent_balances() -> impl Strategy<Value = MemberBalances> {
    (
        1usize..=6,
        prop::collection::vec((1u64..=100_000, 0usize..6, 0usize..64), 0..=25),
        prop::collection::vec((1u64..=50_000, 0usize..6, 0usize..6, any::<bool>()), 0..=10),
    )
        .prop_map(|(member_count, raw_expenses, raw_payments)| {
            let members: Vec<MemberId> = (0..member_count).map(member).collect();
            compute_balances(
                &members,
                &expenses(member_count, &raw_expenses),
                &payments(member_count, &raw_payments),
            )
        })
}

/// Ledgers in whole currency units with exact per-member shares.
///
/// No balance can sit strictly between zero and one unit, so every transfer
/// the simplifier emits closes a position exactly.
fn whole_unit_balances() -> impl Strategy<Value = MemberBalances> {
    (
        2usize..=7,
        prop::collection::vec((0usize..7, prop::collection::vec(0u64..=500, 7)), 0..=20),
    )
        .prop_map(|(member_count, raw_expenses)| {
            let members: Vec<MemberId> = (0..member_count).map(member).collect();
            let expenses: Vec<Expense> = raw_expenses
                .into_iter()
                .enumerate()
                .filter_map(|(idx, (payer, shares))| {
                    let splits: Vec<Split> = shares
                        .iter()
                        .take(member_count)
                        .enumerate()
                        .filter(|(_, units)| **units > 0)
                        .map(|(m, units)| Split::new(member(m), Decimal::from(*units)))
                        .collect();
                    let total: Decimal = splits.iter().map(|s| s.amount).sum();
                    Some(Expense {
                        id: format!("e{idx}"),
                        group_id: GroupId::new("g"),
                        description: String::new(),
                        amount: Amount::new(total).ok()?,
                        currency: "USD".to_string(),
                        paid_by: member(payer % member_count),
                        splits,
                        active: true,
                    })
                })
                .collect();
            compute_balances(&members, &expenses, &[])
        })
}

proptest! {
    #[test]
    fn balances_sum_to_zero(balances in cent_balances()) {
        let total: Decimal = balances.values().map(Balance::value).sum();
        prop_assert!(total.abs() <= SETTLEMENT_TOLERANCE);
        prop_assert!(net_positions(&balances).is_balanced());
    }

    #[test]
    fn debts_settle_every_balance(balances in whole_unit_balances()) {
        for strategy in STRATEGIES {
            let debts = DebtSimplifier::new(strategy).simplify(&balances, "USD");
            let after = apply_debts(&balances, &debts);
            for (member, balance) in &after {
                prop_assert!(
                    balance.is_settled(),
                    "{} left with {} under {}", member, balance, strategy
                );
            }
        }
    }

    #[test]
    fn debts_are_never_below_a_cent(balances in cent_balances()) {
        for strategy in STRATEGIES {
            let debts = DebtSimplifier::new(strategy).simplify(&balances, "USD");
            for debt in &debts {
                prop_assert!(debt.amount >= SETTLEMENT_TOLERANCE);
                prop_assert_ne!(&debt.from, &debt.to);
                prop_assert_eq!(debt.amount, debt.amount.round_dp(2));
            }
        }
    }

    #[test]
    fn transfer_count_is_bounded(balances in whole_unit_balances()) {
        let owing = balances.values().filter(|b| b.is_debtor()).count();
        let owed = balances.values().filter(|b| b.is_creditor()).count();
        let debts = DebtSimplifier::new(SimplifyStrategy::LargestFirst).simplify(&balances, "USD");
        prop_assert!(debts.len() <= (owing + owed).saturating_sub(1));
    }

    #[test]
    fn settled_balances_simplify_to_nothing(member_count in 0usize..=8) {
        let balances: MemberBalances = (0..member_count)
            .map(|idx| (member(idx), Balance::ZERO))
            .collect();
        for strategy in STRATEGIES {
            prop_assert!(DebtSimplifier::new(strategy).simplify(&balances, "USD").is_empty());
        }
    }
}

#[test]
fn zero_activity_member_is_listed_but_never_pays() {
    let members: Vec<MemberId> = (0..3).map(member).collect();
    let amount = Amount::new(Decimal::from(90)).unwrap();
    let expense = Expense {
        id: "e1".to_string(),
        group_id: GroupId::new("g"),
        description: "lunch".to_string(),
        amount,
        currency: "USD".to_string(),
        paid_by: member(0),
        splits: vec![
            Split::new(member(0), Decimal::from(45)),
            Split::new(member(1), Decimal::from(45)),
        ],
        active: true,
    };

    let balances = compute_balances(&members, &[expense], &[]);
    assert_eq!(balances[&member(2)], Balance::ZERO);

    let debts = DebtSimplifier::default().simplify(&balances, "USD");
    assert_eq!(debts.len(), 1);
    assert!(debts.iter().all(|d| d.from != member(2) && d.to != member(2)));
}
