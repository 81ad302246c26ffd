use crate::domain::balance::{compute_balances, net_positions};
use crate::domain::model::{Debt, Expense, Group, GroupId, MemberBalances, MemberId, Payment};
use crate::domain::ports::{ExpenseRepositoryBox, GroupRepositoryBox, PaymentRepositoryBox};
use crate::domain::simplify::{DebtSimplifier, SimplifyStrategy};
use crate::error::{Result, SettleError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One member's balance as reported for a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    pub user_id: MemberId,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub currency: String,
    pub group_id: GroupId,
}

/// One settlement instruction as reported for a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtView {
    pub from: MemberId,
    pub to: MemberId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub group_id: GroupId,
}

impl DebtView {
    fn from_debt(debt: Debt, group_id: &GroupId) -> Self {
        Self {
            from: debt.from,
            to: debt.to,
            amount: debt.amount,
            currency: debt.currency,
            group_id: group_id.clone(),
        }
    }
}

/// A single member's slice of the group's settlement plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub user_id: MemberId,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub currency: String,
    pub group_id: GroupId,
    /// Transfers this member should make.
    pub owes: Vec<DebtView>,
    /// Transfers this member should receive.
    pub owed_by: Vec<DebtView>,
}

/// The records of one group, fetched together before any computation.
struct GroupSnapshot {
    group: Group,
    expenses: Vec<Expense>,
    payments: Vec<Payment>,
}

/// Answers balance and settlement queries for a group.
///
/// `BalanceService` owns the repositories and reads a fresh snapshot on every
/// call. Nothing is cached and nothing is written back.
pub struct BalanceService {
    groups: GroupRepositoryBox,
    expenses: ExpenseRepositoryBox,
    payments: PaymentRepositoryBox,
    simplifier: DebtSimplifier,
}

impl BalanceService {
    /// Creates a new `BalanceService` using the default settlement strategy.
    pub fn new(
        groups: GroupRepositoryBox,
        expenses: ExpenseRepositoryBox,
        payments: PaymentRepositoryBox,
    ) -> Self {
        Self {
            groups,
            expenses,
            payments,
            simplifier: DebtSimplifier::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: SimplifyStrategy) -> Self {
        self.simplifier = DebtSimplifier::new(strategy);
        self
    }

    pub fn strategy(&self) -> SimplifyStrategy {
        self.simplifier.strategy()
    }

    /// Net balance of every member, in group member order.
    pub async fn group_balances(&self, group_id: &GroupId) -> Result<Vec<BalanceView>> {
        let snapshot = self.snapshot(group_id).await?;
        let balances = self.balances(&snapshot);

        Ok(balances
            .into_iter()
            .map(|(user_id, balance)| BalanceView {
                user_id,
                balance: balance.value(),
                currency: snapshot.group.currency.clone(),
                group_id: group_id.clone(),
            })
            .collect())
    }

    /// Transfers that settle the whole group.
    pub async fn simplified_debts(&self, group_id: &GroupId) -> Result<Vec<DebtView>> {
        let snapshot = self.snapshot(group_id).await?;
        let balances = self.balances(&snapshot);
        Ok(self.plan(&snapshot, &balances))
    }

    /// Balance and transfers concerning one member of the group.
    pub async fn member_summary(
        &self,
        group_id: &GroupId,
        member: &MemberId,
    ) -> Result<MemberSummary> {
        let snapshot = self.snapshot(group_id).await?;
        if !snapshot.group.is_member(member) {
            return Err(SettleError::NotAMember {
                group: group_id.to_string(),
                member: member.to_string(),
            });
        }

        let balances = self.balances(&snapshot);
        let balance = balances
            .get(member)
            .map(|b| b.value())
            .unwrap_or_default();
        let (owes, owed_by): (Vec<DebtView>, Vec<DebtView>) = self
            .plan(&snapshot, &balances)
            .into_iter()
            .filter(|debt| &debt.from == member || &debt.to == member)
            .partition(|debt| &debt.from == member);

        Ok(MemberSummary {
            user_id: member.clone(),
            balance,
            currency: snapshot.group.currency,
            group_id: group_id.clone(),
            owes,
            owed_by,
        })
    }

    async fn snapshot(&self, group_id: &GroupId) -> Result<GroupSnapshot> {
        let group = self
            .groups
            .get(group_id)
            .await?
            .ok_or_else(|| SettleError::GroupNotFound(group_id.to_string()))?;

        let expenses: Vec<Expense> = self
            .expenses
            .for_group(group_id)
            .await?
            .into_iter()
            .filter(|expense| expense.active)
            .collect();
        let payments: Vec<Payment> = self
            .payments
            .for_group_or_direct(group_id)
            .await?
            .into_iter()
            .filter(Payment::counts)
            .collect();

        debug!(
            group = %group_id,
            members = group.members.len(),
            expenses = expenses.len(),
            payments = payments.len(),
            "Loaded group snapshot"
        );

        Ok(GroupSnapshot {
            group,
            expenses,
            payments,
        })
    }

    fn balances(&self, snapshot: &GroupSnapshot) -> MemberBalances {
        let balances = compute_balances(
            &snapshot.group.members,
            &snapshot.expenses,
            &snapshot.payments,
        );

        let positions = net_positions(&balances);
        if !positions.is_balanced() {
            warn!(
                group = %snapshot.group.id,
                residual = %positions.residual,
                "Group balances do not sum to zero; expense splits may not match their totals"
            );
        }
        balances
    }

    fn plan(&self, snapshot: &GroupSnapshot, balances: &MemberBalances) -> Vec<DebtView> {
        let debts = self.simplifier.simplify(balances, &snapshot.group.currency);
        debug!(
            group = %snapshot.group.id,
            strategy = %self.simplifier.strategy(),
            transfers = debts.len(),
            "Simplified group debts"
        );

        debts
            .into_iter()
            .map(|debt| DebtView::from_debt(debt, &snapshot.group.id))
            .collect()
    }
}
