use crate::domain::model::{Expense, Group, GroupId, Payment};
use crate::domain::ports::{ExpenseRepository, GroupRepository, PaymentRepository};
use crate::error::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for groups.
#[derive(Default, Clone)]
pub struct InMemoryGroupRepository {
    groups: Arc<RwLock<HashMap<GroupId, Group>>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn store(&self, group: Group) -> Result<()> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get(&self, group_id: &GroupId) -> Result<Option<Group>> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }
}

/// A thread-safe in-memory store for expenses.
///
/// Keyed by expense id; storing an id again replaces the record in place, so
/// reads come back in first-recorded order.
#[derive(Default, Clone)]
pub struct InMemoryExpenseRepository {
    expenses: Arc<RwLock<IndexMap<String, Expense>>>,
}

impl InMemoryExpenseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    async fn store(&self, expense: Expense) -> Result<()> {
        let mut expenses = self.expenses.write().await;
        expenses.insert(expense.id.clone(), expense);
        Ok(())
    }

    async fn for_group(&self, group_id: &GroupId) -> Result<Vec<Expense>> {
        let expenses = self.expenses.read().await;
        Ok(expenses
            .values()
            .filter(|expense| &expense.group_id == group_id)
            .cloned()
            .collect())
    }
}

/// A thread-safe in-memory store for payments.
#[derive(Default, Clone)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<IndexMap<String, Payment>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn store(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id.clone(), payment);
        Ok(())
    }

    async fn for_group_or_direct(&self, group_id: &GroupId) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|payment| payment.applies_to(group_id))
            .cloned()
            .collect())
    }
}
