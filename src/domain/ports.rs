use super::model::{Expense, Group, GroupId, Payment};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn store(&self, group: Group) -> Result<()>;
    async fn get(&self, group_id: &GroupId) -> Result<Option<Group>>;
}

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn store(&self, expense: Expense) -> Result<()>;
    /// All expenses recorded against the group, active or not.
    async fn for_group(&self, group_id: &GroupId) -> Result<Vec<Expense>>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn store(&self, payment: Payment) -> Result<()>;
    /// Payments recorded against the group plus direct payments with no group.
    async fn for_group_or_direct(&self, group_id: &GroupId) -> Result<Vec<Payment>>;
}

pub type GroupRepositoryBox = Box<dyn GroupRepository>;
pub type ExpenseRepositoryBox = Box<dyn ExpenseRepository>;
pub type PaymentRepositoryBox = Box<dyn PaymentRepository>;
