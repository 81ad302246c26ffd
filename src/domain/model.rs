use super::money::{Amount, Balance};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Net balance per member, in the order members were first seen.
pub type MemberBalances = IndexMap<MemberId, Balance>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named set of members sharing one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(default)]
    pub name: String,
    /// Empty when the source did not say; callers fill in a default.
    #[serde(default)]
    pub currency: String,
    pub members: Vec<MemberId>,
}

impl Group {
    pub fn is_member(&self, member: &MemberId) -> bool {
        self.members.contains(member)
    }
}

/// The share of one expense owed by one member, already resolved to an amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    #[serde(alias = "userId")]
    pub member: MemberId,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
}

impl Split {
    pub fn new(member: MemberId, amount: Decimal) -> Self {
        Self {
            member,
            amount,
            percentage: None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub group_id: GroupId,
    #[serde(default)]
    pub description: String,
    pub amount: Amount,
    #[serde(default)]
    pub currency: String,
    pub paid_by: MemberId,
    pub splits: Vec<Split>,
    /// Cleared when an expense is deleted; inactive expenses never count.
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Cancelled,
}

/// A recorded transfer between two members.
///
/// `group_id` is `None` for direct payments made outside any group; those
/// count towards every group's balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(alias = "fromUserId")]
    pub from: MemberId,
    #[serde(alias = "toUserId")]
    pub to: MemberId,
    pub amount: Amount,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: PaymentStatus,
    /// Cleared when a payment is deleted.
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Payment {
    pub fn is_completed(&self) -> bool {
        self.status == PaymentStatus::Completed
    }

    /// Completed and not deleted.
    pub fn counts(&self) -> bool {
        self.active && self.is_completed()
    }

    pub fn applies_to(&self, group: &GroupId) -> bool {
        self.group_id.as_ref().is_none_or(|id| id == group)
    }
}

/// One settlement instruction: `from` pays `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Decimal,
    pub currency: String,
}
