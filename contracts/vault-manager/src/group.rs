//! Atomic Transaction Groups
//!
//! A group is an ordered list of application calls and plain transfers
//! submitted together. Transfers are the companions that calls claim: the
//! fee for an opt-in, the deposit payment, the wrapped tokens for a mint.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use wvault_common::types::{Address, AppId, AssetId, GroupId, VaultOp};

/// Call into an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AppCall {
    pub sender: Address,
    pub app_id: AppId,
    pub op: VaultOp,
}

/// Native currency transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Payment {
    pub sender: Address,
    pub receiver: Address,
    pub amount: u64,
}

/// Asset transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AssetTransfer {
    pub asset_id: AssetId,
    pub sender: Address,
    pub receiver: Address,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum GroupItem {
    Call(AppCall),
    Payment(Payment),
    AssetTransfer(AssetTransfer),
}

impl GroupItem {
    pub fn sender(&self) -> Address {
        match self {
            GroupItem::Call(call) => call.sender,
            GroupItem::Payment(payment) => payment.sender,
            GroupItem::AssetTransfer(transfer) => transfer.sender,
        }
    }

    /// True for payments and asset transfers
    pub fn is_transfer(&self) -> bool {
        !matches!(self, GroupItem::Call(_))
    }
}

/// Items submitted together; they commit or abort as one unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TransactionGroup {
    pub items: Vec<GroupItem>,
}

impl TransactionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: GroupItem) {
        self.items.push(item);
    }

    pub fn with_call(mut self, sender: Address, app_id: AppId, op: VaultOp) -> Self {
        self.push(GroupItem::Call(AppCall { sender, app_id, op }));
        self
    }

    pub fn with_payment(mut self, sender: Address, receiver: Address, amount: u64) -> Self {
        self.push(GroupItem::Payment(Payment { sender, receiver, amount }));
        self
    }

    pub fn with_asset_transfer(
        mut self,
        asset_id: AssetId,
        sender: Address,
        receiver: Address,
        amount: u64,
    ) -> Self {
        self.push(GroupItem::AssetTransfer(AssetTransfer {
            asset_id,
            sender,
            receiver,
            amount,
        }));
        self
    }

    pub fn items(&self) -> &[GroupItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Deterministic id: sha256 of the borsh encoding
    pub fn group_id(&self) -> GroupId {
        // Encoding into a Vec cannot fail
        let bytes = borsh::to_vec(self).unwrap_or_default();
        Sha256::digest(&bytes).into()
    }
}

impl From<Vec<GroupItem>> for TransactionGroup {
    fn from(items: Vec<GroupItem>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Address = [1u8; 32];
    const B: Address = [2u8; 32];

    #[test]
    fn test_builder_order() {
        let group = TransactionGroup::new()
            .with_call(A, 1, VaultOp::Deposit { amount: 5 })
            .with_payment(A, B, 5)
            .with_asset_transfer(9, B, A, 3);
        assert_eq!(group.len(), 3);
        assert!(!group.items()[0].is_transfer());
        assert!(group.items()[1].is_transfer());
        assert_eq!(group.items()[2].sender(), B);
        assert_eq!(TransactionGroup::from(group.items.clone()), group);
    }

    #[test]
    fn test_group_id_depends_on_content_and_order() {
        let a = TransactionGroup::new().with_payment(A, B, 5).with_payment(B, A, 5);
        let b = TransactionGroup::new().with_payment(B, A, 5).with_payment(A, B, 5);
        assert_eq!(a.group_id(), a.clone().group_id());
        assert_ne!(a.group_id(), b.group_id());
        assert_ne!(a.group_id(), TransactionGroup::new().with_payment(A, B, 6).group_id());
    }
}
