use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// A single order. Only ever constructed in a valid state: every constructor
/// and every revision goes through [`Order::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    item: String,
    quantity: i32,
}

impl Order {
    pub fn new(id: Uuid, item: impl Into<String>, quantity: i32) -> Result<Self, DomainError> {
        let order = Self {
            id,
            item: item.into(),
            quantity,
        };
        order.validate()?;
        Ok(order)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    /// Returns a copy of this order carrying the new item and quantity.
    ///
    /// The whole entity is re-validated, not just the changed fields; the id
    /// is carried over unchanged.
    pub fn revise(&self, item: impl Into<String>, quantity: i32) -> Result<Self, DomainError> {
        Self::new(self.id, item, quantity)
    }

    /// Checks the entity invariants, reporting the first one violated.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(&self.item, self.quantity)?;
        if self.id.is_nil() {
            return Err(DomainError::InvalidOrderData(
                "id cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validates the caller-supplied fields of an order.
///
/// An empty item is reported before a non-positive quantity.
pub fn validate_fields(item: &str, quantity: i32) -> Result<(), DomainError> {
    if item.trim().is_empty() {
        return Err(DomainError::InvalidOrderData(
            "item cannot be empty".to_string(),
        ));
    }
    if quantity <= 0 {
        return Err(DomainError::InvalidOrderData(
            "quantity must be positive".to_string(),
        ));
    }
    Ok(())
}
