use serde::{Deserialize, Serialize};

use super::errors::RepositoryError;

/// The one entity this service manages.
///
/// An `id` of 0 means "not yet assigned"; repositories hand out the final
/// id on create and it never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: i32,
    pub item: String,
    pub amount: f64,
}

impl Order {
    pub fn new(item: impl Into<String>, amount: f64) -> Self {
        Self {
            id: 0,
            item: item.into(),
            amount,
        }
    }

    /// An order is valid iff `item` is non-empty and `amount` is positive.
    /// Pure check, no I/O; repositories call this before persisting.
    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.item.is_empty() {
            return Err(RepositoryError::InvalidEntity);
        }
        if self.amount <= 0.0 {
            return Err(RepositoryError::InvalidEntity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_order_passes() {
        assert!(Order::new("Bag", 2.0).validate().is_ok());
    }

    #[test]
    fn empty_item_is_invalid() {
        let err = Order::new("", 2.0).validate().unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidEntity));
    }

    #[test]
    fn zero_amount_is_invalid() {
        let err = Order::new("Bag", 0.0).validate().unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidEntity));
    }

    #[test]
    fn negative_amount_is_invalid() {
        let err = Order::new("Bag", -1.5).validate().unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidEntity));
    }

    #[test]
    fn deserializes_without_id() {
        let order: Order = serde_json::from_str(r#"{"item":"Bag","amount":2.0}"#).unwrap();
        assert_eq!(order.id, 0);
        assert_eq!(order.item, "Bag");
    }
}
