use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockarium_core::{DomainError, DomainResult, Entity, MovementId, ProductId};

/// Actor name recorded when a movement is made without a known user.
pub const UNKNOWN_ACTOR: &str = "Unknown user";

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    /// Goods received (stock increases).
    In,
    /// Goods issued (stock decreases).
    Out,
}

impl MovementDirection {
    /// Split a signed change into a direction and a positive quantity.
    ///
    /// Returns `None` for a zero change.
    pub fn from_change(change: i64) -> Option<(Self, i64)> {
        match change {
            0 => None,
            c if c > 0 => Some((MovementDirection::In, c)),
            c => Some((MovementDirection::Out, c.checked_neg()?)),
        }
    }

    /// Signed stock delta for `quantity` units in this direction.
    pub fn delta(self, quantity: i64) -> i64 {
        match self {
            MovementDirection::In => quantity,
            MovementDirection::Out => -quantity,
        }
    }
}

impl core::fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            MovementDirection::In => "in",
            MovementDirection::Out => "out",
        })
    }
}

/// Immutable record of one stock change, newest first in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(rename = "type")]
    pub direction: MovementDirection,
    pub quantity: i64,
    pub date: DateTime<Utc>,
    pub user: String,
    #[serde(default)]
    pub reason: String,
}

impl Entity for StockMovement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: record a movement against a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMovement {
    pub product_id: ProductId,
    pub quantity: i64,
    pub direction: MovementDirection,
    pub reason: String,
    /// Display name of the acting user; `None` records [`UNKNOWN_ACTOR`].
    pub actor: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl RecordMovement {
    pub fn new(
        product_id: ProductId,
        quantity: i64,
        direction: MovementDirection,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id,
            quantity,
            direction,
            reason: reason.into(),
            actor: None,
            occurred_at,
        }
    }

    pub fn by(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub(crate) fn validate(&self) -> DomainResult<()> {
        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_change_splits_sign() {
        assert_eq!(
            MovementDirection::from_change(5),
            Some((MovementDirection::In, 5))
        );
        assert_eq!(
            MovementDirection::from_change(-3),
            Some((MovementDirection::Out, 3))
        );
        assert_eq!(MovementDirection::from_change(0), None);
        assert_eq!(MovementDirection::from_change(i64::MIN), None);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let cmd = RecordMovement::new(
            ProductId::new(),
            0,
            MovementDirection::In,
            "restock",
            Utc::now(),
        );
        assert!(matches!(cmd.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn direction_serializes_lowercase_under_type_key() {
        let movement = StockMovement {
            id: MovementId::new(),
            product_id: ProductId::new(),
            product_name: "Webcam".to_string(),
            direction: MovementDirection::Out,
            quantity: 2,
            date: Utc::now(),
            user: UNKNOWN_ACTOR.to_string(),
            reason: String::new(),
        };
        let json = serde_json::to_value(&movement).unwrap();
        assert_eq!(json["type"], "out");
        assert_eq!(json["productName"], "Webcam");
    }
}
