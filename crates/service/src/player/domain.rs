use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Backend-assigned identifier; positive once a player has been created.
pub type PlayerId = i64;

/// Canonical player record.
///
/// Deliberately not `Serialize`: the secret must never leave the process
/// through a response body. Use [`Player::view`] for anything outward facing.
#[derive(Clone, PartialEq, Default)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub secret: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Input for `create_player`; id and timestamps are assigned by the backend.
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
            balance: money(Decimal::ZERO),
            ..Default::default()
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = money(balance);
        self
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            username: self.username.clone(),
            balance: self.balance,
            created_at: self.created_at,
        }
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("secret", &"***")
            .field("balance", &self.balance)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl From<models::player::Model> for Player {
    fn from(m: models::player::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            secret: m.password,
            balance: money(m.balance),
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

/// Read-only projection returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub username: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Balances are fixed-point with two fractional digits.
pub fn money(mut amount: Decimal) -> Decimal {
    amount.rescale(2);
    amount
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_defaults_balance_to_zero_cents() {
        let p = Player::new("alice", "s3cret");
        assert_eq!(p.id, 0);
        assert_eq!(p.balance.to_string(), "0.00");
    }

    #[test]
    fn debug_hides_secret() {
        let p = Player::new("alice", "s3cret");
        let dbg = format!("{:?}", p);
        assert!(dbg.contains("alice"));
        assert!(!dbg.contains("s3cret"));
    }

    #[test]
    fn view_omits_secret_in_json() {
        let p = Player::new("bob", "hunter2").with_balance(Decimal::new(100050, 2));
        let json = serde_json::to_value(p.view()).unwrap();
        assert_eq!(json["username"], "bob");
        assert_eq!(json["balance"], "1000.50");
        assert!(json.get("secret").is_none());
        assert!(json.get("password").is_none());
    }
}
