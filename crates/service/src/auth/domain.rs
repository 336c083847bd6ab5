use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Login result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutput {
    pub token: String,
}

/// Registration input; balance defaults to 0.00
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub balance: Option<Decimal>,
}

/// Payload published on `player.registered`
#[derive(Debug, Clone, Serialize)]
pub struct PlayerRegistered<'a> {
    pub player_id: i64,
    pub username: &'a str,
}
