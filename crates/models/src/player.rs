use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, DatabaseConnection, QueryFilter, Set};

use crate::errors::ModelError;

pub const USERNAME_MAX_LEN: usize = 100;
pub const PASSWORD_MAX_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "player")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub balance: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    if username.trim().is_empty() {
        return Err(ModelError::Validation("username required".into()));
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(ModelError::Validation(format!("username longer than {USERNAME_MAX_LEN} chars")));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.is_empty() {
        return Err(ModelError::Validation("password required".into()));
    }
    if password.len() > PASSWORD_MAX_LEN {
        return Err(ModelError::Validation(format!("password longer than {PASSWORD_MAX_LEN} bytes")));
    }
    Ok(())
}

/// Largest value a `decimal(10,2)` column holds.
pub fn balance_max() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

pub fn validate_balance(balance: Decimal) -> Result<(), ModelError> {
    if balance < Decimal::ZERO {
        return Err(ModelError::Validation("balance must not be negative".into()));
    }
    if scaled(balance) > balance_max() {
        return Err(ModelError::Validation(format!("balance exceeds {}", balance_max())));
    }
    Ok(())
}

/// Money columns are `decimal(10,2)`; keep two fractional digits so `0` reads back as `0.00`.
fn scaled(mut balance: Decimal) -> Decimal {
    balance.rescale(2);
    balance
}

/// Insert a player; the database assigns `id`. A duplicate username is reported as `ModelError::Conflict`.
pub async fn create(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    balance: Decimal,
) -> Result<Model, ModelError> {
    validate_username(username)?;
    validate_password(password)?;
    validate_balance(balance)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: NotSet,
        username: Set(username.to_string()),
        password: Set(password.to_string()),
        balance: Set(scaled(balance)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<Model>, ModelError> {
    let found = Entity::find()
        .filter(Column::Username.eq(username))
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?;
    Ok(found)
}

pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Model>, ModelError> {
    let found = Entity::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?;
    Ok(found)
}

/// Mark a live player as deleted. Returns `false` when no live row has `id`.
pub async fn soft_delete(db: &DatabaseConnection, id: i64) -> Result<bool, ModelError> {
    let Some(found) = Entity::find_by_id(id)
        .filter(Column::DeletedAt.is_null())
        .one(db)
        .await?
    else {
        return Ok(false);
    };
    let mut found: ActiveModel = found.into();
    let now = Utc::now().into();
    found.deleted_at = Set(Some(now));
    found.updated_at = Set(now);
    found.update(db).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(matches!(validate_username("   "), Err(ModelError::Validation(_))));
        assert!(validate_username(&"x".repeat(USERNAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn balance_must_fit_the_column() {
        assert!(validate_balance(Decimal::ZERO).is_ok());
        assert!(validate_balance(balance_max()).is_ok());
        assert!(validate_balance(Decimal::new(-1, 2)).is_err());
        assert!(validate_balance(Decimal::new(100_000_000, 0)).is_err());
        // 99999999.999 rounds up past the column limit
        assert!(validate_balance(Decimal::new(99_999_999_999, 3)).is_err());
    }

    #[tokio::test]
    async fn create_rejects_oversized_balance_before_touching_the_database() {
        let db = DatabaseConnection::Disconnected;
        let res = create(&db, "rich", "pw", Decimal::new(1_000_000_000_000, 0)).await;
        assert!(matches!(res, Err(ModelError::Validation(_))), "got {:?}", res);
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("s3cret").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"p".repeat(PASSWORD_MAX_LEN + 1)).is_err());
    }
}
