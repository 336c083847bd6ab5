use axum::{
    extract::{Path, State},
    Extension, Json,
};
use common::{types::Envelope, RequestContext};
use service::player::{PlayerId, PlayerView};

use crate::errors::ApiError;
use crate::state::AppState;

fn parse_player_id(raw: &str) -> Result<PlayerId, ApiError> {
    match raw.parse::<PlayerId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::BadRequest("invalid player id format".into())),
    }
}

#[utoipa::path(get, path = "/api/v1/players/{id}", tag = "player",
    params(("id" = i64, Path, description = "Player id")),
    responses(
        (status = 200, description = "Player info", body = crate::openapi::PlayerInfoEnvelope),
        (status = 400, description = "Invalid id", body = crate::openapi::ErrorEnvelope),
        (status = 404, description = "Player not found", body = crate::openapi::ErrorEnvelope),
        (status = 500, description = "Internal error", body = crate::openapi::ErrorEnvelope),
    )
)]
pub async fn get_player_info(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<PlayerView>>, ApiError> {
    let id = parse_player_id(&raw_id)?;
    let view = state.players.get_player_info(&ctx, id).await?;
    Ok(Json(Envelope::ok(view)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_must_be_positive_integer() {
        assert_eq!(parse_player_id("42").ok(), Some(42));
        for bad in ["0", "-1", "abc", "", "1.5", "99999999999999999999"] {
            assert!(parse_player_id(bad).is_err(), "{bad} should be rejected");
        }
    }
}
