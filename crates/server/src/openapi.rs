use std::collections::HashMap;

use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct ComponentStatusDoc {
    /// UP | DEGRADED | DOWN | DISABLED
    pub status: String,
    pub latency: Option<String>,
    pub details: Option<String>,
    pub message: Option<String>,
}

#[derive(ToSchema)]
pub struct SystemMetricsDoc {
    pub pid: u32,
    pub worker_threads: usize,
    pub alive_tasks: usize,
}

#[derive(ToSchema)]
pub struct HealthReportDoc {
    /// UP | DEGRADED
    pub status: String,
    pub uptime: String,
    pub version: String,
    pub system: SystemMetricsDoc,
    pub components: HashMap<String, ComponentStatusDoc>,
}

#[derive(ToSchema)]
pub struct RegisterRequestDoc {
    pub username: String,
    pub password: String,
    /// Decimal string with two fractional digits, defaults to "0.00"
    pub balance: Option<String>,
}

#[derive(ToSchema)]
pub struct LoginRequestDoc { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct PlayerInfoDoc {
    pub id: i64,
    pub username: String,
    pub balance: String,
    pub created_at: String,
}

#[derive(ToSchema)]
pub struct PlayerInfoEnvelope { pub code: u16, pub message: String, pub data: PlayerInfoDoc }

#[derive(ToSchema)]
pub struct LoginDataDoc { pub token: String }

#[derive(ToSchema)]
pub struct LoginEnvelope { pub code: u16, pub message: String, pub data: LoginDataDoc }

#[derive(ToSchema)]
pub struct ErrorEnvelope { pub code: u16, pub message: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::players::get_player_info,
    ),
    components(
        schemas(
            ComponentStatusDoc,
            SystemMetricsDoc,
            HealthReportDoc,
            RegisterRequestDoc,
            LoginRequestDoc,
            PlayerInfoDoc,
            PlayerInfoEnvelope,
            LoginDataDoc,
            LoginEnvelope,
            ErrorEnvelope,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "player")
    )
)]
pub struct ApiDoc;
