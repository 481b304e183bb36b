use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for QuickBuzz Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::sse::host_stream,
        crate::routes::participant::validate_name,
        crate::routes::participant::register,
        crate::routes::participant::status,
        crate::routes::participant::press,
        crate::routes::participant::logout,
        crate::routes::host::login,
        crate::routes::host::host_status,
        crate::routes::host::change_password,
        crate::routes::host::unlock_all,
        crate::routes::host::lock_all,
        crate::routes::host::unlock_team,
        crate::routes::host::clear_presses,
        crate::routes::host::clear_logs,
        crate::routes::host::host_logout,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::ActionResponse,
            crate::dto::common::RankingEntry,
            crate::dto::common::ParticipantSummary,
            crate::dto::common::HostParticipantSummary,
            crate::dto::participant::NameCheckRequest,
            crate::dto::participant::NameCheckResponse,
            crate::dto::participant::RegisterTeamRequest,
            crate::dto::participant::RegisterTeamResponse,
            crate::dto::participant::PressBuzzerResponse,
            crate::dto::participant::ParticipantStatusResponse,
            crate::dto::host::HostLoginRequest,
            crate::dto::host::HostLoginResponse,
            crate::dto::host::ChangePasswordRequest,
            crate::dto::host::UnlockTeamRequest,
            crate::dto::host::HostStatusResponse,
            crate::dto::host::LogEntryDto,
            crate::dto::sse::ParticipantJoinedEvent,
            crate::dto::sse::ParticipantLeftEvent,
            crate::dto::sse::BuzzerPressedEvent,
            crate::dto::sse::ParticipantBuzzerUnlockedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "participant", description = "Team registration and buzzer operations"),
        (name = "host", description = "Host authentication and competition control"),
    )
)]
pub struct ApiDoc;
