/// Activity recording shared by every mutating operation.
pub mod activity_service;
/// Buzzer press handling and host gate transitions.
pub mod buzzer_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Host authentication and credential management.
pub mod host_service;
/// Participant registration and lifecycle.
pub mod participant_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
