pub mod health;
pub mod verification;

pub use health::{HealthResponse, HealthStatus, PoolUsage, ServiceHealth};
pub use verification::{
    BeginVerificationRequest, BeginVerificationResponse, RespondRequest, RespondResponse,
    RevokeRequest, StatusResponse,
};
