pub mod auth;
pub mod request_id;

pub use auth::{AdminAccess, AuthTokens, PlatformSender, GATEWAY_TOKEN_HEADER, ADMIN_TOKEN_HEADER, PLATFORM_HANDLE_HEADER};
pub use request_id::{RequestId, RequestIdExt, RequestIdMiddleware, REQUEST_ID_HEADER};
