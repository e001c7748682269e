use utoipa::OpenApi;
use utoipa::ToSchema;

use crate::routes::auth::{CredentialsRequest, SessionResponse, UserResponse, WhoAmIResponse};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::signup,
        crate::routes::auth::signin,
        crate::routes::auth::whoami,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            CredentialsRequest,
            SessionResponse,
            UserResponse,
            WhoAmIResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth")
    )
)]
pub struct ApiDoc;
