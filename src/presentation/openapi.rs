use crate::application::session::login::LoginRequest;
use crate::application::session::register::RegisterRequest;
use crate::domain::users::PublicUser;
use crate::presentation::handlers::auth::{RefreshTokenBody, SessionResource};
use crate::shared::error::{ErrorObject, ErrorResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cattos Session API",
        version = "0.1.0",
        description = "Authentication and session lifecycle for the Cattos social network: registration, login, refresh-token rotation, and revocation."
    ),
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::refresh,
        crate::presentation::handlers::auth::logout,
        crate::presentation::handlers::auth::me,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshTokenBody,
            SessionResource,
            PublicUser,
            ErrorResponse,
            ErrorObject,
        )
    ),
    tags(
        (name = "auth", description = "Session lifecycle endpoints")
    )
)]
pub struct ApiDoc;
