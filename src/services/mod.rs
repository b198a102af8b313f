pub mod auth_service;
pub mod event_service;
pub mod token_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthServiceError, LoginRequest};
pub use event_service::EventService;
pub use token_service::{Claims, TokenError, TokenKind, TokenPair, TokenService};
pub use user_service::{CreateUserRequest, UserService, UserServiceError};
