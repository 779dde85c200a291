pub mod auth;
pub mod helper;
pub mod transport;

pub use auth::{AuthResponse, LoginRequest, RegistrationRequest};
pub use helper::{failure_message, RequestHelper, CSRF_HEADER};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
