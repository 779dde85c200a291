use cyb3ria_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::helper::RequestHelper;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub password: String,
    pub repeat_password: String,
    pub invitation_code: String,
    pub ip_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
}

impl RegistrationRequest {
    /// Same checks the server applies, so obvious mistakes never leave the client.
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty()
            || self.password.is_empty()
            || self.repeat_password.is_empty()
            || self.invitation_code.is_empty()
        {
            return Err(Error::Validation("All fields must be filled.".to_string()));
        }
        if self.password != self.repeat_password {
            return Err(Error::Validation("Passwords do not match.".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("invitation_code", &self.invitation_code)
            .field("ip_address", &self.ip_address)
            .field("mac_address", &self.mac_address)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub csrf_token: Option<String>,
}

impl RequestHelper {
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        if request.username.is_empty() || request.password.is_empty() {
            return Err(Error::Validation("All fields must be filled.".to_string()));
        }
        let data = self.send(LOGIN_PATH, "POST", request).await?;
        let response: AuthResponse = serde_json::from_value(data)?;
        info!(username = %request.username, "Logged in");
        Ok(response)
    }

    pub async fn register(&self, request: &RegistrationRequest) -> Result<AuthResponse> {
        request.validate()?;
        let data = self.send(REGISTER_PATH, "POST", request).await?;
        let response: AuthResponse = serde_json::from_value(data)?;
        info!(username = %request.username, "Registered");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::tests::helper;
    use crate::helper::CSRF_HEADER;

    fn registration() -> RegistrationRequest {
        RegistrationRequest {
            username: "neo".to_string(),
            password: "pw".to_string(),
            repeat_password: "pw".to_string(),
            invitation_code: "INV".to_string(),
            ip_address: "10.0.0.2".to_string(),
            mac_address: None,
        }
    }

    #[test]
    fn test_registration_validation() {
        assert!(registration().validate().is_ok());

        let mut missing = registration();
        missing.invitation_code.clear();
        assert!(matches!(missing.validate(), Err(Error::Validation(ref m)) if m == "All fields must be filled."));

        let mut mismatch = registration();
        mismatch.repeat_password = "other".to_string();
        assert!(matches!(mismatch.validate(), Err(Error::Validation(ref m)) if m == "Passwords do not match."));
    }

    #[test]
    fn test_debug_hides_passwords() {
        let login = LoginRequest {
            username: "neo".to_string(),
            password: "secret".to_string(),
        };
        assert!(!format!("{:?}", login).contains("secret"));
        assert!(!format!("{:?}", registration()).contains("pw"));
    }

    #[test]
    fn test_registration_wire_format() {
        let json = serde_json::to_string(&registration()).unwrap();
        assert_eq!(
            json,
            r#"{"username":"neo","password":"pw","repeat_password":"pw","invitation_code":"INV","ip_address":"10.0.0.2"}"#
        );
    }

    #[tokio::test]
    async fn test_login_posts_credentials_and_rotates() {
        let (helper, transport, _store) = helper();
        transport.respond(
            200,
            "OK",
            r#"{"message":"User logged in successfully.","username":"neo","csrf_token":"C1"}"#,
        );

        let response = helper
            .login(&LoginRequest {
                username: "neo".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.username.as_deref(), Some("neo"));
        assert_eq!(response.csrf_token.as_deref(), Some("C1"));
        let sent = transport.request(0);
        assert_eq!(sent.url, "https://cyb3ria.xyz/api/login");
        assert_eq!(sent.body, r#"{"username":"neo","password":"pw"}"#);
        assert_eq!(sent.header(CSRF_HEADER), None);
        assert_eq!(helper.tokens().current().unwrap(), "C1");
    }

    #[tokio::test]
    async fn test_register_rejected_locally() {
        let (helper, transport, _store) = helper();
        let mut request = registration();
        request.repeat_password = "nope".to_string();

        assert!(matches!(helper.register(&request).await, Err(Error::Validation(_))));
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_server_error_message() {
        let (helper, transport, _store) = helper();
        transport.respond(500, "Internal Server Error", r#"{"message":"Failed to save user to database."}"#);

        let err = helper.register(&registration()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to save user to database.");
    }
}
