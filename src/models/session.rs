use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The persisted authentication state: an opaque bearer token plus the user profile.
///
/// A present token is the only authentication signal; its format is never inspected.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: Value,
}

impl Session {
    pub fn new(token: impl Into<String>, user: Value) -> Self {
        Session {
            token: token.into(),
            user,
        }
    }
}

/// Body returned by the login, register and Google exchange endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AuthTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Value,
}

impl From<AuthTokenResponse> for Session {
    fn from(response: AuthTokenResponse) -> Self {
        Session::new(response.access_token, response.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_response_without_token_type() {
        let response: AuthTokenResponse =
            serde_json::from_value(json!({"access_token": "abc", "user": {"id": 1}}))
                .expect("response should parse");
        let session = Session::from(response);
        assert_eq!(session.token, "abc");
        assert_eq!(session.user, json!({"id": 1}));
    }

    #[test]
    fn test_token_response_requires_access_token() {
        let result =
            serde_json::from_value::<AuthTokenResponse>(json!({"user": {"id": 1}}));
        assert!(result.is_err());
    }
}
