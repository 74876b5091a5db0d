use serde::Serialize;

/// Success envelope for mutations: `{"status":"OK"}`.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub status: &'static str,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { status: "OK" }
    }
}

/// Success envelope for register/login: `{"status":"OK","token":"..."}`.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub status: &'static str,
    pub token: String,
}

impl TokenResponse {
    pub fn ok(token: String) -> Self {
        Self {
            status: "OK",
            token,
        }
    }
}
