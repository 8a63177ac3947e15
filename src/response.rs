use serde::{Deserialize, Serialize};

/// Status code the service embeds in the body of a successful response.
pub const STATUS_OK: u16 = 200;

/// Decoded response envelope of `GET <endpoint>/json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub status: Status,
    /// Absent for subscription accounts, which are not rate limited.
    #[serde(default)]
    pub rate: Option<Rate>,
    #[serde(default)]
    pub results: Vec<GeocodeResultItem>,
}

impl GeocodeResult {
    pub fn is_success(&self) -> bool {
        self.status.code == STATUS_OK
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Unix timestamp (seconds) at which the window resets.
    pub reset: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResultItem {
    /// 0 (unknown) to 10 (most precise).
    pub confidence: i32,
    pub formatted: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub bounds: Option<ResultBounds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultBounds {
    pub northeast: Geometry,
    pub southwest: Geometry,
}
