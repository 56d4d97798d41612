use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
    /// IANA timezone name, e.g. `Europe/Warsaw`. `None` means the user
    /// never picked one; summaries then fall back to UTC.
    pub timezone: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub timezone: Option<String>,
}
