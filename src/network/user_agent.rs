//! Request header values

/// User agent identifying this crate and version
pub fn default_user_agent() -> String {
    format!("llomax/{}", crate::VERSION)
}

/// Accept header for archive API requests
pub fn accept_json() -> &'static str {
    "application/json,text/javascript,*/*;q=0.01"
}
