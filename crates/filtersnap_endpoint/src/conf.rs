//! Endpoint defaults.

/// Deployed filter-data endpoint.
pub const C_ENDPOINT_URL_DEFAULT: &str =
    "http://tablue-tablu-r8ty2qntrtky-1570365544.us-east-1.elb.amazonaws.com/flask/filter-data";
/// Environment variable overriding [`C_ENDPOINT_URL_DEFAULT`].
pub const C_ENV_ENDPOINT_URL: &str = "FILTERSNAP_ENDPOINT_URL";
/// Content type sent with every request.
pub const C_CONTENT_TYPE_JSON: &str = "application/json";
