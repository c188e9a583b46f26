//! Chapter content sources

pub mod http_source;
pub mod memory_source;

pub use http_source::HttpContentSource;
pub use memory_source::MemorySource;

/// Short, user-facing text for a failed request
pub(crate) fn friendly_message(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "The request timed out. The text server might be slow right now.".to_string()
    } else if error.is_connect() || error.is_request() {
        "Connection error. Please check your internet connection and try again.".to_string()
    } else if error.is_decode() {
        "Received an unexpected response format from the server.".to_string()
    } else if let Some(status) = error.status() {
        format!("The server could not provide this chapter ({}).", status)
    } else {
        "A network error occurred. Please try again later.".to_string()
    }
}
