use thiserror::Error;

const MAX_BODY_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response is missing data: {0}")]
    MissingData(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl WeatherError {
    pub fn status(url: &str, status: u16, body: &str) -> Self {
        Self::Status {
            url: redact_url(url),
            status,
            body: truncate_body(body),
        }
    }

    pub fn network(url: &str, source: reqwest::Error) -> Self {
        Self::Network {
            url: redact_url(url),
            source: source.without_url(),
        }
    }

    pub fn decode(url: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            url: redact_url(url),
            source,
        }
    }
}

/// Strips the query string so API keys never end up in logs.
pub fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => base.to_string(),
        None => url.to_string(),
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_BODY_LEN {
        return body.to_string();
    }
    let mut end = MAX_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url_drops_query() {
        assert_eq!(
            redact_url("https://api.example.com/v1/current.json?key=secret&q=1,2"),
            "https://api.example.com/v1/current.json"
        );
        assert_eq!(redact_url("https://api.example.com"), "https://api.example.com");
    }

    #[test]
    fn test_status_error_truncates_body() {
        let body = "x".repeat(500);
        let err = WeatherError::status("https://api.example.com?appid=k", 401, &body);
        match err {
            WeatherError::Status { url, status, body } => {
                assert_eq!(url, "https://api.example.com");
                assert_eq!(status, 401);
                assert_eq!(body.len(), MAX_BODY_LEN + 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let body = "μ".repeat(150);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
    }
}
