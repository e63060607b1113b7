use reqwest::Response;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} returned HTTP {status}: {message}")]
    Http {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode response at `{path}`: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0} is not configured")]
    MissingCredential(&'static str),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProviderError::NotFound(_) | ProviderError::Http { status: 404, .. }
        )
    }
}

/// Check the status and decode the body, keeping the failing JSON path.
pub async fn decode<T: DeserializeOwned>(
    provider: &'static str,
    response: Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::Http {
            provider,
            status: status.as_u16(),
            message: body.chars().take(300).collect(),
        });
    }
    parse_json(&body)
}

pub fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    let deserializer = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(deserializer).map_err(|e| ProviderError::Json {
        path: e.path().to_string(),
        source: e.into_inner(),
    })
}

pub fn require<'a>(
    credential: &'a Option<String>,
    name: &'static str,
) -> Result<&'a str, ProviderError> {
    credential
        .as_deref()
        .ok_or(ProviderError::MissingCredential(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Outer {
        #[allow(dead_code)]
        inner: Inner,
    }

    #[derive(Debug, Deserialize)]
    struct Inner {
        #[allow(dead_code)]
        count: u32,
    }

    #[test]
    fn test_decode_error_carries_path() {
        let err = parse_json::<Outer>(r#"{"inner": {"count": "many"}}"#).unwrap_err();
        match err {
            ProviderError::Json { path, .. } => assert_eq!(path, "inner.count"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_not_found_classification() {
        let err = ProviderError::Http {
            provider: "jikan",
            status: 404,
            message: String::new(),
        };
        assert!(err.is_not_found());
        assert!(!ProviderError::InvalidArgument("x".into()).is_not_found());
    }

    #[test]
    fn test_require_credential() {
        assert!(matches!(
            require(&None, "RAWG_API_KEY"),
            Err(ProviderError::MissingCredential("RAWG_API_KEY"))
        ));
        assert_eq!(require(&Some("k".into()), "RAWG_API_KEY").unwrap(), "k");
    }
}
