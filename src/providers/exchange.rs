use super::http::{decode, ProviderError};
use super::Result;
use crate::cache::FileCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const BASE_URL: &str = "https://open.er-api.com/v6/latest";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    pub result: String,
    pub base_code: String,
    pub time_last_update_utc: Option<String>,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_uppercase()).copied()
    }
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub result: f64,
    pub updated: Option<String>,
}

/// ISO 4217 codes are three ASCII letters.
fn normalize_code(code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ProviderError::InvalidArgument(format!(
            "'{}' is not a currency code",
            code
        )));
    }
    Ok(code)
}

pub struct ExchangeRates {
    client: Client,
    cache: FileCache,
}

impl ExchangeRates {
    pub fn new(client: Client, cache: FileCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    pub async fn rates(&self, base: &str) -> Result<RateTable> {
        let base = normalize_code(base)?;
        let key = format!("{}.json", base);
        self.cache
            .get_or_fetch(&key, || async move {
                let response = self
                    .client
                    .get(format!("{}/{}", BASE_URL, base))
                    .send()
                    .await?;
                let table: RateTable = decode("exchange", response).await?;
                if table.result != "success" {
                    return Err(ProviderError::NotFound(format!("rates for {}", base)));
                }
                Ok(table)
            })
            .await
    }

    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<Conversion> {
        let to = normalize_code(to)?;
        let table = self.rates(from).await?;
        let rate = table
            .rate(&to)
            .ok_or_else(|| ProviderError::NotFound(format!("rate {} to {}", table.base_code, to)))?;
        Ok(Conversion {
            amount,
            from: table.base_code.clone(),
            to,
            rate,
            result: amount * rate,
            updated: table.time_last_update_utc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" usd ").unwrap(), "USD");
        assert!(normalize_code("dollars").is_err());
        assert!(normalize_code("U5D").is_err());
    }

    #[tokio::test]
    async fn test_convert_from_cached_table() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(3600));
        let table = RateTable {
            result: "success".into(),
            base_code: "USD".into(),
            time_last_update_utc: None,
            rates: HashMap::from([("IDR".to_string(), 15000.0), ("USD".to_string(), 1.0)]),
        };
        cache.put("USD.json", &table).unwrap();

        let exchange = ExchangeRates::new(Client::new(), cache);
        let conversion = exchange.convert(2.0, "usd", "idr").await.unwrap();
        assert_eq!(conversion.result, 30000.0);
        assert_eq!(conversion.from, "USD");
    }
}
