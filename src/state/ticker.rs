use crate::state::app_settings::TickerSettings;
use anyhow::{Context, anyhow};
use log::info;
use mlb_api::fetch::Fetch;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct TickerQuote {
    pub label: String,
    pub price: f64,
}

impl TickerQuote {
    /// Whole dollars, e.g. `$57123`.
    pub fn text(&self) -> String {
        format!("${}", self.price.trunc() as i64)
    }
}

/// Follow `path` through nested objects to a number. Numeric strings such as
/// `"57,123.45"` count.
pub fn extract_price(doc: &Value, path: &[String]) -> Option<f64> {
    let leaf = path.iter().try_fold(doc, |node, key| node.get(key))?;
    match leaf {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.replace(',', "").trim().parse().ok(),
        _ => None,
    }
}

pub async fn fetch_quote<F: Fetch>(fetcher: &F, ticker: &TickerSettings) -> anyhow::Result<TickerQuote> {
    let body = fetcher.fetch(&ticker.url).await?;
    let doc: Value = serde_json::from_str(&body).context("ticker response is not JSON")?;
    let price = extract_price(&doc, &ticker.json_path)
        .ok_or_else(|| anyhow!("no price at {}", ticker.json_path.join(".")))?;
    info!("{} quote {price}", ticker.label);
    Ok(TickerQuote { label: ticker.label.clone(), price })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlb_api::client::{ApiError, ApiResult};
    use serde_json::json;

    struct Canned(Result<&'static str, ()>);

    impl Fetch for Canned {
        async fn fetch(&self, url: &str) -> ApiResult<String> {
            self.0
                .map(str::to_owned)
                .map_err(|_| ApiError::Network(url.to_owned(), "down".into()))
        }
    }

    fn path(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn walks_nested_objects() {
        let doc = json!({ "bpi": { "USD": { "rate_float": 57123.4567, "rate": "57,123.4567" } } });
        assert_eq!(extract_price(&doc, &path(&["bpi", "USD", "rate_float"])), Some(57123.4567));
        assert_eq!(extract_price(&doc, &path(&["bpi", "USD", "rate"])), Some(57123.4567));
        assert_eq!(extract_price(&doc, &path(&["bpi", "EUR", "rate"])), None);
        assert_eq!(extract_price(&doc, &path(&["bpi"])), None);
    }

    #[test]
    fn quote_text_drops_cents() {
        let quote = TickerQuote { label: "BTC".into(), price: 57123.99 };
        assert_eq!(quote.text(), "$57123");
    }

    #[tokio::test]
    async fn fetch_quote_reports_failures() {
        let ticker = TickerSettings {
            url: "https://api.example.com/btc".into(),
            json_path: path(&["bpi", "USD", "rate_float"]),
            ..TickerSettings::default()
        };

        let ok = Canned(Ok(r#"{"bpi":{"USD":{"rate_float":100.5}}}"#));
        let quote = fetch_quote(&ok, &ticker).await.unwrap();
        assert_eq!(quote.label, "BTC");
        assert_eq!(quote.price, 100.5);

        assert!(fetch_quote(&Canned(Ok("nope")), &ticker).await.is_err());
        assert!(fetch_quote(&Canned(Ok("{}")), &ticker).await.is_err());
        assert!(fetch_quote(&Canned(Err(())), &ticker).await.is_err());
    }
}
