//! HTTP sources: asset prices and the random word of the lexicon widget.
//!
//! Every failure is returned for the cycle and the next cycle runs on the
//! normal interval. Nothing here backs off.

#[cfg(feature = "http")]
pub use sources::{LexiconSource, PriceSource};

pub const PRICE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
pub const LEXICON_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(3);

/// Longest definition shown before it is cut.
pub const DEFINITION_LIMIT: usize = 65;
pub const NO_DEFINITION: &str = "No definition found.";

pub fn truncate_definition(full: &str) -> String {
    if full.chars().count() > DEFINITION_LIMIT {
        let cut: String = full.chars().take(DEFINITION_LIMIT).collect();
        format!("{cut}...")
    } else {
        full.to_string()
    }
}

/// First definition of the first meaning of the first entry.
pub fn first_definition(entries: &serde_json::Value) -> Option<&str> {
    entries
        .get(0)?
        .get("meanings")?
        .get(0)?
        .get("definitions")?
        .get(0)?
        .get("definition")?
        .as_str()
}

#[cfg(feature = "http")]
mod sources {
    use super::{first_definition, truncate_definition, LEXICON_TIMEOUT, NO_DEFINITION, PRICE_TIMEOUT};
    use crate::error::PollError;
    use crate::payload::{Payload, PriceQuote, SourceKind, WordEntry};
    use crate::poller::{Cycle, Poller, StopSignal};
    use crate::settings::{LexiconSettings, PriceSettings};
    use reqwest::blocking::Client;
    use serde::Deserialize;
    use serde_json::Value;
    use std::time::Duration;

    fn client(timeout: Duration) -> Result<Client, PollError> {
        Client::builder()
            .timeout(timeout)
            .user_agent("overlay-widgets")
            .build()
            .map_err(PollError::from)
    }

    #[derive(Deserialize)]
    struct MarketChart {
        prices: Vec<(f64, f64)>,
    }

    /// Spot price, 24h change and 24h history for one coin.
    pub struct PriceSource {
        client: Client,
        base: String,
        coin_id: String,
        vs_currency: String,
        interval: Duration,
    }

    impl PriceSource {
        pub fn new(
            base: impl Into<String>,
            price: &PriceSettings,
            interval: Duration,
        ) -> Result<Self, PollError> {
            Ok(Self {
                client: client(PRICE_TIMEOUT)?,
                base: base.into().trim_end_matches('/').to_string(),
                coin_id: price.coin_id.clone(),
                vs_currency: price.vs_currency.clone(),
                interval,
            })
        }

        pub fn fetch(&self) -> Result<PriceQuote, PollError> {
            let spot: Value = self
                .client
                .get(format!("{}/simple/price", self.base))
                .query(&[
                    ("ids", self.coin_id.as_str()),
                    ("vs_currencies", self.vs_currency.as_str()),
                    ("include_24hr_change", "true"),
                ])
                .send()?
                .error_for_status()?
                .json()?;
            let pair = spot
                .get(&self.coin_id)
                .ok_or_else(|| PollError::Parse(format!("no `{}` in price response", self.coin_id)))?;
            let price = number(pair, &self.vs_currency)?;
            let change_24h = number(pair, &format!("{}_24h_change", self.vs_currency))?;

            let chart: MarketChart = self
                .client
                .get(format!("{}/coins/{}/market_chart", self.base, self.coin_id))
                .query(&[("vs_currency", self.vs_currency.as_str()), ("days", "1")])
                .send()?
                .error_for_status()?
                .json()?;

            Ok(PriceQuote {
                price,
                change_24h,
                history: chart.prices.into_iter().map(|(_, v)| v).collect(),
            })
        }
    }

    fn number(obj: &Value, key: &str) -> Result<f64, PollError> {
        obj.get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| PollError::Parse(format!("missing number `{key}`")))
    }

    impl Poller for PriceSource {
        fn kind(&self) -> SourceKind {
            SourceKind::Http
        }

        fn cycle(&mut self, _signal: &StopSignal) -> Cycle {
            let outcome = self.fetch().map(Payload::Price);
            if let Err(err) = &outcome {
                tracing::debug!(coin = %self.coin_id, error = %err, "price fetch failed");
            }
            Cycle::single(outcome, self.interval)
        }
    }

    /// Random word plus its dictionary definition.
    pub struct LexiconSource {
        client: Client,
        word_url: String,
        dictionary_url: String,
        refresh: Duration,
    }

    impl LexiconSource {
        pub fn new(settings: &LexiconSettings) -> Result<Self, PollError> {
            Ok(Self {
                client: client(LEXICON_TIMEOUT)?,
                word_url: settings.word_url.clone(),
                dictionary_url: settings.dictionary_url.trim_end_matches('/').to_string(),
                refresh: crate::poller::secs(settings.refresh_secs),
            })
        }

        pub fn fetch(&self) -> Result<WordEntry, PollError> {
            let words: Vec<String> = self
                .client
                .get(&self.word_url)
                .send()?
                .error_for_status()?
                .json()?;
            let word = words
                .into_iter()
                .next()
                .filter(|w| !w.trim().is_empty())
                .ok_or_else(|| PollError::Parse("empty word list".into()))?;

            let resp = self
                .client
                .get(format!(
                    "{}/{}",
                    self.dictionary_url,
                    urlencoding::encode(&word)
                ))
                .send()?;
            let definition = if resp.status().is_success() {
                resp.json::<Value>()
                    .ok()
                    .as_ref()
                    .and_then(first_definition)
                    .map(truncate_definition)
                    .unwrap_or_else(|| NO_DEFINITION.to_string())
            } else {
                NO_DEFINITION.to_string()
            };
            Ok(WordEntry { word, definition })
        }
    }

    impl Poller for LexiconSource {
        fn kind(&self) -> SourceKind {
            SourceKind::Http
        }

        fn cycle(&mut self, _signal: &StopSignal) -> Cycle {
            Cycle::single(self.fetch().map(Payload::Word), self.refresh)
        }
    }
}
