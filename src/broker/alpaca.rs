use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::AlpacaConfig;

use super::api::{Account, Execution, NewsFeed};
use super::types::{OrderInstruction, OrderSide};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const NEWS_PAGE_LIMIT: u32 = 50;
const NEWS_MAX_PAGES: u32 = 4;

/// REST client for the Alpaca trading + market data APIs.
pub struct AlpacaClient {
    http_client: reqwest::Client,
    trading_url: String,
    data_url: String,
    api_key: String,
    api_secret: String,
    paper_trading: bool,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    cash: Decimal,
}

#[derive(Debug, Deserialize)]
struct LatestTradeResponse {
    trade: LatestTrade,
}

#[derive(Debug, Deserialize)]
struct LatestTrade {
    #[serde(rename = "p")]
    price: Decimal,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    news: Vec<NewsItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    headline: String,
}

#[derive(Debug, Serialize)]
struct BracketOrderRequest {
    symbol: String,
    qty: String,
    side: &'static str,
    #[serde(rename = "type")]
    order_type: &'static str,
    time_in_force: &'static str,
    order_class: &'static str,
    client_order_id: String,
    take_profit: TakeProfitLeg,
    stop_loss: StopLossLeg,
}

#[derive(Debug, Serialize)]
struct TakeProfitLeg {
    limit_price: Decimal,
}

#[derive(Debug, Serialize)]
struct StopLossLeg {
    stop_price: Decimal,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
}

impl AlpacaClient {
    pub fn new(config: &AlpacaConfig, paper_trading: bool) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(HTTP_TIMEOUT)
                .build()
                .unwrap_or_default(),
            trading_url: config.trading_url.clone(),
            data_url: config.data_url.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            paper_trading,
        }
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.api_secret)
    }
}

#[async_trait]
impl Account for AlpacaClient {
    async fn get_cash(&self) -> Result<Decimal> {
        let url = format!("{}/v2/account", self.trading_url);
        let response = self.authed(self.http_client.get(&url)).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Alpaca account API error: {}", response.status());
        }

        let account: AccountResponse = response.json().await?;
        debug!("Account cash: {}", account.cash);
        Ok(account.cash)
    }

    async fn get_last_price(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/v2/stocks/{}/trades/latest", self.data_url, symbol);
        let response = self.authed(self.http_client.get(&url)).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Alpaca data API error for {}: {}", symbol, response.status());
        }

        let latest: LatestTradeResponse = response.json().await?;
        Ok(latest.trade.price)
    }

    async fn get_current_time(&self) -> Result<DateTime<Utc>> {
        Ok(Utc::now())
    }
}

#[async_trait]
impl NewsFeed for AlpacaClient {
    async fn get_headlines(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<String>> {
        let mut headlines = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..NEWS_MAX_PAGES {
            let url = format!("{}/v1beta1/news", self.data_url);
            let mut req = self.authed(self.http_client.get(&url)).query(&[
                ("symbols", symbol.to_string()),
                ("start", start.format("%Y-%m-%d").to_string()),
                ("end", end.format("%Y-%m-%d").to_string()),
                ("limit", NEWS_PAGE_LIMIT.to_string()),
            ]);
            if let Some(token) = &page_token {
                req = req.query(&[("page_token", token.clone())]);
            }

            let response = req.send().await?;
            if !response.status().is_success() {
                anyhow::bail!("Alpaca news API error: {}", response.status());
            }

            let page: NewsResponse = response.json().await?;
            headlines.extend(page.news.into_iter().map(|item| item.headline));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(
            "Fetched {} headlines for {} ({} to {})",
            headlines.len(),
            symbol,
            start,
            end
        );
        Ok(headlines)
    }
}

#[async_trait]
impl Execution for AlpacaClient {
    async fn submit_order(&self, order: &OrderInstruction) -> Result<String> {
        if self.paper_trading {
            info!(
                "[PAPER] {} {} {} (tp {}, sl {})",
                order.side.as_str(),
                order.quantity,
                order.symbol,
                order.take_profit_price,
                order.stop_loss_price
            );
        }

        let body = BracketOrderRequest {
            symbol: order.symbol.clone(),
            qty: order.quantity.to_string(),
            side: match order.side {
                OrderSide::Buy => "buy",
                OrderSide::Sell => "sell",
            },
            order_type: "market",
            time_in_force: "gtc",
            order_class: "bracket",
            client_order_id: uuid::Uuid::new_v4().to_string(),
            take_profit: TakeProfitLeg {
                limit_price: order.take_profit_price,
            },
            stop_loss: StopLossLeg {
                stop_price: order.stop_loss_price,
            },
        };

        let url = format!("{}/v2/orders", self.trading_url);
        let response = self
            .authed(self.http_client.post(&url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Alpaca order rejected: {}", response.status());
        }

        let placed: OrderResponse = response.json().await?;
        info!("Order accepted: {}", placed.id);
        Ok(placed.id)
    }

    async fn liquidate_all_positions(&self) -> Result<()> {
        let url = format!("{}/v2/positions", self.trading_url);
        let response = self.authed(self.http_client.delete(&url)).send().await?;

        // 207 Multi-Status means some positions closed with per-item results
        if !response.status().is_success() {
            anyhow::bail!("Alpaca liquidation failed: {}", response.status());
        }

        info!("All positions liquidated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlpacaConfig;

    fn client_for(server: &mockito::ServerGuard) -> AlpacaClient {
        AlpacaClient::new(
            &AlpacaConfig {
                api_key: "key".into(),
                api_secret: "secret".into(),
                trading_url: server.url(),
                data_url: server.url(),
            },
            true,
        )
    }

    #[tokio::test]
    async fn parses_account_cash() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/v2/account")
            .with_status(200)
            .with_body(r#"{"cash": "10000.25", "buying_power": "20000.5"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let cash = client.get_cash().await.unwrap();
        assert_eq!(cash, Decimal::new(1_000_025, 2));
    }

    #[tokio::test]
    async fn collects_headlines_across_pages() {
        let mut server = mockito::Server::new_async().await;
        let _p1 = server
            .mock("GET", "/v1beta1/news")
            .match_query(mockito::Matcher::Regex("symbols=SPY".into()))
            .with_status(200)
            .with_body(r#"{"news": [{"headline": "a"}, {"headline": "b"}], "next_page_token": null}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let headlines = client.get_headlines("SPY", start, end).await.unwrap();
        assert_eq!(headlines, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn order_rejection_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/v2/orders")
            .with_status(422)
            .create_async()
            .await;

        let client = client_for(&server);
        let order = OrderInstruction::bracket(
            "SPY",
            10,
            OrderSide::Buy,
            Decimal::new(480, 0),
            Decimal::new(380, 0),
        );
        assert!(client.submit_order(&order).await.is_err());
    }
}
