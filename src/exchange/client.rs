use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::exchange::endpoint::Endpoint;
use crate::exchange::transport::{encode, perform_request, HttpTransport, Method, Transport};
use crate::types::{
    Direction, Envelope, OrderRequest, OrderResponse, OrderType, OrderbookResponse,
    OrdersStatusResponse, QuoteResponse, StatusResponse, SymbolInfo, VenueStatusResponse,
    VenueStocksResponse,
};

/// Async client. Every call returns the decoded response or the reason it
/// was thrown away.
pub struct StockfighterClient<T = HttpTransport> {
    transport: T,
    base: Url,
}

impl StockfighterClient<HttpTransport> {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(cfg)?,
            base: cfg.base()?,
        })
    }
}

/// Body sent when placing an order. Venue and stock come from the call.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderPayload<'a> {
    account: &'a str,
    venue: &'a str,
    stock: &'a str,
    price: u64,
    qty: u64,
    direction: Direction,
    order_type: OrderType,
}

/// Reject a decoded envelope whose `ok` is false or whose echoed venue or
/// symbol differs from the request.
fn verify<R: Envelope>(resp: R, venue: Option<&str>, symbol: Option<&str>) -> Result<R> {
    if !resp.ok() {
        return Err(Error::NotOk {
            error: resp.error().map(str::to_string),
        });
    }
    for (field, expected, actual) in [
        ("venue", venue, resp.venue()),
        ("symbol", symbol, resp.symbol()),
    ] {
        if let (Some(expected), Some(actual)) = (expected, actual) {
            if expected != actual {
                return Err(Error::EchoMismatch {
                    field,
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }
    }
    Ok(resp)
}

impl<T: Transport> StockfighterClient<T> {
    /// Build on any transport, e.g. a canned one in tests.
    pub fn with_transport(transport: T, base: Url) -> Self {
        Self { transport, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: Endpoint<'_>,
        body: Option<String>,
    ) -> Result<R> {
        let url = endpoint.url(&self.base)?;
        perform_request(&self.transport, method, url, body).await
    }

    pub async fn heartbeat(&self) -> Result<StatusResponse> {
        let resp = self.call(Method::Get, Endpoint::Heartbeat, None).await?;
        verify(resp, None, None)
    }

    pub async fn venue_heartbeat(&self, venue: &str) -> Result<VenueStatusResponse> {
        let resp = self
            .call(Method::Get, Endpoint::VenueHeartbeat { venue }, None)
            .await?;
        verify(resp, Some(venue), None)
    }

    /// The listing carries no venue echo; only `ok` is checked.
    pub async fn stocks(&self, venue: &str) -> Result<Vec<SymbolInfo>> {
        let resp: VenueStocksResponse = self.call(Method::Get, Endpoint::Stocks { venue }, None).await?;
        Ok(verify(resp, None, None)?.symbols)
    }

    pub async fn orderbook(&self, venue: &str, stock: &str) -> Result<OrderbookResponse> {
        let resp = self
            .call(Method::Get, Endpoint::Orderbook { venue, stock }, None)
            .await?;
        verify(resp, Some(venue), Some(stock))
    }

    pub async fn quote(&self, venue: &str, stock: &str) -> Result<QuoteResponse> {
        let resp = self
            .call(Method::Get, Endpoint::Quote { venue, stock }, None)
            .await?;
        verify(resp, Some(venue), Some(stock))
    }

    /// Order ids are unique per venue, so only the venue echo is checked.
    pub async fn order(&self, venue: &str, stock: &str, id: u64) -> Result<OrderResponse> {
        let resp = self
            .call(Method::Get, Endpoint::Order { venue, stock, id }, None)
            .await?;
        verify(resp, Some(venue), None)
    }

    pub async fn place_order(
        &self,
        venue: &str,
        stock: &str,
        order: &OrderRequest,
    ) -> Result<OrderResponse> {
        let body = encode(&OrderPayload {
            account: &order.account,
            venue,
            stock,
            price: order.price,
            qty: order.qty,
            direction: order.direction,
            order_type: order.order_type,
        })?;
        let resp = self
            .call(Method::Post, Endpoint::Orders { venue, stock }, Some(body))
            .await?;
        verify(resp, Some(venue), Some(stock))
    }

    /// Succeeds only if the exchange reports the order closed afterwards.
    pub async fn cancel_order(&self, venue: &str, stock: &str, id: u64) -> Result<OrderResponse> {
        let resp: OrderResponse = self
            .call(Method::Delete, Endpoint::Order { venue, stock, id }, None)
            .await?;
        let resp = verify(resp, Some(venue), None)?;
        if resp.open {
            return Err(Error::StillOpen { id });
        }
        Ok(resp)
    }

    pub async fn account_orders(&self, venue: &str, account: &str) -> Result<Vec<OrderResponse>> {
        let resp: OrdersStatusResponse = self
            .call(Method::Get, Endpoint::AccountOrders { venue, account }, None)
            .await?;
        Ok(verify(resp, Some(venue), None)?.orders)
    }

    pub async fn account_stock_orders(
        &self,
        venue: &str,
        account: &str,
        stock: &str,
    ) -> Result<Vec<OrderResponse>> {
        let resp: OrdersStatusResponse = self
            .call(
                Method::Get,
                Endpoint::AccountStockOrders { venue, account, stock },
                None,
            )
            .await?;
        Ok(verify(resp, Some(venue), None)?.orders)
    }
}
