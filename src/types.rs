//! Wire types for the Stockfighter API.
//!
//! Every response carries an `ok` flag. All other fields default when absent
//! so that a failure envelope (`{"ok":false,"error":"..."}`) decodes into any
//! shape and gets rejected by the `ok` check instead of by the decoder.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// The exchange sends `null` for empty lists.
fn nullable_vec<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(de)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(Direction::Buy),
            "sell" => Ok(Direction::Sell),
            other => Err(Error::InvalidArgument(format!("unknown direction: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    Limit,
    Market,
    FillOrKill,
    ImmediateOrCancel,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "limit",
            OrderType::Market => "market",
            OrderType::FillOrKill => "fill-or-kill",
            OrderType::ImmediateOrCancel => "immediate-or-cancel",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "limit" => Ok(OrderType::Limit),
            "market" => Ok(OrderType::Market),
            "fill-or-kill" | "fok" => Ok(OrderType::FillOrKill),
            "immediate-or-cancel" | "ioc" => Ok(OrderType::ImmediateOrCancel),
            other => Err(Error::InvalidArgument(format!("unknown order type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueStatusResponse {
    pub ok: bool,
    pub venue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolInfo {
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueStocksResponse {
    pub ok: bool,
    #[serde(deserialize_with = "nullable_vec")]
    pub symbols: Vec<SymbolInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A resting order at one price level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderbookEntry {
    pub price: u64,
    pub qty: u64,
    pub is_buy: bool,
}

/// Book snapshot. Bid and ask lists keep whatever order the exchange sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderbookResponse {
    pub ok: bool,
    pub venue: String,
    pub symbol: String,
    #[serde(deserialize_with = "nullable_vec")]
    pub bids: Vec<OrderbookEntry>,
    #[serde(deserialize_with = "nullable_vec")]
    pub asks: Vec<OrderbookEntry>,
    pub ts: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrderbookResponse {
    /// Highest bid price, wherever it sits in the list.
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.iter().map(|e| e.price).max()
    }

    /// Lowest ask price, wherever it sits in the list.
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.iter().map(|e| e.price).min()
    }
}

/// What the caller wants to trade. Venue and stock travel with the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub account: String,
    pub order_type: OrderType,
    pub direction: Direction,
    pub qty: u64,
    pub price: u64,
}

impl OrderRequest {
    pub fn limit(account: impl Into<String>, direction: Direction, qty: u64, price: u64) -> Self {
        Self {
            account: account.into(),
            order_type: OrderType::Limit,
            direction,
            qty,
            price,
        }
    }

    /// Market orders ignore price; the exchange still expects the field.
    pub fn market(account: impl Into<String>, direction: Direction, qty: u64) -> Self {
        Self {
            account: account.into(),
            order_type: OrderType::Market,
            direction,
            qty,
            price: 0,
        }
    }

    pub fn with_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fill {
    pub price: u64,
    pub qty: u64,
    pub ts: Option<DateTime<Utc>>,
}

/// The exchange's view of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderResponse {
    pub ok: bool,
    pub venue: String,
    pub symbol: String,
    pub direction: Option<Direction>,
    pub original_qty: u64,
    /// Quantity still outstanding.
    pub qty: u64,
    pub price: u64,
    pub order_type: Option<OrderType>,
    pub id: u64,
    pub account: String,
    pub ts: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "nullable_vec")]
    pub fills: Vec<Fill>,
    pub total_filled: u64,
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersStatusResponse {
    pub ok: bool,
    pub venue: String,
    #[serde(deserialize_with = "nullable_vec")]
    pub orders: Vec<OrderResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteResponse {
    pub ok: bool,
    pub venue: String,
    pub symbol: String,
    pub bid: Option<u64>,
    pub ask: Option<u64>,
    pub bid_size: u64,
    pub ask_size: u64,
    pub bid_depth: u64,
    pub ask_depth: u64,
    pub last: Option<u64>,
    pub last_size: Option<u64>,
    pub last_trade: Option<DateTime<Utc>>,
    pub quote_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Common view over response envelopes used by echo validation.
///
/// `venue`/`symbol` return `None` when the shape carries no such field,
/// in which case that echo check is skipped.
pub trait Envelope {
    fn ok(&self) -> bool;
    fn error(&self) -> Option<&str>;
    fn venue(&self) -> Option<&str> {
        None
    }
    fn symbol(&self) -> Option<&str> {
        None
    }
}

impl Envelope for StatusResponse {
    fn ok(&self) -> bool {
        self.ok
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Envelope for VenueStatusResponse {
    fn ok(&self) -> bool {
        self.ok
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    fn venue(&self) -> Option<&str> {
        Some(&self.venue)
    }
}

impl Envelope for VenueStocksResponse {
    fn ok(&self) -> bool {
        self.ok
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Envelope for OrderbookResponse {
    fn ok(&self) -> bool {
        self.ok
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    fn venue(&self) -> Option<&str> {
        Some(&self.venue)
    }
    fn symbol(&self) -> Option<&str> {
        Some(&self.symbol)
    }
}

impl Envelope for OrderResponse {
    fn ok(&self) -> bool {
        self.ok
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    fn venue(&self) -> Option<&str> {
        Some(&self.venue)
    }
    fn symbol(&self) -> Option<&str> {
        Some(&self.symbol)
    }
}

impl Envelope for OrdersStatusResponse {
    fn ok(&self) -> bool {
        self.ok
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    fn venue(&self) -> Option<&str> {
        Some(&self.venue)
    }
}

impl Envelope for QuoteResponse {
    fn ok(&self) -> bool {
        self.ok
    }
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
    fn venue(&self) -> Option<&str> {
        Some(&self.venue)
    }
    fn symbol(&self) -> Option<&str> {
        Some(&self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orderbook_decode() {
        let body = r#"{
            "ok": true,
            "venue": "OGEX",
            "symbol": "FAC",
            "bids": [
                {"price": 5200, "qty": 1, "isBuy": true},
                {"price": 5250, "qty": 8, "isBuy": true}
            ],
            "asks": null,
            "ts": "2015-12-04T09:02:16.680986205Z"
        }"#;
        let book: OrderbookResponse = serde_json::from_str(body).unwrap();
        assert!(book.ok);
        assert_eq!(book.symbol, "FAC");
        assert_eq!(book.bids.len(), 2);
        assert!(book.asks.is_empty());
        assert_eq!(book.best_bid(), Some(5250));
        assert_eq!(book.best_ask(), None);
        assert!(book.ts.is_some());
    }

    #[test]
    fn test_order_decode_with_fills() {
        let body = r#"{
            "ok": true,
            "symbol": "FOOBAR",
            "venue": "TESTEX",
            "direction": "buy",
            "originalQty": 100,
            "qty": 20,
            "price": 5100,
            "orderType": "limit",
            "id": 12345,
            "account": "OGB12345",
            "ts": "2015-07-05T22:16:18+00:00",
            "fills": [
                {"price": 5050, "qty": 50, "ts": "2015-07-05T22:16:18+00:00"},
                {"price": 5100, "qty": 30, "ts": "2015-07-05T22:16:19+00:00"}
            ],
            "totalFilled": 80,
            "open": true
        }"#;
        let order: OrderResponse = serde_json::from_str(body).unwrap();
        assert_eq!(order.id, 12345);
        assert_eq!(order.direction, Some(Direction::Buy));
        assert_eq!(order.order_type, Some(OrderType::Limit));
        assert_eq!(order.fills.len(), 2);
        assert_eq!(order.fills.iter().map(|f| f.qty).sum::<u64>(), order.total_filled);
        assert!(order.open);
    }

    #[test]
    fn test_failure_envelope_decodes_into_any_shape() {
        let body = r#"{"ok":false,"error":"No venue exists with the symbol NOPE"}"#;
        let quote: QuoteResponse = serde_json::from_str(body).unwrap();
        assert!(!quote.ok);
        assert_eq!(Envelope::error(&quote), Some("No venue exists with the symbol NOPE"));
        assert!(quote.venue.is_empty());

        let order: OrderResponse = serde_json::from_str(body).unwrap();
        assert!(!order.ok);
        assert_eq!(order.direction, None);
    }

    #[test]
    fn test_quote_without_bid() {
        let body = r#"{
            "ok": true,
            "symbol": "FAC",
            "venue": "OGEX",
            "ask": 5125,
            "askSize": 10,
            "askDepth": 2237,
            "bidSize": 0,
            "bidDepth": 0,
            "last": 5125,
            "lastSize": 52,
            "lastTrade": "2015-07-13T05:38:17.33640392Z",
            "quoteTime": "2015-07-13T05:38:17.33640392Z"
        }"#;
        let quote: QuoteResponse = serde_json::from_str(body).unwrap();
        assert_eq!(quote.bid, None);
        assert_eq!(quote.ask, Some(5125));
        assert_eq!(quote.ask_depth, 2237);
        assert_eq!(quote.last_size, Some(52));
    }

    #[test]
    fn test_order_request_wire_names() {
        let req = OrderRequest::limit("EXB123456", Direction::Sell, 10, 2500)
            .with_type(OrderType::ImmediateOrCancel);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["orderType"], "immediate-or-cancel");
        assert_eq!(value["direction"], "sell");
        assert_eq!(value["account"], "EXB123456");
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("BUY".parse::<Direction>().unwrap(), Direction::Buy);
        assert_eq!("fok".parse::<OrderType>().unwrap(), OrderType::FillOrKill);
        assert_eq!(
            "immediate-or-cancel".parse::<OrderType>().unwrap(),
            OrderType::ImmediateOrCancel
        );
        assert!("hold".parse::<Direction>().is_err());
    }
}
