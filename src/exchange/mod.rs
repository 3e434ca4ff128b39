use crate::types::{OrderRequest, OrderResponse, OrderbookResponse, QuoteResponse, SymbolInfo};

pub mod blocking;
pub mod client;
pub mod endpoint;
pub mod transport;

pub use blocking::BlockingClient;
pub use client::StockfighterClient;

/// Synchronous view of the exchange. A call that fails for any reason,
/// transport, decoding, `ok == false` or a mismatched echo, yields
/// `false`/`None` and never a partially filled value.
pub trait Stockfighter {
    fn ping(&self) -> bool;
    fn ping_venue(&self, venue: &str) -> bool;

    fn fetch_stocks(&self, venue: &str) -> Option<Vec<SymbolInfo>>;
    fn fetch_orderbook(&self, venue: &str, stock: &str) -> Option<OrderbookResponse>;
    fn fetch_quote(&self, venue: &str, stock: &str) -> Option<QuoteResponse>;

    fn fetch_order(&self, venue: &str, stock: &str, id: u64) -> Option<OrderResponse>;
    fn place_order(&self, venue: &str, stock: &str, order: &OrderRequest) -> Option<OrderResponse>;
    fn cancel_order(&self, venue: &str, stock: &str, id: u64) -> bool;

    fn fetch_account_orders(&self, venue: &str, account: &str) -> Option<Vec<OrderResponse>>;
    fn fetch_account_stock_orders(
        &self,
        venue: &str,
        account: &str,
        stock: &str,
    ) -> Option<Vec<OrderResponse>>;
}
