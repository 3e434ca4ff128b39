use std::future::Future;

use tokio::runtime::{Builder, Runtime};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::exchange::client::StockfighterClient;
use crate::exchange::transport::{HttpTransport, Transport};
use crate::exchange::Stockfighter;
use crate::logging::{log_failure, log_rejected, Domain};
use crate::types::{OrderRequest, OrderResponse, OrderbookResponse, QuoteResponse, SymbolInfo};

/// Blocking wrapper: one request at a time on a private current-thread
/// runtime. Must not be called from inside another tokio runtime.
pub struct BlockingClient<T = HttpTransport> {
    inner: StockfighterClient<T>,
    runtime: Runtime,
}

impl BlockingClient<HttpTransport> {
    pub fn new(cfg: &Config) -> Result<Self> {
        Self::wrap(StockfighterClient::new(cfg)?)
    }
}

impl<T: Transport> BlockingClient<T> {
    pub fn with_transport(transport: T, base: Url) -> Result<Self> {
        Self::wrap(StockfighterClient::with_transport(transport, base))
    }

    fn wrap(inner: StockfighterClient<T>) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { inner, runtime })
    }

    /// The async client underneath, for callers who want the failure reason.
    pub fn client(&self) -> &StockfighterClient<T> {
        &self.inner
    }

    fn settle<R, F>(&self, domain: Domain, operation: &str, fut: F) -> Option<R>
    where
        F: Future<Output = Result<R>>,
    {
        match self.runtime.block_on(fut) {
            Ok(value) => Some(value),
            Err(err) => {
                report(domain, operation, &err);
                None
            }
        }
    }
}

fn report(domain: Domain, operation: &str, err: &Error) {
    let reason = err.to_string();
    match err {
        Error::NotOk { .. } | Error::EchoMismatch { .. } | Error::StillOpen { .. } => {
            log_rejected(domain, operation, &reason)
        }
        _ if err.is_transport() => log_failure(domain, operation, "transport", &reason),
        _ if err.is_decode() => log_failure(domain, operation, "decode", &reason),
        _ => log_failure(domain, operation, "request", &reason),
    }
}

impl<T: Transport> Stockfighter for BlockingClient<T> {
    fn ping(&self) -> bool {
        self.settle(Domain::System, "ping", self.inner.heartbeat())
            .is_some()
    }

    fn ping_venue(&self, venue: &str) -> bool {
        self.settle(Domain::Market, "ping_venue", self.inner.venue_heartbeat(venue))
            .is_some()
    }

    fn fetch_stocks(&self, venue: &str) -> Option<Vec<SymbolInfo>> {
        self.settle(Domain::Market, "fetch_stocks", self.inner.stocks(venue))
    }

    fn fetch_orderbook(&self, venue: &str, stock: &str) -> Option<OrderbookResponse> {
        self.settle(Domain::Market, "fetch_orderbook", self.inner.orderbook(venue, stock))
    }

    fn fetch_quote(&self, venue: &str, stock: &str) -> Option<QuoteResponse> {
        self.settle(Domain::Market, "fetch_quote", self.inner.quote(venue, stock))
    }

    fn fetch_order(&self, venue: &str, stock: &str, id: u64) -> Option<OrderResponse> {
        self.settle(Domain::Order, "fetch_order", self.inner.order(venue, stock, id))
    }

    fn place_order(&self, venue: &str, stock: &str, order: &OrderRequest) -> Option<OrderResponse> {
        self.settle(Domain::Order, "place_order", self.inner.place_order(venue, stock, order))
    }

    fn cancel_order(&self, venue: &str, stock: &str, id: u64) -> bool {
        self.settle(Domain::Order, "cancel_order", self.inner.cancel_order(venue, stock, id))
            .is_some()
    }

    fn fetch_account_orders(&self, venue: &str, account: &str) -> Option<Vec<OrderResponse>> {
        self.settle(
            Domain::Account,
            "fetch_account_orders",
            self.inner.account_orders(venue, account),
        )
    }

    fn fetch_account_stock_orders(
        &self,
        venue: &str,
        account: &str,
        stock: &str,
    ) -> Option<Vec<OrderResponse>> {
        self.settle(
            Domain::Account,
            "fetch_account_stock_orders",
            self.inner.account_stock_orders(venue, account, stock),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::client::tests::{base, Canned};
    use crate::types::Direction;

    fn client(canned: Canned) -> BlockingClient<Canned> {
        BlockingClient::with_transport(canned, base()).unwrap()
    }

    #[test]
    fn test_fetch_stocks_single_symbol() {
        let c = client(Canned::default().reply(
            r#"{"ok":true,"symbols":[{"name":"American Tea","symbol":"ATEA"}]}"#,
        ));
        let stocks = c.fetch_stocks("TESTEX").unwrap();
        assert_eq!(
            stocks,
            vec![SymbolInfo {
                name: "American Tea".to_string(),
                symbol: "ATEA".to_string(),
            }]
        );
    }

    #[test]
    fn test_ping_false_despite_transport_success() {
        let c = client(Canned::default().reply(r#"{"ok":false,"error":"down"}"#));
        assert!(!c.ping());
    }

    #[test]
    fn test_ping_ok() {
        let c = client(Canned::default().reply(r#"{"ok":true,"error":""}"#));
        assert!(c.ping());
    }

    #[test]
    fn test_cancel_order_closed_is_success() {
        let c = client(Canned::default().reply(
            r#"{"ok":true,"venue":"TESTEX","symbol":"FOOBAR","direction":"buy",
                "originalQty":10,"qty":0,"price":100,"orderType":"limit","id":123,
                "account":"EXB123456","fills":[],"totalFilled":0,"open":false}"#,
        ));
        assert!(c.cancel_order("TESTEX", "FOOBAR", 123));
    }

    #[test]
    fn test_cancel_order_still_open_is_failure() {
        let c = client(Canned::default().reply(
            r#"{"ok":true,"venue":"TESTEX","symbol":"FOOBAR","id":123,"open":true}"#,
        ));
        assert!(!c.cancel_order("TESTEX", "FOOBAR", 123));
    }

    #[test]
    fn test_transport_error_yields_nothing() {
        let canned = (0..10).fold(Canned::default(), |canned, _| canned.fail(502));
        let c = client(canned);
        let req = OrderRequest::limit("EXB123456", Direction::Buy, 10, 100);
        assert!(!c.ping());
        assert!(!c.ping_venue("TESTEX"));
        assert!(c.fetch_stocks("TESTEX").is_none());
        assert!(c.fetch_orderbook("TESTEX", "FOOBAR").is_none());
        assert!(c.fetch_quote("TESTEX", "FOOBAR").is_none());
        assert!(c.fetch_order("TESTEX", "FOOBAR", 1).is_none());
        assert!(c.place_order("TESTEX", "FOOBAR", &req).is_none());
        assert!(!c.cancel_order("TESTEX", "FOOBAR", 1));
        assert!(c.fetch_account_orders("TESTEX", "EXB123456").is_none());
        assert!(c
            .fetch_account_stock_orders("TESTEX", "EXB123456", "FOOBAR")
            .is_none());
    }

    #[test]
    fn test_venue_mismatch_discards_result() {
        let c = client(
            Canned::default()
                .reply(r#"{"ok":true,"venue":"ELSEWHERE","symbol":"FOOBAR","id":5,"open":true}"#)
                .reply(r#"{"ok":true,"venue":"ELSEWHERE","orders":[]}"#),
        );
        assert!(c.fetch_order("TESTEX", "FOOBAR", 5).is_none());
        assert!(c
            .fetch_account_stock_orders("TESTEX", "EXB123456", "FOOBAR")
            .is_none());
    }

    #[test]
    fn test_place_order_rejected_by_exchange() {
        let c = client(Canned::default().reply(r#"{"ok":false,"error":"bad account"}"#));
        let req = OrderRequest::market("NOPE", Direction::Sell, 5);
        assert!(c.place_order("TESTEX", "FOOBAR", &req).is_none());
    }

    #[test]
    fn test_decode_error_yields_nothing() {
        let c = client(Canned::default().reply("not json"));
        assert!(c.fetch_stocks("TESTEX").is_none());
    }
}
