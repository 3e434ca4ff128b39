use url::Url;

use crate::error::{Error, Result};

/// Every route the client talks to, relative to the API base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Heartbeat,
    VenueHeartbeat { venue: &'a str },
    Stocks { venue: &'a str },
    Orderbook { venue: &'a str, stock: &'a str },
    Quote { venue: &'a str, stock: &'a str },
    Orders { venue: &'a str, stock: &'a str },
    Order { venue: &'a str, stock: &'a str, id: u64 },
    AccountOrders { venue: &'a str, account: &'a str },
    AccountStockOrders { venue: &'a str, account: &'a str, stock: &'a str },
}

impl<'a> Endpoint<'a> {
    fn segments(&self) -> Vec<String> {
        fn own(parts: &[&str]) -> Vec<String> {
            parts.iter().map(|p| p.to_string()).collect()
        }
        match *self {
            Endpoint::Heartbeat => own(&["heartbeat"]),
            Endpoint::VenueHeartbeat { venue } => own(&["venues", venue, "heartbeat"]),
            Endpoint::Stocks { venue } => own(&["venues", venue, "stocks"]),
            Endpoint::Orderbook { venue, stock } => own(&["venues", venue, "stocks", stock]),
            Endpoint::Quote { venue, stock } => own(&["venues", venue, "stocks", stock, "quote"]),
            Endpoint::Orders { venue, stock } => own(&["venues", venue, "stocks", stock, "orders"]),
            Endpoint::Order { venue, stock, id } => {
                let mut s = own(&["venues", venue, "stocks", stock, "orders"]);
                s.push(id.to_string());
                s
            }
            Endpoint::AccountOrders { venue, account } => {
                own(&["venues", venue, "accounts", account, "orders"])
            }
            Endpoint::AccountStockOrders { venue, account, stock } => {
                own(&["venues", venue, "accounts", account, "stocks", stock, "orders"])
            }
        }
    }

    /// Join onto `base`, percent-encoding each path parameter as one segment.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Config(format!("base url cannot hold paths: {}", base)))?;
            path.pop_if_empty();
            path.extend(self.segments());
        }
        Ok(url)
    }
}
