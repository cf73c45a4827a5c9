mod price_client;
mod snapshot;
mod state;

pub use price_client::{
    DEFAULT_BASE_API, DEFAULT_CURRENCY_PAIR, FetchError, PriceClient, PriceSource, Ticker,
    parse_tickers,
};
pub use snapshot::{ChangeSign, PriceSnapshot};
pub use state::PriceState;
