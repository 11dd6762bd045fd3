//! Marker types selecting a resource for [`crate::ResourceClient`].

use crate::types::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A collection exposed under `/api/{PATH}` with the uniform CRUD routes.
pub trait Resource {
    /// Path segment after `/api/`.
    const PATH: &'static str;
    /// Body of `POST`.
    type Create: Serialize + Sync;
    /// Body of `PUT`.
    type Update: Serialize + Sync;
    /// Returned record.
    type Item: DeserializeOwned;
}

macro_rules! resource {
    ($(#[$doc:meta])* $marker:ident, $path:literal, $create:ty, $update:ty, $item:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $marker;

        impl Resource for $marker {
            const PATH: &'static str = $path;
            type Create = $create;
            type Update = $update;
            type Item = $item;
        }
    };
}

resource!(
    /// `/api/countries`
    Countries, "countries", CountryRequest, CountryRequest, CountryResponse
);
resource!(
    /// `/api/exchanges`
    Exchanges, "exchanges", ExchangeRequest, ExchangeRequest, ExchangeResponse
);
resource!(
    /// `/api/sectors`
    Sectors, "sectors", SectorRequest, SectorRequest, SectorResponse
);
resource!(
    /// `/api/industries`
    Industries, "industries", IndustryRequest, IndustryRequest, IndustryResponse
);
resource!(
    /// `/api/classification-tags`
    ClassificationTags,
    "classification-tags",
    ClassificationTagRequest,
    ClassificationTagRequest,
    ClassificationTagResponse
);
resource!(
    /// `/api/stock-markets`
    StockMarkets,
    "stock-markets",
    StockMarketRequest,
    StockMarketRequest,
    StockMarketResponse
);
resource!(
    /// `/api/market-calendars`
    MarketCalendars,
    "market-calendars",
    MarketCalendarRequest,
    MarketCalendarUpdateRequest,
    MarketCalendarResponse
);
resource!(
    /// `/api/quotes`
    Quotes, "quotes", QuoteRequest, QuoteRequest, QuoteResponse
);
resource!(
    /// `/api/users`
    Users, "users", CreateUserRequest, UpdateUserRequest, UserResponse
);
