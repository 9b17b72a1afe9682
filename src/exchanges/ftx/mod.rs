pub mod builder;
pub mod pagination;
pub mod rest;
pub mod types;

// Re-export main components
pub use builder::{build_connector, FtxBuilder};
pub use pagination::{PaginationCursor, TradeHistory, PAGE_LIMIT};
pub use rest::FtxRest;
pub use types::{
    ConditionalOrderHistoryFilter, ConditionalOrderKind, ConditionalOrderRequest,
    ConditionalTrigger, ModifyOrder, OrderHistoryFilter, OrderRequest, OrderSide, OrderType, Trade,
    TradeWindow, unix_seconds,
};
