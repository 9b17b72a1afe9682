use crate::core::errors::FtxError;
use crate::core::kernel::codec::Params;
use crate::core::kernel::transport::{HttpTransport, ReqwestTransport};
use crate::core::kernel::RestClient;
use crate::core::types::{RequestDescriptor, VenueResponse};
use crate::exchanges::ftx::pagination::TradeHistory;
use crate::exchanges::ftx::types::{
    ConditionalOrderHistoryFilter, ConditionalOrderRequest, ModifyOrder, OrderHistoryFilter,
    OrderRequest, Trade, TradeWindow,
};
use serde_json::Value;
use tracing::instrument;

/// FTX REST API client implementation
///
/// One method per endpoint. Public market data goes out unsigned, everything
/// account-scoped is signed. Business-rule rejections come back as
/// [`VenueResponse::Rejected`]; HTTP failures as classified [`FtxError`]s.
#[derive(Debug)]
pub struct FtxRest<T: HttpTransport = ReqwestTransport> {
    rest_client: RestClient<T>,
}

impl<T: HttpTransport> FtxRest<T> {
    pub fn new(rest_client: RestClient<T>) -> Self {
        Self { rest_client }
    }

    pub const fn rest_client(&self) -> &RestClient<T> {
        &self.rest_client
    }

    async fn send(&self, descriptor: RequestDescriptor) -> Result<VenueResponse<Value>, FtxError> {
        self.rest_client.execute(&descriptor).await
    }

    // Market data (unsigned)

    pub async fn list_futures(&self) -> Result<VenueResponse<Value>, FtxError> {
        self.send(RequestDescriptor::get("futures")).await
    }

    pub async fn list_markets(&self) -> Result<VenueResponse<Value>, FtxError> {
        self.send(RequestDescriptor::get("markets")).await
    }

    #[instrument(skip(self))]
    pub async fn get_orderbook(
        &self,
        market: &str,
        depth: Option<u32>,
    ) -> Result<VenueResponse<Value>, FtxError> {
        self.send(
            RequestDescriptor::get(format!("markets/{}/orderbook", market))
                .query(Params::new().with_opt("depth", depth)),
        )
        .await
    }

    /// Most recent trades for a market
    pub async fn get_trades(&self, market: &str) -> Result<VenueResponse<Vec<Trade>>, FtxError> {
        self.get_trades_between(market, TradeWindow::default()).await
    }

    /// Trades for a market within an optional time window
    #[instrument(skip(self))]
    pub async fn get_trades_between(
        &self,
        market: &str,
        window: TradeWindow,
    ) -> Result<VenueResponse<Vec<Trade>>, FtxError> {
        self.rest_client
            .execute_json(
                &RequestDescriptor::get(format!("markets/{}/trades", market))
                    .query(window.to_params()),
            )
            .await
    }

    /// Full trade history for a market, fetched page by page.
    ///
    /// Nothing is requested until the returned paginator is driven.
    pub fn trade_history(&self, market: impl Into<String>) -> TradeHistory<'_, T> {
        TradeHistory::new(self, market.into())
    }

    /// Fetch and buffer the full trade history for a market
    pub async fn get_all_trades(&self, market: &str) -> Result<Vec<Trade>, FtxError> {
        self.trade_history(market).collect_all().await
    }

    /// Historical candles. `resolution` is the window length in seconds; times are unix seconds.
    #[instrument(skip(self))]
    pub async fn get_historical_prices(
        &self,
        market: &str,
        resolution: u32,
        start_time: Option<i64>,
        end_time: Option<i64>,
    ) -> Result<VenueResponse<Value>, FtxError> {
        let query = Params::new()
            .with("resolution", resolution)
            .with_opt("start_time", start_time)
            .with_opt("end_time", end_time);
        self.send(RequestDescriptor::get(format!("markets/{}/candles", market)).query(query))
            .await
    }

    // Account (signed)

    pub async fn get_account_info(&self) -> Result<VenueResponse<Value>, FtxError> {
        self.send(RequestDescriptor::get("account").signed()).await
    }

    pub async fn get_open_orders(
        &self,
        market: Option<&str>,
    ) -> Result<VenueResponse<Value>, FtxError> {
        self.send(
            RequestDescriptor::get("orders")
                .query(Params::new().with_opt("market", market))
                .signed(),
        )
        .await
    }

    pub async fn get_order_history(
        &self,
        filter: &OrderHistoryFilter,
    ) -> Result<VenueResponse<Value>, FtxError> {
        self.send(
            RequestDescriptor::get("orders/history")
                .query(filter.to_params())
                .signed(),
        )
        .await
    }

    pub async fn get_conditional_orders(
        &self,
        market: Option<&str>,
    ) -> Result<VenueResponse<Value>, FtxError> {
        self.send(
            RequestDescriptor::get("conditional_orders")
                .query(Params::new().with_opt("market", market))
                .signed(),
        )
        .await
    }

    pub async fn get_conditional_order_history(
        &self,
        filter: &ConditionalOrderHistoryFilter,
    ) -> Result<VenueResponse<Value>, FtxError> {
        self.send(
            RequestDescriptor::get("conditional_orders/history")
                .query(filter.to_params())
                .signed(),
        )
        .await
    }

    pub async fn get_positions(
        &self,
        show_avg_price: bool,
    ) -> Result<VenueResponse<Value>, FtxError> {
        self.send(
            RequestDescriptor::get("positions")
                .query(Params::new().with("showAvgPrice", show_avg_price))
                .signed(),
        )
        .await
    }

    /// The position whose `future` matches `name`, if any
    pub async fn get_position(
        &self,
        name: &str,
        show_avg_price: bool,
    ) -> Result<VenueResponse<Option<Value>>, FtxError> {
        Ok(self.get_positions(show_avg_price).await?.map(|positions| {
            positions.as_array().and_then(|positions| {
                positions
                    .iter()
                    .find(|p| p.get("future").and_then(Value::as_str) == Some(name))
                    .cloned()
            })
        }))
    }

    pub async fn get_balances(&self) -> Result<VenueResponse<Value>, FtxError> {
        self.send(RequestDescriptor::get("wallet/balances").signed()).await
    }

    pub async fn get_deposit_address(&self, coin: &str) -> Result<VenueResponse<Value>, FtxError> {
        self.send(RequestDescriptor::get(format!("wallet/deposit_address/{}", coin)).signed())
            .await
    }

    /// Fills for a market between two unix-second timestamps, oldest first
    #[instrument(skip(self))]
    pub async fn get_fills(
        &self,
        market: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<VenueResponse<Value>, FtxError> {
        let query = Params::new()
            .with("market", market)
            .with("order", "asc")
            .with("start_time", start_time)
            .with("end_time", end_time);
        self.send(RequestDescriptor::get("fills").query(query).signed()).await
    }

    // Trading (signed)

    #[instrument(skip(self, order), fields(market = %order.market, client_id = %order.client_id))]
    pub async fn place_order(&self, order: &OrderRequest) -> Result<VenueResponse<Value>, FtxError> {
        self.send(
            RequestDescriptor::post("orders")
                .body(order.to_params())
                .signed(),
        )
        .await
    }

    #[instrument(skip(self, order), fields(market = %order.market, kind = order.trigger.kind().as_str()))]
    pub async fn place_conditional_order(
        &self,
        order: &ConditionalOrderRequest,
    ) -> Result<VenueResponse<Value>, FtxError> {
        self.send(
            RequestDescriptor::post("conditional_orders")
                .body(order.to_params())
                .signed(),
        )
        .await
    }

    #[instrument(skip(self, modify))]
    pub async fn modify_order_by_client_id(
        &self,
        client_order_id: &str,
        modify: &ModifyOrder,
    ) -> Result<VenueResponse<Value>, FtxError> {
        let body = modify.to_params()?;
        self.send(
            RequestDescriptor::post(format!("orders/by_client_id/{}/modify", client_order_id))
                .body(body)
                .signed(),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn cancel_order_by_client_id(
        &self,
        client_order_id: &str,
    ) -> Result<VenueResponse<Value>, FtxError> {
        self.send(
            RequestDescriptor::delete(format!("orders/by_client_id/{}", client_order_id)).signed(),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn cancel_all_orders(&self, market: &str) -> Result<VenueResponse<Value>, FtxError> {
        self.send(
            RequestDescriptor::delete("orders")
                .body(Params::new().with("market", market))
                .signed(),
        )
        .await
    }
}
