use crate::core::errors::FtxError;
use crate::core::kernel::codec::Params;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

impl OrderType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Limit => "limit",
            Self::Market => "market",
        }
    }
}

/// Conditional order family, as used by the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalOrderKind {
    Stop,
    TakeProfit,
    TrailingStop,
}

impl ConditionalOrderKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::TakeProfit => "take_profit",
            Self::TrailingStop => "trailing_stop",
        }
    }
}

/// New order for `POST orders`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub market: String,
    pub side: OrderSide,
    pub size: Decimal,
    pub order_type: OrderType,
    pub client_id: String,
    /// `None` is sent as `null`, which market orders require
    pub price: Option<Decimal>,
    pub ioc: bool,
    pub reduce_only: bool,
    pub post_only: bool,
}

impl OrderRequest {
    pub fn limit(
        market: impl Into<String>,
        side: OrderSide,
        size: Decimal,
        price: Decimal,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            market: market.into(),
            side,
            size,
            order_type: OrderType::Limit,
            client_id: client_id.into(),
            price: Some(price),
            ioc: false,
            reduce_only: false,
            post_only: false,
        }
    }

    pub fn market(
        market: impl Into<String>,
        side: OrderSide,
        size: Decimal,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            market: market.into(),
            side,
            size,
            order_type: OrderType::Market,
            client_id: client_id.into(),
            price: None,
            ioc: false,
            reduce_only: false,
            post_only: false,
        }
    }

    pub fn ioc(mut self, ioc: bool) -> Self {
        self.ioc = ioc;
        self
    }

    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    pub fn post_only(mut self, post_only: bool) -> Self {
        self.post_only = post_only;
        self
    }

    pub fn to_params(&self) -> Params {
        Params::new()
            .with("market", &self.market)
            .with("side", self.side.as_str())
            .with_nullable("price", self.price)
            .with("type", self.order_type.as_str())
            .with("size", self.size)
            .with("ioc", self.ioc)
            .with("reduceOnly", self.reduce_only)
            .with("postOnly", self.post_only)
            .with("clientId", &self.client_id)
    }
}

/// What makes a conditional order fire.
///
/// A trigger price and a trail value are mutually exclusive, so each variant
/// carries only the fields valid for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalTrigger {
    /// Stop market, or stop limit when `order_price` is set
    Stop {
        trigger_price: Decimal,
        order_price: Option<Decimal>,
    },
    /// Take-profit market, or take-profit limit when `order_price` is set
    TakeProfit {
        trigger_price: Decimal,
        order_price: Option<Decimal>,
    },
    TrailingStop { trail_value: Decimal },
}

impl ConditionalTrigger {
    pub const fn kind(&self) -> ConditionalOrderKind {
        match self {
            Self::Stop { .. } => ConditionalOrderKind::Stop,
            Self::TakeProfit { .. } => ConditionalOrderKind::TakeProfit,
            Self::TrailingStop { .. } => ConditionalOrderKind::TrailingStop,
        }
    }
}

/// New conditional order for `POST conditional_orders`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalOrderRequest {
    pub market: String,
    pub side: OrderSide,
    pub size: Decimal,
    pub trigger: ConditionalTrigger,
    pub client_id: Option<String>,
    pub reduce_only: bool,
}

impl ConditionalOrderRequest {
    pub fn new(
        market: impl Into<String>,
        side: OrderSide,
        size: Decimal,
        trigger: ConditionalTrigger,
    ) -> Self {
        Self {
            market: market.into(),
            side,
            size,
            trigger,
            client_id: None,
            reduce_only: false,
        }
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    pub fn to_params(&self) -> Params {
        let params = Params::new()
            .with("market", &self.market)
            .with("side", self.side.as_str())
            .with("size", self.size)
            .with("type", self.trigger.kind().as_str())
            .with_opt("clientId", self.client_id.as_ref())
            .with("reduceOnly", self.reduce_only);

        match &self.trigger {
            ConditionalTrigger::Stop {
                trigger_price,
                order_price,
            }
            | ConditionalTrigger::TakeProfit {
                trigger_price,
                order_price,
            } => params
                .with_opt("orderPrice", *order_price)
                .with("triggerPrice", *trigger_price),
            ConditionalTrigger::TrailingStop { trail_value } => {
                params.with("trailValue", *trail_value)
            }
        }
    }
}

/// Price and/or size change for `POST orders/by_client_id/{id}/modify`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifyOrder {
    pub price: Option<Decimal>,
    pub size: Option<Decimal>,
}

impl ModifyOrder {
    pub fn to_params(&self) -> Result<Params, FtxError> {
        if self.price.is_none() && self.size.is_none() {
            return Err(FtxError::InvalidParameters(
                "Must modify price or size of order".to_string(),
            ));
        }
        Ok(Params::new()
            .with_opt("price", self.price)
            .with_opt("size", self.size))
    }
}

/// Filters for `GET orders/history`. Times are unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderHistoryFilter {
    pub market: Option<String>,
    pub side: Option<OrderSide>,
    pub order_type: Option<OrderType>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

impl OrderHistoryFilter {
    pub fn to_params(&self) -> Params {
        Params::new()
            .with_opt("market", self.market.as_ref())
            .with_opt("side", self.side.map(OrderSide::as_str))
            .with_opt("orderType", self.order_type.map(OrderType::as_str))
            .with_opt("start_time", self.start_time)
            .with_opt("end_time", self.end_time)
    }
}

/// Filters for `GET conditional_orders/history`. Times are unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalOrderHistoryFilter {
    pub market: Option<String>,
    pub side: Option<OrderSide>,
    pub kind: Option<ConditionalOrderKind>,
    pub order_type: Option<OrderType>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

impl ConditionalOrderHistoryFilter {
    pub fn to_params(&self) -> Params {
        Params::new()
            .with_opt("market", self.market.as_ref())
            .with_opt("side", self.side.map(OrderSide::as_str))
            .with_opt("type", self.kind.map(ConditionalOrderKind::as_str))
            .with_opt("orderType", self.order_type.map(OrderType::as_str))
            .with_opt("start_time", self.start_time)
            .with_opt("end_time", self.end_time)
    }
}

/// Time window for trade listings. Times are unix seconds and may be
/// fractional; the venue compares them against trade times to the microsecond.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeWindow {
    pub start_time: Option<Decimal>,
    pub end_time: Option<Decimal>,
    pub limit: Option<u32>,
}

impl TradeWindow {
    pub fn to_params(&self) -> Params {
        Params::new()
            .with_opt("limit", self.limit)
            .with_opt("start_time", self.start_time.map(|t| t.normalize()))
            .with_opt("end_time", self.end_time.map(|t| t.normalize()))
    }
}

/// Unix seconds for `time`, keeping microseconds
pub fn unix_seconds(time: DateTime<Utc>) -> Decimal {
    Decimal::new(time.timestamp_micros(), 6).normalize()
}

/// A public trade. `id` is unique per venue and is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub time: DateTime<Utc>,
    pub price: Decimal,
    pub size: Decimal,
    pub side: OrderSide,
    #[serde(default)]
    pub liquidation: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::codec::{encode_body, encode_query};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_limit_order_body() {
        let order = OrderRequest::limit("BTC-PERP", OrderSide::Buy, dec("1"), dec("10000"), "abc");
        assert_eq!(
            encode_body(&order.to_params()).unwrap().unwrap(),
            r#"{"market":"BTC-PERP","side":"buy","price":"10000","type":"limit","size":"1","ioc":false,"reduceOnly":false,"postOnly":false,"clientId":"abc"}"#
        );
    }

    #[test]
    fn test_market_order_sends_null_price() {
        let order = OrderRequest::market("ETH-PERP", OrderSide::Sell, dec("0.25"), "m1")
            .ioc(true)
            .reduce_only(true);
        let body = encode_body(&order.to_params()).unwrap().unwrap();
        assert!(body.contains(r#""price":null"#));
        assert!(body.contains(r#""type":"market""#));
        assert!(body.contains(r#""size":"0.25""#));
        assert!(body.contains(r#""ioc":true"#));
        assert!(body.contains(r#""reduceOnly":true"#));
    }

    #[test]
    fn test_stop_limit_params() {
        let order = ConditionalOrderRequest::new(
            "BTC-PERP",
            OrderSide::Sell,
            dec("2"),
            ConditionalTrigger::Stop {
                trigger_price: dec("9000"),
                order_price: Some(dec("8990.5")),
            },
        )
        .client_id("stop-1");

        let params = order.to_params();
        assert_eq!(
            params.keys(),
            vec![
                "market",
                "side",
                "size",
                "type",
                "clientId",
                "reduceOnly",
                "orderPrice",
                "triggerPrice"
            ]
        );
        assert!(params.get("trailValue").is_none());
    }

    #[test]
    fn test_trailing_stop_has_no_trigger_price() {
        let order = ConditionalOrderRequest::new(
            "BTC-PERP",
            OrderSide::Sell,
            dec("1"),
            ConditionalTrigger::TrailingStop {
                trail_value: dec("-50"),
            },
        );
        let body = encode_body(&order.to_params()).unwrap().unwrap();
        assert!(body.contains(r#""type":"trailing_stop""#));
        assert!(body.contains(r#""trailValue":"-50""#));
        assert!(!body.contains("triggerPrice"));
        assert!(!body.contains("clientId"));
    }

    #[test]
    fn test_modify_order_requires_a_change() {
        assert!(ModifyOrder::default().to_params().is_err());
        let params = ModifyOrder {
            price: None,
            size: Some(dec("3")),
        }
        .to_params()
        .unwrap();
        assert_eq!(params.keys(), vec!["size"]);
    }

    #[test]
    fn test_order_history_filter_query() {
        let filter = OrderHistoryFilter {
            market: Some("BTC-PERP".to_string()),
            side: Some(OrderSide::Buy),
            start_time: Some(1_600_000_000),
            ..Default::default()
        };
        assert_eq!(
            encode_query(&filter.to_params()).unwrap(),
            "?market=BTC-PERP&side=buy&start_time=1600000000"
        );
        assert_eq!(encode_query(&OrderHistoryFilter::default().to_params()).unwrap(), "");
    }

    #[test]
    fn test_history_filters_send_order_type() {
        let filter = ConditionalOrderHistoryFilter {
            kind: Some(ConditionalOrderKind::TrailingStop),
            order_type: Some(OrderType::Market),
            ..Default::default()
        };
        assert_eq!(
            encode_query(&filter.to_params()).unwrap(),
            "?type=trailing_stop&orderType=market"
        );

        let filter = OrderHistoryFilter {
            order_type: Some(OrderType::Limit),
            ..Default::default()
        };
        assert_eq!(encode_query(&filter.to_params()).unwrap(), "?orderType=limit");
    }

    #[test]
    fn test_trade_window_keeps_fractional_seconds() {
        let window = TradeWindow {
            start_time: Some(Decimal::from(1_600_000_000)),
            end_time: Some(dec("1600000025.600")),
            limit: Some(100),
        };
        assert_eq!(
            encode_query(&window.to_params()).unwrap(),
            "?limit=100&start_time=1600000000&end_time=1600000025.6"
        );
    }

    #[test]
    fn test_unix_seconds_keeps_microseconds() {
        let time = DateTime::parse_from_rfc3339("2019-03-20T18:16:23.397991+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(unix_seconds(time).to_string(), "1553105783.397991");

        let whole = DateTime::parse_from_rfc3339("2020-09-13T12:26:40Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(unix_seconds(whole).to_string(), "1600000000");
    }

    #[test]
    fn test_trade_deserialize() {
        let trade: Trade = serde_json::from_str(
            r#"{"id":3855995,"liquidation":false,"price":3857.75,"side":"buy","size":0.111,"time":"2019-03-20T18:16:23.397991+00:00"}"#,
        )
        .unwrap();
        assert_eq!(trade.id, 3_855_995);
        assert_eq!(trade.price, dec("3857.75"));
        assert_eq!(trade.size, dec("0.111"));
        assert_eq!(trade.side, OrderSide::Buy);
        assert_eq!(trade.time.timestamp(), 1_553_105_783);
    }
}
