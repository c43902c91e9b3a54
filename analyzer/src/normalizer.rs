//! Snapshot Normalizer
//!
//! Chuyển payload thô của từng nhà cung cấp dữ liệu thị trường về
//! `TokenSnapshot`. Mỗi layout có một schema serde riêng; mọi trường đều
//! được đọc "mềm": số có thể là number hoặc chuỗi số, giá trị hỏng trở về
//! mặc định trung tính thay vì gây lỗi.

// Third party imports
use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst, Same};
use tracing::debug;

// Internal imports
use crate::types::TokenSnapshot;

/// Số dạng number hoặc chuỗi; lỗi -> None
type Lenient = DefaultOnError<Option<PickFirst<(Same, DisplayFromStr)>>>;

/// Layout payload của nhà cung cấp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSchema {
    /// `{"pairs": [{baseToken, priceUsd, volume: {h24}, txns: {h1: {buys}}}]}`
    DexScreener,
    /// `{"success": true, "data": {price, mc, v24hUSD, buy1h, ...}}`
    Birdeye,
}

/// Payload thô nhận được từ nhà cung cấp dữ liệu thị trường
#[derive(Debug, Clone, PartialEq)]
pub struct RawMarketData {
    pub schema: PayloadSchema,
    pub body: Value,
}

impl RawMarketData {
    pub fn new(schema: PayloadSchema, body: Value) -> Self {
        Self { schema, body }
    }
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DexTokensResponse {
    #[serde_as(as = "DefaultOnError")]
    pairs: Option<Vec<Value>>,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DexPair {
    #[serde_as(as = "DefaultOnError")]
    base_token: DexBaseToken,
    #[serde_as(as = "Lenient")]
    price_usd: Option<f64>,
    #[serde_as(as = "Lenient")]
    market_cap: Option<f64>,
    #[serde_as(as = "Lenient")]
    fdv: Option<f64>,
    #[serde_as(as = "DefaultOnError")]
    liquidity: DexLiquidity,
    #[serde_as(as = "DefaultOnError")]
    volume: DexWindows,
    #[serde_as(as = "DefaultOnError")]
    price_change: DexWindows,
    #[serde_as(as = "DefaultOnError")]
    txns: DexTxns,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DexBaseToken {
    #[serde_as(as = "DefaultOnError")]
    address: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    name: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    symbol: Option<String>,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DexLiquidity {
    #[serde_as(as = "Lenient")]
    usd: Option<f64>,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DexWindows {
    #[serde_as(as = "Lenient")]
    m5: Option<f64>,
    #[serde_as(as = "Lenient")]
    h1: Option<f64>,
    #[serde_as(as = "Lenient")]
    h6: Option<f64>,
    #[serde_as(as = "Lenient")]
    h24: Option<f64>,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DexTxns {
    #[serde_as(as = "DefaultOnError")]
    h1: DexTxnCount,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DexTxnCount {
    #[serde_as(as = "Lenient")]
    buys: Option<u64>,
    #[serde_as(as = "Lenient")]
    sells: Option<u64>,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BirdeyeEnvelope {
    #[serde_as(as = "DefaultOnError")]
    success: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    data: Option<BirdeyeOverview>,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BirdeyeOverview {
    #[serde_as(as = "DefaultOnError")]
    name: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    symbol: Option<String>,
    #[serde_as(as = "Lenient")]
    price: Option<f64>,
    #[serde_as(as = "Lenient")]
    mc: Option<f64>,
    #[serde(rename = "marketCap")]
    #[serde_as(as = "Lenient")]
    market_cap: Option<f64>,
    #[serde_as(as = "Lenient")]
    liquidity: Option<f64>,
    #[serde(rename = "v24hUSD")]
    #[serde_as(as = "Lenient")]
    volume_24h: Option<f64>,
    #[serde(rename = "v1hUSD")]
    #[serde_as(as = "Lenient")]
    volume_1h: Option<f64>,
    #[serde(rename = "priceChange1hPercent")]
    #[serde_as(as = "Lenient")]
    price_change_1h: Option<f64>,
    #[serde(rename = "priceChange24hPercent")]
    #[serde_as(as = "Lenient")]
    price_change_24h: Option<f64>,
    #[serde(rename = "buy1h")]
    #[serde_as(as = "Lenient")]
    buy_count_1h: Option<u64>,
    #[serde(rename = "sell1h")]
    #[serde_as(as = "Lenient")]
    sell_count_1h: Option<u64>,
}

/// Chuẩn hóa payload thành snapshot
///
/// Trả về None khi payload không chứa bản ghi nào cho token (token không
/// tồn tại ở nhà cung cấp).
pub fn normalize(address: &str, raw: &RawMarketData) -> Option<TokenSnapshot> {
    match raw.schema {
        PayloadSchema::DexScreener => normalize_dexscreener(address, &raw.body),
        PayloadSchema::Birdeye => normalize_birdeye(address, &raw.body),
    }
}

fn normalize_dexscreener(address: &str, body: &Value) -> Option<TokenSnapshot> {
    let response: DexTokensResponse = serde_json::from_value(body.clone()).unwrap_or_default();
    let pairs: Vec<DexPair> = response
        .pairs
        .unwrap_or_default()
        .into_iter()
        .filter_map(|pair| serde_json::from_value(pair).ok())
        .collect();

    if pairs.is_empty() {
        debug!(token = %address, "DexScreener payload has no pairs");
        return None;
    }

    // Địa chỉ base58 phân biệt hoa thường; pair chỉ có token ở phía quote
    // mang giá của token khác nên bị bỏ qua.
    let candidates: Vec<DexPair> = pairs
        .into_iter()
        .filter(|pair| pair.base_token.address.as_deref() == Some(address))
        .collect();
    if candidates.is_empty() {
        debug!(token = %address, "DexScreener payload has no pair with this token as base");
        return None;
    }

    let pair = candidates.into_iter().max_by(|a, b| {
        let a = a.liquidity.usd.unwrap_or(-1.0);
        let b = b.liquidity.usd.unwrap_or(-1.0);
        a.total_cmp(&b)
    })?;

    Some(TokenSnapshot {
        address: address.to_string(),
        name: clean_text(pair.base_token.name),
        symbol: clean_text(pair.base_token.symbol),
        price: non_negative(pair.price_usd),
        market_cap: non_negative(pair.market_cap).or_else(|| non_negative(pair.fdv)),
        liquidity_usd: non_negative(pair.liquidity.usd),
        volume_24h: non_negative(pair.volume.h24),
        volume_1h: non_negative(pair.volume.h1),
        price_change_5m: finite(pair.price_change.m5),
        price_change_1h: finite(pair.price_change.h1),
        price_change_6h: finite(pair.price_change.h6),
        price_change_24h: finite(pair.price_change.h24),
        buy_count_1h: pair.txns.h1.buys,
        sell_count_1h: pair.txns.h1.sells,
    })
}

fn normalize_birdeye(address: &str, body: &Value) -> Option<TokenSnapshot> {
    let envelope: BirdeyeEnvelope = serde_json::from_value(body.clone()).unwrap_or_default();
    if envelope.success == Some(false) {
        debug!(token = %address, "Birdeye reported failure");
        return None;
    }
    let data = envelope.data?;

    Some(TokenSnapshot {
        address: address.to_string(),
        name: clean_text(data.name),
        symbol: clean_text(data.symbol),
        price: non_negative(data.price),
        market_cap: non_negative(data.market_cap).or_else(|| non_negative(data.mc)),
        liquidity_usd: non_negative(data.liquidity),
        volume_24h: non_negative(data.volume_24h),
        volume_1h: non_negative(data.volume_1h),
        price_change_5m: None,
        price_change_1h: finite(data.price_change_1h),
        price_change_6h: None,
        price_change_24h: finite(data.price_change_24h),
        buy_count_1h: data.buy_count_1h,
        sell_count_1h: data.sell_count_1h,
    })
}

fn clean_text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    finite(value).filter(|v| *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

    fn dex(body: Value) -> RawMarketData {
        RawMarketData::new(PayloadSchema::DexScreener, body)
    }

    #[test]
    fn test_dexscreener_full_pair() {
        let raw = dex(json!({
            "schemaVersion": "1.0.0",
            "pairs": [{
                "baseToken": { "address": MINT, "name": " Bonk ", "symbol": "BONK" },
                "priceUsd": "0.00002312",
                "marketCap": 1500000000,
                "fdv": 1700000000,
                "liquidity": { "usd": 250000.5 },
                "volume": { "m5": 100, "h1": 5000, "h6": 20000, "h24": 80000 },
                "priceChange": { "m5": -0.5, "h1": 2.1, "h6": "4.2", "h24": 7 },
                "txns": { "h1": { "buys": 120, "sells": "40" } }
            }]
        }));

        let snapshot = normalize(MINT, &raw).unwrap();
        assert_eq!(snapshot.name, "Bonk");
        assert_eq!(snapshot.symbol, "BONK");
        assert_eq!(snapshot.price, Some(0.00002312));
        assert_eq!(snapshot.market_cap, Some(1500000000.0));
        assert_eq!(snapshot.liquidity_usd, Some(250000.5));
        assert_eq!(snapshot.volume_24h, Some(80000.0));
        assert_eq!(snapshot.volume_1h, Some(5000.0));
        assert_eq!(snapshot.price_change_5m, Some(-0.5));
        assert_eq!(snapshot.price_change_6h, Some(4.2));
        assert_eq!(snapshot.buy_count_1h, Some(120));
        assert_eq!(snapshot.sell_count_1h, Some(40));
    }

    #[test]
    fn test_malformed_fields_become_neutral() {
        let raw = dex(json!({
            "pairs": [{
                "baseToken": { "address": MINT, "name": 42, "symbol": null },
                "priceUsd": "not-a-number",
                "marketCap": -10,
                "fdv": "900",
                "liquidity": "deep",
                "volume": { "h24": [1, 2] },
                "priceChange": null,
                "txns": { "h1": { "buys": -3, "sells": 1.5 } }
            }]
        }));

        let snapshot = normalize(MINT, &raw).unwrap();
        assert_eq!(snapshot.name, "");
        assert_eq!(snapshot.symbol, "");
        assert_eq!(snapshot.price, None);
        // marketCap âm bị loại, dùng fdv
        assert_eq!(snapshot.market_cap, Some(900.0));
        assert_eq!(snapshot.liquidity_usd, None);
        assert_eq!(snapshot.volume_24h, None);
        assert_eq!(snapshot.price_change_24h, None);
        assert_eq!(snapshot.buy_count_1h, None);
        assert_eq!(snapshot.sell_count_1h, None);
    }

    #[test]
    fn test_unknown_token_yields_none() {
        assert!(normalize(MINT, &dex(json!({ "pairs": null }))).is_none());
        assert!(normalize(MINT, &dex(json!({ "pairs": [] }))).is_none());
        assert!(normalize(MINT, &dex(json!({}))).is_none());
        assert!(normalize(MINT, &dex(json!("garbage"))).is_none());
    }

    #[test]
    fn test_picks_deepest_matching_pair() {
        let raw = dex(json!({
            "pairs": [
                { "baseToken": { "address": "other", "symbol": "OTHER" }, "liquidity": { "usd": 9000000 } },
                { "baseToken": { "address": MINT, "symbol": "SHALLOW" }, "liquidity": { "usd": 1000 } },
                { "baseToken": { "address": MINT, "symbol": "DEEP" }, "liquidity": { "usd": 50000 } }
            ]
        }));

        let snapshot = normalize(MINT, &raw).unwrap();
        assert_eq!(snapshot.symbol, "DEEP");
        assert_eq!(snapshot.address, MINT);
    }

    #[test]
    fn test_address_match_is_case_sensitive() {
        let raw = dex(json!({
            "pairs": [
                { "baseToken": { "address": "abcDEF", "symbol": "OTHER" }, "liquidity": { "usd": 9000000 } },
                { "baseToken": { "address": "AbcDef", "symbol": "MINE" }, "liquidity": { "usd": 1 } }
            ]
        }));

        assert_eq!(normalize("AbcDef", &raw).unwrap().symbol, "MINE");
        assert!(normalize("ABCDEF", &raw).is_none());
    }

    #[test]
    fn test_quote_side_pair_is_not_used() {
        const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
        let raw = dex(json!({
            "pairs": [{
                "baseToken": { "address": MINT, "symbol": "BONK" },
                "quoteToken": { "address": USDC, "symbol": "USDC" },
                "priceUsd": "0.00002",
                "marketCap": 1500000000,
                "liquidity": { "usd": 250000 }
            }]
        }));

        assert!(normalize(USDC, &raw).is_none());
        assert_eq!(normalize(MINT, &raw).unwrap().symbol, "BONK");
    }

    #[test]
    fn test_birdeye_overview() {
        let raw = RawMarketData::new(
            PayloadSchema::Birdeye,
            json!({
                "success": true,
                "data": {
                    "address": MINT,
                    "name": "Bonk",
                    "symbol": "BONK",
                    "price": 0.0000231,
                    "mc": 1400000000.0,
                    "liquidity": 120000,
                    "v24hUSD": 90000,
                    "v1hUSD": "12000",
                    "priceChange1hPercent": 3.5,
                    "priceChange24hPercent": -1.25,
                    "buy1h": 300,
                    "sell1h": 120
                }
            }),
        );

        let snapshot = normalize(MINT, &raw).unwrap();
        assert_eq!(snapshot.market_cap, Some(1400000000.0));
        assert_eq!(snapshot.volume_1h, Some(12000.0));
        assert_eq!(snapshot.price_change_1h, Some(3.5));
        assert_eq!(snapshot.price_change_6h, None);
        assert_eq!(snapshot.buy_count_1h, Some(300));
    }

    #[test]
    fn test_birdeye_failure_is_unknown_token() {
        let raw = RawMarketData::new(PayloadSchema::Birdeye, json!({ "success": false, "message": "Not found" }));
        assert!(normalize(MINT, &raw).is_none());

        let raw = RawMarketData::new(PayloadSchema::Birdeye, json!({ "success": true, "data": null }));
        assert!(normalize(MINT, &raw).is_none());
    }
}
