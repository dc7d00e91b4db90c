// src/application/dto/parser.rs
// Parsers for provider responses

use chrono::{DateTime, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::chart_response::{ChartEnvelope, ChartEvents, ChartResult};
use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::model::{PriceRecord, PriceSeries};

/// Error code the provider uses for unknown or delisted symbols.
const NOT_FOUND_CODE: &str = "Not Found";
const DEFAULT_PRICE_HINT: u32 = 2;
const MAX_ERROR_BODY: usize = 200;

/// Decode a chart response into a series.
///
/// Unknown symbols and windows without bars yield an empty series; only
/// provider errors and schema mismatches are reported as `Err`.
pub fn parse_chart_response(status: u16, body: &[u8]) -> FetchResult<PriceSeries> {
    let success = (200..300).contains(&status);

    let envelope: ChartEnvelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) if success => {
            return Err(FetchError::Malformed(format!(
                "Failed to decode chart response: {}",
                e
            )))
        }
        Err(_) => {
            return Err(FetchError::Provider {
                status,
                message: truncate_body(body),
            })
        }
    };

    if let Some(error) = envelope.chart.error {
        if error.code.eq_ignore_ascii_case(NOT_FOUND_CODE) {
            log::debug!(
                "Provider reported no data: {}",
                error.description.as_deref().unwrap_or("not found")
            );
            return Ok(PriceSeries::empty());
        }
        return Err(FetchError::Provider {
            status,
            message: match error.description {
                Some(description) => format!("{}: {}", error.code, description),
                None => error.code,
            },
        });
    }

    if !success {
        return Err(FetchError::Provider {
            status,
            message: truncate_body(body),
        });
    }

    match envelope.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => normalize_chart_result(result),
        None => Ok(PriceSeries::empty()),
    }
}

/// Turn the column-oriented result into date-keyed records.
pub fn normalize_chart_result(result: ChartResult) -> FetchResult<PriceSeries> {
    let timestamps = match result.timestamp {
        Some(ts) if !ts.is_empty() => ts,
        _ => return Ok(PriceSeries::empty()),
    };

    let indicators = result.indicators;
    let quote = indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Malformed("Missing quote block in chart result".to_string()))?;
    let adjclose = indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose);

    let expected = timestamps.len();
    for (name, len) in [
        ("open", quote.open.len()),
        ("high", quote.high.len()),
        ("low", quote.low.len()),
        ("close", quote.close.len()),
        ("volume", quote.volume.len()),
        ("adjclose", adjclose.as_ref().map_or(expected, Vec::len)),
    ] {
        if len != expected {
            return Err(FetchError::Malformed(format!(
                "Column {} has {} values, expected {}",
                name, len, expected
            )));
        }
    }

    let offset = result.meta.gmtoffset;
    let price_hint = result.meta.price_hint.unwrap_or(DEFAULT_PRICE_HINT);
    let (dividends, splits) = collect_events(result.events.unwrap_or_default(), offset);

    let mut records = Vec::with_capacity(expected);
    let mut skipped = 0usize;

    for (i, ts) in timestamps.iter().enumerate() {
        let date = local_date(*ts, offset)
            .ok_or_else(|| FetchError::Malformed(format!("Invalid timestamp: {}", ts)))?;

        let factor = adjustment_factor(quote.close[i], adjclose.as_ref().and_then(|a| a[i]));
        let adjusted = |raw: Option<f64>| raw.and_then(|v| to_price(v * factor, price_hint));

        let prices = (
            adjusted(quote.open[i]),
            adjusted(quote.high[i]),
            adjusted(quote.low[i]),
            adjusted(quote.close[i]),
        );

        let (open, high, low, close) = match prices {
            (Some(open), Some(high), Some(low), Some(close)) => (open, high, low, close),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let volume = quote.volume[i].map(|v| v.max(0.0) as u64).unwrap_or(0);

        let mut record = PriceRecord::new(date, open, high, low, close, volume);
        if let Some(amount) = dividends.get(&date) {
            record.dividends = *amount;
        }
        if let Some(ratio) = splits.get(&date) {
            record.stock_splits = *ratio;
        }
        records.push(record);
    }

    if skipped > 0 {
        log::debug!("Dropped {} incomplete bars", skipped);
    }

    Ok(PriceSeries::from_records(records))
}

fn collect_events(
    events: ChartEvents,
    offset: i64,
) -> (HashMap<NaiveDate, Decimal>, HashMap<NaiveDate, Decimal>) {
    let dividends = events
        .dividends
        .values()
        .filter_map(|d| Some((local_date(d.date, offset)?, Decimal::from_f64(d.amount)?)))
        .collect();

    let splits = events
        .splits
        .values()
        .filter_map(|s| {
            let numerator = Decimal::from_f64(s.numerator)?;
            let denominator = Decimal::from_f64(s.denominator)?;
            let ratio = numerator.checked_div(denominator)?;
            Some((local_date(s.date, offset)?, ratio.normalize()))
        })
        .collect();

    (dividends, splits)
}

/// Ratio that back-adjusts a bar for later dividends and splits.
/// Bars without a usable adjusted close keep their raw prices.
fn adjustment_factor(close: Option<f64>, adjclose: Option<f64>) -> f64 {
    match (close, adjclose) {
        (Some(close), Some(adj)) if close != 0.0 && close.is_finite() && adj.is_finite() => {
            adj / close
        }
        _ => 1.0,
    }
}

/// Calendar date in the exchange's time zone.
fn local_date(ts: i64, offset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts.checked_add(offset)?, 0).map(|dt| dt.date_naive())
}

fn to_price(value: f64, price_hint: u32) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(price_hint))
}

fn truncate_body(body: &[u8]) -> String {
    String::from_utf8_lossy(body).chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // 2024-01-02 and 2024-01-03 14:30 UTC, the NYSE open
    const JAN_2: i64 = 1704205800;
    const JAN_3: i64 = 1704292200;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_parse_daily_bars() {
        let body = format!(
            r#"{{"chart":{{"result":[{{
                "meta":{{"symbol":"AAPL","currency":"USD","gmtoffset":-18000,"priceHint":2}},
                "timestamp":[{},{}],
                "indicators":{{"quote":[{{
                    "open":[180.0,181.0],
                    "high":[182.0,183.0],
                    "low":[179.0,180.0],
                    "close":[181.00000762939453,182.0],
                    "volume":[82488700,58414500]
                }}]}}
            }}],"error":null}}}}"#,
            JAN_2, JAN_3
        );

        let series = parse_chart_response(200, body.as_bytes()).unwrap();
        assert_eq!(series.len(), 2);

        let first = &series.records()[0];
        assert_eq!(first.date, date(2));
        assert_eq!(first.close, dec!(181));
        assert_eq!(first.volume, 82488700);
        assert_eq!(first.dividends, Decimal::ZERO);
        assert_eq!(series.records()[1].date, date(3));
    }

    #[test]
    fn test_gmt_offset_shifts_date() {
        // 03:00 UTC on Jan 3 is still Jan 2 in New York
        let ts = 1704250800;
        assert_eq!(local_date(ts, 0), Some(date(3)));
        assert_eq!(local_date(ts, -18000), Some(date(2)));
    }

    #[test]
    fn test_incomplete_bars_dropped_and_null_volume_zeroed() {
        let body = format!(
            r#"{{"chart":{{"result":[{{
                "meta":{{"gmtoffset":-18000}},
                "timestamp":[{},{}],
                "indicators":{{"quote":[{{
                    "open":[180.0,null],
                    "high":[182.0,183.0],
                    "low":[179.0,180.0],
                    "close":[181.0,182.0],
                    "volume":[null,100]
                }}]}}
            }}]}}}}"#,
            JAN_2, JAN_3
        );

        let series = parse_chart_response(200, body.as_bytes()).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.records()[0].date, date(2));
        assert_eq!(series.records()[0].volume, 0);
    }

    #[test]
    fn test_prices_rounded_to_price_hint() {
        assert_eq!(to_price(185.63999938964844, 2), Some(dec!(185.64)));
        assert_eq!(to_price(0.123456, 4), Some(dec!(0.1235)));
        assert_eq!(to_price(f64::NAN, 2), None);
    }

    #[test]
    fn test_corporate_actions_matched_by_date() {
        let body = format!(
            r#"{{"chart":{{"result":[{{
                "meta":{{"gmtoffset":-18000,"priceHint":2}},
                "timestamp":[{},{}],
                "events":{{
                    "dividends":{{"{}":{{"amount":0.24,"date":{}}}}},
                    "splits":{{"{}":{{"date":{},"numerator":4,"denominator":1,"splitRatio":"4:1"}}}}
                }},
                "indicators":{{"quote":[{{
                    "open":[180.0,181.0],
                    "high":[182.0,183.0],
                    "low":[179.0,180.0],
                    "close":[181.0,182.0],
                    "volume":[1,2]
                }}]}}
            }}]}}}}"#,
            JAN_2, JAN_3, JAN_2, JAN_2, JAN_3, JAN_3
        );

        let series = parse_chart_response(200, body.as_bytes()).unwrap();
        assert_eq!(series.records()[0].dividends, dec!(0.24));
        assert_eq!(series.records()[0].stock_splits, Decimal::ZERO);
        assert_eq!(series.records()[1].stock_splits, dec!(4));
    }

    #[test]
    fn test_prices_adjusted_by_adjclose() {
        let body = format!(
            r#"{{"chart":{{"result":[{{
                "meta":{{"gmtoffset":-18000,"priceHint":2}},
                "timestamp":[{},{}],
                "indicators":{{
                    "quote":[{{
                        "open":[180.0,181.0],
                        "high":[182.0,183.0],
                        "low":[179.0,180.0],
                        "close":[181.0,182.0],
                        "volume":[1,2]
                    }}],
                    "adjclose":[{{"adjclose":[180.0,182.0]}}]
                }}
            }}]}}}}"#,
            JAN_2, JAN_3
        );

        let series = parse_chart_response(200, body.as_bytes()).unwrap();
        let first = &series.records()[0];
        assert_eq!(first.close, dec!(180));
        // 180 * 180 / 181
        assert_eq!(first.open, dec!(179.01));
        assert_eq!(first.high, dec!(180.99));
        assert_eq!(first.low, dec!(178.01));

        // Unadjusted bar keeps its raw prices
        let second = &series.records()[1];
        assert_eq!(second.close, dec!(182));
        assert_eq!(second.open, dec!(181));
    }

    #[test]
    fn test_adjustment_factor_falls_back_to_raw() {
        assert_eq!(adjustment_factor(Some(200.0), Some(100.0)), 0.5);
        assert_eq!(adjustment_factor(Some(200.0), None), 1.0);
        assert_eq!(adjustment_factor(Some(0.0), Some(1.0)), 1.0);
        assert_eq!(adjustment_factor(None, Some(1.0)), 1.0);
    }

    #[test]
    fn test_not_found_is_empty_series() {
        let body = br#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let series = parse_chart_response(404, body).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_missing_timestamps_is_empty_series() {
        let body = br#"{"chart":{"result":[{"meta":{"gmtoffset":0},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let series = parse_chart_response(200, body).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_provider_error_reported() {
        let body = br#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input - interval=1d is not supported"}}}"#;
        match parse_chart_response(400, body) {
            Err(FetchError::Provider { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.starts_with("Bad Request"));
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_json_error_status_is_provider_error() {
        let err = parse_chart_response(503, b"<html>Service Unavailable</html>").unwrap_err();
        assert!(matches!(err, FetchError::Provider { status: 503, .. }));
    }

    #[test]
    fn test_schema_mismatch_is_malformed() {
        let err = parse_chart_response(200, b"{\"unexpected\":true}").unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));

        let body = format!(
            r#"{{"chart":{{"result":[{{
                "timestamp":[{},{}],
                "indicators":{{"quote":[{{
                    "open":[180.0],
                    "high":[182.0,183.0],
                    "low":[179.0,180.0],
                    "close":[181.0,182.0],
                    "volume":[1,2]
                }}]}}
            }}]}}}}"#,
            JAN_2, JAN_3
        );
        let err = parse_chart_response(200, body.as_bytes()).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }
}
