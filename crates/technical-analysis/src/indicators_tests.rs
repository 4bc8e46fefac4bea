#[cfg(test)]
mod tests {
    use super::super::chart::*;
    use super::super::indicators::*;
    use analysis_core::Bar;
    use chrono::{Duration, TimeZone, Utc};

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    // Daily bars closing at `closes`, starting 2024-01-02
    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000000.0,
            })
            .collect()
    }

    fn uptrend(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), data.len());
        assert!(result[0].is_none());
        assert!(result[1].is_none());
        assert!((result[2].unwrap() - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[3].unwrap() - 3.0).abs() < 0.001);
        assert!((result[4].unwrap() - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        let result = sma(&data, 5);

        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_sma_real_prices() {
        let prices = sample_prices();
        let result = sma(&prices, 5);

        let expected_first = (44.34 + 44.09 + 44.15 + 43.61 + 44.33) / 5.0;
        assert!((result[4].unwrap() - expected_first).abs() < 0.01);
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let data = vec![22.0, 24.0, 23.0, 25.0, 26.0];
        let result = ema(&data, 3);

        // span 3 gives alpha 0.5
        let expected = [22.0, 23.0, 23.0, 24.0, 25.0];
        assert_eq!(result.len(), data.len());
        for (got, want) in result.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ema_empty_data() {
        let data: Vec<f64> = vec![];
        assert!(ema(&data, 5).is_empty());
    }

    #[test]
    fn test_ema_increases_with_uptrend() {
        let data = uptrend(10);
        let result = ema(&data, 3);

        for i in 1..result.len() {
            assert!(result[i] > result[i - 1]);
        }
    }

    #[test]
    fn test_rsi_rolling_mean() {
        // diffs: +2, -1, +2
        let data = vec![1.0, 3.0, 2.0, 4.0];
        let result = rsi(&data, 2);

        assert!(result[0].is_none());
        assert!(result[1].is_none());
        // avg gain 1.0, avg loss 0.5 -> rs 2
        assert!((result[2].unwrap() - 200.0 / 3.0).abs() < 1e-9);
        assert!((result[3].unwrap() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_bounds() {
        let prices = sample_prices();
        let result = rsi(&prices, 14);

        assert!(result[13].is_none());
        let defined: Vec<f64> = result.iter().flatten().copied().collect();
        assert_eq!(defined.len(), prices.len() - 14);
        for value in defined {
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let data = vec![1.0, 2.0, 3.0];
        assert!(rsi(&data, 14).iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_rsi_no_losses() {
        let result = rsi(&uptrend(20), 14);
        assert_eq!(result.last().copied().flatten(), Some(100.0));

        let flat = rsi(&vec![50.0; 20], 14);
        assert!(flat.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_macd_aligned_with_input() {
        let prices = sample_prices();
        let result = macd(&prices, 12, 26, 9);

        assert_eq!(result.macd_line.len(), prices.len());
        assert_eq!(result.signal_line.len(), prices.len());
        assert_eq!(result.histogram.len(), prices.len());
        // both EMAs start at the first close
        assert_eq!(result.macd_line[0], 0.0);
    }

    #[test]
    fn test_macd_histogram() {
        let prices = sample_prices();
        let result = macd(&prices, 12, 26, 9);

        for (i, &hist) in result.histogram.iter().enumerate() {
            let expected = result.macd_line[i] - result.signal_line[i];
            assert!((hist - expected).abs() < 0.001);
        }
    }

    #[test]
    fn test_bollinger_bands_sample_std() {
        let result = bollinger_bands(&[1.0, 2.0, 3.0], 3, 2.0);

        assert!(result.middle[1].is_none());
        assert!((result.middle[2].unwrap() - 2.0).abs() < 1e-9);
        // sample std of [1, 2, 3] is 1
        assert!((result.upper[2].unwrap() - 4.0).abs() < 1e-9);
        assert!(result.lower[2].unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_bollinger_bands_ordering() {
        let prices = sample_prices();
        let result = bollinger_bands(&prices, 10, 2.0);

        for i in 9..prices.len() {
            assert!(result.upper[i].unwrap() > result.middle[i].unwrap());
            assert!(result.middle[i].unwrap() > result.lower[i].unwrap());
        }
    }

    #[test]
    fn test_bollinger_bands_width() {
        let prices = vec![100.0; 20]; // Constant prices
        let result = bollinger_bands(&prices, 20, 2.0);

        assert_eq!(result.upper[19], result.lower[19]);
        assert_eq!(result.middle[19], Some(100.0));
    }

    #[test]
    fn test_sma_points_only_for_full_windows() {
        let bars = bars_from_closes(&uptrend(30));
        let points = indicator_points(&bars, IndicatorKind::Sma);

        // SMA50 and SMA200 need more history
        assert_eq!(points.len(), 11);
        let json = serde_json::to_value(&points[0]).unwrap();
        assert_eq!(json["type"], "SMA20");
        assert_eq!(json["date"], "2024-01-21");
        assert!((json["value"].as_f64().unwrap() - 109.5).abs() < 1e-9);
    }

    #[test]
    fn test_ema_points() {
        let bars = bars_from_closes(&uptrend(20));
        let points = indicator_points(&bars, IndicatorKind::Ema);

        // EMA26 needs 26 bars
        assert_eq!(points.len(), 20);
        assert!(points.iter().all(|p| matches!(p, IndicatorPoint::Line { kind, .. } if kind == "EMA12")));
    }

    #[test]
    fn test_rsi_and_macd_minimum_history() {
        let short = bars_from_closes(&uptrend(14));
        assert!(indicator_points(&short, IndicatorKind::Rsi).is_empty());

        let bars = bars_from_closes(&uptrend(15));
        assert_eq!(indicator_points(&bars, IndicatorKind::Rsi).len(), 1);
        assert!(indicator_points(&bars, IndicatorKind::Macd).is_empty());

        let bars = bars_from_closes(&uptrend(26));
        let macd_points = indicator_points(&bars, IndicatorKind::Macd);
        assert_eq!(macd_points.len(), 26);
        let json = serde_json::to_value(&macd_points[25]).unwrap();
        assert_eq!(json["type"], "MACD");
        assert!(json.get("signal").is_some());
    }

    #[test]
    fn test_bollinger_points() {
        let bars = bars_from_closes(&sample_prices());
        let points = indicator_points(&bars, IndicatorKind::Bollinger);

        assert_eq!(points.len(), 1);
        let json = serde_json::to_value(&points[0]).unwrap();
        assert_eq!(json["type"], "Bollinger");
        assert!(json["upper"].as_f64().unwrap() > json["middle"].as_f64().unwrap());
        assert!(json.get("value").is_none());
    }

    #[test]
    fn test_indicator_kind_parse() {
        assert_eq!("macd".parse::<IndicatorKind>(), Ok(IndicatorKind::Macd));
        assert!("vwap".parse::<IndicatorKind>().is_err());
    }

    #[test]
    fn test_ytd_change_series() {
        let bars = bars_from_closes(&[100.0, 110.0, 90.0]);
        let series = ytd_change_series(&bars);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].value, 0.0);
        assert!((series[1].value - 10.0).abs() < 1e-9);
        assert!((series[2].value + 10.0).abs() < 1e-9);
        assert_eq!(series[2].date, "2024-01-04");
        assert!(ytd_change_series(&[]).is_empty());
    }
}
