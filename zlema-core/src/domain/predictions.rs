//! Polynomial forecast payload.
//!
//! The backend has not published a fixed shape for this endpoint, so every
//! field is optional and the common aliases are accepted.

use serde::{Deserialize, Serialize};

/// `GET /api/polynomial-predictions` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolynomialPredictions {
    /// Forecast values for the bars after the last candle.
    #[serde(alias = "forecast", alias = "predicted")]
    pub predictions: Vec<f64>,
    /// In-sample fit over the lookback window.
    #[serde(alias = "fitted_values", alias = "fit")]
    pub fitted: Vec<f64>,
    pub lookback: Option<u32>,
    pub forecast_periods: Option<u32>,
    pub degree: Option<u32>,
}

impl PolynomialPredictions {
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty() && self.fitted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_aliases() {
        let p: PolynomialPredictions = serde_json::from_value(json!({
            "forecast": [1.0, 2.0],
            "fitted_values": [0.5],
            "degree": 2
        }))
        .unwrap();
        assert_eq!(p.predictions, vec![1.0, 2.0]);
        assert_eq!(p.fitted, vec![0.5]);
        assert_eq!(p.degree, Some(2));
    }

    #[test]
    fn empty_object_is_empty() {
        let p: PolynomialPredictions = serde_json::from_value(json!({})).unwrap();
        assert!(p.is_empty());
    }
}
