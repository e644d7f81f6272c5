use serde::{Deserialize, Serialize};

use crate::{Metric, RatingError, Ticker, ValidationError};

/// One optional value per tracked metric.
///
/// Values may be absent before cleaning; the grader treats an absent value as
/// a hard precondition failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricValues {
    #[serde(rename = "PERatio")]
    pub pe_ratio: Option<f64>,
    #[serde(rename = "Earnings/Share")]
    pub earnings_per_share: Option<f64>,
    #[serde(rename = "DividendYieldRatio")]
    pub dividend_yield: Option<f64>,
    #[serde(rename = "BookValue/Share")]
    pub book_value_per_share: Option<f64>,
    #[serde(rename = "Revenue/Share")]
    pub revenue_per_share: Option<f64>,
    #[serde(rename = "D/ERatio")]
    pub debt_to_equity: Option<f64>,
}

impl MetricValues {
    /// Build a fully populated set, values in [`Metric::ALL`] order.
    pub fn complete(values: [f64; 6]) -> Self {
        let mut metrics = Self::default();
        for (metric, value) in Metric::ALL.into_iter().zip(values) {
            metrics.set(metric, Some(value));
        }
        metrics
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::PeRatio => self.pe_ratio,
            Metric::EarningsPerShare => self.earnings_per_share,
            Metric::DividendYield => self.dividend_yield,
            Metric::BookValuePerShare => self.book_value_per_share,
            Metric::RevenuePerShare => self.revenue_per_share,
            Metric::DebtToEquity => self.debt_to_equity,
        }
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::PeRatio => &mut self.pe_ratio,
            Metric::EarningsPerShare => &mut self.earnings_per_share,
            Metric::DividendYield => &mut self.dividend_yield,
            Metric::BookValuePerShare => &mut self.book_value_per_share,
            Metric::RevenuePerShare => &mut self.revenue_per_share,
            Metric::DebtToEquity => &mut self.debt_to_equity,
        };
        *slot = value;
    }

    /// First tracked metric without a value, if any.
    pub fn first_missing(&self) -> Option<Metric> {
        Metric::ALL
            .into_iter()
            .find(|metric| self.get(*metric).is_none())
    }

    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }
}

/// Canonical per-ticker fundamentals row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub code: Ticker,
    pub name: String,
    pub sector: String,
    /// Market capitalization in billions of the listing currency.
    pub market_cap: f64,
    #[serde(flatten)]
    pub metrics: MetricValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_rating: Option<f64>,
}

impl StockRecord {
    pub fn new(
        code: Ticker,
        name: impl Into<String>,
        sector: impl Into<String>,
        market_cap: f64,
        metrics: MetricValues,
    ) -> Result<Self, ValidationError> {
        let sector = sector.into();
        if sector.trim().is_empty() {
            return Err(ValidationError::EmptySector);
        }
        validate_non_negative("market_cap", market_cap)?;
        for metric in Metric::ALL {
            validate_optional_finite(metric.label(), metrics.get(metric))?;
        }

        Ok(Self {
            code,
            name: name.into(),
            sector,
            market_cap,
            metrics,
            overall_rating: None,
        })
    }

    /// Value of `metric`, or [`RatingError::MissingData`] when absent.
    pub fn metric(&self, metric: Metric) -> Result<f64, RatingError> {
        self.metrics
            .get(metric)
            .ok_or_else(|| RatingError::MissingData {
                code: self.code.to_string(),
                metric,
            })
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
    }
    Ok(())
}
