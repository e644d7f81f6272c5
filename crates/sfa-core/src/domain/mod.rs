//! # Domain Models
//!
//! Canonical types shared by the grading engine.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StockRecord`] | One ticker's fundamentals row |
//! | [`MetricValues`] | Optional value per tracked metric |
//! | [`Metric`] | The six tracked metrics and their direction |
//! | [`Grade`] | Letter grade ladder, `A+` to `F` |
//! | [`Ticker`] | Validated stock code |
//! | [`Exchange`] | Listing exchange code |
//! | [`CapTier`] | Market-cap bucket (small, mid, large) |
//! | [`UtcDateTime`] | UTC timestamp |

mod exchange;
mod grade;
mod metric;
mod record;
mod ticker;
mod timestamp;

pub use exchange::{CapTier, Exchange};
pub use grade::Grade;
pub use metric::{Direction, Metric};
pub use record::{MetricValues, StockRecord};
pub use ticker::Ticker;
pub use timestamp::UtcDateTime;
