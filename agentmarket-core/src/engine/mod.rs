//! Market engine: one discrete tick of price formation at a time.
//!
//! Each tick runs the same sequential pipeline:
//!
//! 1. Decision: every trader decides, in a freshly shuffled order
//! 2. Aggregation: trader demands are summed
//! 3. Maker reaction: market makers lean against the trader flow
//! 4. Recalibration: impact is rescaled by trailing realized volatility
//! 5. Price update: clamped demand moves the price multiplicatively
//! 6. Noise: small Gaussian multiplicative noise
//! 7. Safety: a non-finite or non-positive price reverts to the last valid one
//! 8. Append: the price is appended to history and the step counter advances
//!
//! Numeric trouble never surfaces as an error; the worst outcome of a tick is
//! "no price change".

pub mod history;
pub mod impact;
pub mod market;

pub use history::PriceHistory;
pub use impact::{base_impact, recalibrate, DEMAND_LIMIT, VOL_SENSITIVITY, VOL_WINDOW};
pub use market::{MarketEngine, TickReport};
