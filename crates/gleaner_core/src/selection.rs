//! Selection ordering strategy.

use serde::{Deserialize, Serialize};

/// Ordering applied when several ledger entries are available for a claim.
///
/// `Sequential` favors low credential ids and drains the pool in a fixed
/// order; `Random` spreads load evenly across credentials.
///
/// # Examples
///
/// ```
/// use gleaner_core::SelectionOrder;
/// use std::str::FromStr;
///
/// assert_eq!(SelectionOrder::default(), SelectionOrder::Sequential);
/// assert_eq!(SelectionOrder::from_str("random").unwrap(), SelectionOrder::Random);
/// assert_eq!(format!("{}", SelectionOrder::Sequential), "sequential");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SelectionOrder {
    /// Lowest credential id first
    #[default]
    Sequential,
    /// Randomized order
    Random,
}
