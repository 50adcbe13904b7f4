//! Broker order status and its collapse into polling phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status as reported by the broker.
///
/// Mirrors Alpaca's order status vocabulary. Anything the broker sends that
/// is not listed here parses to [`OrderStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Received, not yet routed.
    New,
    /// Received by the broker, not yet accepted for execution.
    PendingNew,
    /// Accepted, awaiting routing.
    Accepted,
    /// Some of the quantity has executed.
    PartiallyFilled,
    /// Fully executed.
    Filled,
    /// Done executing for the day.
    DoneForDay,
    /// Canceled (for IOC orders: the unfilled remainder was dropped).
    Canceled,
    /// Expired by time in force.
    Expired,
    /// Replaced by another order.
    Replaced,
    /// Cancel requested, not yet confirmed.
    PendingCancel,
    /// Replace requested, not yet confirmed.
    PendingReplace,
    /// Rejected by the broker or exchange.
    Rejected,
    /// Suspended from trading.
    Suspended,
    /// Stopped, execution guaranteed at a later time.
    Stopped,
    /// Fill complete, settlement calculation pending.
    Calculated,
    /// Status string not recognized.
    Unknown,
}

impl OrderStatus {
    /// Parse the broker's status string. Case-insensitive.
    #[must_use]
    pub fn parse(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "new" => Self::New,
            "pending_new" => Self::PendingNew,
            "accepted" | "accepted_for_bidding" => Self::Accepted,
            "partially_filled" => Self::PartiallyFilled,
            "filled" => Self::Filled,
            "done_for_day" => Self::DoneForDay,
            "canceled" => Self::Canceled,
            "expired" => Self::Expired,
            "replaced" => Self::Replaced,
            "pending_cancel" => Self::PendingCancel,
            "pending_replace" => Self::PendingReplace,
            "rejected" => Self::Rejected,
            "suspended" => Self::Suspended,
            "stopped" => Self::Stopped,
            "calculated" => Self::Calculated,
            _ => Self::Unknown,
        }
    }

    /// Collapse into the phase the poll loop acts on.
    ///
    /// Only `filled` and `canceled` end polling. Treating another status as
    /// terminal (e.g. `rejected`) must be added here explicitly.
    #[must_use]
    pub const fn phase(&self) -> OrderPhase {
        match self {
            Self::Filled => OrderPhase::Terminal(TerminalState::Filled),
            Self::Canceled => OrderPhase::Terminal(TerminalState::Canceled),
            Self::New
            | Self::PendingNew
            | Self::Accepted
            | Self::PartiallyFilled
            | Self::DoneForDay
            | Self::Expired
            | Self::Replaced
            | Self::PendingCancel
            | Self::PendingReplace
            | Self::Rejected
            | Self::Suspended
            | Self::Stopped
            | Self::Calculated
            | Self::Unknown => OrderPhase::Pending,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::PendingNew => "pending_new",
            Self::Accepted => "accepted",
            Self::PartiallyFilled => "partially_filled",
            Self::Filled => "filled",
            Self::DoneForDay => "done_for_day",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
            Self::Replaced => "replaced",
            Self::PendingCancel => "pending_cancel",
            Self::PendingReplace => "pending_replace",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
            Self::Stopped => "stopped",
            Self::Calculated => "calculated",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// How an order ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalState {
    /// Executed; a fill price exists.
    Filled,
    /// Dropped by the broker; no fill price.
    Canceled,
}

/// Where an order is from the poll loop's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderPhase {
    /// No further transitions will happen.
    Terminal(TerminalState),
    /// Keep polling.
    Pending,
}

impl OrderPhase {
    /// Returns true once polling can stop.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}
