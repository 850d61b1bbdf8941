//! The fixed catalogue of charted metrics.

use super::diagnostics::SentinelPolicy;

/// How a chart's y axis is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisScale {
    /// Fit the data with a margin; used where values sit far from zero (offsets, RTT).
    Centered,
    /// Start the axis at zero; used for rates, counts and lags.
    FromZero,
    /// Fixed DOWN/INIT/UP levels.
    States,
}

/// How consecutive points are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStyle {
    Line,
    /// Hold each value until the next sample.
    Steps,
}

/// Per-broker metrics, in chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BrokerMetric {
    RoundTrip,
    TxRate,
    RxRate,
    Connects,
    Disconnects,
    Throttle,
    ReceiveErrors,
    SendErrors,
    RequestTimeouts,
    State,
}

impl BrokerMetric {
    pub const ALL: [BrokerMetric; 10] = [
        BrokerMetric::RoundTrip,
        BrokerMetric::TxRate,
        BrokerMetric::RxRate,
        BrokerMetric::Connects,
        BrokerMetric::Disconnects,
        BrokerMetric::Throttle,
        BrokerMetric::ReceiveErrors,
        BrokerMetric::SendErrors,
        BrokerMetric::RequestTimeouts,
        BrokerMetric::State,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            BrokerMetric::RoundTrip => "Broker RTT",
            BrokerMetric::TxRate => "Broker Data Rate (TX)",
            BrokerMetric::RxRate => "Broker Data Rate (RX)",
            BrokerMetric::Connects => "Broker Connections",
            BrokerMetric::Disconnects => "Broker Disconnections",
            BrokerMetric::Throttle => "Broker Throttle Time",
            BrokerMetric::ReceiveErrors => "Broker Receive Errors",
            BrokerMetric::SendErrors => "Broker Transmit Errors",
            BrokerMetric::RequestTimeouts => "Broker Request Timeouts",
            BrokerMetric::State => "Broker State",
        }
    }

    pub fn y_label(&self) -> &'static str {
        match self {
            BrokerMetric::RoundTrip => "RTT (ms)",
            BrokerMetric::TxRate | BrokerMetric::RxRate => "MiB/s",
            BrokerMetric::Connects | BrokerMetric::Disconnects => "Count",
            BrokerMetric::Throttle => "Throttle (ms)",
            BrokerMetric::ReceiveErrors | BrokerMetric::SendErrors => "Cumulative Errors",
            BrokerMetric::RequestTimeouts => "Cumulative Timeouts",
            BrokerMetric::State => "State",
        }
    }

    pub fn axis(&self) -> AxisScale {
        match self {
            BrokerMetric::RoundTrip => AxisScale::Centered,
            BrokerMetric::State => AxisScale::States,
            _ => AxisScale::FromZero,
        }
    }

    pub fn draw_style(&self) -> DrawStyle {
        match self {
            BrokerMetric::State => DrawStyle::Steps,
            _ => DrawStyle::Line,
        }
    }

    /// Whether axis labels should be whole numbers.
    pub fn integer_valued(&self) -> bool {
        matches!(
            self,
            BrokerMetric::Connects
                | BrokerMetric::Disconnects
                | BrokerMetric::ReceiveErrors
                | BrokerMetric::SendErrors
                | BrokerMetric::RequestTimeouts
                | BrokerMetric::State
        )
    }

    /// Broker values are never sentinels: `-1` is a legitimate DOWN state.
    pub fn sentinel_policy(&self) -> SentinelPolicy {
        SentinelPolicy::None
    }
}

/// Per-partition consumer metrics, in chart order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartitionMetric {
    CommittedOffset,
    StoredOffset,
    CommittedLeaderEpoch,
    ConsumerLag,
    StoredConsumerLag,
}

impl PartitionMetric {
    pub const ALL: [PartitionMetric; 5] = [
        PartitionMetric::CommittedOffset,
        PartitionMetric::StoredOffset,
        PartitionMetric::CommittedLeaderEpoch,
        PartitionMetric::ConsumerLag,
        PartitionMetric::StoredConsumerLag,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            PartitionMetric::CommittedOffset => "Committed Offset",
            PartitionMetric::StoredOffset => "Stored Offset",
            PartitionMetric::CommittedLeaderEpoch => "Committed Leader Epoch",
            PartitionMetric::ConsumerLag => "Consumer Lag",
            PartitionMetric::StoredConsumerLag => "Stored Consumer Lag",
        }
    }

    pub fn y_label(&self) -> &'static str {
        match self {
            PartitionMetric::CommittedOffset | PartitionMetric::StoredOffset => "Offset",
            PartitionMetric::CommittedLeaderEpoch => "Epoch",
            PartitionMetric::ConsumerLag | PartitionMetric::StoredConsumerLag => {
                "Lag (Messages)"
            }
        }
    }

    pub fn axis(&self) -> AxisScale {
        match self {
            PartitionMetric::CommittedOffset
            | PartitionMetric::StoredOffset
            | PartitionMetric::CommittedLeaderEpoch => AxisScale::Centered,
            PartitionMetric::ConsumerLag | PartitionMetric::StoredConsumerLag => {
                AxisScale::FromZero
            }
        }
    }

    pub fn draw_style(&self) -> DrawStyle {
        DrawStyle::Line
    }

    pub fn integer_valued(&self) -> bool {
        true
    }

    pub fn sentinel_policy(&self) -> SentinelPolicy {
        SentinelPolicy::Reserved
    }
}
