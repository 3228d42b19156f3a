//! Activity kinds, severities and the template catalog
//!
//! Every [`ActivityKind`] crosses a domain [`Subject`] with an action. The
//! catalog returned by [`ActivityKind::template`] is the single place where
//! the title, description pattern and default severity of each kind live.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ActivityError;

/// Display/aggregation level of an entry
///
/// Severity carries no control-flow meaning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// All severities, in ascending order
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Success,
        Severity::Warning,
        Severity::Error,
    ];

    /// Wire name of the severity
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ActivityError::invalid(format!("unknown severity: {s:?}")))
    }
}

/// Domain object an activity is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    User,
    Load,
    Driver,
    Shipper,
    Broker,
    Payment,
    Payout,
    Order,
    Bid,
    System,
}

impl Subject {
    /// Human-readable label used in titles and descriptions
    pub fn label(&self) -> &'static str {
        match self {
            Subject::User => "User",
            Subject::Load => "Load",
            Subject::Driver => "Driver",
            Subject::Shipper => "Shipper",
            Subject::Broker => "Broker",
            Subject::Payment => "Payment",
            Subject::Payout => "Payout",
            Subject::Order => "Order",
            Subject::Bid => "Bid",
            Subject::System => "System",
        }
    }

    /// Metadata key under which template-built events store the subject id
    pub fn metadata_key(&self) -> &'static str {
        match self {
            Subject::User => "userId",
            Subject::Load => "loadId",
            Subject::Driver => "driverId",
            Subject::Shipper => "shipperId",
            Subject::Broker => "brokerId",
            Subject::Payment => "paymentId",
            Subject::Payout => "payoutId",
            Subject::Order => "orderId",
            Subject::Bid => "bidId",
            Subject::System => "taskId",
        }
    }
}

/// Closed set of activity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    UserLogin,
    UserLogout,
    UserCreated,
    UserUpdated,
    UserDeleted,
    UserDeactivated,
    LoadCreated,
    LoadUpdated,
    LoadDeleted,
    DriverCreated,
    DriverUpdated,
    DriverDeleted,
    DriverDeactivated,
    ShipperCreated,
    ShipperUpdated,
    ShipperDeleted,
    ShipperDeactivated,
    BrokerCreated,
    BrokerUpdated,
    BrokerDeleted,
    BrokerDeactivated,
    PaymentProcessed,
    PayoutProcessed,
    OrderCreated,
    OrderUpdated,
    BidAccepted,
    SystemMaintenance,
}

/// Catalog row describing how an event of a given kind is rendered
///
/// `description` may contain the placeholders `{subject}` and `{actor}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub severity: Severity,
}

impl KindTemplate {
    const fn new(title: &'static str, description: &'static str, severity: Severity) -> Self {
        Self {
            title,
            description,
            severity,
        }
    }

    /// Fill the description placeholders
    pub fn render(&self, subject_id: &str, actor: &str) -> String {
        self.description
            .replace("{subject}", subject_id)
            .replace("{actor}", actor)
    }
}

impl ActivityKind {
    /// Every kind, in declaration order
    pub const ALL: [ActivityKind; 27] = [
        ActivityKind::UserLogin,
        ActivityKind::UserLogout,
        ActivityKind::UserCreated,
        ActivityKind::UserUpdated,
        ActivityKind::UserDeleted,
        ActivityKind::UserDeactivated,
        ActivityKind::LoadCreated,
        ActivityKind::LoadUpdated,
        ActivityKind::LoadDeleted,
        ActivityKind::DriverCreated,
        ActivityKind::DriverUpdated,
        ActivityKind::DriverDeleted,
        ActivityKind::DriverDeactivated,
        ActivityKind::ShipperCreated,
        ActivityKind::ShipperUpdated,
        ActivityKind::ShipperDeleted,
        ActivityKind::ShipperDeactivated,
        ActivityKind::BrokerCreated,
        ActivityKind::BrokerUpdated,
        ActivityKind::BrokerDeleted,
        ActivityKind::BrokerDeactivated,
        ActivityKind::PaymentProcessed,
        ActivityKind::PayoutProcessed,
        ActivityKind::OrderCreated,
        ActivityKind::OrderUpdated,
        ActivityKind::BidAccepted,
        ActivityKind::SystemMaintenance,
    ];

    /// Wire name of the kind, e.g. `"driver_deactivated"`
    pub fn as_str(&self) -> &'static str {
        use ActivityKind::*;
        match self {
            UserLogin => "user_login",
            UserLogout => "user_logout",
            UserCreated => "user_created",
            UserUpdated => "user_updated",
            UserDeleted => "user_deleted",
            UserDeactivated => "user_deactivated",
            LoadCreated => "load_created",
            LoadUpdated => "load_updated",
            LoadDeleted => "load_deleted",
            DriverCreated => "driver_created",
            DriverUpdated => "driver_updated",
            DriverDeleted => "driver_deleted",
            DriverDeactivated => "driver_deactivated",
            ShipperCreated => "shipper_created",
            ShipperUpdated => "shipper_updated",
            ShipperDeleted => "shipper_deleted",
            ShipperDeactivated => "shipper_deactivated",
            BrokerCreated => "broker_created",
            BrokerUpdated => "broker_updated",
            BrokerDeleted => "broker_deleted",
            BrokerDeactivated => "broker_deactivated",
            PaymentProcessed => "payment_processed",
            PayoutProcessed => "payout_processed",
            OrderCreated => "order_created",
            OrderUpdated => "order_updated",
            BidAccepted => "bid_accepted",
            SystemMaintenance => "system_maintenance",
        }
    }

    /// The domain object this kind is about
    pub fn subject(&self) -> Subject {
        use ActivityKind::*;
        match self {
            UserLogin | UserLogout | UserCreated | UserUpdated | UserDeleted | UserDeactivated => {
                Subject::User
            }
            LoadCreated | LoadUpdated | LoadDeleted => Subject::Load,
            DriverCreated | DriverUpdated | DriverDeleted | DriverDeactivated => Subject::Driver,
            ShipperCreated | ShipperUpdated | ShipperDeleted | ShipperDeactivated => {
                Subject::Shipper
            }
            BrokerCreated | BrokerUpdated | BrokerDeleted | BrokerDeactivated => Subject::Broker,
            PaymentProcessed => Subject::Payment,
            PayoutProcessed => Subject::Payout,
            OrderCreated | OrderUpdated => Subject::Order,
            BidAccepted => Subject::Bid,
            SystemMaintenance => Subject::System,
        }
    }

    /// Catalog row for this kind
    pub fn template(&self) -> KindTemplate {
        use ActivityKind::*;
        use Severity::*;
        match self {
            UserLogin => KindTemplate::new("User Login", "{actor} logged in", Success),
            UserLogout => KindTemplate::new("User Logout", "{actor} logged out", Info),
            UserCreated => KindTemplate::new(
                "User Created",
                "User {subject} was created by {actor}",
                Success,
            ),
            UserUpdated => KindTemplate::new(
                "User Updated",
                "User {subject} was updated by {actor}",
                Info,
            ),
            UserDeleted => KindTemplate::new(
                "User Deleted",
                "User {subject} was deleted by {actor}",
                Warning,
            ),
            UserDeactivated => KindTemplate::new(
                "User Deactivated",
                "User {subject} was deactivated by {actor}",
                Warning,
            ),
            LoadCreated => KindTemplate::new(
                "Load Created",
                "Load #{subject} was created by {actor}",
                Success,
            ),
            LoadUpdated => KindTemplate::new(
                "Load Updated",
                "Load #{subject} was updated by {actor}",
                Info,
            ),
            LoadDeleted => KindTemplate::new(
                "Load Deleted",
                "Load #{subject} was deleted by {actor}",
                Warning,
            ),
            DriverCreated => KindTemplate::new(
                "Driver Created",
                "Driver {subject} was added by {actor}",
                Success,
            ),
            DriverUpdated => KindTemplate::new(
                "Driver Updated",
                "Driver {subject} was updated by {actor}",
                Info,
            ),
            DriverDeleted => KindTemplate::new(
                "Driver Deleted",
                "Driver {subject} was deleted by {actor}",
                Warning,
            ),
            DriverDeactivated => KindTemplate::new(
                "Driver Deactivated",
                "Driver {subject} was deactivated by {actor}",
                Warning,
            ),
            ShipperCreated => KindTemplate::new(
                "Shipper Created",
                "Shipper {subject} was added by {actor}",
                Success,
            ),
            ShipperUpdated => KindTemplate::new(
                "Shipper Updated",
                "Shipper {subject} was updated by {actor}",
                Info,
            ),
            ShipperDeleted => KindTemplate::new(
                "Shipper Deleted",
                "Shipper {subject} was deleted by {actor}",
                Warning,
            ),
            ShipperDeactivated => KindTemplate::new(
                "Shipper Deactivated",
                "Shipper {subject} was deactivated by {actor}",
                Warning,
            ),
            BrokerCreated => KindTemplate::new(
                "Broker Created",
                "Broker {subject} was added by {actor}",
                Success,
            ),
            BrokerUpdated => KindTemplate::new(
                "Broker Updated",
                "Broker {subject} was updated by {actor}",
                Info,
            ),
            BrokerDeleted => KindTemplate::new(
                "Broker Deleted",
                "Broker {subject} was deleted by {actor}",
                Warning,
            ),
            BrokerDeactivated => KindTemplate::new(
                "Broker Deactivated",
                "Broker {subject} was deactivated by {actor}",
                Warning,
            ),
            PaymentProcessed => KindTemplate::new(
                "Payment Processed",
                "Payment {subject} was processed by {actor}",
                Success,
            ),
            PayoutProcessed => KindTemplate::new(
                "Payout Processed",
                "Payout {subject} was processed by {actor}",
                Success,
            ),
            OrderCreated => KindTemplate::new(
                "Order Created",
                "Order #{subject} was created by {actor}",
                Success,
            ),
            OrderUpdated => KindTemplate::new(
                "Order Updated",
                "Order #{subject} was updated by {actor}",
                Info,
            ),
            BidAccepted => KindTemplate::new(
                "Bid Accepted",
                "Bid {subject} was accepted by {actor}",
                Success,
            ),
            SystemMaintenance => KindTemplate::new(
                "System Maintenance",
                "Maintenance task {subject} was run by {actor}",
                Warning,
            ),
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        ActivityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ActivityError::invalid(format!("unknown activity kind: {s:?}")))
    }
}
