use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, VariantNames};
use utoipa::ToSchema;

/// Closed set of notification categories produced by the school backends.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    EnumString,
    VariantNames,
    Display,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Task,
    Submission,
    Grade,
    Forum,
    Event,
    System,
}

impl NotificationKind {
    /// Short heading used by the push and email templates.
    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::Task => "Nueva tarea",
            NotificationKind::Submission => "Entrega recibida",
            NotificationKind::Grade => "Calificación publicada",
            NotificationKind::Forum => "Actividad en el foro",
            NotificationKind::Event => "Evento del calendario",
            NotificationKind::System => "Aviso del sistema",
        }
    }
}

/// Severity of a notification. Governs which channels the coordinator
/// attempts, see `DeliveryPolicy`.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    EnumString,
    VariantNames,
    Display,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// One delivery transport.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    EnumString,
    VariantNames,
    Display,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationChannel {
    Realtime,
    Push,
    Whatsapp,
    Email,
}

impl NotificationChannel {
    /// Field name of the per-channel delivery flag on the notification
    /// document.
    pub fn delivered_field(&self) -> &'static str {
        match self {
            NotificationChannel::Realtime => "deliveredRealtime",
            NotificationChannel::Push => "deliveredPush",
            NotificationChannel::Whatsapp => "deliveredWhatsapp",
            NotificationChannel::Email => "deliveredEmail",
        }
    }
}

/// Entity types a notification may deep-link to.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    EnumString,
    VariantNames,
    Display,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReferenceModel {
    Task,
    Submission,
    Course,
    Module,
    User,
}

#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, EnumString, VariantNames, Display, PartialEq, Eq,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PushSubscriptionStatus {
    Active,
    Inactive,
}

#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    EnumString,
    VariantNames,
    Display,
    PartialEq,
    Eq,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    Docente,
    Padre,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn kind_round_trips_through_strings() {
        for raw in ["task", "submission", "grade", "forum", "event", "system"] {
            let kind = NotificationKind::from_str(raw).unwrap();
            assert_eq!(kind.to_string(), raw);
        }
        assert!(NotificationKind::from_str("payroll").is_err());
    }

    #[test]
    fn priority_ordering_follows_severity() {
        assert!(NotificationPriority::Low < NotificationPriority::Medium);
        assert!(NotificationPriority::Medium < NotificationPriority::High);
        assert!(NotificationPriority::High < NotificationPriority::Critical);
    }

    #[test]
    fn delivered_fields_are_distinct() {
        let fields = [
            NotificationChannel::Realtime.delivered_field(),
            NotificationChannel::Push.delivered_field(),
            NotificationChannel::Whatsapp.delivered_field(),
            NotificationChannel::Email.delivered_field(),
        ];
        let unique: std::collections::HashSet<_> = fields.iter().collect();
        assert_eq!(unique.len(), fields.len());
    }
}
