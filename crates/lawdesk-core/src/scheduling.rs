//! Scheduling lookup payloads shared by the server's slots endpoint and the
//! chat client's booking flow.

use serde::{Deserialize, Serialize};

use crate::firm::FirmProfile;

/// How many event types are offered when no free/paid event is found.
pub const FALLBACK_OPTION_LIMIT: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeSummary {
    pub name: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub description: Option<String>,
    pub scheduling_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingOption {
    pub label: String,
    pub scheduling_url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    NotConfigured,
    NoEvents,
    UpstreamError,
}

/// Body of `GET /api/calendly-slots`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotsResponse {
    pub available: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventTypeSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<BookingOption>,
    /// True when `options` holds the first events rather than the free/paid
    /// consultation pair.
    #[serde(default)]
    pub fallback_options: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendly_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnavailableReason>,
}

impl SlotsResponse {
    pub fn unavailable(reason: UnavailableReason, firm: &FirmProfile) -> Self {
        let (message, calendly_url) = match reason {
            UnavailableReason::NotConfigured => (
                format!("Please call {} or use our online intake form", firm.phone),
                None,
            ),
            UnavailableReason::NoEvents => (
                format!("No consultation slots available. Please call {}", firm.phone),
                None,
            ),
            UnavailableReason::UpstreamError => (
                format!(
                    "Unable to fetch available times. Please call {} or use our online intake form",
                    firm.phone
                ),
                Some(firm.calendly_url.clone()),
            ),
        };

        Self {
            available: false,
            message,
            event_type: None,
            booking_url: None,
            instructions: None,
            options: Vec::new(),
            fallback_options: false,
            fallback_url: Some(firm.intake_form_url.clone()),
            calendly_url,
            reason: Some(reason),
        }
    }

    /// Build the available response from the account's active event types.
    /// Returns the `NoEvents` variant when the list is empty.
    pub fn from_events(events: &[EventTypeSummary], firm: &FirmProfile) -> Self {
        let Some(consultation) = pick_consultation(events) else {
            return Self::unavailable(UnavailableReason::NoEvents, firm);
        };
        let (options, fallback_options) = booking_options(events);

        Self {
            available: true,
            message: format!(
                "Schedule your {}-minute {}",
                consultation.duration, consultation.name
            ),
            event_type: Some(consultation.clone()),
            booking_url: Some(consultation.scheduling_url.clone()),
            instructions: Some(
                "Click the button below to view available times and book your consultation directly on Calendly."
                    .to_string(),
            ),
            options,
            fallback_options,
            fallback_url: None,
            calendly_url: None,
            reason: None,
        }
    }
}

/// First event named like a consultation or meeting, else the first event.
pub fn pick_consultation(events: &[EventTypeSummary]) -> Option<&EventTypeSummary> {
    events
        .iter()
        .find(|e| {
            let name = e.name.to_lowercase();
            name.contains("consultation") || name.contains("meeting")
        })
        .or_else(|| events.first())
}

/// The free and paid consultation links when present; otherwise the first
/// few events labelled with their duration. The flag reports the fallback.
pub fn booking_options(events: &[EventTypeSummary]) -> (Vec<BookingOption>, bool) {
    let find = |needle: &str| {
        events
            .iter()
            .find(|e| e.name.to_lowercase().contains(needle))
    };

    let named: Vec<BookingOption> = [find("free"), find("paid")]
        .into_iter()
        .flatten()
        .map(|e| BookingOption {
            label: e.name.clone(),
            scheduling_url: e.scheduling_url.clone(),
        })
        .collect();

    if !named.is_empty() {
        return (named, false);
    }

    let fallback = events
        .iter()
        .take(FALLBACK_OPTION_LIMIT)
        .map(|e| BookingOption {
            label: format!("{} ({} min)", e.name, e.duration),
            scheduling_url: e.scheduling_url.clone(),
        })
        .collect();
    (fallback, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, duration: u32) -> EventTypeSummary {
        EventTypeSummary {
            name: name.to_string(),
            duration,
            description: None,
            scheduling_url: format!("https://calendly.com/firm/{}", name.to_lowercase().replace(' ', "-")),
        }
    }

    #[test]
    fn consultation_event_is_preferred() {
        let events = vec![event("Intro Call", 15), event("Paid Consultation", 60)];
        assert_eq!(pick_consultation(&events).unwrap().name, "Paid Consultation");

        let events = vec![event("Intro Call", 15), event("Follow up", 30)];
        assert_eq!(pick_consultation(&events).unwrap().name, "Intro Call");
        assert!(pick_consultation(&[]).is_none());
    }

    #[test]
    fn free_and_paid_options_are_listed_in_that_order() {
        let events = vec![
            event("Paid Consultation", 60),
            event("Other", 30),
            event("Free Call", 15),
        ];
        let (options, fallback) = booking_options(&events);

        assert!(!fallback);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "Free Call");
        assert_eq!(options[1].label, "Paid Consultation");
    }

    #[test]
    fn fallback_lists_first_three_with_durations() {
        let events = vec![
            event("A", 10),
            event("B", 20),
            event("C", 30),
            event("D", 40),
        ];
        let (options, fallback) = booking_options(&events);

        assert!(fallback);
        assert_eq!(options.len(), 3);
        assert_eq!(options[2].label, "C (30 min)");
    }

    #[test]
    fn available_response_carries_message_and_booking_url() {
        let firm = FirmProfile::default();
        let response = SlotsResponse::from_events(&[event("Consultation", 30)], &firm);

        assert!(response.available);
        assert_eq!(response.message, "Schedule your 30-minute Consultation");
        assert_eq!(
            response.booking_url.as_deref(),
            Some("https://calendly.com/firm/consultation")
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["eventType"]["schedulingUrl"], "https://calendly.com/firm/consultation");
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn unavailable_responses_point_to_phone_and_intake_form() {
        let firm = FirmProfile::default();

        let missing = SlotsResponse::unavailable(UnavailableReason::NotConfigured, &firm);
        assert_eq!(
            missing.message,
            "Please call (510) 443-2123 or use our online intake form"
        );
        assert_eq!(missing.fallback_url.as_deref(), Some("/client-area/intake-form"));
        assert!(missing.calendly_url.is_none());

        let failed = SlotsResponse::unavailable(UnavailableReason::UpstreamError, &firm);
        assert_eq!(
            failed.calendly_url.as_deref(),
            Some("https://calendly.com/pritsinghlaw")
        );

        let empty = SlotsResponse::from_events(&[], &firm);
        assert_eq!(empty.reason, Some(UnavailableReason::NoEvents));
    }
}
