// RSVP domain types
//
// An RSVP is an attendee's reservation for one event. Each reservation gets
// an opaque ticket identifier, rendered as a QR code for entry verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// RSVP - one attendee reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Rsvp {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub ticket_id: String,
    pub created_at: DateTime<Utc>,
}

/// Generate a fresh opaque ticket identifier.
///
/// Random v4, not time-ordered v7: tickets are shown to attendees and must
/// not leak creation order.
pub fn new_ticket_id() -> String {
    Uuid::new_v4().to_string()
}

/// URL of a rendered QR code image for a ticket identifier
pub fn qr_image_url(ticket_id: &str) -> String {
    format!(
        "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data={}",
        urlencode(ticket_id)
    )
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
