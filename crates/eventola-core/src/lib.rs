// Eventola Domain Core
//
// DB-agnostic domain types and logic shared by the API server and the
// provisioning binary.
//
// Key design decisions:
// - Entity types (Event, Rsvp) are defined here, typed once instead of the
//   loosely-shaped documents the hosted backend used to hand out
// - Form validation happens at the boundary via EventForm/RsvpForm and
//   produces field-level errors the UI can render inline
// - Copy generation is behind the CopyWriter trait so providers stay
//   pluggable; prompt templates live next to the trait
// - Bucket policies (size caps, allowed extensions) are constants here and
//   enforced at upload time

pub mod buckets;
pub mod copy;
pub mod error;
pub mod event;
pub mod rsvp;
pub mod validate;

// Re-exports for convenience
pub use buckets::{BucketPolicy, BUCKET_COVERS, BUCKET_LOGOS};
pub use copy::{CopyConfig, CopyWriter};
pub use error::{EventolaError, Result};
pub use event::{slugify, Event, EventStatus, Theme};
pub use rsvp::{new_ticket_id, qr_image_url, Rsvp};
pub use validate::{EventForm, FieldError, RsvpForm};
