//! `tickets-lib` - Project-scoped ticket store.
//!
//! Provides a standalone API for persisting issue tickets grouped by a
//! `project` partition key. Data lives in memory and is optionally
//! persisted as JSONL.
//!
//! # Quick Start
//!
//! ```no_run
//! use tickets_lib::{NewTicket, SharedStore, TicketFilter, TicketPatch, TicketStore};
//!
//! // Load (or create) a collection file
//! let store = SharedStore::open("data/tickets.jsonl").unwrap();
//!
//! // Create
//! let ticket = store
//!     .insert(NewTicket {
//!         project: "apitest".into(),
//!         issue_title: "Broken link".into(),
//!         issue_text: "The footer link 404s".into(),
//!         created_by: "alice".into(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! // Query
//! let open = store.find(&TicketFilter::project("apitest").with_field("open", "true")).unwrap();
//!
//! // Partial update
//! let patch = TicketPatch { open: Some(false), ..Default::default() };
//! store.update_one(&TicketFilter::scoped("apitest", &ticket.id), &patch).unwrap();
//! ```

pub mod error;
pub mod jsonl;
pub mod model;
pub mod query;
pub mod store;
pub mod util;

pub use error::{Result, TicketError};
pub use model::{NewTicket, Ticket};
pub use query::{TicketFilter, TicketPatch};
pub use store::{InMemoryStore, SharedStore, TicketStore};
