//! Response shaping for the issue API.
//!
//! These types are the JSON the HTTP boundary emits:
//! - [`TicketView`] - a ticket with its identifier under `_id`
//! - [`MutationResult`] - `{result, _id}` acknowledgement for update/delete

mod output;

pub use output::{MutationResult, TicketView};
