//! Ticket list screen state.
//!
//! [`TicketListReducer`] turns search and sort input into repository queries
//! and publishes the latest result as a [`ListViewState`].

mod reducer;
mod types;

pub use reducer::TicketListReducer;
pub use types::{Criteria, ListEffect, ListEvent, ListItem, ListViewState};
