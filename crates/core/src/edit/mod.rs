//! Create/edit ticket form.

mod reducer;
mod types;
mod validation;

pub use reducer::TicketEditReducer;
pub use types::{EditEffect, EditEvent, EditViewState};
pub use validation::{validate_required, RequiredField, ValidationError};
