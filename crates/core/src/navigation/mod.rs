//! Screen routes and the bottom-sheet back stack.

mod route;
mod sheet;

pub use route::{weighbridge_sheets, Route};
pub use sheet::{
    BackStackEntry, EntryId, HideRequest, LifecycleEvent, NavigationError, RoutePattern,
    SheetDestination, SheetNavigator, SheetProperties, SheetState,
};
