use std::fmt;
use std::str::FromStr;

use super::sheet::{BackStackEntry, NavigationError, SheetNavigator, SheetProperties};
use crate::list::ListEffect;
use crate::ticket::TicketId;

const MAIN: &str = "main";
const CREATE: &str = "add";
const EDIT_PATTERN: &str = "edit/{id}";

/// Screens of the weighbridge app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The ticket list.
    Main,
    /// Empty ticket form, shown as a sheet.
    Create,
    /// Form for an existing ticket, shown as a sheet.
    Edit(TicketId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Main => MAIN.to_string(),
            Route::Create => CREATE.to_string(),
            Route::Edit(id) => format!("edit/{}", id),
        }
    }

    /// Whether the route is presented as a bottom sheet.
    pub fn is_sheet(&self) -> bool {
        !matches!(self, Route::Main)
    }

    /// Ticket the form should open, [`TicketId::NEW`] for the create form.
    pub fn ticket_id(&self) -> Option<TicketId> {
        match self {
            Route::Main => None,
            Route::Create => Some(TicketId::NEW),
            Route::Edit(id) => Some(*id),
        }
    }

    /// Where a list effect leads, if anywhere.
    pub fn for_effect(effect: &ListEffect) -> Option<Route> {
        match effect {
            ListEffect::NavigateToCreate => Some(Route::Create),
            ListEffect::NavigateToEdit(id) => Some(Route::Edit(*id)),
            ListEffect::DeleteFailed { .. } => None,
        }
    }

    /// The route a sheet entry was opened for.
    pub fn from_entry(entry: &BackStackEntry) -> Result<Route, NavigationError> {
        entry.route.parse()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = NavigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MAIN => Ok(Route::Main),
            CREATE => Ok(Route::Create),
            _ => s
                .strip_prefix("edit/")
                .and_then(|id| id.parse::<i64>().ok())
                .filter(|id| *id > 0)
                .map(|id| Route::Edit(TicketId(id)))
                .ok_or_else(|| NavigationError::UnknownRoute(s.to_string())),
        }
    }
}

/// Navigator with the weighbridge ticket sheets registered.
///
/// Both sheets open fully expanded.
pub fn weighbridge_sheets() -> SheetNavigator {
    let properties = SheetProperties {
        skip_partially_expanded: true,
        skip_hidden_state: false,
    };

    let mut navigator = SheetNavigator::new();
    for pattern in [CREATE, EDIT_PATTERN] {
        if let Err(e) = navigator.register(pattern, properties) {
            tracing::error!("Failed to register sheet {}: {}", pattern, e);
        }
    }
    navigator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::LifecycleEvent;

    #[test]
    fn test_paths_round_trip() {
        for route in [Route::Main, Route::Create, Route::Edit(TicketId(12))] {
            assert_eq!(route.path().parse::<Route>(), Ok(route));
        }
        assert_eq!(Route::Edit(TicketId(12)).to_string(), "edit/12");
    }

    #[test]
    fn test_parse_rejects_bad_routes() {
        assert!("edit/abc".parse::<Route>().is_err());
        assert!("edit/0".parse::<Route>().is_err());
        assert!("settings".parse::<Route>().is_err());
    }

    #[test]
    fn test_route_for_effect() {
        assert_eq!(
            Route::for_effect(&ListEffect::NavigateToCreate),
            Some(Route::Create)
        );
        assert_eq!(
            Route::for_effect(&ListEffect::NavigateToEdit(TicketId(3))),
            Some(Route::Edit(TicketId(3)))
        );
        assert_eq!(
            Route::for_effect(&ListEffect::DeleteFailed {
                id: TicketId(3),
                message: "locked".to_string(),
            }),
            None
        );
    }

    #[test]
    fn test_ticket_id_for_form() {
        assert_eq!(Route::Create.ticket_id(), Some(TicketId::NEW));
        assert_eq!(Route::Edit(TicketId(5)).ticket_id(), Some(TicketId(5)));
        assert_eq!(Route::Main.ticket_id(), None);
        assert!(!Route::Main.is_sheet());
    }

    #[test]
    fn test_weighbridge_sheets() {
        let mut navigator = weighbridge_sheets();
        assert_eq!(navigator.destinations().len(), 2);

        let id = navigator.navigate(&Route::Edit(TicketId(4)).path()).unwrap();
        navigator.on_lifecycle(id, LifecycleEvent::Started).unwrap();

        let entry = navigator.top().unwrap();
        assert!(entry.properties.skip_partially_expanded);
        assert_eq!(entry.argument("id"), Some("4"));
        assert_eq!(Route::from_entry(entry), Ok(Route::Edit(TicketId(4))));

        assert!(navigator.navigate(&Route::Main.path()).is_err());
    }
}
