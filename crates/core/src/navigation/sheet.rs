//! Modal bottom-sheet back stack.
//!
//! Entries move through [`SheetState`] as the host reports lifecycle changes
//! and animation completion:
//!
//! ```text
//! navigate        Started          pop_back_stack        on_hide_finished
//! ───────▶ Pushed ───────▶ Visible ──────────────▶ Hiding ────────────────▶ Popped
//!            ▲                │
//!            └──── Stopped ───┘
//! ```
//!
//! A pop is not committed when it is requested: the navigator only marks the
//! entry as hiding and hands back a [`HideRequest`]. The entry stays on the
//! back stack until the host reports that the hide animation finished, or the
//! user dismissed the sheet directly.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

/// Errors from sheet navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// No registered sheet matches the route.
    #[error("no sheet registered for route: {0}")]
    UnknownRoute(String),

    /// A sheet route pattern could not be parsed.
    #[error("invalid route pattern: {0}")]
    InvalidPattern(String),

    /// The entry is not on the back stack.
    #[error("back stack entry not found: {0}")]
    EntryNotFound(EntryId),

    #[error("back stack is empty")]
    EmptyBackStack,

    /// The entry is in the wrong state for the requested transition.
    #[error("invalid sheet state: expected {expected}, got {actual}")]
    InvalidState {
        expected: &'static str,
        actual: SheetState,
    },
}

/// Identifies one back stack entry for the lifetime of the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Presentation state of a sheet entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetState {
    /// On the back stack but not shown (not started yet, or stopped).
    Pushed,
    /// Shown and interactive.
    Visible,
    /// Hide animation running; the pop commits when it finishes.
    Hiding,
    /// Removed from the back stack.
    Popped,
}

impl SheetState {
    /// Whether the sheet is on screen.
    pub fn is_visible(&self) -> bool {
        matches!(self, SheetState::Visible | SheetState::Hiding)
    }
}

impl fmt::Display for SheetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SheetState::Pushed => "pushed",
            SheetState::Visible => "visible",
            SheetState::Hiding => "hiding",
            SheetState::Popped => "popped",
        };
        f.write_str(s)
    }
}

/// Host lifecycle signal for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Started,
    Stopped,
}

/// How a sheet may be presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetProperties {
    /// Open fully expanded instead of stopping half way.
    pub skip_partially_expanded: bool,
    /// Never settle in the hidden state while on the back stack.
    pub skip_hidden_state: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A route pattern like `edit/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, NavigationError> {
        let invalid = || NavigationError::InvalidPattern(pattern.to_string());

        let segments = pattern
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    return Err(invalid());
                }
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) if !name.is_empty() && !name.contains(['{', '}']) => {
                        Ok(Segment::Param(name.to_string()))
                    }
                    Some(_) => Err(invalid()),
                    None if segment.contains(['{', '}']) => Err(invalid()),
                    None => Ok(Segment::Literal(segment.to_string())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Arguments extracted from `route` when it matches.
    pub fn matches(&self, route: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = route.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut arguments = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    arguments.insert(name.clone(), part.to_string());
                }
                _ => return None,
            }
        }
        Some(arguments)
    }
}

/// A registered sheet.
#[derive(Debug, Clone)]
pub struct SheetDestination {
    pub pattern: RoutePattern,
    pub properties: SheetProperties,
}

/// One sheet on the back stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackStackEntry {
    pub id: EntryId,
    /// The concrete route, e.g. `edit/3`.
    pub route: String,
    /// The pattern it matched, e.g. `edit/{id}`.
    pub pattern: String,
    pub arguments: BTreeMap<String, String>,
    pub properties: SheetProperties,
    pub state: SheetState,
}

impl BackStackEntry {
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).map(String::as_str)
    }
}

/// Ask the host to run the hide animation for an entry, then call
/// [`SheetNavigator::on_hide_finished`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideRequest {
    pub entry: EntryId,
}

/// Back stack of modal sheets.
#[derive(Debug)]
pub struct SheetNavigator {
    destinations: Vec<SheetDestination>,
    entries: Vec<BackStackEntry>,
    next_id: u64,
    back_stack: watch::Sender<Vec<BackStackEntry>>,
}

impl Default for SheetNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetNavigator {
    pub fn new() -> Self {
        let (back_stack, _) = watch::channel(Vec::new());
        Self {
            destinations: Vec::new(),
            entries: Vec::new(),
            next_id: 1,
            back_stack,
        }
    }

    /// Register a sheet under a route pattern.
    pub fn register(
        &mut self,
        pattern: &str,
        properties: SheetProperties,
    ) -> Result<(), NavigationError> {
        let pattern = RoutePattern::parse(pattern)?;
        self.destinations.push(SheetDestination {
            pattern,
            properties,
        });
        Ok(())
    }

    pub fn destinations(&self) -> &[SheetDestination] {
        &self.destinations
    }

    /// Push a sheet for `route`. The entry starts out [`SheetState::Pushed`].
    pub fn navigate(&mut self, route: &str) -> Result<EntryId, NavigationError> {
        let (destination, arguments) = self
            .destinations
            .iter()
            .find_map(|d| d.pattern.matches(route).map(|args| (d, args)))
            .ok_or_else(|| NavigationError::UnknownRoute(route.to_string()))?;

        let id = EntryId(self.next_id);
        self.next_id += 1;

        self.entries.push(BackStackEntry {
            id,
            route: route.to_string(),
            pattern: destination.pattern.as_str().to_string(),
            arguments,
            properties: destination.properties,
            state: SheetState::Pushed,
        });
        debug!("Pushed sheet {} for route {}", id, route);
        self.publish();
        Ok(id)
    }

    /// Apply a host lifecycle change. Returns the entry's new state.
    ///
    /// Lifecycle changes do not interrupt a running hide.
    pub fn on_lifecycle(
        &mut self,
        id: EntryId,
        event: LifecycleEvent,
    ) -> Result<SheetState, NavigationError> {
        let entry = self.entry_mut(id)?;
        let next = match (entry.state, event) {
            (SheetState::Hiding, _) => SheetState::Hiding,
            (_, LifecycleEvent::Started) => SheetState::Visible,
            (_, LifecycleEvent::Stopped) => SheetState::Pushed,
        };

        if entry.state != next {
            entry.state = next;
            self.publish();
        }
        Ok(next)
    }

    /// Start popping the top sheet.
    ///
    /// The entry moves to [`SheetState::Hiding`] and stays on the back stack
    /// until [`on_hide_finished`](Self::on_hide_finished) is called.
    pub fn pop_back_stack(&mut self) -> Result<HideRequest, NavigationError> {
        let entry = self
            .entries
            .last_mut()
            .ok_or(NavigationError::EmptyBackStack)?;

        if entry.state == SheetState::Hiding {
            return Err(NavigationError::InvalidState {
                expected: "pushed or visible",
                actual: entry.state,
            });
        }

        entry.state = SheetState::Hiding;
        let request = HideRequest { entry: entry.id };
        debug!("Hiding sheet {}", entry.id);
        self.publish();
        Ok(request)
    }

    /// The hide animation for `id` finished; commit the pop.
    pub fn on_hide_finished(&mut self, id: EntryId) -> Result<BackStackEntry, NavigationError> {
        let state = self.entry_mut(id)?.state;
        if state != SheetState::Hiding {
            return Err(NavigationError::InvalidState {
                expected: "hiding",
                actual: state,
            });
        }
        self.remove(id)
    }

    /// The user dismissed the sheet directly; pop it without animating.
    pub fn dismiss(&mut self, id: EntryId) -> Result<BackStackEntry, NavigationError> {
        self.remove(id)
    }

    /// Entries from bottom to top.
    pub fn back_stack(&self) -> &[BackStackEntry] {
        &self.entries
    }

    pub fn top(&self) -> Option<&BackStackEntry> {
        self.entries.last()
    }

    pub fn entry(&self, id: EntryId) -> Option<&BackStackEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries currently on screen, including ones that are hiding.
    pub fn visible_entries(&self) -> Vec<&BackStackEntry> {
        self.entries
            .iter()
            .filter(|e| e.state.is_visible())
            .collect()
    }

    /// Observe the back stack.
    pub fn subscribe(&self) -> watch::Receiver<Vec<BackStackEntry>> {
        self.back_stack.subscribe()
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut BackStackEntry, NavigationError> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(NavigationError::EntryNotFound(id))
    }

    fn remove(&mut self, id: EntryId) -> Result<BackStackEntry, NavigationError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(NavigationError::EntryNotFound(id))?;

        let mut entry = self.entries.remove(index);
        entry.state = SheetState::Popped;
        debug!("Popped sheet {} ({})", entry.id, entry.route);
        self.publish();
        Ok(entry)
    }

    fn publish(&self) {
        self.back_stack.send_replace(self.entries.clone());
    }
}
