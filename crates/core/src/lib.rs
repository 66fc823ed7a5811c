pub mod config;
pub mod edit;
pub mod effect;
pub mod format;
pub mod list;
pub mod navigation;
pub mod repository;
pub mod scope;
pub mod testing;
pub mod ticket;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    EditConfig, ListConfig, LoggingConfig,
};
pub use edit::{EditEffect, EditEvent, EditViewState, TicketEditReducer, ValidationError};
pub use effect::{effect_channel, EffectSender};
pub use list::{Criteria, ListEffect, ListEvent, ListItem, ListViewState, TicketListReducer};
pub use navigation::{weighbridge_sheets, Route, SheetNavigator, SheetState};
pub use repository::{StoreTicketRepository, TicketRepository, TicketStream};
pub use scope::TaskScope;
pub use ticket::{
    SortOrder, SqliteTicketStore, Ticket, TicketError, TicketFilter, TicketId, TicketRecord,
    TicketStore,
};
