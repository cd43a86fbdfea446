pub mod commands;
pub mod events;
pub mod parse;
pub mod presets;
pub mod session;

pub use commands::{Command, Operation};
pub use events::{EventBus, Observer, ObserverError, SubscriptionId};
pub use parse::{ParseError, parse_operation, parse_point};
pub use session::Session;
