//! Core of the image mover: when a note moves inside a vault, the images it
//! embeds under `images/` follow it into an `images` folder next to its new
//! location.
//!
//! The crate never talks to a concrete host. Everything host-specific goes
//! through the traits in [`host`].

pub mod error;
pub mod host;
pub mod link_parser;
pub mod logger;
pub mod path_resolver;
pub mod plugin;
pub mod relocator;
pub mod rename_handler;
pub mod report;
pub mod settings;

pub use error::{HandlerError, LogError, RelocateError};
pub use host::{DataStore, Host, Notifier, RenameEvent, Vault, VaultFile};
pub use logger::Logger;
pub use plugin::{ImageMoverPlugin, Subscription};
pub use report::{FailureKind, MoveFailure, Relocation, RenameReport};
pub use settings::Settings;
