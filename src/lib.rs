pub mod app;
pub mod dispatch;
pub mod error;
pub mod gui;
pub mod layout;
pub mod logging;
pub mod notes;
pub mod overlay;
pub mod payload;
pub mod poller;
pub mod registry;
pub mod settings;
pub mod view;
pub mod visibility;

pub use app::AppRoot;
pub use error::{OverlayError, PollError, RenderError};
pub use overlay::{Opacity, OverlayWindow, WindowRole};
pub use payload::{Payload, SourceKind};
