//! Client core for the therapy desk: backend access, the owned view state and
//! the view model frontends render from it.

pub mod driver;
pub mod error;
pub mod mood;
pub mod report;
pub mod settings;
pub mod state;
pub mod transport;
pub mod view;

pub use driver::EffectRunner;
pub use error::ClientError;
pub use report::{MoodTrend, SessionReport};
pub use settings::{ClientSettings, SettingsError};
pub use state::{Action, AppState, Effect, Screen};
pub use transport::{HttpTherapyApi, TherapyApi};
pub use view::ViewModel;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
