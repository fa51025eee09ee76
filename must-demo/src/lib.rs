//! Demo user service on must-core: handlers abort inline, one boundary answers.

pub mod cli;
pub mod logging;
pub mod store;
pub mod users;

pub use cli::Cli;
pub use logging::{init_logging, LogFormat};
pub use store::{StoreError, User, UserStore};
pub use users::UserApi;
