pub mod auth;
pub mod files;
pub mod responses;
pub mod router;
pub mod state;
pub mod storage;
pub mod uploads;

pub use auth::SESSION_COOKIE;
pub use responses::json_error;
pub use state::AppState;
