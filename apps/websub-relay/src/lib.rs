//! HTTP front end of the websub relay: the axum router the hub talks to and
//! the server loop around it.
pub mod http;
mod main_logic;
pub mod reqid;

pub use http::{AppState, build_router};
pub use main_logic::run;
