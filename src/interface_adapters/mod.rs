// Interface adapters: wire protocol, HTTP client, session storage and wiring.

pub mod clients;
pub mod navigation;
pub mod protocol;
pub mod session_store;
pub mod state;
