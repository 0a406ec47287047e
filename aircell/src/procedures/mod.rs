mod handler_api;
mod ng_setup;
mod ran_connection;
mod ue_procedures;

pub use handler_api::HandlerApi;
pub use ran_connection::RanConnectionHandler;
