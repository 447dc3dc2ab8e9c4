pub mod command;
pub mod flow;
pub mod parser;
pub mod poller;
pub mod store;
