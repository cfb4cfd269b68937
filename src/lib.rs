pub mod config;
pub mod layout;
pub mod limits;
pub mod model;
pub mod observability;
pub mod resolver;
pub mod store;
pub mod ticker;
pub mod time;
pub mod view;
