//! Handlers 模块

pub mod audit;
pub mod auth;
pub mod barrier;
pub mod clients;
pub mod devices;
pub mod metrics;
pub mod plans;
pub mod sites;
pub mod trips;
pub mod users;
pub mod vendors;

pub use audit::*;
pub use auth::*;
pub use barrier::*;
pub use clients::*;
pub use devices::*;
pub use metrics::*;
pub use plans::*;
pub use sites::*;
pub use trips::*;
pub use users::*;
pub use vendors::*;
