//! 业务服务模块

pub mod dispatcher;

pub use dispatcher::{DispatchError, Dispatcher};
