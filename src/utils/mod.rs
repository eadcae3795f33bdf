//! Small helpers shared by the service and API layers.

pub mod jwt;
pub mod password;
pub mod validate;
