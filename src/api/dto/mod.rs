//! Data Transfer Objects for REST request/response serialization.

pub mod common_dto;
pub mod record_dto;
pub mod transition_dto;

pub use common_dto::*;
pub use record_dto::*;
pub use transition_dto::*;
