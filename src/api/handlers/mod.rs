//! HTTP request handlers.

pub mod admin_handler;
pub mod appointment_handler;
pub mod auth_handler;
pub mod cascade_check_handler;
pub mod distributed_vaccine_handler;
pub mod notification_handler;
pub mod overview_handler;
pub mod personnel_handler;
pub mod pet_owner_handler;
pub mod pet_record_handler;
pub mod register_handler;
pub mod vaccination_record_handler;
pub mod vaccination_schedule_handler;
pub mod vaccine_inventory_handler;

pub use admin_handler::admin_routes;
pub use appointment_handler::appointment_routes;
pub use auth_handler::auth_routes;
pub use cascade_check_handler::cascade_check_routes;
pub use distributed_vaccine_handler::distributed_vaccine_routes;
pub use notification_handler::notification_routes;
pub use overview_handler::overview_routes;
pub use personnel_handler::personnel_routes;
pub use pet_owner_handler::pet_owner_routes;
pub use pet_record_handler::pet_record_routes;
pub use register_handler::register_routes;
pub use vaccination_record_handler::vaccination_record_routes;
pub use vaccination_schedule_handler::vaccination_schedule_routes;
pub use vaccine_inventory_handler::vaccine_inventory_routes;

use crate::errors::{AppError, AppResult};

/// Unwrap a parameter a `type` branch cannot do without.
pub(crate) fn required<T>(value: Option<T>, name: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::bad_request(format!("{} is required", name)))
}
