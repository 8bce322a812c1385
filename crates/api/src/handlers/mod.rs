pub mod ai;
pub mod config;
pub mod progress;
pub mod roadmap;

use prep_core::error::CoreError;
use prep_core::user_config::is_valid_user_id;

use crate::error::AppError;

/// Path user ids are the owner's email address.
pub(crate) fn check_user_id(user_id: &str) -> Result<(), AppError> {
    if !is_valid_user_id(user_id) {
        return Err(AppError::Core(CoreError::Validation(
            "User ID must be a valid email address".into(),
        )));
    }
    Ok(())
}
