//! Shape validation of request bodies.

use content_manager_sdk::BulkDeleteInput;

use super::error::DomainError;

/// Check a bulk delete body before any permission work happens.
///
/// # Errors
///
/// - [`DomainError::Validation`] if `ids` is empty or longer than `max_ids`
pub fn validate_bulk_delete(input: &BulkDeleteInput, max_ids: usize) -> Result<(), DomainError> {
    if input.ids.is_empty() {
        return Err(DomainError::validation(
            "ids",
            "must contain at least one id",
        ));
    }
    if input.ids.len() > max_ids {
        return Err(DomainError::validation(
            "ids",
            format!("must contain at most {max_ids} ids, got {}", input.ids.len()),
        ));
    }
    Ok(())
}
