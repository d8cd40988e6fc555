use crate::{error::ValidationError, model::Query};

/// Validate raw user input into a [`Query`].
///
/// Whitespace is trimmed; an empty result is rejected before anything
/// reaches the network.
pub fn submit_query(raw: &str) -> Result<Query, ValidationError> {
    let city = raw.trim();
    if city.is_empty() {
        return Err(ValidationError::Empty);
    }
    Ok(Query::new_unchecked(city.to_string()))
}
