use chrono::NaiveDate;

/// Date formats accepted for `{CURRENT_DATE}`.
pub const ACCEPTED_FORMATS: [&str; 2] = ["%m/%d/%Y", "%m-%d-%Y"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("Please enter a valid date. {0} is invalid")]
    Malformed(String),
}

/// Check a user supplied date string.
///
/// The string itself is what ends up in the form, so it is returned trimmed
/// but otherwise unchanged (`1/2/2025` stays `1/2/2025`).
pub fn validate_date(input: &str) -> Result<&str, DateError> {
    let trimmed = input.trim();
    if ACCEPTED_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(trimmed, fmt).is_ok())
    {
        Ok(trimmed)
    } else {
        Err(DateError::Malformed(trimmed.to_string()))
    }
}
