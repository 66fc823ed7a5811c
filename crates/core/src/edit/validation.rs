use std::fmt;

use thiserror::Error;

/// Form fields that must be filled in before a ticket can be saved.
///
/// Declaration order is the order fields are listed in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequiredField {
    DriverName,
    LicenceNumber,
    InboundWeight,
    OutboundWeight,
}

impl RequiredField {
    pub const ALL: [RequiredField; 4] = [
        RequiredField::DriverName,
        RequiredField::LicenceNumber,
        RequiredField::InboundWeight,
        RequiredField::OutboundWeight,
    ];

    /// Label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            RequiredField::DriverName => "Driver Name",
            RequiredField::LicenceNumber => "Licence Number",
            RequiredField::InboundWeight => "Inbound Weight",
            RequiredField::OutboundWeight => "Outbound Weight",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One or more required fields were left blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} is required", join_labels(.missing))]
pub struct ValidationError {
    missing: Vec<RequiredField>,
}

impl ValidationError {
    /// Blank fields, in form order.
    pub fn missing(&self) -> &[RequiredField] {
        &self.missing
    }
}

fn join_labels(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(RequiredField::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that none of the given field values is blank.
///
/// Whitespace-only input counts as blank. Values are paired with
/// [`RequiredField::ALL`] by position.
pub fn validate_required(values: [&str; 4]) -> Result<(), ValidationError> {
    let missing: Vec<RequiredField> = RequiredField::ALL
        .into_iter()
        .zip(values)
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_blank_lists_every_field() {
        let err = validate_required(["", "", "", ""]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Driver Name, Licence Number, Inbound Weight, Outbound Weight is required"
        );
        assert_eq!(err.missing(), &RequiredField::ALL);
    }

    #[test]
    fn test_single_missing_field() {
        let err = validate_required(["Budi", "B 1", "  ", "150"]).unwrap_err();
        assert_eq!(err.to_string(), "Inbound Weight is required");
    }

    #[test]
    fn test_missing_fields_keep_form_order() {
        let err = validate_required(["", "B 1", "100", ""]).unwrap_err();
        assert_eq!(err.to_string(), "Driver Name, Outbound Weight is required");
    }

    #[test]
    fn test_complete_form_is_valid() {
        assert!(validate_required(["Test", "B1", "100", "150"]).is_ok());
    }
}
