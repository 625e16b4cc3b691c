// src/facade/validation.rs - Document input checks before the NFC/selfie steps
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ValidationError;

pub const INPUT_DATE_FORMAT: &str = "%d.%m.%Y";
pub const CHIP_DATE_FORMAT: &str = "%y%m%d";

fn serial_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{2}[0-9]{7}$").expect("serial pattern is valid"))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), INPUT_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidFormat(format!("bad date '{value}'")))
}

/// `dd.MM.yyyy` to the `yyMMdd` form the chip reader expects.
pub fn to_chip_date(value: &str) -> Result<String, ValidationError> {
    Ok(parse_date(value)?.format(CHIP_DATE_FORMAT).to_string())
}

pub fn validate_passport_info(
    serial_number: &str,
    birth_date: &str,
    date_of_expiry: &str,
) -> Result<(), ValidationError> {
    if serial_number.is_empty() || birth_date.is_empty() || date_of_expiry.is_empty() {
        return Err(ValidationError::Empty);
    }

    if !serial_pattern().is_match(serial_number) {
        return Err(ValidationError::InvalidFormat(format!(
            "bad serial number '{serial_number}'"
        )));
    }

    let birth = parse_date(birth_date)?;
    let expiry = parse_date(date_of_expiry)?;
    if expiry <= birth {
        return Err(ValidationError::InvalidFormat(
            "expiry date is not after birth date".to_string(),
        ));
    }

    Ok(())
}
