//! Common regex patterns for identity document values.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Day, month, four-digit year with any run of separators in between
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b([0-9]{1,2})[\s/|.\-]*([0-9]{1,2})[\s/|.\-]*([0-9]{4})\b"
    ).unwrap();

    // Passport number: one uppercase letter followed by seven digits
    pub static ref PASSPORT_NUMBER: Regex = Regex::new(
        r"[A-Z][0-9]{7}"
    ).unwrap();

    // Citizen / identity card number: 9 or 12 digits
    pub static ref CITIZEN_NUMBER: Regex = Regex::new(
        r"\b[0-9]{9}(?:[0-9]{3})?\b"
    ).unwrap();

    // Driving license class: A-F with an optional digit
    pub static ref LICENSE_CLASS: Regex = Regex::new(
        r"\b[A-F][0-9]?\b"
    ).unwrap();
}
