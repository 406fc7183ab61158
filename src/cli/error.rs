// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing tasks, rejected changes, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exit with an internal error (exit code 2)
/// Internal errors are for unexpected failures such as unwritable storage
pub fn internal_error(message: &str) -> ! {
    eprintln!("Internal error: {}", message);
    process::exit(2);
}

/// Validate that an id is a positive integer
pub fn validate_id(id_str: &str, kind: &str) -> Result<i64, String> {
    id_str
        .parse::<i64>()
        .map_err(|_| format!("Invalid {} ID: '{}'. {} ID must be a number.", kind, id_str, capitalize(kind)))
        .and_then(|id| {
            if id > 0 {
                Ok(id)
            } else {
                Err(format!("Invalid {} ID: {}. {} ID must be positive.", kind, id, capitalize(kind)))
            }
        })
}

/// Validate a task id, exiting with a user error when it is malformed
pub fn task_id_or_exit(id_str: &str) -> i64 {
    validate_id(id_str, "task").unwrap_or_else(|e| user_error(&e))
}

/// Validate a timeslot id, exiting with a user error when it is malformed
pub fn timeslot_id_or_exit(id_str: &str) -> i64 {
    validate_id(id_str, "timeslot").unwrap_or_else(|e| user_error(&e))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
