use crate::error::{Error, Result};

/// Validates a port value and normalizes it to an integer.
///
/// Accepts numeric-looking strings and integers equivalently (the builder
/// stringifies before calling this). Ports must fall in 1..=65535.
pub fn validate_port(label: &str, value: &str) -> Result<u16> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidConfig(format!("{} cannot be blank", label)));
    }

    let port: i64 = trimmed.parse().map_err(|_| {
        Error::InvalidConfig(format!("{} must be a number, not '{}'", label, value))
    })?;

    if !(1..=65535).contains(&port) {
        return Err(Error::InvalidConfig(format!(
            "{} must be in range 1 to 65535, got {}",
            label, port
        )));
    }

    Ok(port as u16)
}

/// Validates the controller address.
///
/// The address is a DBus-style endpoint such as `tcp:host=::,port=5000` and
/// must be non-empty text containing at least one colon.
pub fn validate_controller_address(value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(Error::InvalidConfig(
            "controller address cannot be blank".to_string(),
        ));
    }

    if !value.contains(':') {
        return Err(Error::InvalidConfig(format!(
            "controller address must contain at least one colon, got '{}'",
            value
        )));
    }

    Ok(value.to_string())
}

/// Validates a named record file.
///
/// The name is passed to the server as `--record=<name>` and must be a bare
/// file name: non-empty and free of path separators.
pub fn validate_record_name(value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(Error::InvalidConfig(
            "record file name cannot be blank".to_string(),
        ));
    }

    if value.contains('/') {
        return Err(Error::InvalidConfig(format!(
            "record file name '{}' cannot contain path separators",
            value
        )));
    }

    Ok(value.to_string())
}
