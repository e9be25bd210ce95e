use std::time::Duration;

use crate::error::ConfigError;

/// Parses durations such as `500ms`, `30s`, `2m`, `1h`, or compound forms like
/// `1m30s`. A bare number is read as seconds. Zero is allowed.
///
/// # Errors
///
/// Returns an error for empty input, unknown units, or overflow.
pub fn parse_duration_value(input: &str) -> Result<Duration, ConfigError> {
    let value = input.trim();
    if value.is_empty() {
        return Err(ConfigError::DurationEmpty);
    }

    let mut total = Duration::ZERO;
    let mut rest = value;
    while !rest.is_empty() {
        let digits_len = rest.chars().take_while(char::is_ascii_digit).count();
        if digits_len == 0 {
            return Err(ConfigError::InvalidDurationFormat {
                value: value.to_owned(),
            });
        }
        let (num_part, after_num) = rest.split_at(digits_len);
        let number: u64 = num_part
            .parse()
            .map_err(|err| ConfigError::InvalidDurationNumber {
                value: value.to_owned(),
                source: err,
            })?;

        let unit_len = after_num
            .chars()
            .take_while(char::is_ascii_alphabetic)
            .count();
        let (unit_part, remaining) = after_num.split_at(unit_len);
        let unit = if unit_part.is_empty() { "s" } else { unit_part };
        let part = match unit {
            "ms" => Duration::from_millis(number),
            "s" => Duration::from_secs(number),
            "m" => Duration::from_secs(
                number
                    .checked_mul(60)
                    .ok_or(ConfigError::DurationOverflow)?,
            ),
            "h" => Duration::from_secs(
                number
                    .checked_mul(60)
                    .and_then(|minutes| minutes.checked_mul(60))
                    .ok_or(ConfigError::DurationOverflow)?,
            ),
            _ => {
                return Err(ConfigError::InvalidDurationUnit {
                    unit: unit.to_owned(),
                });
            }
        };
        total = total
            .checked_add(part)
            .ok_or(ConfigError::DurationOverflow)?;
        rest = remaining;
    }

    Ok(total)
}
