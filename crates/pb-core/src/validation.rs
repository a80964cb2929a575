//! Creation input checks.
//!
//! Input arrives as loosely typed JSON, so the checks work on
//! `serde_json::Value` and name the offending field on failure.

use crate::error::{AppError, Result};
use crate::models::NewPaste;
use serde_json::Value;

/// Largest float that still represents every integer below it exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Validates a creation body of the shape `{content, ttl_seconds?, max_views?}`.
///
/// A JSON `null` for an optional field counts as absent.
pub fn parse_new_paste(body: &Value, max_content_bytes: usize) -> Result<NewPaste> {
    let content = content(body.get("content"), max_content_bytes)?;
    let ttl_seconds = positive_integer("ttl_seconds", body.get("ttl_seconds"))?;
    let max_views = positive_integer("max_views", body.get("max_views"))?;

    Ok(NewPaste {
        content,
        ttl_seconds,
        max_views,
    })
}

fn content(raw: Option<&Value>, max_bytes: usize) -> Result<String> {
    match raw {
        Some(Value::String(text)) if !text.trim().is_empty() => {
            if text.len() > max_bytes {
                return Err(AppError::validation(
                    "content",
                    format!("content exceeds {max_bytes} bytes"),
                ));
            }
            Ok(text.clone())
        }
        _ => Err(AppError::validation(
            "content",
            "content must be a non-empty string",
        )),
    }
}

fn positive_integer(field: &'static str, raw: Option<&Value>) -> Result<Option<u64>> {
    let number = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number,
        Some(_) => {
            return Err(AppError::validation(field, "must be a positive integer"));
        }
    };

    let parsed = number.as_u64().or_else(|| {
        // `3.0` is an integer too.
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f > 0.0 && *f <= MAX_SAFE_INTEGER)
            .map(|f| f as u64)
    });

    match parsed {
        Some(value) if value >= 1 => Ok(Some(value)),
        _ => Err(AppError::validation(field, "must be a positive integer")),
    }
}
