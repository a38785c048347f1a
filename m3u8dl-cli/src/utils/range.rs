use crate::error::AppError;

/// Parse a segment range written as `a..b`.
///
/// An empty `a` starts at 0 and an empty `b` runs to the end of the playlist.
pub fn parse_range(value: &str) -> Result<(f64, f64), AppError> {
    let Some((from, to)) = value.trim().split_once("..") else {
        return Err(AppError::ParseError(format!(
            "Invalid range '{value}': expected <a>..<b>"
        )));
    };

    let from = parse_bound(from, 0.0)?;
    let to = parse_bound(to, f64::INFINITY)?;
    Ok((from, to))
}

fn parse_bound(bound: &str, empty: f64) -> Result<f64, AppError> {
    let bound = bound.trim();
    if bound.is_empty() {
        return Ok(empty);
    }
    bound
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .ok_or_else(|| AppError::ParseError(format!("Invalid range bound '{bound}'")))
}
