/// Render a numeric value the way the text formats store it.
///
/// Integral values keep one decimal place (`85.0`), everything else uses the
/// shortest representation that parses back to the same `f64` (`5.5`, `0.1`).
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
