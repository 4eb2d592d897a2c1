use crate::models::form::FormState;
use crate::models::request::BacktestRequest;

/// Turns the form the user filled in into the request the backend expects.
///
/// Numbers are read the way a browser reads form input: leading whitespace
/// is skipped and the longest numeric prefix wins, so `"5 years"` becomes 5.
/// Nothing is validated here. Text without a numeric prefix becomes `None`
/// and is sent as `null`.
pub struct RequestService;

impl RequestService {
    pub fn new() -> Self {
        Self
    }

    /// Snapshot the form into a fresh request. The form is not touched.
    #[must_use]
    pub fn build_request(&self, form: &FormState) -> BacktestRequest {
        BacktestRequest {
            method: form.method.clone(),
            years: parse_int_prefix(&form.years),
            tickers: form.tickers.clone(),
            initial_investment: parse_float_prefix(&form.initial_investment),
        }
    }
}

impl Default for RequestService {
    fn default() -> Self {
        Self::new()
    }
}

/// Base-10 integer from the start of `text`.
///
/// Returns `None` when there is no digit to read, or when the digits do not
/// fit in an `i64`.
#[must_use]
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, rest) = split_sign(s);
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Decimal number from the start of `text`.
///
/// Accepts `[sign] digits [. digits] [e [sign] digits]` with at least one
/// mantissa digit. `Infinity` reads as infinite, which has no JSON form, so
/// it is reported as `None` like any other non-number.
#[must_use]
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let (_, unsigned) = split_sign(s);
    let sign_len = s.len() - unsigned.len();

    if unsigned.starts_with("Infinity") {
        return None;
    }

    let bytes = unsigned.as_bytes();
    let mut end = 0;
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    let value: f64 = s[..sign_len + end].parse().ok()?;
    value.is_finite().then_some(value)
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
