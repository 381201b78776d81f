//! The report-path parameter: `base?/Folder/Report&key=value`.
//!
//! The reporting dialect carries the report's logical path as a bare first
//! query token. The server wants that token's `/` separators escaped even
//! though the rest of the query is not, so the path is encoded per segment.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use reportframe_core::AddressError;

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Separator the server expects between encoded path segments.
pub const ENCODED_SEPARATOR: &str = "%2f";

/// Split a query into its report-path token (if any) and the ordinary rest.
///
/// The first `&`-delimited token is a report path when it starts with `/`,
/// literally or once percent-decoded (a previously composed address).
pub fn split_report_path(query: &str) -> (Option<&str>, &str) {
    let first = query.split('&').next().unwrap_or_default();
    if !is_report_path(first) {
        return (None, query);
    }

    let rest = &query[first.len()..];
    (Some(first), rest.strip_prefix('&').unwrap_or(rest))
}

fn is_report_path(token: &str) -> bool {
    token.starts_with('/') || percent_decode_str(token).decode_utf8_lossy().starts_with('/')
}

/// Encode a report path token segment by segment.
///
/// The token is decoded first so already-escaped segments are not escaped
/// twice: `/Sales/Q1%20Report` and `%2fSales%2fQ1%20Report` both become
/// `%2fSales%2fQ1%20Report`.
pub fn encode_report_path(token: &str) -> Result<String, AddressError> {
    let decoded = percent_decode_str(token)
        .decode_utf8()
        .map_err(|e| AddressError::UndecodablePath(e.to_string()))?;

    let segments: Vec<String> = decoded
        .split('/')
        .map(|segment| {
            if segment.is_empty() {
                String::new()
            } else {
                utf8_percent_encode(segment, COMPONENT).to_string()
            }
        })
        .collect();

    Ok(segments.join(ENCODED_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_slash_token_is_extracted() {
        let (path, rest) = split_report_path("/Sales/Monthly&Year=2024&x=1");
        assert_eq!(path, Some("/Sales/Monthly"));
        assert_eq!(rest, "Year=2024&x=1");
    }

    #[test]
    fn ordinary_first_token_is_not_a_path() {
        let (path, rest) = split_report_path("Year=2024&/odd");
        assert_eq!(path, None);
        assert_eq!(rest, "Year=2024&/odd");
    }

    #[test]
    fn encoded_path_token_is_recognized() {
        let (path, rest) = split_report_path("%2fSales%2fMonthly&rs%3AEmbed=true");
        assert_eq!(path, Some("%2fSales%2fMonthly"));
        assert_eq!(rest, "rs%3AEmbed=true");
    }

    #[test]
    fn path_without_params_leaves_empty_rest() {
        assert_eq!(split_report_path("/F/R"), (Some("/F/R"), ""));
    }

    #[test]
    fn segments_are_encoded_and_joined_with_escaped_separator() {
        assert_eq!(encode_report_path("/F/R").unwrap(), "%2fF%2fR");
        assert_eq!(
            encode_report_path("/Sales Reports/Q1 (Final)").unwrap(),
            "%2fSales%20Reports%2fQ1%20(Final)"
        );
    }

    #[test]
    fn already_encoded_segments_are_not_double_encoded() {
        assert_eq!(
            encode_report_path("/Sales/Q1%20Report").unwrap(),
            "%2fSales%2fQ1%20Report"
        );
        assert_eq!(
            encode_report_path("%2fSales%2fQ1%20Report").unwrap(),
            "%2fSales%2fQ1%20Report"
        );
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(matches!(
            encode_report_path("/F/%FF"),
            Err(AddressError::UndecodablePath(_))
        ));
    }
}
