//! Historical viewer-page addresses.

use std::borrow::Cow;

const LEGACY_VIEWER_PATH: &str = "/ReportServer/Pages/ReportViewer.aspx";
const MODERN_VIEWER_PATH: &str = "/reports/report";

/// Rewrite `<base>/ReportServer/Pages/ReportViewer.aspx?<rest>` to
/// `<base>/reports/report?<rest>`. Anything else is returned unchanged.
pub fn normalize_viewer_address(address: &str) -> Cow<'_, str> {
    let Some((base, rest)) = address.split_once('?') else {
        return Cow::Borrowed(address);
    };

    let Some(prefix_len) = base.len().checked_sub(LEGACY_VIEWER_PATH.len()) else {
        return Cow::Borrowed(address);
    };
    let Some(tail) = base.get(prefix_len..) else {
        return Cow::Borrowed(address);
    };
    if !tail.eq_ignore_ascii_case(LEGACY_VIEWER_PATH) {
        return Cow::Borrowed(address);
    }

    Cow::Owned(format!("{}{MODERN_VIEWER_PATH}?{rest}", &base[..prefix_len]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewer_page_is_rewritten() {
        assert_eq!(
            normalize_viewer_address("https://host/ReportServer/Pages/ReportViewer.aspx?/F/R&x=1"),
            "https://host/reports/report?/F/R&x=1"
        );
    }

    #[test]
    fn match_is_case_insensitive() {
        assert_eq!(
            normalize_viewer_address("https://host/reportserver/pages/reportviewer.aspx?/F/R"),
            "https://host/reports/report?/F/R"
        );
    }

    #[test]
    fn other_addresses_pass_through() {
        for address in [
            "https://host/ReportServer?/F/R",
            "https://host/ReportServer/Pages/ReportViewer.aspx",
            "https://host/reports/report?/F/R",
            "",
        ] {
            assert!(matches!(normalize_viewer_address(address), Cow::Borrowed(_)));
        }
    }
}
