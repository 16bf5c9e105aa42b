// Query-string parameter lookup for a page location.

use url::form_urlencoded;

/// Query parameter carrying the comma-separated team filter.
pub const TEAMS_PARAM: &str = "teams";

/// Return the decoded value of the first `name` parameter in `location`, or
/// an empty string if it is absent.
///
/// `location` may be a full URL, a path with a query, or a bare query string
/// (`?teams=BOS,LAL`). The fragment is ignored. Values are form-decoded, so
/// `+` becomes a space and percent escapes are expanded.
pub fn query_param(location: &str, name: &str) -> String {
    let before_fragment = location.split('#').next().unwrap_or_default();
    let Some((_, query)) = before_fragment.split_once('?') else {
        return String::new();
    };
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}
