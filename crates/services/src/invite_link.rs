//! Invite deep-link building and token extraction.
//!
//! Links come in two shapes: `https://<host>/invite/<token>` and
//! `https://<host>/invite?token=<token>`. Extraction checks the query
//! parameter first, then falls back to the path segment after `invite`.

pub fn build_link(base_url: &str, token: &str) -> String {
    format!("{}/invite/{}", base_url.trim_end_matches('/'), token)
}

pub fn extract_token(link: &str) -> Option<String> {
    let (path, query) = match link.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (link, None),
    };

    // Query parameter takes precedence over the path form.
    if let Some(query) = query {
        for pair in query.split('&') {
            if let Some(value) = pair.strip_prefix("token=") {
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    let mut segments = path.trim_end_matches('/').split('/');
    while let Some(segment) = segments.next() {
        if segment == "invite" {
            return segments.next().filter(|s| !s.is_empty()).map(str::to_string);
        }
    }
    None
}
