use crate::UrlError;
use url::Url;

/// Query parameters that never change which product a URL points at
const TRACKING_PARAMS: &[&str] = &[
    "fbclid",
    "gclid",
    "mc_eid",
    "ref",
    "source",
    "cm_sp",
    "cm_re",
    "searchterm",
    "searchtype",
    "sid",
];

/// Derives the deduplication key for a detail page URL
///
/// Two URLs reaching the same product through different listing pages map
/// to the same key.
///
/// # Normalization Steps
///
/// 1. Accept only http and https; the scheme itself is not part of the key
/// 2. Lowercase the host and drop a `www.` prefix
/// 3. Keep an explicit non-default port
/// 4. Remove dot segments, empty segments and a trailing slash
/// 5. Drop the fragment
/// 6. Drop tracking parameters, then sort the remaining ones
///
/// # Examples
///
/// ```
/// use shoe_scout::url::product_key;
/// use url::Url;
///
/// let url = Url::parse("http://WWW.SHOP.EXAMPLE/p/42/?utm_source=x#reviews").unwrap();
/// assert_eq!(product_key(&url).unwrap(), "shop.example/p/42");
/// ```
pub fn product_key(url: &Url) -> Result<String, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let mut key = String::from(host);
    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    key.push_str(&normalize_path(url.path()));

    let params = filter_and_sort_query_params(url);
    if !params.is_empty() {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        key.push('?');
        key.push_str(&query);
    }

    Ok(key)
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}
