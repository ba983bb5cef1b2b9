use crate::config::EndpointConfig;
use crate::pages::format_page_number;

/// Prefix carried by IIIF identifiers but not by ALTO storage paths
pub const ARKIS_PREFIX: &str = "arkis!";

/// Strips a leading `arkis!` from an identifier
pub fn remove_arkis_prefix(id: &str) -> &str {
    id.strip_prefix(ARKIS_PREFIX).unwrap_or(id)
}

/// Trimmed identifier without the `arkis!` prefix, or `None` if nothing remains
fn clean_id(id: &str) -> Option<&str> {
    let clean = remove_arkis_prefix(id.trim());
    if clean.is_empty() || clean.contains('/') {
        None
    } else {
        Some(clean)
    }
}

/// Builds the ALTO XML URL for one page
///
/// The storage path is sharded by the first four characters of the
/// identifier, so identifiers shorter than that have no ALTO URL.
///
/// # Examples
///
/// ```
/// use ra_transcripts::config::EndpointConfig;
/// use ra_transcripts::url::alto_url;
///
/// let endpoints = EndpointConfig::default();
/// assert_eq!(
///     alto_url(&endpoints, "arkis!R0001213", 5).as_deref(),
///     Some("https://sok.riksarkivet.se/dokument/alto/R000/R0001213/R0001213_00005.xml")
/// );
/// assert_eq!(alto_url(&endpoints, "R00", 5), None);
/// ```
pub fn alto_url(endpoints: &EndpointConfig, manifest_id: &str, page: u32) -> Option<String> {
    let clean = clean_id(manifest_id)?;
    if page == 0 {
        return None;
    }
    let shard: String = clean.chars().take(4).collect();
    if shard.chars().count() < 4 {
        return None;
    }

    Some(format!(
        "{}/{}/{}/{}_{}.xml",
        endpoints.alto_base.trim_end_matches('/'),
        shard,
        clean,
        clean,
        format_page_number(page)
    ))
}

/// Builds the IIIF Image API URL for one page
///
/// Image identifiers always carry the `arkis!` prefix, whether or not the
/// caller's identifier had it.
pub fn iiif_image_url(endpoints: &EndpointConfig, pid: &str, page: u32) -> Option<String> {
    let clean = clean_id(pid)?;
    if page == 0 {
        return None;
    }
    Some(format!(
        "{}/{}{}_{}/full/max/0/default.jpg",
        endpoints.iiif_base.trim_end_matches('/'),
        ARKIS_PREFIX,
        clean,
        format_page_number(page)
    ))
}

/// Builds the image viewer URL for one page, optionally carrying a search term
pub fn bildvisning_url(
    endpoints: &EndpointConfig,
    pid: &str,
    page: u32,
    search_term: Option<&str>,
) -> Option<String> {
    let clean = clean_id(pid)?;
    if page == 0 {
        return None;
    }
    let mut url = format!(
        "{}/{}_{}",
        endpoints.bildvisning_base.trim_end_matches('/'),
        clean,
        format_page_number(page)
    );

    if let Some(term) = search_term.map(str::trim).filter(|term| !term.is_empty()) {
        url.push_str("#?q=");
        url.push_str(&urlencoding::encode(term));
    }

    Some(url)
}

/// Builds the IIIF presentation manifest URL
pub fn manifest_url(endpoints: &EndpointConfig, pid: &str) -> Option<String> {
    let clean = clean_id(pid)?;
    Some(format!(
        "{}/{}{}/manifest",
        endpoints.iiif_base.trim_end_matches('/'),
        ARKIS_PREFIX,
        clean
    ))
}

/// Builds the IIIF collection URL for a record identifier
pub fn collection_url(endpoints: &EndpointConfig, pid: &str) -> Option<String> {
    let clean = clean_id(pid)?;
    Some(format!(
        "{}/{}",
        endpoints.collection_base.trim_end_matches('/'),
        clean
    ))
}

/// Converts a manifest URL (`.../arkis!ID/manifest`) into a viewer URL
pub fn bildvisaren_url(endpoints: &EndpointConfig, manifest_url: &str) -> Option<String> {
    let (_, rest) = manifest_url.split_once(ARKIS_PREFIX)?;
    let id = rest.split(['/', '?', '#']).next()?;
    if id.is_empty() {
        return None;
    }
    Some(format!(
        "{}/{}",
        endpoints.bildvisning_base.trim_end_matches('/'),
        id
    ))
}

/// Last path segment of a URL, ignoring query and fragment
pub fn last_path_segment(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
}

/// Manifest identifier from an IIIF manifest id URL
///
/// `.../arkis!R0001213/manifest` yields `R0001213`; a URL without a
/// `/manifest` suffix yields its last segment.
pub fn manifest_id_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?.trim_end_matches('/');
    let segment = match path.strip_suffix("/manifest") {
        Some(stripped) => last_path_segment(stripped)?,
        None => last_path_segment(path)?,
    };
    let id = remove_arkis_prefix(segment);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
