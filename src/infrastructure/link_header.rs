// RFC 5988 Link header parsing for paginated responses
use reqwest::Url;

/// Page numbers advertised by the `next` and `last` link relations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkRelations {
    pub next_page: Option<u32>,
    pub last_page: Option<u32>,
}

/// Parse a Link header.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/organizations/123/repos?per_page=100&page=2>; rel="next", <...&page=3>; rel="last"`
///
/// Links without a parseable `page` query parameter are ignored.
pub fn parse_link_header(link_header: &str) -> LinkRelations {
    let mut relations = LinkRelations::default();

    for part in link_header.split(',') {
        let mut url = None;
        let mut rel = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                url = Some(inner);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                rel = Some(value.trim_matches('"'));
            }
        }

        let (Some(url), Some(rel)) = (url, rel) else {
            continue;
        };

        if let Some(page) = page_from_url(url) {
            // A single link may carry several space-separated relation types
            for rel_type in rel.split_whitespace() {
                match rel_type {
                    "next" => relations.next_page = Some(page),
                    "last" => relations.last_page = Some(page),
                    _ => {}
                }
            }
        }
    }

    relations
}

/// Extract the `page` query parameter from a URL.
pub fn page_from_url(url: &str) -> Option<u32> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
