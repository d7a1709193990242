//! Download metadata transcribed from a network response.

use serde::{Deserialize, Serialize};
use url::Url;

/// User agent reported when the request carried none.
pub const DEFAULT_USER_AGENT: &str = concat!("savepath/", env!("CARGO_PKG_VERSION"));

/// Raw response facts handed over by the network layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
    /// Every URL visited, in redirect order.
    pub url_chain: Vec<String>,
    /// `Content-Disposition` header, if any.
    pub content_disposition: Option<String>,
    /// MIME type from `Content-Type`, without parameters.
    pub mime_type: Option<String>,
    /// `Content-Length`, if the server sent one.
    pub content_length: Option<i64>,
    /// `Referer` sent with the request.
    pub referrer: Option<String>,
    /// `User-Agent` sent with the request.
    pub user_agent: Option<String>,
    /// Whether a user gesture started the request.
    pub has_user_gesture: bool,
}

/// Metadata describing a download, derived from its response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadInfo {
    /// First URL of the redirect chain.
    pub original_url: String,
    /// Final URL of the redirect chain.
    pub url: String,
    /// `Content-Disposition` header, empty if absent.
    pub content_disposition: String,
    /// MIME type as sent by the server, empty if absent.
    pub original_mime_type: String,
    /// Content length, `-1` when unknown.
    pub total_bytes: i64,
    /// Referrer, only kept when it is an absolute URL.
    pub referrer: String,
    /// User agent of the request.
    pub user_agent: String,
    /// Whether a user gesture started the download.
    pub has_user_gesture: bool,
}

impl DownloadInfo {
    /// Transcribe response metadata into a download record.
    pub fn from_response(response: &ResponseMetadata) -> Self {
        let user_agent = response
            .user_agent
            .as_deref()
            .filter(|ua| !ua.is_empty())
            .unwrap_or(DEFAULT_USER_AGENT)
            .to_string();

        let referrer = response
            .referrer
            .as_deref()
            .filter(|r| Url::parse(r).is_ok())
            .unwrap_or_default()
            .to_string();

        Self {
            original_url: response.url_chain.first().cloned().unwrap_or_default(),
            url: response.url_chain.last().cloned().unwrap_or_default(),
            content_disposition: response.content_disposition.clone().unwrap_or_default(),
            original_mime_type: response.mime_type.clone().unwrap_or_default(),
            total_bytes: response.content_length.unwrap_or(-1),
            referrer,
            user_agent,
            has_user_gesture: response.has_user_gesture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_chain_endpoints_are_kept() {
        let info = DownloadInfo::from_response(&ResponseMetadata {
            url_chain: vec![
                "http://a.example/start".to_string(),
                "http://b.example/hop".to_string(),
                "https://c.example/file.pdf".to_string(),
            ],
            ..ResponseMetadata::default()
        });

        assert_eq!(info.original_url, "http://a.example/start");
        assert_eq!(info.url, "https://c.example/file.pdf");
    }

    #[test]
    fn missing_user_agent_falls_back_to_default() {
        let info = DownloadInfo::from_response(&ResponseMetadata {
            user_agent: Some(String::new()),
            ..ResponseMetadata::default()
        });
        assert_eq!(info.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn invalid_referrer_is_dropped() {
        let bad = DownloadInfo::from_response(&ResponseMetadata {
            referrer: Some("not a url".to_string()),
            ..ResponseMetadata::default()
        });
        assert!(bad.referrer.is_empty());

        let good = DownloadInfo::from_response(&ResponseMetadata {
            referrer: Some("https://example.com/page".to_string()),
            ..ResponseMetadata::default()
        });
        assert_eq!(good.referrer, "https://example.com/page");
    }

    #[test]
    fn non_http_absolute_referrers_are_kept() {
        for referrer in ["file:///home/u/page.html", "about:blank"] {
            let info = DownloadInfo::from_response(&ResponseMetadata {
                referrer: Some(referrer.to_string()),
                ..ResponseMetadata::default()
            });
            assert_eq!(info.referrer, referrer);
        }

        let relative = DownloadInfo::from_response(&ResponseMetadata {
            referrer: Some("/relative/page".to_string()),
            ..ResponseMetadata::default()
        });
        assert!(relative.referrer.is_empty());
    }

    #[test]
    fn unknown_length_is_negative_one() {
        let info = DownloadInfo::from_response(&ResponseMetadata::default());
        assert_eq!(info.total_bytes, -1);
        assert!(!info.has_user_gesture);
    }
}
