//! Update check against the project's release feed

use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, DEV_VERSION};
use crate::network::transport::{OutgoingRequest, Transport};

/// Outcome of an update check; only `current_version` is guaranteed
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    pub current_version: String,
    pub latest_version: String,
    pub update_available: bool,
    #[serde(rename = "releaseURL")]
    pub release_url: String,
}

#[derive(Deserialize)]
struct Release {
    tag_name: String,
    html_url: String,
}

/// Ask the release feed whether a newer version exists.
///
/// Failures of any kind leave the info with just the current version.
pub async fn check_for_update<T: Transport>(
    transport: &T,
    current_version: &str,
    releases_url: &str,
) -> UpdateInfo {
    let mut info = UpdateInfo {
        current_version: current_version.to_string(),
        ..Default::default()
    };
    if current_version == DEV_VERSION {
        return info;
    }

    let request = OutgoingRequest {
        method: "GET".to_string(),
        url: releases_url.to_string(),
        headers: vec![
            ("Accept".to_string(), "application/vnd.github+json".to_string()),
            ("User-Agent".to_string(), format!("{}/{}", APP_NAME, current_version)),
        ],
        body: None,
    };

    let response = match transport.send(request).await {
        Ok(response) if response.status == 200 => response,
        Ok(response) => {
            tracing::debug!(status = response.status, "Release feed returned non-200");
            return info;
        }
        Err(e) => {
            tracing::debug!(error = %e, "Update check failed");
            return info;
        }
    };

    let release: Release = match serde_json::from_str(&response.body) {
        Ok(release) => release,
        Err(e) => {
            tracing::debug!(error = %e, "Unexpected release feed payload");
            return info;
        }
    };

    info.update_available = is_newer(&release.tag_name, current_version);
    info.latest_version = release.tag_name;
    info.release_url = release.html_url;
    info
}

/// True if `latest` is a strictly higher `MAJOR.MINOR.PATCH` than `current`.
///
/// A leading `v` is allowed on either side; anything unparseable is never newer.
pub fn is_newer(latest: &str, current: &str) -> bool {
    match (parse_version(latest), parse_version(current)) {
        (Some(latest), Some(current)) => latest > current,
        _ => false,
    }
}

fn parse_version(version: &str) -> Option<(u64, u64, u64)> {
    let version = version.strip_prefix('v').unwrap_or(version);
    let mut parts = version.splitn(3, '.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    Some((major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::executor::tests::FakeTransport;
    use crate::network::transport::{TransportError, TransportResponse};

    const FEED: &str = "https://api.example.com/releases/latest";

    fn feed_reply(status: u16, body: &str) -> FakeTransport {
        FakeTransport::replying(Ok(TransportResponse {
            status,
            body: body.to_string(),
            ..Default::default()
        }))
    }

    #[test]
    fn test_is_newer() {
        assert!(is_newer("v1.2.0", "1.1.9"));
        assert!(is_newer("2.0.0", "v1.99.99"));
        assert!(is_newer("1.10.0", "1.9.0"));
        assert!(!is_newer("1.2.0", "1.2.0"));
        assert!(!is_newer("1.2.0", "1.3.0"));
        assert!(!is_newer("1.2", "1.1.0"));
        assert!(!is_newer("v1.2.0-beta", "1.1.0"));
        assert!(!is_newer("1.2.0", "dev"));
    }

    #[tokio::test]
    async fn test_dev_build_skips_network() {
        let transport = feed_reply(200, "{}");
        let info = check_for_update(&transport, "dev", FEED).await;
        assert_eq!(info.current_version, "dev");
        assert!(!info.update_available);
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_newer_release_available() {
        let transport = feed_reply(
            200,
            r#"{"tag_name": "v0.3.0", "html_url": "https://example.com/r/v0.3.0", "draft": false}"#,
        );
        let info = check_for_update(&transport, "0.2.1", FEED).await;
        assert!(info.update_available);
        assert_eq!(info.latest_version, "v0.3.0");
        assert_eq!(info.release_url, "https://example.com/r/v0.3.0");

        let sent = transport.last_sent();
        assert_eq!(sent.url, FEED);
        assert!(sent
            .headers
            .contains(&("Accept".to_string(), "application/vnd.github+json".to_string())));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["currentVersion"], "0.2.1");
        assert_eq!(json["releaseURL"], "https://example.com/r/v0.3.0");
        assert_eq!(json["updateAvailable"], true);
    }

    #[tokio::test]
    async fn test_failures_leave_bare_info() {
        let bare = UpdateInfo {
            current_version: "0.2.1".to_string(),
            ..Default::default()
        };

        let info = check_for_update(&feed_reply(404, "{}"), "0.2.1", FEED).await;
        assert_eq!(info, bare);

        let info = check_for_update(&feed_reply(200, "<html>"), "0.2.1", FEED).await;
        assert_eq!(info, bare);

        let offline = FakeTransport::replying(Err(TransportError::Failed("offline".to_string())));
        let info = check_for_update(&offline, "0.2.1", FEED).await;
        assert_eq!(info, bare);
    }
}
