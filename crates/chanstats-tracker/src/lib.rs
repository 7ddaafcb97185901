use chrono::NaiveDate;
use serde::Deserialize;

const TRACKER_API_URL: &str = "https://twitchtracker.com/api";

/// Plain reqwest requests get bounced by the site's bot filtering, so we
/// present a browser-ish user agent.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0 Safari/537.36";

pub struct TrackerClient {
    client: reqwest::Client,
    base_url: String,
}
impl TrackerClient {
    pub fn new() -> Self {
        Self::with_base_url(TRACKER_API_URL)
    }

    /// Constructs a client against a different API root, so tests can point
    /// at a local mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::USER_AGENT,
                    BROWSER_USER_AGENT.parse().unwrap(),
                );

                headers
            })
            .build()
            .unwrap();

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetches the channel's statistics summary for a single day. Non-2xx
    /// responses come back as an error carrying the status code.
    pub async fn channel_summary(
        &self,
        channel: &str,
        date: NaiveDate,
    ) -> reqwest::Result<ChannelSummary> {
        self.client
            .get(format!("{}/channels/summary/{channel}", self.base_url))
            .query(&[("date", date.format("%Y-%m-%d").to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[derive(Debug, Deserialize)]
pub struct ChannelSummary {
    pub rank: Option<i64>,
    pub minutes_streamed: Option<i64>,
    // The API really does spell the key "avg_viwers".
    #[serde(rename = "avg_viwers")]
    pub avg_viewers: Option<i64>,
    pub max_viewers: Option<i64>,
    pub followers: Option<i64>,
    pub followers_total: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAYLOAD: &str = r#"{
        "rank": 4,
        "minutes_streamed": 1260,
        "avg_viwers": 48321,
        "max_viewers": 102554,
        "followers": 2401,
        "followers_total": 12844570
    }"#;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 18).unwrap()
    }

    #[test]
    fn summary_extracts_all_fields() {
        let summary: ChannelSummary = serde_json::from_str(FULL_PAYLOAD).unwrap();

        assert_eq!(summary.rank, Some(4));
        assert_eq!(summary.minutes_streamed, Some(1260));
        assert_eq!(summary.avg_viewers, Some(48321));
        assert_eq!(summary.max_viewers, Some(102554));
        assert_eq!(summary.followers, Some(2401));
        assert_eq!(summary.followers_total, Some(12844570));
    }

    #[test]
    fn missing_keys_become_none() {
        let summary: ChannelSummary = serde_json::from_str(r#"{"rank": 9}"#).unwrap();

        assert_eq!(summary.rank, Some(9));
        assert_eq!(summary.minutes_streamed, None);
        assert_eq!(summary.avg_viewers, None);
        assert_eq!(summary.max_viewers, None);
        assert_eq!(summary.followers, None);
        assert_eq!(summary.followers_total, None);
    }

    #[tokio::test]
    async fn summary_requests_the_dated_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/channels/summary/rubius")
            .match_query(mockito::Matcher::UrlEncoded(
                "date".into(),
                "2024-11-18".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(FULL_PAYLOAD)
            .create_async()
            .await;

        let client = TrackerClient::with_base_url(server.url());
        let summary = client.channel_summary("rubius", date()).await.unwrap();

        assert_eq!(summary.avg_viewers, Some(48321));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_carries_the_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = TrackerClient::with_base_url(server.url());
        let err = client.channel_summary("rubius", date()).await.unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    }
}
