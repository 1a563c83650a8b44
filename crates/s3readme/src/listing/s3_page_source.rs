// ai
//! 🪣📄 S3 Prefix Page Source: one `ListObjectsV2` call, one page of folders.
//!
//! 🧠 Knowledge graph:
//! - `PrefixPageSource`: the seam. `PathLister` drives it, page by page.
//! - `S3PrefixPageSource`: `ListObjectsV2` with `Delimiter=/`, keeps only `CommonPrefixes`.
//! - Deep keys (`c/x`) land in `Contents`, which we ignore. Only folders make the cut.
//! - `NextContinuationToken` is passed back up. Whether to follow it is the lister's call.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;

use super::DELIMITER;

/// 📄 One page worth of common prefixes, plus the token for the next page (if S3 says there is one).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefixPage {
    pub prefixes: Vec<String>,
    pub next_continuation_token: Option<String>,
}

/// 📄 Something that can answer "which folders live under this prefix?" one page at a time.
///
/// # Contract 📜
/// - `prefix` is already normalized. Don't add slashes, don't remove slashes.
/// - `continuation_token = None` means "first page please".
/// - `next_continuation_token = None` in the result means "that was the last page".
#[async_trait]
pub trait PrefixPageSource: std::fmt::Debug + Send + Sync {
    async fn fetch_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<PrefixPage>;
}

/// 🪣 The real one. Talks to S3 (or anything that speaks S3 well enough to fool the SDK).
#[derive(Debug, Clone)]
pub struct S3PrefixPageSource {
    client: aws_sdk_s3::Client,
}

impl S3PrefixPageSource {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PrefixPageSource for S3PrefixPageSource {
    async fn fetch_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<PrefixPage> {
        let the_response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .delimiter(DELIMITER)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|err| anyhow!("{}", DisplayErrorContext(err)))
            .context(format!("💀 ListObjectsV2 failed for s3://{}/{}", bucket, prefix))?;

        let the_prefixes = the_response
            .common_prefixes()
            .iter()
            .filter_map(|common_prefix| common_prefix.prefix())
            .map(str::to_string)
            .collect();

        // 🔄 Truncated with no token would loop forever. We'd rather stop than spin.
        let the_next_token = if the_response.is_truncated().unwrap_or(false) {
            the_response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(PrefixPage {
            prefixes: the_prefixes,
            next_continuation_token: the_next_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, SessionIdentity, TemporaryCredentials, load_sdk_config};
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// 🧪 An S3 client aimed at the mock server, riding on fake assumed-role creds
    /// so the SDK has something to sign with.
    async fn the_mock_s3_source(the_server: &MockServer) -> S3PrefixPageSource {
        let the_session = Session {
            region: "us-east-1".to_string(),
            endpoint_url: Some(the_server.uri()),
            identity: SessionIdentity::AssumedRole {
                role_arn: "arn:aws:iam::123456789012:role/test".to_string(),
                credentials: TemporaryCredentials {
                    access_key_id: "ASIATEST".to_string(),
                    secret_access_key: "test-secret".to_string(),
                    session_token: "test-token".to_string(),
                    expires_at: None,
                },
            },
        };
        let the_sdk_config = load_sdk_config(&the_session.region, the_session.endpoint_url.as_deref()).await;
        S3PrefixPageSource::new(the_session.s3_client(&the_sdk_config))
    }

    fn list_bucket_result(prefixes: &[&str], keys: &[&str], next_token: Option<&str>) -> String {
        let the_contents: String = keys
            .iter()
            .map(|key| format!("<Contents><Key>{key}</Key><Size>42</Size></Contents>"))
            .collect();
        let the_common_prefixes: String = prefixes
            .iter()
            .map(|prefix| format!("<CommonPrefixes><Prefix>{prefix}</Prefix></CommonPrefixes>"))
            .collect();
        let (the_truncation, the_token) = match next_token {
            Some(token) => (
                "true",
                format!("<NextContinuationToken>{token}</NextContinuationToken>"),
            ),
            None => ("false", String::new()),
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>readme-bucket</Name>
  <Prefix></Prefix>
  <Delimiter>/</Delimiter>
  <MaxKeys>1000</MaxKeys>
  <IsTruncated>{the_truncation}</IsTruncated>
  {the_token}
  {the_contents}
  {the_common_prefixes}
</ListBucketResult>"#
        )
    }

    #[tokio::test]
    async fn the_one_where_only_folders_make_the_cut() {
        let the_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/readme-bucket/"))
            .and(query_param("list-type", "2"))
            .and(query_param("delimiter", "/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                list_bucket_result(&["a/", "b/"], &["README.md"], None),
                "application/xml",
            ))
            .expect(1)
            .mount(&the_server)
            .await;

        let the_page = the_mock_s3_source(&the_server)
            .await
            .fetch_page("readme-bucket", "", None)
            .await
            .expect("💀 The mock bucket answered. We should have understood it.");

        assert_eq!(the_page.prefixes, vec!["a/", "b/"]);
        assert_eq!(the_page.next_continuation_token, None);
    }

    #[tokio::test]
    async fn the_one_where_the_lister_walks_two_pages_over_the_wire() {
        let the_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/readme-bucket/"))
            .and(query_param("prefix", "a/"))
            .and(query_param_is_missing("continuation-token"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                list_bucket_result(&["a/one/"], &[], Some("page-2")),
                "application/xml",
            ))
            .expect(1)
            .mount(&the_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/readme-bucket/"))
            .and(query_param("prefix", "a/"))
            .and(query_param("continuation-token", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                list_bucket_result(&["a/two/"], &[], None),
                "application/xml",
            ))
            .expect(1)
            .mount(&the_server)
            .await;

        let the_lister = crate::listing::PathLister::new(the_mock_s3_source(&the_server).await, None);
        let the_paths = the_lister
            .get_paths("readme-bucket", Some("a"))
            .await
            .expect("💀 Two pages, two answers, one list.");

        assert_eq!(the_paths, vec!["a/one/", "a/two/"]);
    }

    #[tokio::test]
    async fn the_one_where_s3_says_access_denied() {
        let the_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/locked-bucket/"))
            .respond_with(ResponseTemplate::new(403).set_body_raw(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>AccessDenied</Code><Message>Access Denied</Message><RequestId>DEADBEEF</RequestId></Error>"#,
                "application/xml",
            ))
            .mount(&the_server)
            .await;

        let the_lister = crate::listing::PathLister::new(the_mock_s3_source(&the_server).await, None);
        let the_error = the_lister
            .get_paths("locked-bucket", None)
            .await
            .expect_err("💀 A 403 is many things. A success is not one of them.");

        let the_message = format!("{the_error:#}");
        assert!(the_message.contains("locked-bucket"), "{the_message}");
        assert!(the_message.contains("AccessDenied"), "{the_message}");
    }
}
