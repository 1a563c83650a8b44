//! 📂 Path Lister: finding the "folders" in a bucket that has no folders.
//!
//! 🎬 S3 doesn't have directories. It has keys, a delimiter, and a shared delusion.
//! Ask it to list with `Delimiter=/` and it groups everything after the first `/`
//! into `CommonPrefixes`. Those are our folders. We collect them. We print them.
//! That's the whole show.
//!
//! 🧠 Knowledge graph:
//! - `normalize_prefix()`: `None`/`""` → `""`, `"a"` → `"a/"`, `"a/"` stays `"a/"`
//! - `PrefixPageSource`: one delimited listing call per page (S3 in prod, a script in tests)
//! - `PathLister::get_paths()`: follows continuation tokens, optionally capped by `max_pages`
//! - Errors come back as `Err` with the bucket name attached. Nobody calls `exit()` in here.

pub mod s3_page_source;

use anyhow::{Context, Result};
use tracing::{debug, warn};

pub use s3_page_source::{PrefixPage, PrefixPageSource, S3PrefixPageSource};

/// 📏 The one and only delimiter. Folders end in this. Always.
pub const DELIMITER: &str = "/";

/// ✂️ Turn a user-supplied prefix into the query prefix S3 expects.
///
/// `"a"` becomes `"a/"` so we list *inside* `a`, not every key that merely starts
/// with the letter a (`apple/`, `aardvark.txt`, you get it).
pub fn normalize_prefix(prefix: Option<&str>) -> String {
    match prefix {
        None | Some("") => String::new(),
        Some(p) if p.ends_with(DELIMITER) => p.to_string(),
        Some(p) => format!("{p}{DELIMITER}"),
    }
}

/// 📂 Lists immediate child prefixes of a path in a bucket.
#[derive(Debug)]
pub struct PathLister<S> {
    source: S,
    max_pages: Option<usize>,
}

impl<S: PrefixPageSource> PathLister<S> {
    /// 🚀 `max_pages = None` reads every page. `Some(0)` is treated as `Some(1)`,
    /// because a listing that reads zero pages is just a very slow `vec![]`.
    pub fn new(source: S, max_pages: Option<usize>) -> Self {
        Self {
            source,
            max_pages: max_pages.map(|cap| cap.max(1)),
        }
    }

    /// 📋 Return the common prefixes directly under `prefix` in `bucket`, in S3 order.
    ///
    /// 💀 On failure the error carries the bucket name (and the query prefix),
    /// so the log line at 3am tells you *which* bucket hates you.
    pub async fn get_paths(&self, bucket: &str, prefix: Option<&str>) -> Result<Vec<String>> {
        let the_query_prefix = normalize_prefix(prefix);
        let mut the_paths = Vec::new();
        let mut the_continuation_token: Option<String> = None;
        let mut the_pages_read = 0usize;

        loop {
            let the_page = self
                .source
                .fetch_page(bucket, &the_query_prefix, the_continuation_token.take())
                .await
                .context(format!(
                    "💀 There was a problem listing objects for bucket: {} (prefix '{}')",
                    bucket, the_query_prefix
                ))?;
            the_pages_read += 1;

            debug!(
                "📄 page {} of s3://{}/{} brought {} prefixes",
                the_pages_read,
                bucket,
                the_query_prefix,
                the_page.prefixes.len()
            );
            the_paths.extend(the_page.prefixes);

            let Some(the_next_token) = the_page.next_continuation_token else {
                break;
            };
            if self.max_pages.is_some_and(|cap| the_pages_read >= cap) {
                warn!(
                    "⚠️ stopped after {} page(s) of s3://{}/{}; the bucket has more, this list is incomplete",
                    the_pages_read, bucket, the_query_prefix
                );
                break;
            }
            the_continuation_token = Some(the_next_token);
        }

        Ok(the_paths)
    }
}
