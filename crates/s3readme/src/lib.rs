//! 🪣 s3readme: list the "folders" in an S3 bucket, optionally as somebody else.
//!
//! 🎬 The whole plot, in four acts:
//! 1. `app_config`: read the YAML. No YAML, no show.
//! 2. `session`: figure out who we are (ambient creds, or an assumed IAM role).
//! 3. `listing`: ask S3 for the common prefixes under a path.
//! 4. `output`: print them.
//!
//! 🦆 The duck lists folders too. It calls them "ponds".

pub mod app_config;
pub mod listing;
pub mod output;
pub mod session;

use anyhow::Result;
use tracing::{info, warn};

use crate::app_config::AppConfig;
use crate::listing::{PathLister, S3PrefixPageSource};
use crate::session::{SessionProvider, StsTokenExchange, load_sdk_config};

/// 🚀 `init`: resolve the session, list the prefixes under `prefix` in `bucket`.
///
/// 💀 Every failure comes back as an `Err`. The caller decides whether that's
/// an exit code or a retry; this function doesn't pull the plug on the process.
pub async fn run_init(
    app_config: &AppConfig,
    aws_region: &str,
    bucket: &str,
    prefix: Option<&str>,
) -> Result<Vec<String>> {
    // 🌫️ Loaded once: it backs the STS client and the S3 client alike. Loading reads
    // env/profile files only; STS itself only gets called if a role is configured.
    let the_ambient_config = load_sdk_config(aws_region, app_config.endpoint_url.as_deref()).await;
    let the_session_provider = SessionProvider::new(StsTokenExchange::new(&the_ambient_config));
    let the_session = the_session_provider.resolve(aws_region, app_config).await?;

    let the_lister = PathLister::new(
        S3PrefixPageSource::new(the_session.s3_client(&the_ambient_config)),
        app_config.max_pages,
    );
    let the_paths = the_lister.get_paths(bucket, prefix).await?;

    info!(
        "📂 found {} prefix(es) in s3://{}/{}",
        the_paths.len(),
        bucket,
        listing::normalize_prefix(prefix)
    );
    Ok(the_paths)
}

/// ✍️ `write`: reserved for pushing local READMEs over what's in S3. Not today.
pub fn run_write() -> Result<()> {
    // 🚧 "Initially we will simply overwrite what is in S3 with what we have locally."
    // Initially has not arrived yet.
    warn!("🚧 write is not implemented yet, nothing was written");
    Ok(())
}
