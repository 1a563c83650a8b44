//! 🪪 Session Provider: deciding who we are before we ask S3 anything.
//!
//! 🎭 Two identities on the menu:
//! - **Ambient**: whatever the SDK default chain finds. Env vars, `~/.aws`, IMDS, vibes.
//! - **Assumed role**: a role ARN from config, traded at the STS desk for temporary creds.
//!
//! 🧠 Knowledge graph:
//! - `SessionProvider::resolve()` → `Session` (region + endpoint + identity)
//! - `Session::s3_client(&SdkConfig)` → `aws_sdk_s3::Client` with the right credentials provider
//! - No role configured → the token exchange is never called. Not once. Not even to say hi.
//!
//! 🦆 The duck assumed a role once. It was "duck". Method acting.

pub mod token_exchange;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

use crate::app_config::AppConfig;
pub use token_exchange::{StsTokenExchange, TemporaryCredentials, TokenExchange};

/// 🪪 Which credentials a session runs on.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionIdentity {
    /// 🌫️ SDK default credential chain. We don't touch it, we just trust it.
    Ambient,
    /// 🎭 Temporary creds obtained by assuming `role_arn`.
    AssumedRole {
        role_arn: String,
        credentials: TemporaryCredentials,
    },
}

/// 🧳 A resolved session: where we talk to, and who we are while talking.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub region: String,
    pub endpoint_url: Option<String>,
    pub identity: SessionIdentity,
}

impl Session {
    /// 🌫️ A session on ambient credentials. No STS round trip required.
    pub fn ambient(region: impl Into<String>, endpoint_url: Option<String>) -> Self {
        Self {
            region: region.into(),
            endpoint_url,
            identity: SessionIdentity::Ambient,
        }
    }

    /// 🪣 Build an S3 client for this session on top of an already-loaded SDK config.
    ///
    /// Assumed-role sessions get a static credentials provider with the temp creds.
    /// A custom endpoint flips on path-style addressing (LocalStack has no bucket subdomains).
    /// The config is passed in so one `init` loads it exactly once and shares it with STS.
    pub fn s3_client(&self, sdk_config: &SdkConfig) -> aws_sdk_s3::Client {
        let mut the_builder = aws_sdk_s3::config::Builder::from(sdk_config);

        if self.endpoint_url.is_some() {
            the_builder = the_builder.force_path_style(true);
        }
        if let SessionIdentity::AssumedRole { credentials, .. } = &self.identity {
            the_builder = the_builder.credentials_provider(credentials.to_sdk_credentials());
        }

        aws_sdk_s3::Client::from_conf(the_builder.build())
    }
}

/// 🔧 The ambient SDK config: region pinned, endpoint optionally overridden,
/// credentials left to the default chain.
pub async fn load_sdk_config(region: &str, endpoint_url: Option<&str>) -> SdkConfig {
    let mut the_loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
    if let Some(endpoint) = endpoint_url {
        the_loader = the_loader.endpoint_url(endpoint);
    }
    the_loader.load().await
}

/// 🪪 Resolves the session for one invocation.
///
/// Generic over the token exchange so tests can count how many times STS got bothered.
/// (The correct answer, with no role configured, is zero.)
#[derive(Debug)]
pub struct SessionProvider<X> {
    exchange: X,
}

impl<X: TokenExchange> SessionProvider<X> {
    pub fn new(exchange: X) -> Self {
        Self { exchange }
    }

    /// 🎯 Ambient if no role is configured, otherwise one `assume_role` call.
    /// No retries. If STS says no, we say no, with the role ARN in the error.
    pub async fn resolve(&self, region: &str, app_config: &AppConfig) -> Result<Session> {
        let Some(the_role_arn) = app_config.role_to_assume() else {
            debug!("🌫️ no iam_role_to_assume configured, riding on ambient credentials");
            return Ok(Session::ambient(region, app_config.endpoint_url.clone()));
        };

        debug!("🎭 Assuming the AWS IAM role: {}", the_role_arn);
        let the_credentials = self
            .exchange
            .assume_role(the_role_arn, &app_config.role_session_name)
            .await
            .context(format!(
                "💀 Couldn't assume the IAM role '{}'. Without it we're just a process with an ARN and a dream.",
                the_role_arn
            ))?;

        Ok(Session {
            region: region.to_string(),
            endpoint_url: app_config.endpoint_url.clone(),
            identity: SessionIdentity::AssumedRole {
                role_arn: the_role_arn.to_string(),
                credentials: the_credentials,
            },
        })
    }
}
