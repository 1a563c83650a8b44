// ai
//! 🎭🔑 Token Exchange: trading a role ARN for a short-lived badge.
//!
//! INT. SECURITY DESK, DAY. A process walks up holding nothing but an ARN and
//! a dream. The STS guard squints, stamps a session name on it, and hands over
//! three strings and an expiry. "Don't lose these," says the guard. "They self-destruct."
//!
//! 🧠 Knowledge graph:
//! - `TokenExchange`: the seam. One method, `assume_role`. Tests swap in a fake.
//! - `StsTokenExchange`: the real thing, STS `AssumeRole` over the AWS SDK.
//! - `TemporaryCredentials`: access key, secret, session token, optional expiry. Never persisted.

use std::time::SystemTime;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sts::error::DisplayErrorContext;
use tracing::debug;

/// 🔑 Temporary credentials handed out by a token exchange.
///
/// `Debug` is hand-rolled below so the secret and the session token never end up
/// in a log line. Ask me how I know.
#[derive(Clone, PartialEq)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expires_at: Option<SystemTime>,
}

impl TemporaryCredentials {
    /// 🔄 Convert into the SDK's credentials type, ready to be a static credentials provider.
    pub fn to_sdk_credentials(&self) -> aws_sdk_s3::config::Credentials {
        aws_sdk_s3::config::Credentials::new(
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            Some(self.session_token.clone()),
            self.expires_at,
            "s3readme-assume-role",
        )
    }
}

impl std::fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &"** redacted **")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// 🎭 Something that can turn a role ARN into temporary credentials.
///
/// # Contract 📜
/// - Called at most once per session resolution, and only when a role is configured.
/// - No retries here. A failure is returned as-is and the caller decides how dead we are.
#[async_trait]
pub trait TokenExchange: std::fmt::Debug + Send + Sync {
    /// 🔑 Exchange `role_arn` for temporary credentials, tagged with `session_name`.
    async fn assume_role(&self, role_arn: &str, session_name: &str) -> Result<TemporaryCredentials>;
}

/// 🏛️ STS-backed token exchange. The client rides on ambient credentials:
/// you need *some* identity to be allowed to become another one.
#[derive(Debug, Clone)]
pub struct StsTokenExchange {
    client: aws_sdk_sts::Client,
}

impl StsTokenExchange {
    /// 🚀 Build from an SDK config (usually the ambient one). No network yet.
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sts::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl TokenExchange for StsTokenExchange {
    async fn assume_role(&self, role_arn: &str, session_name: &str) -> Result<TemporaryCredentials> {
        debug!("🎭 asking STS to let us be '{}' for a while (session '{}')", role_arn, session_name);

        let the_response = self
            .client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .send()
            .await
            .map_err(|err| anyhow!("{}", DisplayErrorContext(err)))
            .context(format!(
                "💀 STS AssumeRole failed for '{}'. Check the trust policy on the role \
                 and that your ambient identity is allowed to sts:AssumeRole it.",
                role_arn
            ))?;

        // 📦 STS says Credentials is optional in the model. In practice it's always there.
        // In practice is not a guarantee, so we check.
        let the_credentials = the_response.credentials().context(format!(
            "💀 STS AssumeRole for '{}' came back without credentials. A badge with no photo.",
            role_arn
        ))?;

        Ok(TemporaryCredentials {
            access_key_id: the_credentials.access_key_id().to_string(),
            secret_access_key: the_credentials.secret_access_key().to_string(),
            session_token: the_credentials.session_token().to_string(),
            expires_at: SystemTime::try_from(*the_credentials.expiration()).ok(),
        })
    }
}
