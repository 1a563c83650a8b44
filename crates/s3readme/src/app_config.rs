//! 🔧 App Configuration: where a YAML file and a handful of env vars get
//! squeezed into one immutable struct.
//!
//! 📡 Every run starts here. No config file, no run. We'd rather fail on line one
//! than halfway through a conversation with STS. 🦆
//!
//! 🏗️ Figment does the merging. We just tell it where to look and in which order,
//! like a very opinionated tour guide.
//!
//! 🧠 Knowledge graph:
//! - File is REQUIRED. A missing file is fatal, and it is fatal before anybody talks to AWS.
//! - Env vars (`S3README_*`) are the base layer, the YAML file is merged on top. File wins.
//! - `iam_role_to_assume` absent / null / blank → ambient credentials. No role, no STS.
//! - Figment reads `S3README_ROLE_SESSION_NAME=12345` as a number; session names accept that.

use anyhow::{Context, bail};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Deserializer};
use std::path::Path;
use tracing::info;

/// 🏷️ The session name STS stamps on the assumed role. Shows up in CloudTrail,
/// so whoever audits this at 3am knows exactly which tool did it.
pub const DEFAULT_ROLE_SESSION_NAME: &str = "AssumeSbarRole";

/// 📦 The AppConfig: one struct to rule them all. Well, one optional ARN and some friends.
///
/// 🎯 Loaded once per invocation, immutable thereafter. Like a tattoo, but for settings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// 🎭 ARN of the IAM role to assume before listing. `None` = use whatever creds are lying around.
    #[serde(default)]
    pub iam_role_to_assume: Option<String>,
    /// 🏷️ Session name passed to STS AssumeRole
    #[serde(
        default = "default_role_session_name",
        deserialize_with = "deserialize_string_or_number"
    )]
    pub role_session_name: String,
    /// 🏠 Custom endpoint for S3 and STS (LocalStack, MinIO, a wiremock in a test).
    /// When set, path-style addressing is forced, because localhost has no subdomains.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// 📄 Stop listing after this many pages. `None` = read every page the bucket has.
    #[serde(default)]
    pub max_pages: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            iam_role_to_assume: None,
            role_session_name: default_role_session_name(),
            endpoint_url: None,
            max_pages: None,
        }
    }
}

impl AppConfig {
    /// 🎭 The role to assume, if any. Blank strings count as "no role", because
    /// `iam_role_to_assume: ""` is a cry for help, not an ARN.
    pub fn role_to_assume(&self) -> Option<&str> {
        self.iam_role_to_assume
            .as_deref()
            .map(str::trim)
            .filter(|arn| !arn.is_empty())
    }
}

fn default_role_session_name() -> String {
    DEFAULT_ROLE_SESSION_NAME.to_string()
}

/// 🔢 Accept `12345` as well as `"12345"`. Env values and unquoted YAML scalars
/// arrive typed, and a session name made of digits is still a session name.
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(text) => text,
        StringOrNumber::Unsigned(n) => n.to_string(),
        StringOrNumber::Signed(n) => n.to_string(),
        StringOrNumber::Float(n) => n.to_string(),
    })
}

/// 🚀 Load the config: env vars (`S3README_*`) first, the YAML file merged on top.
///
/// 💀 Errors if the file does not exist (checked up front, since figment would happily
/// treat a missing file as "no settings" and we'd go off to AWS with nothing) or if
/// the YAML is unparseable. Both errors name the path.
pub fn load_config(config_file: &Path) -> anyhow::Result<AppConfig> {
    info!("🔧 Loading configuration: {}", config_file.display());

    // 🔒 Validate the file exists before we get too emotionally attached
    let it_exists = config_file.try_exists().context(format!(
        "💀 Couldn't even check whether the config file exists at '{}'. \
         Permissions? A haunted NFS mount? Both?",
        config_file.display()
    ))?;
    if !it_exists {
        bail!(
            "💀 config does not exist at path: '{}'. If it's a relative path, \
             remember it's relative to your cwd, not to the binary.",
            config_file.display()
        );
    }

    // 🏗️ Env vars as the base layer, the file on top. File wins on conflicts.
    let the_figment = Figment::new()
        .merge(Env::prefixed("S3README_"))
        .merge(Yaml::file(config_file));

    the_figment.extract().context(format!(
        "💀 Failed to parse configuration from file '{}' and environment variables (S3README_*). \
         Either the YAML is malformed or one of the values has the wrong type; \
         the cause below names the key and where it came from.",
        config_file.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn the_one_where_the_role_arn_is_read_from_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                "iam_role_to_assume: arn:aws:iam::123456789012:role/readme-writer\n",
            )?;

            let the_config = load_config(Path::new("config.yaml"))
                .expect("💀 A one-line YAML file should parse. It's one line.");

            assert_eq!(
                the_config.role_to_assume(),
                Some("arn:aws:iam::123456789012:role/readme-writer")
            );
            assert_eq!(the_config.role_session_name, DEFAULT_ROLE_SESSION_NAME);
            assert_eq!(the_config.endpoint_url, None);
            assert_eq!(the_config.max_pages, None);
            Ok(())
        });
    }

    #[test]
    fn the_one_where_no_role_means_ambient_credentials() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "iam_role_to_assume: null\n")?;
            let the_null_config = load_config(Path::new("config.yaml"))
                .expect("💀 null is a perfectly valid YAML value. Sad, but valid.");
            assert_eq!(the_null_config.role_to_assume(), None);

            jail.create_file("blank.yaml", "iam_role_to_assume: '   '\n")?;
            let the_blank_config = load_config(Path::new("blank.yaml"))
                .expect("💀 Blank strings should parse.");
            assert_eq!(the_blank_config.role_to_assume(), None);

            jail.create_file("other.yaml", "some_unrelated_key: 42\n")?;
            let the_unrelated_config = load_config(Path::new("other.yaml"))
                .expect("💀 Unknown keys should be ignored, not cause a scene.");
            assert_eq!(the_unrelated_config, AppConfig::default());
            Ok(())
        });
    }

    #[test]
    fn the_one_where_the_config_file_ghosted_us() {
        Jail::expect_with(|_jail| {
            let the_error = load_config(Path::new("definitely-not-here.yaml"))
                .expect_err("💀 A missing config file must be fatal.");

            let the_message = format!("{the_error:#}");
            assert!(the_message.contains("config does not exist"), "{the_message}");
            assert!(the_message.contains("definitely-not-here.yaml"), "{the_message}");
            Ok(())
        });
    }

    #[test]
    fn the_one_where_the_yaml_is_a_crime_scene() {
        Jail::expect_with(|jail| {
            jail.create_file("broken.yaml", "iam_role_to_assume: [unclosed\n  : :\n")?;

            let the_error = load_config(Path::new("broken.yaml"))
                .expect_err("💀 Malformed YAML should not parse. It's malformed.");

            let the_message = format!("{the_error:#}");
            assert!(the_message.contains("Failed to parse configuration"), "{the_message}");
            assert!(the_message.contains("S3README_"), "{the_message}");
            assert!(the_message.contains("broken.yaml"), "{the_message}");
            Ok(())
        });
    }

    #[test]
    fn the_one_where_env_vars_fill_the_gaps_but_the_file_wins() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                "role_session_name: from-the-file\n",
            )?;
            jail.set_env("S3README_ROLE_SESSION_NAME", "from-the-env");
            jail.set_env("S3README_ENDPOINT_URL", "http://localhost:4566");
            jail.set_env("S3README_MAX_PAGES", "3");

            let the_config = load_config(Path::new("config.yaml"))
                .expect("💀 Env + file should merge without drama.");

            assert_eq!(the_config.role_session_name, "from-the-file");
            assert_eq!(the_config.endpoint_url.as_deref(), Some("http://localhost:4566"));
            assert_eq!(the_config.max_pages, Some(3));
            Ok(())
        });
    }

    #[test]
    fn the_one_where_a_session_name_made_of_digits_survives_the_env() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "{}\n")?;
            jail.set_env("S3README_ROLE_SESSION_NAME", "12345");

            let the_config = load_config(Path::new("config.yaml"))
                .expect("💀 12345 is a perfectly good STS session name. Figment just got excited.");

            assert_eq!(the_config.role_session_name, "12345");
            Ok(())
        });
    }

    #[test]
    fn the_one_where_an_unquoted_number_in_yaml_is_also_fine() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "role_session_name: 2024\n")?;

            let the_config = load_config(Path::new("config.yaml"))
                .expect("💀 An unquoted number is still a name.");

            assert_eq!(the_config.role_session_name, "2024");
            Ok(())
        });
    }
}
