//! 🚀 s3readme-cli: the part of s3readme that has to deal with humans.
//!
//! 🎬 argv goes in, prefixes come out on stdout, and everything we have to say
//! about it goes to stderr. If something breaks, you get the whole error chain,
//! a hint if we recognize the smell, and exit code 1. 🦆

mod args;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use args::{Cli, Command};

/// 🚀 main(): where it all begins. A current-thread runtime, because there is
/// exactly one request in flight at any time and it would be rude to spin up a pool for it.
///
/// 🔧 Steps:
/// 1. Init tracing (stderr, so stdout is nothing but prefixes)
/// 2. Parse args
/// 3. Run the subcommand
/// 4. Report: log the whole onion on failure, turn the outcome into an exit code
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // 📡 RUST_LOG wins if set; otherwise info. Logs go to stderr, output goes to stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let the_cli = Cli::parse();

    ExitCode::from(report_outcome(run(the_cli).await))
}

/// 🧾 Success is 0. Anything else gets logged cause by cause, maybe a hint, and 1.
fn report_outcome(outcome: Result<()>) -> u8 {
    let Err(err) = outcome else {
        return 0;
    };

    error!("💀 error: {}", err);
    // -- 🧅 every layer of context, outermost first
    for cause in err.chain().skip(1) {
        error!("⚠️  cause: {}", cause);
    }
    if let Some(the_hint) = hint_for(&err) {
        error!("🔧 hint: {}", the_hint);
    }
    1
}

/// 🎯 Dispatch. Config is only loaded for `init`; `write` has nothing to configure yet.
async fn run(the_cli: Cli) -> Result<()> {
    match the_cli.command {
        Command::Init {
            aws_region,
            bucket,
            prefix,
        } => {
            // 🔧 Config first. A missing file stops us here, before anyone talks to AWS.
            let the_app_config = s3readme::app_config::load_config(&the_cli.config)
                .context("💀 In s3readme-cli, we couldn't load the config file. Take a look at it.")?;

            let the_paths =
                s3readme::run_init(&the_app_config, &aws_region, &bucket, prefix.as_deref()).await?;

            let the_rendered = s3readme::output::render(&the_paths, the_cli.output)?;
            if !the_rendered.is_empty() {
                println!("{the_rendered}");
            }
            Ok(())
        }
        Command::Write => s3readme::run_write(),
    }
}

/// 🕵️ Sniff the error chain for the usual suspects and suggest where to look.
fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    let the_whole_story = format!("{err:#}");

    let smells_like_credentials = [
        "no credentials",
        "NoCredentials",
        "ExpiredToken",
        "InvalidClientTokenId",
        "credentials provider",
    ]
    .iter()
    .any(|needle| the_whole_story.contains(needle));
    if smells_like_credentials {
        return Some(
            "AWS couldn't figure out who you are. Set AWS_PROFILE or the AWS_ACCESS_KEY_ID / \
             AWS_SECRET_ACCESS_KEY env vars, or refresh your SSO session.",
        );
    }

    let smells_like_permissions = ["AccessDenied", "Forbidden"]
        .iter()
        .any(|needle| the_whole_story.contains(needle));
    if smells_like_permissions {
        return Some(
            "AWS knows who you are and said no anyway. Check the bucket policy, the IAM policy, \
             and (if you assume a role) the role's trust policy.",
        );
    }

    let smells_like_connectivity = [
        "dispatch failure",
        "connection refused",
        "Connection refused",
        "dns error",
        "timed out",
    ]
    .iter()
    .any(|needle| the_whole_story.contains(needle));
    if smells_like_connectivity {
        return Some(
            "looks like S3 (or STS) isn't reachable. Check the region, your network, and \
             `endpoint_url` if you're pointing at LocalStack.",
        );
    }

    None
}
