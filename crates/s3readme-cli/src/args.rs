//! 🎛️ CLI arguments: argv, but with manners.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use s3readme::output::OutputFormat;

/// 🪣 List the top-level "folders" under a path in an S3 bucket,
/// optionally after assuming the IAM role named in the config file.
///
/// Examples:
///   s3readme init us-east-1 my-bucket
///   s3readme --output json init eu-west-1 my-bucket docs
#[derive(Parser, Debug)]
#[command(name = "s3readme")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// YAML config file (recognizes `iam_role_to_assume`)
    #[arg(short, long, env = "S3README_CONFIG", default_value = "config.yaml", global = true)]
    pub config: PathBuf,

    /// How to print the prefix list
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Lines, global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List the common prefixes under an optional path
    Init {
        /// AWS region the bucket lives in
        aws_region: String,
        /// Bucket name
        bucket: String,
        /// Path inside the bucket; a trailing `/` is added if missing
        prefix: Option<String>,
    },
    /// Push local READMEs to S3 (not implemented yet, does nothing)
    Write,
}
