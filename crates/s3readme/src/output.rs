//! 🖨️ Output: turning a `Vec<String>` into something a human (or `jq`) can read.
//!
//! Three flavors, like a very boring ice cream shop:
//! - `lines`: one prefix per line. Pipes into `xargs` like it was born for it.
//! - `json`: a JSON array. For the `jq` enjoyers.
//! - `table`: a comfy-table. For the screenshot-in-the-PR enjoyers.

use anyhow::{Context, Result};
use clap::ValueEnum;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};

/// 🎨 How the prefix list gets printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Lines,
    Json,
    Table,
}

/// 🖨️ Render `paths` in the requested format. No trailing newline; the caller `println!`s.
pub fn render(paths: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Lines => Ok(paths.join("\n")),
        OutputFormat::Json => serde_json::to_string(paths)
            .context("💀 Couldn't serialize a list of strings to JSON. Which should be impossible. And yet."),
        OutputFormat::Table => {
            let mut the_table = Table::new();
            the_table.load_preset(UTF8_FULL);
            the_table.set_content_arrangement(ContentArrangement::Dynamic);
            the_table.set_header(vec!["prefix"]);
            for path in paths {
                the_table.add_row(vec![path.as_str()]);
            }
            Ok(the_table.to_string())
        }
    }
}
