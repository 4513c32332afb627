//! Omit-fields setting commands.

use catsync_core::{OmitField, OmitFields};
use catsync_sync::SyncContext;
use clap::Subcommand;

/// Sub-commands available under `settings`.
#[derive(Debug, Subcommand)]
pub enum SettingsCommands {
    /// Print the fields currently excluded from reconciliation
    Show,
    /// Replace the omit-fields setting; pass no names to clear it
    Set {
        /// Comma-separated field names, e.g. price,image
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        omit: Vec<String>,
    },
}

pub(crate) async fn run(ctx: &SyncContext, command: SettingsCommands) -> anyhow::Result<()> {
    match command {
        SettingsCommands::Show => {
            let fields = ctx.settings().load_omit_fields().await?;
            print_fields(fields);
        }
        SettingsCommands::Set { omit } => {
            let (fields, ignored) = OmitFields::parse_lenient(&omit);
            if !ignored.is_empty() {
                let valid: Vec<&str> = OmitField::ALL.iter().map(|f| f.as_str()).collect();
                eprintln!(
                    "ignoring unknown fields: {} (valid: {})",
                    ignored.join(", "),
                    valid.join(", ")
                );
            }
            ctx.settings().save_omit_fields(fields).await?;
            ctx.sink()
                .info(format!("Omit fields saved: [{}]", fields.names().join(", ")))
                .await;
            print_fields(fields);
        }
    }
    Ok(())
}

fn print_fields(fields: OmitFields) {
    if fields.is_empty() {
        println!("omit fields: (none)");
    } else {
        println!("omit fields: {}", fields.names().join(", "));
    }
}
