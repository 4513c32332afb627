use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["catsync-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["catsync-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["catsync-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_fetch_command() {
    let cli = Cli::try_parse_from(["catsync-cli", "fetch"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Fetch)));
}

#[test]
fn import_defaults_to_single_batch_from_zero() {
    let cli = Cli::try_parse_from(["catsync-cli", "import"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Import {
            offset: 0,
            all: false,
            delay_ms: 0
        })
    ));
}

#[test]
fn import_accepts_offset_all_and_delay() {
    let cli = Cli::try_parse_from([
        "catsync-cli",
        "import",
        "--offset",
        "20",
        "--all",
        "--delay-ms",
        "250",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Import {
            offset: 20,
            all: true,
            delay_ms: 250
        })
    ));
}

#[test]
fn import_rejects_negative_offset() {
    assert!(Cli::try_parse_from(["catsync-cli", "import", "--offset", "-1"]).is_err());
}

#[test]
fn refresh_requires_external_id() {
    assert!(Cli::try_parse_from(["catsync-cli", "refresh"]).is_err());

    let cli = Cli::try_parse_from(["catsync-cli", "refresh", "ZC-100"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Refresh { ref external_id }) if external_id == "ZC-100"
    ));
}

#[test]
fn settings_set_splits_comma_separated_fields() {
    let cli =
        Cli::try_parse_from(["catsync-cli", "settings", "set", "--omit", "price,image"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Settings {
            command: SettingsCommands::Set { ref omit }
        }) if omit == &["price", "image"]
    ));
}

#[test]
fn settings_set_without_names_clears() {
    let cli = Cli::try_parse_from(["catsync-cli", "settings", "set", "--omit"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Settings {
            command: SettingsCommands::Set { ref omit }
        }) if omit.is_empty()
    ));
}

#[test]
fn log_tail_defaults_to_fifty() {
    let cli = Cli::try_parse_from(["catsync-cli", "log", "tail"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Log {
            command: LogCommands::Tail { limit: 50 }
        })
    ));
}

#[test]
fn log_prune_days_is_optional() {
    let cli = Cli::try_parse_from(["catsync-cli", "log", "prune"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Log {
            command: LogCommands::Prune { days: None }
        })
    ));

    let cli = Cli::try_parse_from(["catsync-cli", "log", "prune", "--days", "7"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Log {
            command: LogCommands::Prune { days: Some(7) }
        })
    ));
}
