//! CLI parse tests.

use super::{endpoint, Cli, CliCommand};
use clap::Parser;
use urlgrab_core::logging::LogTarget;

pub(super) fn parse_cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

pub(super) fn parse(args: &[&str]) -> CliCommand {
    parse_cli(args).command
}


#[test]
fn endpoint_joins_base_and_route() {
    assert_eq!(
        endpoint("http://127.0.0.1:3000", "/api/download"),
        "http://127.0.0.1:3000/api/download"
    );
    assert_eq!(
        endpoint("https://relay.example.com/", "/api/download"),
        "https://relay.example.com/api/download"
    );
}

#[test]
fn log_target_per_command() {
    assert_eq!(parse(&["urlgrab", "serve"]).log_target(), LogTarget::StateFile);
    assert_eq!(
        parse(&["urlgrab", "info", "https://example.com/a"]).log_target(),
        LogTarget::Stderr
    );
}
