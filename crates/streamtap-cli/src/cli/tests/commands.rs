//! Tests for pipe, copy, fetch, completions.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use clap_complete::Shell;
use std::path::Path;

#[test]
fn cli_parse_pipe_defaults() {
    match parse(&["streamtap", "pipe"]) {
        CliCommand::Pipe { length, lines } => {
            assert!(length.is_none());
            assert!(!lines);
        }
        _ => panic!("expected Pipe"),
    }
}

#[test]
fn cli_parse_pipe_length_lines() {
    match parse(&["streamtap", "pipe", "--length", "4096", "--lines"]) {
        CliCommand::Pipe { length, lines } => {
            assert_eq!(length, Some(4096));
            assert!(lines);
        }
        _ => panic!("expected Pipe with --length --lines"),
    }
}

#[test]
fn cli_parse_copy() {
    match parse(&["streamtap", "copy", "in.bin", "out.bin"]) {
        CliCommand::Copy { src, dst } => {
            assert_eq!(src, Path::new("in.bin"));
            assert_eq!(dst, Path::new("out.bin"));
        }
        _ => panic!("expected Copy"),
    }
}

#[test]
fn cli_parse_copy_requires_dst() {
    assert!(Cli::try_parse_from(["streamtap", "copy", "in.bin"]).is_err());
}

#[test]
fn cli_parse_fetch_drains_by_default() {
    match parse(&["streamtap", "fetch", "https://example.com/file.iso"]) {
        CliCommand::Fetch {
            url,
            output,
            headers,
        } => {
            assert_eq!(url, "https://example.com/file.iso");
            assert!(output.is_none());
            assert!(headers.is_empty());
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_output_and_headers() {
    match parse(&[
        "streamtap",
        "fetch",
        "https://example.com/a",
        "-o",
        "a.bin",
        "-H",
        "Accept: */*",
        "--header",
        "X-Token: t",
    ]) {
        CliCommand::Fetch {
            output, headers, ..
        } => {
            assert_eq!(output.as_deref(), Some(Path::new("a.bin")));
            assert_eq!(headers, vec!["Accept: */*", "X-Token: t"]);
        }
        _ => panic!("expected Fetch with -o and -H"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["streamtap", "completions", "bash"]) {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_parse_rejects_unknown_shell() {
    assert!(Cli::try_parse_from(["streamtap", "completions", "cmd"]).is_err());
}
