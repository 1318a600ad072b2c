//! Command line of the copier: seven positional parameters, parsed once into an immutable
//! [`CopyRequest`].

use std::ffi::OsString;
use std::fmt::{self, Formatter};
use std::iter::Peekable;
use std::net::{IpAddr, SocketAddr};
use std::str::Chars;

use clap::error::ErrorKind;
use clap::Parser;
use derivative::Derivative;
use derive_more::{Constructor, Display};
use itertools::Itertools;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 9042;
pub const DEFAULT_PAGE_SIZE: i32 = 5000;

const EXAMPLE: &str = "e.g.:\n\
    keyspace-copy holmes_totem holmes results \"service_name = 'yara'\" \
    \"['10.0.4.80','10.0.4.81','10.0.4.82']\" cassandra password";

/// Raw command line. Positional order is part of the interface and must not change. Positionals
/// may start with `-`; the optional flags go after them.
#[derive(Derivative, Parser)]
#[derivative(Debug)]
#[command(
    name = "keyspace-copy",
    about = "Copies the rows of TABLE matching SELECTOR from KEYSPACE_FROM into KEYSPACE_TO",
    after_help = EXAMPLE
)]
pub struct Cli {
    /// Keyspace the rows are read from.
    #[arg(value_name = "KEYSPACE_FROM", allow_hyphen_values = true)]
    pub source_keyspace: String,
    /// Keyspace the rows are written to.
    #[arg(value_name = "KEYSPACE_TO", allow_hyphen_values = true)]
    pub dest_keyspace: String,
    /// Table name, identical in both keyspaces.
    #[arg(value_name = "TABLE", allow_hyphen_values = true)]
    pub table: String,
    /// CQL filter placed verbatim after WHERE. Trusted input only.
    #[arg(value_name = "SELECTOR", allow_hyphen_values = true)]
    pub predicate: String,
    /// List literal of cluster endpoints, e.g. "['10.0.4.80','10.0.4.81']".
    #[arg(value_name = "CLUSTER_IPS", allow_hyphen_values = true)]
    pub cluster_ips: String,
    #[arg(value_name = "USERNAME", allow_hyphen_values = true)]
    pub username: String,
    #[arg(value_name = "PASSWORD", allow_hyphen_values = true)]
    #[derivative(Debug = "ignore")]
    pub password: String,
    /// Rows fetched per page from the source keyspace.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(i32).range(1..))]
    pub page_size: i32,
    /// Port used for endpoints listed without one.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

/// Usage text printed on any argument error.
pub fn usage(program: &str) -> String {
    format!(
        "USAGE: {program} KEYSPACE_FROM KEYSPACE_TO TABLE SELECTOR CLUSTER_IPS USERNAME PASSWORD\n{}",
        EXAMPLE.replacen("keyspace-copy", program, 1)
    )
}

/// Parses a full argument vector, program name included.
pub fn parse_args<I, T>(args: I) -> Result<CopyRequest>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|error| match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            Error::Help(error.render().to_string())
        }
        _ => Error::Usage(error.to_string()),
    })?;

    CopyRequest::try_from(cli)
}

/// Filter clause supplied by the operator.
///
/// The fragment is spliced into `SELECT .. WHERE <predicate>` without any escaping or
/// validation, so it must only ever come from a trusted operator, never from untrusted input.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub struct RawPredicate(String);

impl RawPredicate {
    pub fn trusted(predicate: String) -> Self {
        RawPredicate(predicate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plain-text credentials for the cluster.
#[derive(Clone, Constructor, Derivative)]
#[derivative(Debug)]
pub struct Credentials {
    pub username: String,
    #[derivative(Debug = "ignore")]
    pub password: String,
}

/// A single cluster contact point.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Endpoint {
            host: host.into(),
            port,
        }
    }

    /// Parses `host`, `host:port`, `ip`, or `[ipv6]:port`. Missing ports fall back to
    /// `default_port`.
    pub fn parse(entry: &str, default_port: u16) -> Result<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(Error::InvalidClusterList("empty endpoint".into()));
        }

        if let Ok(addr) = entry.parse::<SocketAddr>() {
            return Ok(Endpoint::new(addr.ip().to_string(), addr.port()));
        }

        if let Ok(ip) = entry.parse::<IpAddr>() {
            return Ok(Endpoint::new(ip.to_string(), default_port));
        }

        match entry.rsplit_once(':') {
            None => Ok(Endpoint::new(entry, default_port)),
            Some((host, port)) if !host.is_empty() && !host.contains(':') => port
                .parse()
                .map(|port| Endpoint::new(host, port))
                .map_err(|_| Error::InvalidClusterList(format!("invalid port in '{entry}'"))),
            Some(_) => Err(Error::InvalidClusterList(format!(
                "invalid endpoint '{entry}'"
            ))),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Everything needed for one run. Built once from the command line, never modified.
#[derive(Clone, Debug)]
pub struct CopyRequest {
    pub source_keyspace: String,
    pub dest_keyspace: String,
    pub table: String,
    pub predicate: RawPredicate,
    pub cluster: Vec<Endpoint>,
    pub credentials: Credentials,
    pub page_size: i32,
}

impl CopyRequest {
    /// Human-readable description shown before asking for confirmation.
    pub fn summary(&self) -> String {
        format!(
            "Copying from keyspace '{}' to '{}' on cluster [{}]: Table '{}' where \"{}\".",
            self.source_keyspace,
            self.dest_keyspace,
            self.cluster.iter().join(", "),
            self.table,
            self.predicate
        )
    }
}

impl TryFrom<Cli> for CopyRequest {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self> {
        let cluster = parse_cluster_list(&cli.cluster_ips, cli.port)?;

        Ok(CopyRequest {
            source_keyspace: cli.source_keyspace,
            dest_keyspace: cli.dest_keyspace,
            table: cli.table,
            predicate: RawPredicate::trusted(cli.predicate),
            cluster,
            credentials: Credentials::new(cli.username, cli.password),
            page_size: cli.page_size,
        })
    }
}

/// Parses a list literal of quoted strings, e.g. `['10.0.4.80','10.0.4.81']`, into endpoints.
pub fn parse_cluster_list(literal: &str, default_port: u16) -> Result<Vec<Endpoint>> {
    let entries = parse_string_list(literal)
        .ok_or_else(|| Error::InvalidClusterList(format!("cannot parse {literal}")))?;

    if entries.is_empty() {
        return Err(Error::InvalidClusterList("the list is empty".into()));
    }

    entries
        .iter()
        .map(|entry| Endpoint::parse(entry, default_port))
        .collect()
}

fn parse_string_list(literal: &str) -> Option<Vec<String>> {
    let mut chars = literal.trim().chars().peekable();
    if chars.next()? != '[' {
        return None;
    }

    let mut entries = vec![];
    loop {
        skip_whitespace(&mut chars);
        match chars.next()? {
            ']' => break,
            quote @ ('\'' | '"') => {
                entries.push(read_quoted(&mut chars, quote)?);

                skip_whitespace(&mut chars);
                match chars.next()? {
                    ',' => continue,
                    ']' => break,
                    _ => return None,
                }
            }
            _ => return None,
        }
    }

    // trailing garbage after the closing bracket
    if chars.next().is_some() {
        return None;
    }

    Some(entries)
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> Option<String> {
    let mut value = String::new();
    loop {
        match chars.next()? {
            c if c == quote => return Some(value),
            '\\' => match chars.next()? {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                c @ ('\\' | '\'' | '"') => value.push(c),
                c => {
                    value.push('\\');
                    value.push(c);
                }
            },
            c => value.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cluster: &str) -> Vec<String> {
        [
            "keyspace-copy",
            "holmes_totem",
            "holmes",
            "results",
            "service_name = 'yara'",
            cluster,
            "cassandra",
            "secret",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn should_parse_valid_arguments() {
        let request = parse_args(args("['10.0.4.80','10.0.4.81']")).unwrap();

        assert_eq!(request.source_keyspace, "holmes_totem");
        assert_eq!(request.dest_keyspace, "holmes");
        assert_eq!(request.table, "results");
        assert_eq!(request.predicate.as_str(), "service_name = 'yara'");
        assert_eq!(
            request.cluster,
            vec![
                Endpoint::new("10.0.4.80", DEFAULT_PORT),
                Endpoint::new("10.0.4.81", DEFAULT_PORT)
            ]
        );
        assert_eq!(request.credentials.username, "cassandra");
        assert_eq!(request.credentials.password, "secret");
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn should_reject_wrong_argument_count() {
        let mut short = args("['10.0.4.80']");
        short.pop();
        assert!(parse_args(short).unwrap_err().is_usage());

        let mut long = args("['10.0.4.80']");
        long.push("extra".into());
        assert!(parse_args(long).unwrap_err().is_usage());
    }

    #[test]
    fn should_reject_malformed_cluster_list() {
        for literal in [
            "10.0.4.80",
            "'10.0.4.80'",
            "['10.0.4.80'",
            "[10.0.4.80]",
            "['10.0.4.80' '10.0.4.81']",
            "['10.0.4.80'] x",
            "[,]",
            "[]",
        ] {
            let error = parse_args(args(literal)).unwrap_err();
            assert!(
                matches!(error, Error::InvalidClusterList(_)),
                "{literal} gave {error:?}"
            );
        }
    }

    #[test]
    fn should_accept_list_literal_variants() {
        let endpoints =
            parse_cluster_list(r#" [ "node1" , 'node2:9142', "10.0.0.1",] "#, 9042).unwrap();

        assert_eq!(
            endpoints,
            vec![
                Endpoint::new("node1", 9042),
                Endpoint::new("node2", 9142),
                Endpoint::new("10.0.0.1", 9042),
            ]
        );
    }

    #[test]
    fn should_handle_escapes_in_quoted_entries() {
        assert_eq!(
            parse_string_list(r#"['a\'b', "c\"d", 'e\\f']"#).unwrap(),
            vec!["a'b", "c\"d", "e\\f"]
        );
        assert!(parse_string_list(r"['abc\']").is_none());
    }

    #[test]
    fn should_parse_ipv6_endpoints() {
        let bare = Endpoint::parse("::1", 9042).unwrap();
        assert_eq!(bare, Endpoint::new("::1", 9042));
        assert_eq!(bare.to_string(), "[::1]:9042");

        let with_port = Endpoint::parse("[fe80::1]:9100", 9042).unwrap();
        assert_eq!(with_port, Endpoint::new("fe80::1", 9100));

        assert!(Endpoint::parse("fe80::zz", 9042).is_err());
        assert!(Endpoint::parse("host:port", 9042).is_err());
    }

    #[test]
    fn should_apply_port_flag() {
        let mut argv = args("['10.0.4.80']");
        argv.extend(["--port".to_string(), "19042".to_string()]);

        let request = parse_args(argv).unwrap();
        assert_eq!(request.cluster, vec![Endpoint::new("10.0.4.80", 19042)]);
    }

    #[test]
    fn should_reject_zero_page_size() {
        let mut argv = args("['10.0.4.80']");
        argv.extend(["--page-size".to_string(), "0".to_string()]);

        assert!(parse_args(argv).unwrap_err().is_usage());
    }

    #[test]
    fn should_accept_positionals_starting_with_hyphen() {
        let mut argv = args("['10.0.4.80']");
        argv[4] = "-1 < score".into();
        argv[7] = "-s3cret".into();

        let request = parse_args(argv).unwrap();

        assert_eq!(request.predicate.as_str(), "-1 < score");
        assert_eq!(request.credentials.password, "-s3cret");
    }

    #[test]
    fn should_parse_flags_after_hyphen_positionals() {
        let mut argv = args("['10.0.4.80']");
        argv[7] = "--not-a-flag".into();
        argv.extend(["--page-size".to_string(), "100".to_string()]);

        let request = parse_args(argv).unwrap();

        assert_eq!(request.credentials.password, "--not-a-flag");
        assert_eq!(request.page_size, 100);
    }

    #[test]
    fn should_render_help() {
        match parse_args(["keyspace-copy", "--help"]) {
            Err(Error::Help(text)) => assert!(text.contains("KEYSPACE_FROM")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn should_hide_password_in_debug_output() {
        let request = parse_args(args("['10.0.4.80']")).unwrap();
        assert!(!format!("{request:?}").contains("secret"));
    }

    #[test]
    fn should_describe_request() {
        let request = parse_args(args("['10.0.4.80','10.0.4.81']")).unwrap();

        assert_eq!(
            request.summary(),
            "Copying from keyspace 'holmes_totem' to 'holmes' on cluster \
             [10.0.4.80:9042, 10.0.4.81:9042]: Table 'results' where \"service_name = 'yara'\"."
        );
    }

    #[test]
    fn should_name_program_in_usage() {
        let text = usage("copy");
        assert!(text.starts_with("USAGE: copy KEYSPACE_FROM KEYSPACE_TO TABLE SELECTOR"));
        assert!(text.contains("copy holmes_totem holmes results"));
    }
}
