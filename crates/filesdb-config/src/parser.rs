//! Parser for pacman-style mirror configuration files.
//!
//! The format is line oriented:
//!
//! ```text
//! [options]
//! Architecture = auto
//!
//! [core]
//! Server = https://mirror.example.org/$repo/os/$arch
//! Include = /etc/pacman.d/mirrorlist
//! ```
//!
//! Everything from `#` to the end of a line is a comment. A `[name]` header opens a
//! repository, except for the reserved `[options]` section whose directives never
//! produce repositories. `Server` directives append a mirror to the open repository;
//! `Include` directives splice in the `Server` lines of another file at that point.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use filesdb_utils::path::resolve_path;
use tracing::{debug, trace, warn};

use crate::{
    error::{ConfigError, Result},
    repository::Repository,
};

const OPTIONS_SECTION: &str = "options";
const SERVER_KEY: &str = "Server";
const INCLUDE_KEY: &str = "Include";

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Section(&'a str),
    Directive { key: &'a str, value: &'a str },
    Other(&'a str),
}

impl<'a> Line<'a> {
    /// Classifies a raw line, returning `None` when nothing is left after
    /// stripping the comment and surrounding whitespace.
    fn classify(raw: &'a str) -> Option<Self> {
        let line = raw.split_once('#').map_or(raw, |(before, _)| before).trim();

        if line.is_empty() {
            return None;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            return Some(Line::Section(name));
        }

        match line.split_once('=') {
            Some((key, value)) => {
                Some(Line::Directive {
                    key: key.trim(),
                    value: value.trim(),
                })
            }
            None => Some(Line::Other(line)),
        }
    }
}

/// Line-processing state for a single parse run.
#[derive(Default)]
struct ParserState {
    section: Option<String>,
    in_options: bool,
    current: Option<usize>,
    repos: Vec<Repository>,
}

impl ParserState {
    fn feed(&mut self, raw: &str) {
        let Some(line) = Line::classify(raw) else {
            return;
        };

        match line {
            Line::Section(name) => self.open_section(name),
            Line::Directive {
                key,
                value,
            } => self.directive(key, value),
            Line::Other(other) => trace!("ignoring line without directive: {}", other),
        }
    }

    fn open_section(&mut self, name: &str) {
        self.section = Some(name.to_string());
        self.in_options = name == OPTIONS_SECTION;

        if self.in_options {
            self.current = None;
            return;
        }

        if name.is_empty() {
            warn!("ignoring section with an empty name");
            self.current = None;
            return;
        }

        if let Some(idx) = self.repos.iter().position(|repo| repo.name == name) {
            debug!("section [{}] repeated, appending to the existing repository", name);
            self.current = Some(idx);
        } else {
            self.repos.push(Repository::new(name));
            self.current = Some(self.repos.len() - 1);
        }
    }

    fn directive(&mut self, key: &str, value: &str) {
        if self.in_options {
            trace!("[options] {} = {}", key, value);
            return;
        }

        let Some(repo) = self.current.and_then(|idx| self.repos.get_mut(idx)) else {
            debug!("discarding `{}` outside of any repository section", key);
            return;
        };

        match key {
            SERVER_KEY => push_server(repo, value),
            INCLUDE_KEY => {
                for server in include_servers(value) {
                    push_server(repo, &server);
                }
            }
            _ => {
                trace!(
                    "ignoring `{}` in [{}]",
                    key,
                    self.section.as_deref().unwrap_or_default()
                )
            }
        }
    }

    fn finish(self) -> Vec<Repository> {
        self.repos
    }
}

fn push_server(repo: &mut Repository, server: &str) {
    if server.is_empty() {
        warn!("ignoring empty Server in [{}]", repo.name);
        return;
    }
    repo.add_server(server);
}

/// Reads every line of `reader`, decoding invalid UTF-8 lossily.
fn for_each_line<R, F>(mut reader: R, mut f: F) -> std::io::Result<()>
where
    R: BufRead,
    F: FnMut(&str),
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        f(&String::from_utf8_lossy(&buf));
    }
}

/// Collects the `Server` values of an included file, in file order.
///
/// Section headers and other keys are ignored. An unreadable include is reported
/// and contributes nothing.
fn include_servers(value: &str) -> Vec<String> {
    let mut servers = Vec::new();

    let path = match resolve_path(value) {
        Ok(path) => path,
        Err(err) => {
            warn!(
                "{}",
                ConfigError::IncludeAccess {
                    path: value.into(),
                    reason: err.to_string(),
                }
            );
            return servers;
        }
    };

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(err) => {
            warn!(
                "{}",
                ConfigError::IncludeAccess {
                    path,
                    reason: err.to_string(),
                }
            );
            return servers;
        }
    };

    let result = for_each_line(BufReader::new(file), |raw| {
        if let Some(Line::Directive {
            key: SERVER_KEY,
            value,
        }) = Line::classify(raw)
        {
            servers.push(value.to_string());
        }
    });

    if let Err(err) = result {
        warn!(
            "{}",
            ConfigError::IncludeAccess {
                path: path.clone(),
                reason: err.to_string(),
            }
        );
    }

    debug!("{} servers from {}", servers.len(), path.display());
    servers
}

/// Parses mirror configuration held in memory.
pub fn parse_str(content: &str) -> Vec<Repository> {
    let mut state = ParserState::default();
    content.lines().for_each(|line| state.feed(line));
    state.finish()
}

/// Parses mirror configuration from a buffered reader.
///
/// `origin` is only used for error reporting.
pub fn parse_reader<R: BufRead>(reader: R, origin: &Path) -> Result<Vec<Repository>> {
    let mut state = ParserState::default();
    for_each_line(reader, |line| state.feed(line)).map_err(|source| {
        ConfigError::Read {
            path: origin.to_path_buf(),
            source,
        }
    })?;
    Ok(state.finish())
}

/// Parses the mirror configuration at `path` into repositories in file order.
///
/// # Errors
///
/// Returns [`ConfigError::ConfigAccess`] if the file cannot be opened. Unreadable
/// include files are only reported.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Repository>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| {
        ConfigError::ConfigAccess {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!("parsing mirror configuration {}", path.display());
    let repos = parse_reader(BufReader::new(file), path)?;
    debug!("found {} repositories", repos.len());

    Ok(repos)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn servers_of<'a>(repos: &'a [Repository], name: &str) -> &'a [String] {
        &repos
            .iter()
            .find(|r| r.name == name)
            .expect("repository present")
            .servers
    }

    #[test]
    fn test_classify() {
        assert_eq!(Line::classify("   "), None);
        assert_eq!(Line::classify("# only a comment"), None);
        assert_eq!(Line::classify("[core]"), Some(Line::Section("core")));
        assert_eq!(Line::classify("  [ core ]  "), Some(Line::Section(" core ")));
        assert_eq!(
            Line::classify("  Server =  https://a/$repo  # trailing"),
            Some(Line::Directive {
                key: "Server",
                value: "https://a/$repo"
            })
        );
        assert_eq!(
            Line::classify("Key=a=b"),
            Some(Line::Directive {
                key: "Key",
                value: "a=b"
            })
        );
        assert_eq!(Line::classify("ILoveCandy"), Some(Line::Other("ILoveCandy")));
    }

    #[test]
    fn test_servers_follow_latest_section() {
        let repos = parse_str(
            "\
[core]
Server = https://one.example/$repo/os/$arch
Server = https://two.example/$repo/os/$arch

[extra]
Server = https://one.example/$repo/os/$arch
",
        );

        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "core");
        assert_eq!(
            repos[0].servers,
            [
                "https://one.example/$repo/os/$arch",
                "https://two.example/$repo/os/$arch"
            ]
        );
        assert_eq!(repos[1].name, "extra");
        assert_eq!(repos[1].servers.len(), 1);
    }

    #[test]
    fn test_options_and_orphans_dropped() {
        let repos = parse_str(
            "\
Server = https://orphan.example
[options]
Architecture = auto
Server = https://options.example
Include = /does/not/matter
[core]
Server = https://core.example
",
        );

        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "core");
        assert_eq!(repos[0].servers, ["https://core.example"]);
    }

    #[test]
    fn test_section_without_servers() {
        let repos = parse_str("[core]\n[extra]\nServer = https://e\n");
        assert_eq!(repos.len(), 2);
        assert!(repos[0].servers.is_empty());
    }

    #[test]
    fn test_unknown_keys_and_comments_ignored() {
        let repos = parse_str(
            "\
# [commented]
[core] # the core repo
SigLevel = Required
Server = https://a # mirror a
#Server = https://disabled
",
        );
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].servers, ["https://a"]);
    }

    #[test]
    fn test_include_inserted_at_directive() {
        let dir = tempdir().unwrap();
        let mirrorlist = dir.path().join("mirrorlist");
        fs::write(
            &mirrorlist,
            "\
## Worldwide
[ignored-section]
Server = https://m1.example/$repo/os/$arch
SigLevel = Never
#Server = https://commented.example
Server = https://m2.example/$repo/os/$arch
",
        )
        .unwrap();

        let conf = format!(
            "[core]\nServer = https://before\nInclude = {}\nServer = https://after\n",
            mirrorlist.display()
        );
        let repos = parse_str(&conf);

        assert_eq!(repos.len(), 1);
        assert_eq!(
            servers_of(&repos, "core"),
            [
                "https://before",
                "https://m1.example/$repo/os/$arch",
                "https://m2.example/$repo/os/$arch",
                "https://after"
            ]
        );
    }

    #[test]
    fn test_missing_include_continues() {
        let repos = parse_str(
            "\
[core]
Include = /nonexistent/filesdb/mirrorlist
Server = https://still-here
[extra]
Server = https://extra
",
        );
        assert_eq!(servers_of(&repos, "core"), ["https://still-here"]);
        assert_eq!(servers_of(&repos, "extra"), ["https://extra"]);
    }

    #[test]
    fn test_repeated_section_appends() {
        let repos = parse_str("[core]\nServer = a\n[extra]\nServer = b\n[core]\nServer = c\n");
        assert_eq!(repos.len(), 2);
        assert_eq!(servers_of(&repos, "core"), ["a", "c"]);
    }

    #[test]
    fn test_empty_section_name_ignored() {
        let repos = parse_str("[]\nServer = a\n[core]\nServer = b\n");
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].servers, ["b"]);
    }

    #[test]
    fn test_section_name_taken_verbatim() {
        let repos = parse_str("[ core ]\nServer = a\n[core]\nServer = b\n");
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, " core ");
        assert_eq!(servers_of(&repos, "core"), ["b"]);
    }

    #[test]
    fn test_crlf_lines() {
        let repos = parse_str("[core]\r\nServer = https://a\r\n");
        assert_eq!(repos[0].servers, ["https://a"]);
    }

    #[test]
    fn test_parse_file_missing() {
        let dir = tempdir().unwrap();
        let result = parse_file(dir.path().join("pacman.conf"));
        assert!(matches!(result, Err(ConfigError::ConfigAccess { .. })));
    }

    #[test]
    fn test_parse_file_is_idempotent() {
        let dir = tempdir().unwrap();
        let mirrorlist = dir.path().join("mirrorlist");
        fs::write(&mirrorlist, "Server = https://m1\nServer = https://m2\n").unwrap();
        let conf = dir.path().join("pacman.conf");
        fs::write(
            &conf,
            format!(
                "[options]\nHoldPkg = pacman\n[core]\nInclude = {}\n[extra]\nInclude = {}\n",
                mirrorlist.display(),
                mirrorlist.display()
            ),
        )
        .unwrap();

        let first = parse_file(&conf).unwrap();
        let second = parse_file(&conf).unwrap();
        assert_eq!(first, second);
        assert_eq!(servers_of(&first, "extra"), ["https://m1", "https://m2"]);
    }

    #[test]
    fn test_parse_reader_invalid_utf8() {
        let input: &[u8] = b"[core]\nServer = https://a\xff\n";
        let repos = parse_reader(input, Path::new("memory")).unwrap();
        assert_eq!(repos[0].servers.len(), 1);
        assert!(repos[0].servers[0].starts_with("https://a"));
    }
}
