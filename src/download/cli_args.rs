//! Translation of raw downloader command-line flags into API option overrides.

use serde_json::{Map, Value};

use crate::error::{FetchError, FetchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Flag sets the key to `true`.
    Switch,
    /// Flag sets the key to `false`.
    SwitchOff,
    /// Flag takes a string value.
    Text,
    /// Flag takes an integer value; non-integers are kept as text.
    Number,
}

#[derive(Debug)]
pub struct FlagSpec {
    /// Canonical spelling first.
    pub flags: &'static [&'static str],
    pub key: &'static str,
    pub kind: ArgKind,
}

const KNOWN_FLAGS: &[FlagSpec] = &[
    FlagSpec { flags: &["--format", "-f"], key: "format", kind: ArgKind::Text },
    FlagSpec { flags: &["--playlist-start"], key: "playliststart", kind: ArgKind::Number },
    FlagSpec { flags: &["--playlist-end"], key: "playlistend", kind: ArgKind::Number },
    FlagSpec { flags: &["--output", "-o"], key: "outtmpl", kind: ArgKind::Text },
    FlagSpec { flags: &["--audio-quality"], key: "audioquality", kind: ArgKind::Number },
    FlagSpec { flags: &["--playlist-random"], key: "playlist_random", kind: ArgKind::Switch },
    FlagSpec { flags: &["--windows-filenames"], key: "windowsfilenames", kind: ArgKind::Switch },
    FlagSpec { flags: &["--restrict-filenames"], key: "restrictfilenames", kind: ArgKind::Switch },
    FlagSpec { flags: &["--no-playlist"], key: "noplaylist", kind: ArgKind::Switch },
    FlagSpec { flags: &["--yes-playlist"], key: "noplaylist", kind: ArgKind::SwitchOff },
    FlagSpec { flags: &["--force-overwrites"], key: "overwrites", kind: ArgKind::Switch },
    FlagSpec { flags: &["--no-overwrites", "-w"], key: "overwrites", kind: ArgKind::SwitchOff },
    FlagSpec { flags: &["--proxy"], key: "proxy", kind: ArgKind::Text },
    FlagSpec { flags: &["--cookies"], key: "cookiefile", kind: ArgKind::Text },
    FlagSpec { flags: &["--limit-rate", "-r"], key: "ratelimit", kind: ArgKind::Text },
    FlagSpec { flags: &["--socket-timeout"], key: "socket_timeout", kind: ArgKind::Number },
    FlagSpec { flags: &["--max-downloads"], key: "max_downloads", kind: ArgKind::Number },
    FlagSpec {
        flags: &["--concurrent-fragments", "-N"],
        key: "concurrent_fragment_downloads",
        kind: ArgKind::Number,
    },
];

/// Option overrides produced from raw arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiOverrides {
    pub values: Map<String, Value>,
    /// Tokens with no known option key, in their original order.
    pub passthrough: Vec<String>,
}

/// Look up the flag that expresses `key = value`.
pub fn flag_for_key(key: &str, value: &Value) -> Option<&'static FlagSpec> {
    KNOWN_FLAGS.iter().find(|spec| {
        spec.key == key
            && match spec.kind {
                ArgKind::Switch => value.as_bool() == Some(true),
                ArgKind::SwitchOff => value.as_bool() == Some(false),
                ArgKind::Text | ArgKind::Number => !value.is_boolean(),
            }
    })
}

fn spec_for_flag(flag: &str) -> Option<&'static FlagSpec> {
    KNOWN_FLAGS.iter().find(|spec| spec.flags.contains(&flag))
}

/// Parse raw downloader flags (possibly spanning several lines) into overrides.
pub fn cli_to_api(raw: &str) -> FetchResult<ApiOverrides> {
    let tokens = split_args(raw)?;
    let mut overrides = ApiOverrides::default();
    let mut iter = tokens.into_iter();

    while let Some(token) = iter.next() {
        let (flag, inline_value) = match token.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (token.clone(), None),
        };

        let Some(spec) = spec_for_flag(&flag) else {
            overrides.passthrough.push(token);
            continue;
        };

        let value = match spec.kind {
            ArgKind::Switch => Value::Bool(true),
            ArgKind::SwitchOff => Value::Bool(false),
            ArgKind::Text | ArgKind::Number => {
                let raw_value = match inline_value {
                    Some(v) => v,
                    None => iter.next().ok_or_else(|| {
                        FetchError::InvalidInput(format!("{} expects a value", flag))
                    })?,
                };
                if spec.kind == ArgKind::Number {
                    raw_value
                        .parse::<i64>()
                        .map(Value::from)
                        .unwrap_or(Value::String(raw_value))
                } else {
                    Value::String(raw_value)
                }
            }
        };
        overrides.values.insert(spec.key.to_string(), value);
    }

    Ok(overrides)
}

/// Split a string into arguments following POSIX shell quoting rules.
pub fn split_args(raw: &str) -> FetchResult<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(unterminated('\'')),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\' | '$' | '`')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err(unterminated('"')),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(unterminated('"')),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(ch) = chars.next() {
                    // escaped newline is a line continuation
                    if ch != '\n' {
                        current.push(ch);
                    }
                }
            }
            other => {
                in_token = true;
                current.push(other);
            }
        }
    }
    if in_token {
        args.push(current);
    }
    Ok(args)
}

fn unterminated(quote: char) -> FetchError {
    FetchError::InvalidInput(format!("unterminated {} quote in downloader arguments", quote))
}
