//! Typed grammar for the analyst console commands.
//!
//! Command strings route to exactly one variant through a token
//! parser; handlers dispatch on the variant, never on substring
//! sniffing of the raw input.
//!
//! Accepted forms (keywords are case-insensitive):
//!
//! ```text
//! scan <target>
//! cloud [audit] [<profile>]        # profile defaults to "default"
//! check cloud [<profile>]
//! web [inspect] <url>
//! inspect web <url>
//! ```

use url::Url;

use crate::scanner::Capability;

/// One parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Probe a network target (IP or hostname).
    Scan { target: String },
    /// Audit a cloud profile's storage posture.
    CloudAudit { profile: String },
    /// Inspect a web endpoint's response headers.
    WebInspect { url: Url },
    /// Anything the grammar does not cover; carries the raw input so
    /// the caller can echo it back.
    Unknown { input: String },
}

impl Command {
    /// Parse a raw console line. Never fails: unparseable input is the
    /// `Unknown` variant, which is a first-class outcome.
    pub fn parse(input: &str) -> Self {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let keyword = |i: usize| tokens.get(i).map(|t| t.to_ascii_lowercase());

        match keyword(0).as_deref() {
            Some("scan") => match &tokens[1..] {
                [target] => Self::Scan {
                    target: target.to_string(),
                },
                _ => Self::unknown(input),
            },
            Some("cloud") => Self::parse_cloud(&tokens[1..], input),
            Some("check") if keyword(1).as_deref() == Some("cloud") => {
                Self::parse_cloud(&tokens[2..], input)
            }
            Some("web") => Self::parse_web(&tokens[1..], input),
            Some("inspect") => {
                if keyword(1).as_deref() == Some("web") {
                    Self::parse_web(&tokens[2..], input)
                } else {
                    Self::parse_web(&tokens[1..], input)
                }
            }
            _ => Self::unknown(input),
        }
    }

    fn parse_cloud(rest: &[&str], input: &str) -> Self {
        let rest = match rest {
            [first, tail @ ..] if first.eq_ignore_ascii_case("audit") => tail,
            other => other,
        };
        match rest {
            [] => Self::CloudAudit {
                profile: "default".into(),
            },
            [profile] => Self::CloudAudit {
                profile: profile.to_string(),
            },
            _ => Self::unknown(input),
        }
    }

    fn parse_web(rest: &[&str], input: &str) -> Self {
        let rest = match rest {
            [first, tail @ ..] if first.eq_ignore_ascii_case("inspect") => tail,
            other => other,
        };
        let [raw] = rest else {
            return Self::unknown(input);
        };
        match parse_url_lenient(raw) {
            Some(url) => Self::WebInspect { url },
            None => Self::unknown(input),
        }
    }

    fn unknown(input: &str) -> Self {
        Self::Unknown {
            input: input.to_string(),
        }
    }

    /// Which scanner capability serves this command. `Unknown` routes
    /// nowhere.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            Self::Scan { .. } => Some(Capability::Network),
            Self::CloudAudit { .. } => Some(Capability::Cloud),
            Self::WebInspect { .. } => Some(Capability::Web),
            Self::Unknown { .. } => None,
        }
    }

    /// The target identifier the scanner should receive.
    pub fn target(&self) -> Option<String> {
        match self {
            Self::Scan { target } => Some(target.clone()),
            Self::CloudAudit { profile } => Some(profile.clone()),
            Self::WebInspect { url } => Some(url.to_string()),
            Self::Unknown { .. } => None,
        }
    }
}

/// Parse a URL, retrying with an https scheme for bare hostnames.
fn parse_url_lenient(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(_) if !raw.contains("://") => Url::parse(&format!("https://{raw}")).ok(),
        Err(_) => None,
    }
}
