//! Share links and the port that opens them.
//!
//! Building a link is pure string work. Opening one is a side effect kept
//! behind [`Opener`] so everything else can be tested without a desktop.

use std::cell::RefCell;
use std::process::{Command, Stdio};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{debug, info};

use crate::config::ShareConfig;
use crate::error::{Error, Result};

/// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Messaging destination for a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    /// WhatsApp.
    WhatsApp,
    /// Telegram.
    Telegram,
}

impl ShareTarget {
    /// The configured link prefix for this target.
    #[must_use]
    pub fn template(self, config: &ShareConfig) -> &str {
        match self {
            Self::WhatsApp => &config.whatsapp_template,
            Self::Telegram => &config.telegram_template,
        }
    }
}

impl std::fmt::Display for ShareTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WhatsApp => write!(f, "WhatsApp"),
            Self::Telegram => write!(f, "Telegram"),
        }
    }
}

/// Percent-encode `text` the way `encodeURIComponent` does.
#[must_use]
pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// Build the share link for `transcript`.
#[must_use]
pub fn share_link(target: ShareTarget, config: &ShareConfig, transcript: &str) -> String {
    format!("{}{}", target.template(config), encode_component(transcript))
}

/// Opens a link in some external program. Fire and forget: no response
/// from the target is awaited.
pub trait Opener: std::fmt::Debug {
    /// Open `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the link could not be handed off.
    fn open(&self, url: &str) -> Result<()>;
}

/// Hands links to the platform URL handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl SystemOpener {
    #[cfg(target_os = "macos")]
    fn command(url: &str) -> Command {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    }

    #[cfg(target_os = "windows")]
    fn command(url: &str) -> Command {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    fn command(url: &str) -> Command {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

impl Opener for SystemOpener {
    fn open(&self, url: &str) -> Result<()> {
        let child = Self::command(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::open(url, e.to_string()))?;
        debug!("Spawned URL handler pid {}", child.id());
        Ok(())
    }
}

/// Prints links to stdout instead of opening them.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintOpener;

impl Opener for PrintOpener {
    fn open(&self, url: &str) -> Result<()> {
        info!("Printing share link instead of opening it");
        println!("{url}");
        Ok(())
    }
}

/// Remembers links instead of opening them.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: RefCell<Vec<String>>,
}

impl RecordingOpener {
    /// Create an opener with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Links opened so far, oldest first.
    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl Opener for RecordingOpener {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_component_matches_browser() {
        assert_eq!(encode_component("a b"), "a%20b");
        assert_eq!(encode_component("x\ny"), "x%0Ay");
        assert_eq!(encode_component("Jl. Merdeka"), "Jl.%20Merdeka");
        assert_eq!(encode_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_component("a:b/c?d&e=f#g"), "a%3Ab%2Fc%3Fd%26e%3Df%23g");
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn test_share_links() {
        let config = ShareConfig::default();
        assert_eq!(
            share_link(ShareTarget::WhatsApp, &config, "Hari : Senin"),
            "https://wa.me/?text=Hari%20%3A%20Senin"
        );
        assert_eq!(
            share_link(ShareTarget::Telegram, &config, "a&b"),
            "https://t.me/share/url?text=a%26b"
        );
    }

    #[test]
    fn test_custom_template() {
        let config = ShareConfig {
            whatsapp_template: "whatsapp://send?text=".to_string(),
            ..ShareConfig::default()
        };
        assert_eq!(
            share_link(ShareTarget::WhatsApp, &config, "hi"),
            "whatsapp://send?text=hi"
        );
    }

    #[test]
    fn test_share_target_display() {
        assert_eq!(ShareTarget::WhatsApp.to_string(), "WhatsApp");
        assert_eq!(ShareTarget::Telegram.to_string(), "Telegram");
    }

    #[test]
    fn test_recording_opener() {
        let opener = RecordingOpener::new();
        opener.open("https://wa.me/?text=a").unwrap();
        opener.open("https://t.me/share/url?text=b").unwrap();
        assert_eq!(
            opener.opened(),
            vec!["https://wa.me/?text=a", "https://t.me/share/url?text=b"]
        );
    }
}
