use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = ".folio.toml";

/// Project configuration loaded from `.folio.toml`, with command-line
/// overrides applied on top.
#[derive(Debug, Clone)]
pub struct Config {
    /// Try to resolve bare lowercase words as references too.
    pub hyperlink_all: bool,
    /// Free page to move to the front of the document.
    pub main_page: Option<String>,
    /// Path of the JSON documentation model.
    pub model: PathBuf,
    /// Directory the document and landing page are written to.
    pub output: PathBuf,
    /// Page format.
    pub paper_size: PaperSize,
    /// Keep the leading `#` on displayed instance-method references.
    pub show_hash: bool,
    /// Append the target page number to every cross-reference.
    pub show_pages: bool,
    /// Title used for the landing page.
    pub title: Option<String>,
}

/// Raw TOML structure for `.folio.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct FolioTomlConfig {
    #[serde(default)]
    hyperlink_all: Option<bool>,
    #[serde(default)]
    main_page: Option<String>,
    #[serde(default)]
    model: Option<PathBuf>,
    #[serde(default)]
    output: Option<PathBuf>,
    #[serde(default)]
    paper_size: Option<String>,
    #[serde(default)]
    show_hash: Option<bool>,
    #[serde(default)]
    show_pages: Option<bool>,
    #[serde(default)]
    title: Option<String>,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--hyperlink-all`.
    pub hyperlink_all: bool,
    /// `--main-page`.
    pub main_page: Option<String>,
    /// `--model`.
    pub model: Option<PathBuf>,
    /// `--output`.
    pub output: Option<PathBuf>,
    /// `--paper-size`.
    pub paper_size: Option<String>,
    /// `--show-hash`.
    pub show_hash: bool,
    /// `--show-pages` / `--no-show-pages`.
    pub show_pages: Option<bool>,
}

/// Supported page formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperSize {
    /// ISO A4.
    A4,
    /// ISO A5.
    A5,
    /// US Legal.
    Legal,
    /// US Letter.
    Letter,
}

impl PaperSize {
    /// Width and height in PDF points.
    pub const fn dimensions(self) -> (f32, f32) {
        return match self {
            Self::A4 => (595.28, 841.89),
            Self::A5 => (419.53, 595.28),
            Self::Legal => (612.0, 1008.0),
            Self::Letter => (612.0, 792.0),
        };
    }
}

impl FromStr for PaperSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "a5" => Ok(Self::A5),
            "legal" => Ok(Self::Legal),
            "letter" => Ok(Self::Letter),
            _ => Err(Error::UnknownPaperSize { name: s.to_string() }),
        };
    }
}

/// The three switches the cross-referencer reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Resolve bare lowercase words too.
    pub hyperlink_all: bool,
    /// Keep the `#` sigil in displayed instance-method names.
    pub show_hash: bool,
    /// Append page numbers to references.
    pub show_pages: bool,
}

impl Config {
    /// Apply command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownPaperSize` if `--paper-size` names an unknown format.
    pub fn apply(mut self, overrides: Overrides) -> Result<Self, Error> {
        self.hyperlink_all |= overrides.hyperlink_all;
        self.show_hash |= overrides.show_hash;
        if let Some(show_pages) = overrides.show_pages {
            self.show_pages = show_pages;
        }
        if let Some(paper) = overrides.paper_size {
            self.paper_size = paper.parse()?;
        }
        if overrides.main_page.is_some() {
            self.main_page = overrides.main_page;
        }
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        return Ok(self);
    }

    /// Load `.folio.toml` from the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; never silently
    /// falls back to defaults when the user wrote a config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed, or `Error::UnknownPaperSize`.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Load an explicitly named config file, which must exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file is missing, otherwise as [`Config::load`].
    pub fn load_file(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// The switches relevant to cross-reference rendering.
    pub const fn options(&self) -> RenderOptions {
        return RenderOptions {
            hyperlink_all: self.hyperlink_all,
            show_hash: self.show_hash,
            show_pages: self.show_pages,
        };
    }

    /// Parse config TOML, filling in defaults for missing keys.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or `Error::UnknownPaperSize`.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: FolioTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        let paper_size = match raw.paper_size {
            None => defaults.paper_size,
            Some(name) => name.parse()?,
        };

        return Ok(Self {
            hyperlink_all: raw.hyperlink_all.unwrap_or(defaults.hyperlink_all),
            main_page: raw.main_page,
            model: raw.model.unwrap_or(defaults.model),
            output: raw.output.unwrap_or(defaults.output),
            paper_size,
            show_hash: raw.show_hash.unwrap_or(defaults.show_hash),
            show_pages: raw.show_pages.unwrap_or(defaults.show_pages),
            title: raw.title,
        });
    }
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            hyperlink_all: false,
            main_page: None,
            model: PathBuf::from("docs.json"),
            output: PathBuf::from("doc"),
            paper_size: PaperSize::A4,
            show_hash: false,
            show_pages: true,
            title: None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.show_pages);
        assert!(!config.show_hash);
        assert!(!config.hyperlink_all);
        assert_eq!(config.paper_size, PaperSize::A4);
        assert_eq!(config.model, PathBuf::from("docs.json"));
    }

    #[test]
    fn reads_all_keys() {
        let config = Config::parse(
            "show_pages = false\nshow_hash = true\nhyperlink_all = true\npaper_size = \"Letter\"\nmain_page = \"README.rdoc\"\ntitle = \"Demo\"\n",
        )
        .unwrap();
        assert_eq!(
            config.options(),
            RenderOptions { hyperlink_all: true, show_hash: true, show_pages: false }
        );
        assert_eq!(config.paper_size, PaperSize::Letter);
        assert_eq!(config.main_page.as_deref(), Some("README.rdoc"));
        assert_eq!(config.title.as_deref(), Some("Demo"));
    }

    #[test]
    fn unknown_key_is_an_error() {
        assert!(matches!(Config::parse("show_page = true"), Err(Error::TomlDe(_))));
    }

    #[test]
    fn unknown_paper_size_is_an_error() {
        assert!(matches!(
            Config::parse("paper_size = \"B7\""),
            Err(Error::UnknownPaperSize { .. })
        ));
    }

    #[test]
    fn overrides_win() {
        let overrides = Overrides {
            paper_size: Some("a5".to_string()),
            show_hash: true,
            show_pages: Some(false),
            ..Overrides::default()
        };
        let config = Config::default().apply(overrides).unwrap();
        assert_eq!(config.paper_size, PaperSize::A5);
        assert!(config.show_hash);
        assert!(!config.show_pages);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.show_pages);
        assert!(matches!(
            Config::load_file(&dir.path().join("nope.toml")),
            Err(Error::ConfigNotFound { .. })
        ));
    }
}
