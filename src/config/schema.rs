use crate::error::{DocsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name looked up under the documentation root when no explicit path is
/// given.
pub const CONFIG_FILE: &str = "zelig-docs.toml";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "ZELIG_DOCS_CONFIG";

/// Resolved site configuration, constructed once at startup and handed to the
/// documentation renderer as a single immutable record.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct SiteConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub html: HtmlConfig,
    #[serde(default)]
    pub latex: LatexConfig,
    #[serde(default)]
    pub man: ManConfig,
    #[serde(default)]
    pub texinfo: TexinfoConfig,
    #[serde(default)]
    pub epub: EpubConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ProjectConfig {
    #[serde(default = "default_project_name")]
    pub name: String,
    #[serde(default = "default_project_copyright")]
    pub copyright: String,
    #[serde(default = "default_project_version")]
    pub version: String,
    #[serde(default = "default_project_release")]
    pub release: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct SourceConfig {
    #[serde(default = "default_master_doc")]
    pub master_doc: String,
    #[serde(default = "default_source_suffix")]
    pub suffix: String,
    #[serde(default = "default_templates_path")]
    pub templates_path: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_pygments_style")]
    pub pygments_style: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct HtmlConfig {
    #[serde(default = "default_html_theme")]
    pub theme: String,
    #[serde(default = "default_html_title")]
    pub title: String,
    #[serde(default = "default_static_path")]
    pub static_path: Vec<String>,
    #[serde(default)]
    pub show_sphinx: bool,
    #[serde(default = "default_docs_title")]
    pub help_basename: String,
    #[serde(default = "default_sidebars")]
    pub sidebars: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub theme_options: ThemeOptions,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ThemeOptions {
    #[serde(default = "default_navbar_site_name")]
    pub navbar_site_name: String,
    #[serde(default = "default_navbar_class")]
    pub navbar_class: String,
    // -1 shows all levels
    #[serde(default = "default_globaltoc_depth")]
    pub globaltoc_depth: i32,
    #[serde(default = "default_true")]
    pub globaltoc_includehidden: bool,
    #[serde(default = "default_source_link_position")]
    pub source_link_position: String,
    #[serde(default = "default_bootstrap_version")]
    pub bootstrap_version: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct LatexConfig {
    #[serde(default = "default_latex_target")]
    pub target: String,
    #[serde(default = "default_docs_title")]
    pub title: String,
    #[serde(default = "default_zelig_team")]
    pub author: String,
    #[serde(default = "default_document_class")]
    pub document_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ManConfig {
    #[serde(default = "default_man_name")]
    pub name: String,
    #[serde(default = "default_docs_title")]
    pub description: String,
    #[serde(default = "default_man_authors")]
    pub authors: Vec<String>,
    #[serde(default = "default_man_section")]
    pub section: u8,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct TexinfoConfig {
    #[serde(default = "default_texinfo_target")]
    pub target: String,
    #[serde(default = "default_docs_title")]
    pub title: String,
    #[serde(default = "default_zelig_team")]
    pub author: String,
    #[serde(default = "default_texinfo_target")]
    pub dir_entry: String,
    #[serde(default = "default_texinfo_description")]
    pub description: String,
    #[serde(default = "default_texinfo_category")]
    pub category: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct EpubConfig {
    #[serde(default = "default_epub_title")]
    pub title: String,
    #[serde(default = "default_zelig_team")]
    pub author: String,
    #[serde(default = "default_zelig_team")]
    pub publisher: String,
    #[serde(default = "default_epub_copyright")]
    pub copyright: String,
}

/// Knobs for the asset sync step
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct SyncConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

// Default value functions
fn default_project_name() -> String {
    "Zelig".to_string()
}
fn default_project_copyright() -> String {
    "2015, The President & Fellows of Harvard College".to_string()
}
fn default_project_version() -> String {
    "Version 5.0-3".to_string()
}
fn default_project_release() -> String {
    "5.0-3".to_string()
}
fn default_master_doc() -> String {
    "index".to_string()
}
fn default_source_suffix() -> String {
    ".rst".to_string()
}
fn default_templates_path() -> Vec<String> {
    vec!["_templates".to_string()]
}
fn default_extensions() -> Vec<String> {
    vec![
        "sphinx.ext.pngmath".to_string(),
        "sphinxcontrib.programoutput".to_string(),
    ]
}
fn default_pygments_style() -> String {
    "sphinx".to_string()
}
fn default_html_theme() -> String {
    "bootstrap".to_string()
}
fn default_html_title() -> String {
    "Zelig Project".to_string()
}
fn default_static_path() -> Vec<String> {
    vec!["_static".to_string()]
}
fn default_docs_title() -> String {
    "Zelig Documentation".to_string()
}
fn default_sidebars() -> BTreeMap<String, Vec<String>> {
    let mut sidebars = BTreeMap::new();
    sidebars.insert(
        "**".to_string(),
        vec!["searchbox.html".to_string(), "sidebartoc.html".to_string()],
    );
    sidebars
}
fn default_navbar_site_name() -> String {
    "Site".to_string()
}
fn default_navbar_class() -> String {
    "navbar-inverse".to_string()
}
fn default_globaltoc_depth() -> i32 {
    2
}
fn default_true() -> bool {
    true
}
fn default_source_link_position() -> String {
    "footer".to_string()
}
fn default_bootstrap_version() -> String {
    "3".to_string()
}
fn default_latex_target() -> String {
    "Zelig.tex".to_string()
}
fn default_zelig_team() -> String {
    "The Zelig Team".to_string()
}
fn default_document_class() -> String {
    "manual".to_string()
}
fn default_man_name() -> String {
    "zelig".to_string()
}
fn default_man_authors() -> Vec<String> {
    vec![default_zelig_team()]
}
fn default_man_section() -> u8 {
    1
}
fn default_texinfo_target() -> String {
    "Zelig".to_string()
}
fn default_texinfo_description() -> String {
    "One line description of project.".to_string()
}
fn default_texinfo_category() -> String {
    "Miscellaneous".to_string()
}
fn default_epub_title() -> String {
    "Zelig 5".to_string()
}
fn default_epub_copyright() -> String {
    "2015, The Zelig Team".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_attempts() -> u32 {
    3
}
fn default_backoff_ms() -> u64 {
    500
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            source: SourceConfig::default(),
            html: HtmlConfig::default(),
            latex: LatexConfig::default(),
            man: ManConfig::default(),
            texinfo: TexinfoConfig::default(),
            epub: EpubConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_project_name(),
            copyright: default_project_copyright(),
            version: default_project_version(),
            release: default_project_release(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            master_doc: default_master_doc(),
            suffix: default_source_suffix(),
            templates_path: default_templates_path(),
            exclude_patterns: Vec::new(),
            extensions: default_extensions(),
            pygments_style: default_pygments_style(),
        }
    }
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            theme: default_html_theme(),
            title: default_html_title(),
            static_path: default_static_path(),
            show_sphinx: false,
            help_basename: default_docs_title(),
            sidebars: default_sidebars(),
            theme_options: ThemeOptions::default(),
        }
    }
}

impl Default for ThemeOptions {
    fn default() -> Self {
        Self {
            navbar_site_name: default_navbar_site_name(),
            navbar_class: default_navbar_class(),
            globaltoc_depth: default_globaltoc_depth(),
            globaltoc_includehidden: default_true(),
            source_link_position: default_source_link_position(),
            bootstrap_version: default_bootstrap_version(),
        }
    }
}

impl Default for LatexConfig {
    fn default() -> Self {
        Self {
            target: default_latex_target(),
            title: default_docs_title(),
            author: default_zelig_team(),
            document_class: default_document_class(),
            paper_size: None,
            point_size: None,
            preamble: None,
        }
    }
}

impl Default for ManConfig {
    fn default() -> Self {
        Self {
            name: default_man_name(),
            description: default_docs_title(),
            authors: default_man_authors(),
            section: default_man_section(),
        }
    }
}

impl Default for TexinfoConfig {
    fn default() -> Self {
        Self {
            target: default_texinfo_target(),
            title: default_docs_title(),
            author: default_zelig_team(),
            dir_entry: default_texinfo_target(),
            description: default_texinfo_description(),
            category: default_texinfo_category(),
        }
    }
}

impl Default for EpubConfig {
    fn default() -> Self {
        Self {
            title: default_epub_title(),
            author: default_zelig_team(),
            publisher: default_zelig_team(),
            copyright: default_epub_copyright(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            attempts: default_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl SiteConfig {
    /// Load the site configuration for a documentation root.
    ///
    /// Lookup order: the file named by `$ZELIG_DOCS_CONFIG` if set, then
    /// `<root>/zelig-docs.toml`, then built-in defaults. Loading never
    /// touches the network.
    pub fn load(root: &Path) -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }

        let path = root.join(CONFIG_FILE);
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path. Unlike [`SiteConfig::load`], a missing
    /// file is an error here: the caller asked for this file specifically.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DocsError::Config(format!("Failed to read {}: {e}", path.display())))?;

        toml::from_str(&content)
            .map_err(|e| DocsError::Config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Render the resolved configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| DocsError::Config(format!("Failed to serialize config: {e}")))
    }
}
