//! Layered configuration.
//!
//! Sources, lowest to highest precedence:
//! 1. built-in defaults;
//! 2. a config file: the path given explicitly, or `config.{toml,yaml,yml,json}`
//!    in the platform configuration directory;
//! 3. `RETITLE_`-prefixed environment variables, nested with `__`
//!    (`RETITLE_LLM__MODEL`, `RETITLE_LIBRARY__CONCURRENCY`);
//! 4. `API_KEY_ACCESS` (→ `llm.api_key`) and `PDF_DIR` (→ `library.folder`).
//!
//! Command-line flags are applied on top by the binary, followed by
//! [`Config::validate`].

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "RETITLE_";
/// Environment variables understood by earlier versions of the tool.
const ENV_API_KEY: &str = "API_KEY_ACCESS";
const ENV_FOLDER: &str = "PDF_DIR";

#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Model for the content prompt, when different from `model`.
    pub fallback_model: Option<String>,
    pub timeout_secs: u64,
    pub filename_first: bool,
}
impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: retitle_namer::DEFAULT_BASE_URL.to_string(),
            model: retitle_namer::DEFAULT_MODEL.to_string(),
            fallback_model: None,
            timeout_secs: retitle_namer::DEFAULT_TIMEOUT.as_secs(),
            filename_first: true,
        }
    }
}
impl Debug for LlmConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("fallback_model", &self.fallback_model)
            .field("timeout_secs", &self.timeout_secs)
            .field("filename_first", &self.filename_first)
            .finish()
    }
}
impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub folder: Option<PathBuf>,
    /// Filename template; see `retitle_library::FilenameGenerator`.
    pub template: String,
    pub concurrency: usize,
    pub retries: u32,
    pub dry_run: bool,
}
impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            folder: None,
            template: retitle_library::DEFAULT_TEMPLATE.to_string(),
            concurrency: retitle_library::DEFAULT_CONCURRENCY,
            retries: retitle_library::DEFAULT_RETRIES,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub max_pages: usize,
    /// `ebook-convert` executable; looked up on `PATH` when unset.
    pub converter: Option<PathBuf>,
}
impl Default for ExtractConfig {
    fn default() -> Self {
        Self { max_pages: retitle_extract::DEFAULT_MAX_PAGES, converter: None }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub library: LibraryConfig,
    pub extract: ExtractConfig,
}
impl Config {
    /// Directory searched for `config.*` when no file is given explicitly.
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "retitle").map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn file_layer(path: &Path) -> Figment {
        match path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("yaml" | "yml") => Figment::from(Yaml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            _ => Figment::from(Toml::file(path)),
        }
    }

    /// Every source except command-line flags, merged in precedence order.
    ///
    /// An explicitly given `file` must exist; default locations are optional.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match file {
            Some(path) if !path.is_file() => {
                exn::bail!(ErrorKind::Invalid(format!("config file {} not found", path.display())));
            },
            Some(path) => figment = figment.merge(Self::file_layer(path)),
            None => {
                for path in Self::default_dir().into_iter().flat_map(|dir| {
                    ["config.toml", "config.yaml", "config.yml", "config.json"].map(|name| dir.join(name))
                }) {
                    if path.is_file() {
                        tracing::debug!(path = %path.display(), "Using configuration file");
                        figment = figment.merge(Self::file_layer(&path));
                    }
                }
            },
        }
        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&[ENV_API_KEY]).map(|_| "llm.api_key".into()))
            .merge(Env::raw().only(&[ENV_FOLDER]).map(|_| "library.folder".into())))
    }

    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::figment(file)?.extract().or_raise(|| ErrorKind::Load)
    }

    /// Checks values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<()> {
        if self.library.concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("library.concurrency must be at least 1".into()));
        }
        if self.extract.max_pages == 0 {
            exn::bail!(ErrorKind::Invalid("extract.max_pages must be at least 1".into()));
        }
        if self.library.template.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("library.template must not be empty".into()));
        }
        if self.llm.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("llm.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn api_key(&self) -> Result<&str> {
        self.llm
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_raise(|| ErrorKind::MissingApiKey)
    }

    pub fn folder(&self) -> Result<&Path> {
        self.library
            .folder
            .as_deref()
            .filter(|folder| !folder.as_os_str().is_empty())
            .ok_or_raise(|| ErrorKind::MissingFolder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::ops::Deref;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("empty.toml", "")?;
            let config = Config::load(Some(Path::new("empty.toml"))).unwrap();
            assert_eq!(config.llm.base_url, "https://api.siliconflow.cn/v1");
            assert_eq!(config.llm.model, "deepseek-ai/DeepSeek-V2.5");
            assert_eq!(config.llm.timeout(), Duration::from_secs(120));
            assert!(config.llm.filename_first);
            assert_eq!(config.library.concurrency, 8);
            assert_eq!(config.library.retries, 2);
            assert_eq!(config.extract.max_pages, 10);
            assert!(config.validate().is_ok());
            assert!(matches!(config.api_key().unwrap_err().deref(), ErrorKind::MissingApiKey));
            assert!(matches!(config.folder().unwrap_err().deref(), ErrorKind::MissingFolder));
            Ok(())
        });
    }

    #[test]
    fn test_precedence() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "retitle.toml",
                r#"
                [llm]
                api_key = "from-file"
                model = "from-file"
                fallback_model = "deepseek-ai/DeepSeek-R1"

                [library]
                folder = "/from/file"
                concurrency = 4
                "#,
            )?;
            jail.set_env("RETITLE_LLM__MODEL", "from-env");
            jail.set_env("RETITLE_LLM__API_KEY", "from-prefixed-env");
            jail.set_env("RETITLE_LIBRARY__DRY_RUN", "true");
            jail.set_env("API_KEY_ACCESS", "sk-legacy");
            jail.set_env("PDF_DIR", "/legacy/dir");

            let config = Config::load(Some(Path::new("retitle.toml"))).unwrap();
            assert_eq!(config.llm.model, "from-env");
            assert_eq!(config.llm.fallback_model.as_deref(), Some("deepseek-ai/DeepSeek-R1"));
            assert_eq!(config.api_key().unwrap(), "sk-legacy");
            assert_eq!(config.folder().unwrap(), Path::new("/legacy/dir"));
            assert_eq!(config.library.concurrency, 4);
            assert!(config.library.dry_run);
            Ok(())
        });
    }

    #[rstest::rstest]
    #[case("retitle.yaml", "llm:\n  model: from-yaml\nextract:\n  max_pages: 3\n")]
    #[case("retitle.json", r#"{"llm": {"model": "from-yaml"}, "extract": {"max_pages": 3}}"#)]
    fn test_other_formats(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(name, contents)?;
            let config = Config::load(Some(Path::new(name))).unwrap();
            assert_eq!(config.llm.model, "from-yaml");
            assert_eq!(config.extract.max_pages, 3);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("retitle.toml", "[library]\nconcurrency = 0\n")?;
            let config = Config::load(Some(Path::new("retitle.toml"))).unwrap();
            assert!(matches!(config.validate().unwrap_err().deref(), ErrorKind::Invalid(_)));

            jail.set_env("RETITLE_LIBRARY__CONCURRENCY", "lots");
            let error = Config::load(Some(Path::new("retitle.toml"))).unwrap_err();
            assert!(matches!(error.deref(), ErrorKind::Load));

            let error = Config::load(Some(Path::new("missing.toml"))).unwrap_err();
            assert!(matches!(error.deref(), ErrorKind::Invalid(_)));
            Ok(())
        });
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("empty.toml", "")?;
            jail.set_env("API_KEY_ACCESS", "  ");
            let config = Config::load(Some(Path::new("empty.toml"))).unwrap();
            assert!(matches!(config.api_key().unwrap_err().deref(), ErrorKind::MissingApiKey));
            Ok(())
        });
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-very-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
