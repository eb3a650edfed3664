//! Internationalization (i18n) support
//!
//! The site ships with built-in Brazilian Portuguese and English string
//! tables. Language files in YAML can extend or override them.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const PT_BR: &str = r#"
load_more: Carregar mais posts
loading: Carregando...
edited_on: "* editado em"
minutes: min
not_found: Página não encontrada
back_home: Voltar para a home
months_short: [jan, fev, mar, abr, mai, jun, jul, ago, set, out, nov, dez]
months: [janeiro, fevereiro, março, abril, maio, junho, julho, agosto, setembro, outubro, novembro, dezembro]
"#;

const EN: &str = r#"
load_more: Load more posts
loading: Loading...
edited_on: "* edited on"
minutes: min
not_found: Page not found
back_home: Back to home
months_short: [Jan, Feb, Mar, Apr, May, Jun, Jul, Aug, Sep, Oct, Nov, Dec]
months: [January, February, March, April, May, June, July, August, September, October, November, December]
"#;

/// Internationalization handler
#[derive(Debug, Clone)]
pub struct I18n {
    /// Current language
    language: String,
    /// Language data: lang -> key -> translation
    translations: HashMap<String, HashMap<String, serde_yaml::Value>>,
}

impl I18n {
    /// Create a handler with the built-in languages loaded
    pub fn new(language: &str) -> Self {
        let mut translations = HashMap::new();
        for (lang, source) in [("pt-BR", PT_BR), ("en", EN)] {
            match serde_yaml::from_str(source) {
                Ok(data) => {
                    translations.insert(lang.to_string(), data);
                }
                Err(e) => tracing::error!("Built-in language {} is invalid: {}", lang, e),
            }
        }

        Self {
            language: language.to_string(),
            translations,
        }
    }

    /// Load language files from a directory, merging over built-in keys
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }

            let lang = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("en")
                .to_string();
            let content = fs::read_to_string(&path)?;

            match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(&content) {
                Ok(data) => {
                    self.translations.entry(lang).or_default().extend(data);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                }
            }
        }

        Ok(())
    }

    /// Get a translation by key
    pub fn get(&self, key: &str) -> String {
        self.lookup(key)
            .map(yaml_value_to_string)
            .unwrap_or_else(|| key.to_string())
    }

    /// Abbreviated month name, `month` counted from 1
    pub fn month_short(&self, month: u32) -> String {
        self.month_from("months_short", month)
    }

    /// Full month name, `month` counted from 1
    pub fn month(&self, month: u32) -> String {
        self.month_from("months", month)
    }

    fn month_from(&self, key: &str, month: u32) -> String {
        self.lookup(key)
            .and_then(|v| v.as_sequence())
            .and_then(|months| months.get(month.checked_sub(1)? as usize))
            .map(yaml_value_to_string)
            .unwrap_or_else(|| format!("{:02}", month))
    }

    /// All plain string translations for the current language
    pub fn get_all_translations(&self) -> HashMap<String, String> {
        let mut result = HashMap::new();
        for lang in ["en", self.language.as_str()] {
            if let Some(data) = self.translations.get(lang) {
                for (key, value) in data {
                    if value.is_string() {
                        result.insert(key.clone(), yaml_value_to_string(value));
                    }
                }
            }
        }
        result
    }

    /// Current language first, then English
    fn lookup(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.translations
            .get(&self.language)
            .and_then(|data| data.get(key))
            .or_else(|| self.translations.get("en").and_then(|data| data.get(key)))
    }
}

fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
