use crate::error::{PdiError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// 生成ファイルの保存先（未設定ならカレント）
    pub output_dir: Option<PathBuf>,
    /// イニシャル入力の初期値
    pub default_initials: Option<String>,
    /// 保存済みセッションがあれば確認なしで再開する
    pub auto_resume: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// 設定ディレクトリ（`~/.config/pdi-sheet`）
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PdiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("pdi-sheet"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 出力先（引数 > 設定 > カレント）
    pub fn resolve_output_dir(&self, arg: Option<PathBuf>) -> PathBuf {
        arg.or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn set_output_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.output_dir = Some(dir);
        self.save()
    }

    /// イニシャルは検証・正規化してから保存
    pub fn set_initials(&mut self, initials: &str) -> Result<()> {
        let initials = pdi_sheet_common::validate::normalize_initials(initials)
            .map_err(|e| PdiError::Config(e.to_string()))?;
        self.default_initials = Some(initials);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output_dir() {
        let mut config = Config::default();
        assert_eq!(config.resolve_output_dir(None), PathBuf::from("."));

        config.output_dir = Some(PathBuf::from("/tmp/pdi"));
        assert_eq!(config.resolve_output_dir(None), PathBuf::from("/tmp/pdi"));
        assert_eq!(
            config.resolve_output_dir(Some(PathBuf::from("out"))),
            PathBuf::from("out")
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"default_initials":"JD"}"#).unwrap();
        assert_eq!(config.default_initials.as_deref(), Some("JD"));
        assert!(config.output_dir.is_none());
        assert!(!config.auto_resume);
    }
}
