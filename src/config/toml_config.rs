use crate::utils::error::{Result, TriageError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    pub supabase: SupabaseConfig,
    pub gemini: GeminiConfig,
    pub transcriber: Option<TranscriberConfig>,
    pub frames: Option<FramesConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
    pub bucket: Option<String>,
    pub table: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    pub model_path: String,
    pub binary: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramesConfig {
    pub binary: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl TriageConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TriageError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TriageError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        // 使用正規表達式匹配 ${VAR_NAME} 格式
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 沒有配置檔時退回環境變數,跟原系統的部署方式一致。
    pub fn from_env() -> Result<Self> {
        let supabase_url = std::env::var("SUPABASE_URL").map_err(|_| TriageError::ConfigError {
            message: "SUPABASE_URL is not set".to_string(),
        })?;
        let supabase_key = std::env::var("SUPABASE_KEY").map_err(|_| TriageError::ConfigError {
            message: "SUPABASE_KEY is not set".to_string(),
        })?;
        let gemini_key = std::env::var("GEMINI_API_KEY").map_err(|_| TriageError::ConfigError {
            message: "GEMINI_API_KEY is not set".to_string(),
        })?;

        Ok(Self {
            supabase: SupabaseConfig {
                url: supabase_url,
                service_key: supabase_key,
                bucket: None,
                table: None,
            },
            gemini: GeminiConfig {
                api_key: gemini_key,
                endpoint: None,
                model: None,
            },
            transcriber: None,
            frames: None,
        })
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("supabase.url", &self.supabase.url)?;
        validate_non_empty_string("supabase.service_key", &self.supabase.service_key)?;
        validate_non_empty_string("gemini.api_key", &self.gemini.api_key)?;

        if let Some(endpoint) = &self.gemini.endpoint {
            validate_url("gemini.endpoint", endpoint)?;
        }
        if let Some(transcriber) = &self.transcriber {
            validate_path("transcriber.model_path", &transcriber.model_path)?;
            if let Some(timeout) = transcriber.timeout_seconds {
                validate_positive_number("transcriber.timeout_seconds", timeout, 1)?;
            }
        }
        if let Some(frames) = &self.frames {
            if let Some(timeout) = frames.timeout_seconds {
                validate_positive_number("frames.timeout_seconds", timeout, 1)?;
            }
        }

        Ok(())
    }

    pub fn bucket(&self) -> &str {
        self.supabase.bucket.as_deref().unwrap_or("media")
    }

    pub fn table(&self) -> &str {
        self.supabase.table.as_deref().unwrap_or("issues")
    }
}

impl Validate for TriageConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
