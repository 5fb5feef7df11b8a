use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub financing: FinancingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://157.180.29.248:8070".to_string(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Crews are planned in blocks of this many square meters.
    pub area_unit_sqm: f64,
    /// Working days one block takes at multiplier 1.0.
    pub days_per_unit: f64,
    /// Discount factor applied when the customer pays the full amount upfront.
    pub full_payment_discount: f64,
    pub max_area_sqm: f64,
    /// Fallback duration for orders placed without a saved quote.
    pub default_duration_days: u32,
    /// The renovation service id the order endpoint expects.
    pub service_id: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            area_unit_sqm: 10.0,
            days_per_unit: 7.0,
            full_payment_discount: 0.05,
            max_area_sqm: 1000.0,
            default_duration_days: 14,
            service_id: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingConfig {
    pub installment_terms: Vec<u32>,
    pub default_term: u32,
    /// Shown when the customer lands on financing without a saved quote.
    pub fallback_total: f64,
}

impl Default for FinancingConfig {
    fn default() -> Self {
        Self {
            installment_terms: vec![6, 12, 24],
            default_term: 12,
            fallback_total: 500_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub base_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: ".renoquote".to_string(),
        }
    }
}

impl Settings {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(QuoteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| QuoteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_BASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 600)?;

        validate_positive("pricing.area_unit_sqm", self.pricing.area_unit_sqm)?;
        validate_positive("pricing.days_per_unit", self.pricing.days_per_unit)?;
        validate_positive("pricing.max_area_sqm", self.pricing.max_area_sqm)?;
        validate_range(
            "pricing.full_payment_discount",
            self.pricing.full_payment_discount,
            0.0,
            0.99,
        )?;
        validate_range(
            "pricing.default_duration_days",
            self.pricing.default_duration_days,
            1,
            365,
        )?;

        if self.financing.installment_terms.is_empty() {
            return Err(QuoteError::MissingConfigError {
                field: "financing.installment_terms".to_string(),
            });
        }
        for term in &self.financing.installment_terms {
            validate_range("financing.installment_terms", *term, 1, 120)?;
        }
        if !self
            .financing
            .installment_terms
            .contains(&self.financing.default_term)
        {
            return Err(QuoteError::InvalidConfigValueError {
                field: "financing.default_term".to_string(),
                value: self.financing.default_term.to_string(),
                reason: "Default term must be one of the configured installment terms".to_string(),
            });
        }
        validate_positive("financing.fallback_total", self.financing.fallback_total)?;

        validate_non_empty_string("storage.base_path", &self.storage.base_path)?;

        Ok(())
    }
}
