//! Email configuration (Resend)

use serde::Deserialize;

use super::error::ValidationError;

/// Email configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key
    pub resend_api_key: String,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Recipient for new-lead notifications
    #[serde(default = "default_notify_to")]
    pub notify_to: String,
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.resend_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("RESEND_API_KEY"));
        }
        if !self.resend_api_key.starts_with("re_") {
            return Err(ValidationError::InvalidResendKey);
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        if !self.notify_to.contains('@') {
            return Err(ValidationError::InvalidNotifyAddress);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            notify_to: default_notify_to(),
        }
    }
}

fn default_from_email() -> String {
    "leads@svg.com.co".to_string()
}

fn default_from_name() -> String {
    "SVG Agency".to_string()
}

fn default_notify_to() -> String {
    "hi@svgvisual.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_header_formats() {
        let config = EmailConfig::default();
        assert_eq!(config.from_header(), "SVG Agency <leads@svg.com.co>");
    }

    #[test]
    fn missing_api_key_rejected() {
        assert!(EmailConfig::default().validate().is_err());
    }

    #[test]
    fn wrong_key_prefix_rejected() {
        let config = EmailConfig {
            resend_api_key: "sk_xxx".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn valid_config_accepted() {
        let config = EmailConfig {
            resend_api_key: "re_abcd1234".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_notify_address_rejected() {
        let config = EmailConfig {
            resend_api_key: "re_abcd1234".to_string(),
            notify_to: "not-an-address".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
