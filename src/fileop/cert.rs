//! Certificate request values and subject alternative name parsing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::PreconditionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SanType {
    #[strum(serialize = "DNS")]
    #[serde(rename = "DNS")]
    Dns,
    #[strum(serialize = "IP")]
    #[serde(rename = "IP")]
    Ip,
    #[strum(serialize = "URI")]
    #[serde(rename = "URI")]
    Uri,
    #[strum(serialize = "EMAIL")]
    #[serde(rename = "EMAIL")]
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAltName {
    #[serde(rename = "type")]
    pub san_type: SanType,
    pub value: String,
}

/// Parse `TYPE/VALUE[,TYPE/VALUE...]`, e.g. `DNS/foo.com,IP/10.0.0.1`.
pub fn parse_sans(input: &str) -> Result<Vec<SubjectAltName>, PreconditionError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_san)
        .collect()
}

pub fn parse_san(entry: &str) -> Result<SubjectAltName, PreconditionError> {
    let (kind, value) = entry
        .split_once('/')
        .ok_or_else(|| PreconditionError::MalformedSan(entry.to_string()))?;
    let (kind, value) = (kind.trim(), value.trim());
    if kind.is_empty() || value.is_empty() {
        return Err(PreconditionError::MalformedSan(entry.to_string()));
    }
    let san_type = kind
        .parse::<SanType>()
        .map_err(|_| PreconditionError::UnknownSanType(kind.to_string()))?;
    Ok(SubjectAltName {
        san_type,
        value: value.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
pub enum CertificateUsage {
    #[default]
    #[strum(serialize = "ADMIN")]
    Admin,
    #[strum(serialize = "CAPTIVE_PORTAL")]
    CaptivePortal,
    #[strum(serialize = "SFNT_CLIENT_CERT")]
    SfntClientCert,
    #[strum(serialize = "IFMAP_DHCP")]
    IfmapDhcp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
pub enum Algorithm {
    #[strum(serialize = "SHA-1")]
    Sha1,
    #[default]
    #[strum(serialize = "SHA-256")]
    Sha256,
}

pub const DEFAULT_KEY_SIZE: u32 = 2048;
pub const DEFAULT_DAYS_VALID: u32 = 365;

/// Everything needed for `generateselfsignedcert` or `generatecsr`.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateRequestSpec {
    pub cn: String,
    pub member: String,
    pub algorithm: Algorithm,
    pub certificate_usage: CertificateUsage,
    pub key_size: u32,
    /// Only sent for self-signed certificates.
    pub days_valid: u32,
    pub comment: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub locality: Option<String>,
    pub org: Option<String>,
    pub org_unit: Option<String>,
    pub state: Option<String>,
    pub subject_alternative_names: Vec<SubjectAltName>,
}

impl CertificateRequestSpec {
    pub fn new(cn: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            cn: cn.into(),
            member: member.into(),
            algorithm: Algorithm::default(),
            certificate_usage: CertificateUsage::default(),
            key_size: DEFAULT_KEY_SIZE,
            days_valid: DEFAULT_DAYS_VALID,
            comment: None,
            country: None,
            email: None,
            locality: None,
            org: None,
            org_unit: None,
            state: None,
            subject_alternative_names: Vec::new(),
        }
    }

    /// Attach SANs given as `TYPE/VALUE[,TYPE/VALUE...]`.
    pub fn with_sans(mut self, input: &str) -> Result<Self, PreconditionError> {
        self.subject_alternative_names = parse_sans(input)?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), PreconditionError> {
        if self.cn.trim().is_empty() {
            return Err(PreconditionError::MissingField("cn".to_string()));
        }
        if self.member.trim().is_empty() {
            return Err(PreconditionError::MissingField("member".to_string()));
        }
        if let Some(country) = &self.country {
            if country.len() != 2 {
                return Err(PreconditionError::InvalidValue {
                    field: "country".to_string(),
                    value: country.clone(),
                });
            }
        }
        Ok(())
    }

    /// Request body; unset optional fields are left out.
    pub(crate) fn to_payload(&self, self_signed: bool) -> Value {
        let mut payload = Map::new();
        payload.insert("cn".into(), self.cn.clone().into());
        payload.insert("member".into(), self.member.clone().into());
        payload.insert("algorithm".into(), self.algorithm.to_string().into());
        payload.insert(
            "certificate_usage".into(),
            self.certificate_usage.to_string().into(),
        );
        payload.insert("key_size".into(), self.key_size.into());
        if self_signed {
            payload.insert("days_valid".into(), self.days_valid.into());
        }
        let optional = [
            ("comment", &self.comment),
            ("country", &self.country),
            ("email", &self.email),
            ("locality", &self.locality),
            ("org", &self.org),
            ("org_unit", &self.org_unit),
            ("state", &self.state),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                payload.insert(key.into(), value.clone().into());
            }
        }
        if !self.subject_alternative_names.is_empty() {
            payload.insert(
                "subject_alternative_names".into(),
                serde_json::to_value(&self.subject_alternative_names).unwrap_or(Value::Null),
            );
        }
        Value::Object(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_sans() {
        let sans = parse_sans("DNS/foo.com,IP/10.0.0.1").unwrap();
        assert_eq!(
            sans,
            vec![
                SubjectAltName {
                    san_type: SanType::Dns,
                    value: "foo.com".to_string()
                },
                SubjectAltName {
                    san_type: SanType::Ip,
                    value: "10.0.0.1".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_sans_rejects_bad_input() {
        assert!(matches!(
            parse_sans("BOGUS/x"),
            Err(PreconditionError::UnknownSanType(t)) if t == "BOGUS"
        ));
        assert!(matches!(
            parse_sans("foo.com"),
            Err(PreconditionError::MalformedSan(_))
        ));
        assert!(matches!(
            parse_sans("DNS/"),
            Err(PreconditionError::MalformedSan(_))
        ));
    }

    #[test]
    fn test_uri_value_keeps_slashes() {
        let san = parse_san("URI/https://gm.example.com/x").unwrap();
        assert_eq!(san.san_type, SanType::Uri);
        assert_eq!(san.value, "https://gm.example.com/x");
    }

    #[test]
    fn test_payload_skips_unset_fields() {
        let mut spec = CertificateRequestSpec::new("gm.example.com", "gm.example.com");
        spec.org = Some("Example".to_string());
        spec.subject_alternative_names = parse_sans("EMAIL/admin@example.com").unwrap();

        let payload = spec.to_payload(false);
        assert_eq!(
            payload,
            json!({
                "cn": "gm.example.com",
                "member": "gm.example.com",
                "algorithm": "SHA-256",
                "certificate_usage": "ADMIN",
                "key_size": 2048,
                "org": "Example",
                "subject_alternative_names": [{"type": "EMAIL", "value": "admin@example.com"}],
            })
        );
        assert_eq!(spec.to_payload(true)["days_valid"], json!(365));
    }

    #[test]
    fn test_validate() {
        let mut spec = CertificateRequestSpec::new("", "gm");
        assert!(spec.validate().is_err());
        spec.cn = "gm".to_string();
        spec.country = Some("USA".to_string());
        assert!(spec.validate().is_err());
        spec.country = Some("US".to_string());
        assert!(spec.validate().is_ok());
    }
}
