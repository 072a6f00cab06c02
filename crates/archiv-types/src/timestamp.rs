//! RFC 3161 time-stamp response model
//!
//! These are the projected, schema-checked forms of the DER structures. They
//! are serialized into the manifest, so field names are stable.

use crate::encoding::Hex;
use serde::{Deserialize, Serialize};

/// PKIStatus value for `granted`
pub const STATUS_GRANTED: u64 = 0;
/// PKIStatus value for `grantedWithMods`
pub const STATUS_GRANTED_WITH_MODS: u64 = 1;

/// PKIStatusInfo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// 0 granted, 1 grantedWithMods, 2 rejection, 3 waiting, 4 revocationWarning,
    /// 5 revocationNotification
    pub code: u64,
    /// First element of `statusString`, if present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `failInfo` bits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_info: Option<Hex>,
}

impl Status {
    pub fn granted() -> Self {
        Self {
            code: STATUS_GRANTED,
            description: None,
            fail_info: None,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.code == STATUS_GRANTED
    }

    /// Human-readable name of the status code
    pub fn code_name(&self) -> &'static str {
        match self.code {
            0 => "granted",
            1 => "grantedWithMods",
            2 => "rejection",
            3 => "waiting",
            4 => "revocationWarning",
            5 => "revocationNotification",
            _ => "unknown",
        }
    }
}

/// Hash algorithm and digest of the time-stamped data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageImprint {
    #[serde(rename = "algorithmOID")]
    pub algorithm_oid: String,
    pub hash: Hex,
}

/// Accuracy of `genTime`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accuracy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub millis: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micros: Option<u64>,
}

/// The signed content of a time-stamp token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TstInfo {
    pub version: u64,
    #[serde(rename = "policyOID")]
    pub policy_oid: String,
    pub message_imprint: MessageImprint,
    /// Content octets of the serialNumber INTEGER
    pub serial_number: Hex,
    /// GeneralizedTime as sent, `YYYYMMDDHHMMSS[.f]Z`
    pub gen_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<Accuracy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<bool>,
    /// Content octets of the nonce INTEGER
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Hex>,
    /// Raw encoding of the `[0] tsa` GeneralName
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tsa: Option<Hex>,
}

/// The CMS SignerInfo that signs the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerInfo {
    pub version: u64,
    /// Serial number from `issuerAndSerialNumber`, content octets
    pub signer_serial: Hex,
    #[serde(rename = "digestAlgorithmOID")]
    pub digest_algorithm_oid: String,
    /// Original encoding of `[0] IMPLICIT signedAttrs`, tag octet included
    pub signed_attrs_raw: Hex,
    #[serde(rename = "signatureAlgorithmOID")]
    pub signature_algorithm_oid: String,
    pub signature: Hex,
}

/// Subset of an X.501 name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_unit_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = [
            ("C", &self.country),
            ("O", &self.org_name),
            ("OU", &self.org_unit_name),
            ("CN", &self.common_name),
        ];
        let rendered: Vec<String> = parts
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| format!("{}={}", key, v)))
            .collect();
        f.write_str(&rendered.join(", "))
    }
}

/// Certificate validity period, as encoded (UTCTime or GeneralizedTime)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validity {
    pub not_before: String,
    pub not_after: String,
}

/// An X.509 certificate carried in the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// X.509 version field (0 for v1, 2 for v3)
    pub version: u64,
    /// Content octets of the serialNumber INTEGER
    pub serial_number: Hex,
    #[serde(rename = "signatureAlgorithmOID")]
    pub signature_algorithm_oid: String,
    pub issuer: Name,
    pub validity: Validity,
    pub subject: Name,
    /// Full SubjectPublicKeyInfo encoding
    pub subject_public_key_info: Hex,
    /// Full certificate encoding
    pub raw_bytes: Hex,
}

/// A parsed TimeStampResp carrying a granted token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStampResponse {
    pub status: Status,
    pub tst_info: TstInfo,
    pub certificates: Vec<Certificate>,
    pub signer_infos: Vec<SignerInfo>,
}

impl TimeStampResponse {
    /// The SignerInfo used for verification (always the first)
    pub fn signer(&self) -> Option<&SignerInfo> {
        self.signer_infos.first()
    }

    /// The certificate whose serial number matches the signer's
    pub fn signer_certificate(&self) -> Option<&Certificate> {
        let signer = self.signer()?;
        self.certificates
            .iter()
            .find(|cert| cert.serial_number == signer.signer_serial)
    }

    /// Every certificate except the signer's
    pub fn chain_certificates(&self) -> impl Iterator<Item = &Certificate> {
        let signer_serial = self.signer().map(|s| s.signer_serial.clone());
        self.certificates
            .iter()
            .filter(move |cert| Some(&cert.serial_number) != signer_serial.as_ref())
    }
}
