//! Content types and the payload formatter.
//!
//! Formatting is total: any combination of field values produces a payload
//! string. Whether that payload is worth rendering is decided separately by
//! [`crate::readiness`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Characters left untouched by URI component encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Raw form values keyed by field name.
pub type ContentFields = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Url,
    Email,
    #[serde(rename = "tel")]
    Phone,
    Sms,
    #[serde(rename = "wifi")]
    WifiCredential,
}

impl ContentType {
    pub const ALL: [ContentType; 6] = [
        ContentType::Text,
        ContentType::Url,
        ContentType::Email,
        ContentType::Phone,
        ContentType::Sms,
        ContentType::WifiCredential,
    ];

    /// Short identifier used in file names (`qr-code-<slug>.png`).
    pub fn slug(self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Url => "url",
            ContentType::Email => "email",
            ContentType::Phone => "tel",
            ContentType::Sms => "sms",
            ContentType::WifiCredential => "wifi",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentType::Text => "Text",
            ContentType::Url => "URL",
            ContentType::Email => "Email",
            ContentType::Phone => "Phone",
            ContentType::Sms => "SMS",
            ContentType::WifiCredential => "WiFi",
        }
    }

    /// Field names the formatter reads for this type.
    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            ContentType::Text => &["text"],
            ContentType::Url => &["url"],
            ContentType::Email => &["email", "subject", "body"],
            ContentType::Phone => &["phone"],
            ContentType::Sms => &["phone", "message"],
            ContentType::WifiCredential => &["ssid", "password", "encryption", "hidden"],
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ContentType {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ContentType::Text),
            "url" => Ok(ContentType::Url),
            "email" => Ok(ContentType::Email),
            "tel" | "phone" => Ok(ContentType::Phone),
            "sms" => Ok(ContentType::Sms),
            "wifi" => Ok(ContentType::WifiCredential),
            other => Err(FormatError::UnknownContentType(other.to_string())),
        }
    }
}

/// WiFi authentication schemes understood by scanners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WifiEncryption {
    #[default]
    Wpa,
    Wep,
    NoPass,
}

impl WifiEncryption {
    pub fn as_str(self) -> &'static str {
        match self {
            WifiEncryption::Wpa => "WPA",
            WifiEncryption::Wep => "WEP",
            WifiEncryption::NoPass => "nopass",
        }
    }

    /// Lenient parse; anything unrecognised is passed through verbatim by
    /// the formatter instead.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wpa" | "wpa2" | "wpa/wpa2" => Some(WifiEncryption::Wpa),
            "wep" => Some(WifiEncryption::Wep),
            "nopass" | "none" | "open" => Some(WifiEncryption::NoPass),
            _ => None,
        }
    }
}

fn field<'a>(fields: &'a ContentFields, name: &str) -> &'a str {
    fields.get(name).map(String::as_str).unwrap_or("")
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Build the payload string handed to the encoder.
pub fn format(content_type: ContentType, fields: &ContentFields) -> String {
    match content_type {
        ContentType::Text => field(fields, "text").to_string(),
        ContentType::Url => field(fields, "url").to_string(),
        ContentType::Phone => field(fields, "phone").to_string(),
        ContentType::Email => {
            let mut payload = format!("mailto:{}", field(fields, "email"));
            let subject = field(fields, "subject");
            let body = field(fields, "body");
            let mut separator = '?';
            if !subject.is_empty() {
                payload.push(separator);
                payload.push_str("subject=");
                payload.push_str(&encode_component(subject));
                separator = '&';
            }
            if !body.is_empty() {
                payload.push(separator);
                payload.push_str("body=");
                payload.push_str(&encode_component(body));
            }
            payload
        }
        ContentType::Sms => {
            let mut payload = format!("sms:{}", field(fields, "phone"));
            let message = field(fields, "message");
            if !message.is_empty() {
                payload.push_str("?body=");
                payload.push_str(&encode_component(message));
            }
            payload
        }
        ContentType::WifiCredential => {
            let raw_encryption = field(fields, "encryption");
            let encryption = if raw_encryption.is_empty() {
                WifiEncryption::default().as_str().to_string()
            } else {
                WifiEncryption::parse(raw_encryption)
                    .map(|e| e.as_str().to_string())
                    .unwrap_or_else(|| raw_encryption.to_string())
            };
            let hidden = matches!(
                field(fields, "hidden").trim().to_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            );
            format!(
                "WIFI:T:{};S:{};P:{};H:{};;",
                encryption,
                field(fields, "ssid"),
                field(fields, "password"),
                hidden
            )
        }
    }
}

/// One human-readable line describing the content, used on print sheets.
pub fn summary(content_type: ContentType, fields: &ContentFields) -> String {
    let primary = match content_type {
        ContentType::Text => field(fields, "text"),
        ContentType::Url => field(fields, "url"),
        ContentType::Email => field(fields, "email"),
        ContentType::Phone | ContentType::Sms => field(fields, "phone"),
        ContentType::WifiCredential => field(fields, "ssid"),
    };
    // Keep the summary to one line.
    let line: String = primary.lines().next().unwrap_or("").chars().take(80).collect();
    match content_type {
        ContentType::WifiCredential => format!("WiFi network: {}", line),
        other => format!("{}: {}", other.label(), line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> ContentFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_text_and_url_pass_through() {
        assert_eq!(format(ContentType::Text, &fields(&[("text", "héllo")])), "héllo");
        assert_eq!(
            format(ContentType::Url, &fields(&[("url", "https://example.com/?a=b")])),
            "https://example.com/?a=b"
        );
        assert_eq!(format(ContentType::Phone, &fields(&[("phone", "+1 234")])), "+1 234");
    }

    #[test]
    fn test_email_subject_and_body() {
        let payload = format(
            ContentType::Email,
            &fields(&[("email", "a@b.com"), ("subject", "Hi there"), ("body", "see you")]),
        );
        assert_eq!(payload, "mailto:a@b.com?subject=Hi%20there&body=see%20you");
    }

    #[test]
    fn test_email_body_without_subject_uses_question_mark() {
        let payload = format(
            ContentType::Email,
            &fields(&[("email", "a@b.com"), ("subject", ""), ("body", "hi")]),
        );
        assert_eq!(payload, "mailto:a@b.com?body=hi");
    }

    #[test]
    fn test_email_omits_empty_parameters() {
        let payload = format(ContentType::Email, &fields(&[("email", "a@b.com")]));
        assert_eq!(payload, "mailto:a@b.com");
        assert_eq!(format(ContentType::Email, &ContentFields::new()), "mailto:");
    }

    #[test]
    fn test_uri_component_encoding_matches_browser_rules() {
        let payload = format(
            ContentType::Email,
            &fields(&[("email", "x@y.z"), ("subject", "a&b=c (ok)!*~'")]),
        );
        assert_eq!(payload, "mailto:x@y.z?subject=a%26b%3Dc%20(ok)!*~'");
    }

    #[test]
    fn test_sms_body() {
        assert_eq!(format(ContentType::Sms, &fields(&[("phone", "555")])), "sms:555");
        assert_eq!(
            format(ContentType::Sms, &fields(&[("phone", "555"), ("message", "on my way")])),
            "sms:555?body=on%20my%20way"
        );
    }

    #[test]
    fn test_wifi_field_order_and_terminator() {
        let payload = format(
            ContentType::WifiCredential,
            &fields(&[
                ("ssid", "Home"),
                ("password", "secret1"),
                ("encryption", "WPA"),
                ("hidden", "false"),
            ]),
        );
        assert_eq!(payload, "WIFI:T:WPA;S:Home;P:secret1;H:false;;");
    }

    #[test]
    fn test_wifi_defaults() {
        let payload = format(ContentType::WifiCredential, &fields(&[("ssid", "Cafe")]));
        assert_eq!(payload, "WIFI:T:WPA;S:Cafe;P:;H:false;;");

        let payload = format(
            ContentType::WifiCredential,
            &fields(&[("ssid", "Lab"), ("encryption", "none"), ("hidden", "true")]),
        );
        assert_eq!(payload, "WIFI:T:nopass;S:Lab;P:;H:true;;");
        assert!(payload.ends_with(";;"));
    }

    #[test]
    fn test_format_is_deterministic() {
        let f = fields(&[("email", "a@b.com"), ("body", "é ü")]);
        assert_eq!(format(ContentType::Email, &f), format(ContentType::Email, &f));
    }

    #[test]
    fn test_content_type_parsing() {
        assert_eq!("tel".parse::<ContentType>().unwrap(), ContentType::Phone);
        assert_eq!("WiFi".parse::<ContentType>().unwrap(), ContentType::WifiCredential);
        assert!(matches!(
            "fax".parse::<ContentType>(),
            Err(FormatError::UnknownContentType(_))
        ));
        for ty in ContentType::ALL {
            assert_eq!(ty.slug().parse::<ContentType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_summary_is_single_line() {
        let s = summary(ContentType::Text, &fields(&[("text", "line one\nline two")]));
        assert_eq!(s, "Text: line one");
        let s = summary(ContentType::WifiCredential, &fields(&[("ssid", "Home")]));
        assert_eq!(s, "WiFi network: Home");
    }
}
