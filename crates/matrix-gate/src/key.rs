//! Matrix identity keys
//!
//! A `MatrixKey` names the report currently on screen: the service type
//! followed by its normalised input fields, joined with `|`. A `|` or `\`
//! inside a field is escaped with `\` so distinct fields never collide. A
//! premium grant is bound to exactly one key.

use chrono::NaiveDate;
use matrix_points::BirthInput;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field separator inside a key
pub const KEY_SEPARATOR: char = '|';

const KEY_ESCAPE: char = '\\';

/// Report variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Single-person matrix
    Personal,
    /// Two-person compatibility matrix
    Compatibility,
}

impl ServiceType {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Compatibility => "compatibility",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "personal" => Ok(Self::Personal),
            "compatibility" => Ok(Self::Compatibility),
            other => Err(format!("unknown service type: {other}")),
        }
    }
}

/// Raw input fields identifying a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixInputs<'a> {
    /// Date and name fields of the personal form
    Personal {
        /// Birth date as entered
        date: &'a str,
        /// Name as entered
        name: &'a str,
    },
    /// Both partners' date fields
    Compatibility {
        /// First partner's birth date
        first: &'a str,
        /// Second partner's birth date
        second: &'a str,
    },
}

impl MatrixInputs<'_> {
    /// Service these inputs belong to
    #[must_use]
    pub fn service(&self) -> ServiceType {
        match self {
            Self::Personal { .. } => ServiceType::Personal,
            Self::Compatibility { .. } => ServiceType::Compatibility,
        }
    }
}

/// Identity of a displayed report
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatrixKey(String);

impl MatrixKey {
    /// Build a key from raw form fields
    ///
    /// Dates in `YYYY-MM-DD` or `DD.MM.YYYY` are normalised to ISO; other
    /// date text is kept trimmed. Names are trimmed with inner whitespace
    /// collapsed.
    #[must_use]
    pub fn build(inputs: &MatrixInputs<'_>) -> Self {
        let fields = match *inputs {
            MatrixInputs::Personal { date, name } => [normalize_date(date), normalize_name(name)],
            MatrixInputs::Compatibility { first, second } => {
                [normalize_date(first), normalize_date(second)]
            }
        };
        Self::join(inputs.service(), &fields)
    }

    /// Key for a validated personal input
    #[must_use]
    pub fn personal(input: &BirthInput) -> Self {
        Self::join(
            ServiceType::Personal,
            &[input.iso_date(), normalize_name(input.name().unwrap_or_default())],
        )
    }

    /// Key for two validated partner inputs
    #[must_use]
    pub fn compatibility(first: &BirthInput, second: &BirthInput) -> Self {
        Self::join(
            ServiceType::Compatibility,
            &[first.iso_date(), second.iso_date()],
        )
    }

    /// Wrap a key read back from storage
    #[must_use]
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    fn join(service: ServiceType, fields: &[String]) -> Self {
        let mut key = service.as_str().to_string();
        for field in fields {
            key.push(KEY_SEPARATOR);
            for c in field.chars() {
                if c == KEY_SEPARATOR || c == KEY_ESCAPE {
                    key.push(KEY_ESCAPE);
                }
                key.push(c);
            }
        }
        Self(key)
    }

    /// Key text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key has no text at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Service prefix, if recognisable
    #[must_use]
    pub fn service(&self) -> Option<ServiceType> {
        self.0.split(KEY_SEPARATOR).next()?.parse().ok()
    }
}

impl fmt::Display for MatrixKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d.%m.%Y"))
        .map_or_else(|_| raw.to_string(), |d| d.format("%Y-%m-%d").to_string())
}

fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn personal_key_layout() {
        let key = MatrixKey::build(&MatrixInputs::Personal {
            date: "1990-05-15",
            name: "  Anna   Maria ",
        });
        assert_eq!(key.as_str(), "personal|1990-05-15|Anna Maria");
        assert_eq!(key.service(), Some(ServiceType::Personal));
    }

    #[test]
    fn compatibility_key_layout() {
        let key = MatrixKey::build(&MatrixInputs::Compatibility {
            first: "15.05.1990",
            second: "1985-11-03",
        });
        assert_eq!(key.as_str(), "compatibility|1990-05-15|1985-11-03");
    }

    #[test]
    fn date_formats_normalise_to_same_key() {
        let iso = MatrixKey::build(&MatrixInputs::Personal {
            date: "1990-05-15",
            name: "Anna",
        });
        let dotted = MatrixKey::build(&MatrixInputs::Personal {
            date: " 15.05.1990",
            name: "Anna",
        });
        assert_eq!(iso, dotted);
    }

    #[test]
    fn unparsable_date_kept_verbatim() {
        let key = MatrixKey::build(&MatrixInputs::Compatibility {
            first: "",
            second: "garbage",
        });
        assert_eq!(key.as_str(), "compatibility||garbage");
    }

    #[test]
    fn separator_inside_field_is_escaped() {
        let in_date = MatrixKey::build(&MatrixInputs::Personal {
            date: "1990-05-15|x",
            name: "y",
        });
        let in_name = MatrixKey::build(&MatrixInputs::Personal {
            date: "1990-05-15",
            name: "x|y",
        });
        assert_eq!(in_date.as_str(), r"personal|1990-05-15\|x|y");
        assert_eq!(in_name.as_str(), r"personal|1990-05-15|x\|y");
        assert_ne!(in_date, in_name);

        let slash = MatrixKey::build(&MatrixInputs::Personal {
            date: r"a\",
            name: "b",
        });
        assert_eq!(slash.as_str(), r"personal|a\\|b");
    }

    #[test]
    fn validated_input_matches_raw_form() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let input = BirthInput::parse("1990-05-15", Some("Anna"), today).unwrap();
        let raw = MatrixKey::build(&MatrixInputs::Personal {
            date: "1990-05-15",
            name: "Anna",
        });
        assert_eq!(MatrixKey::personal(&input), raw);
    }

    #[test]
    fn service_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ServiceType::Compatibility).unwrap(),
            "\"compatibility\""
        );
        assert_eq!("personal".parse::<ServiceType>(), Ok(ServiceType::Personal));
        assert!("vip".parse::<ServiceType>().is_err());
    }
}
