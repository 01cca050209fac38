//! Attribute values and the token parsers for categorical variables.

use std::fmt;

use crate::error::{Result, ZonespaceError};

/// A single canonical attribute value.
///
/// Unset attributes are represented by absence from the containing row, not by
/// a sentinel variant.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Num(f64),
    Text(String),
}

impl AttrValue {
    /// Numeric value, if this is one.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            AttrValue::Num(n) => Some(*n),
            AttrValue::Text(_) => None,
        }
    }

    /// Text value, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Num(_) => None,
            AttrValue::Text(s) => Some(s.as_str()),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Num(n)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

/// Tri-state land-use allowance: permitted, prohibited, or permitted only
/// with a conditional use permit.
///
/// # Example
///
/// ```
/// use zonespace_core::Allowance;
///
/// assert_eq!(Allowance::from_token("cup").unwrap(), Allowance::Conditional);
/// assert_eq!(Allowance::from_token("Y").unwrap().to_string(), "yes");
/// assert!(Allowance::from_token("maybe").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allowance {
    Yes,
    No,
    Conditional,
}

impl Allowance {
    /// Parses an allowance token as authored in rule tables.
    pub fn from_token(token: &str) -> Result<Self> {
        match token.to_lowercase().as_str() {
            "0" | "f" | "false" | "n" | "no" => Ok(Allowance::No),
            "1" | "t" | "true" | "y" | "yes" => Ok(Allowance::Yes),
            "c" | "cup" | "cond" | "conditional" => Ok(Allowance::Conditional),
            _ => Err(ZonespaceError::Schema(format!(
                "cannot parse allowable use value {token}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Allowance::Yes => "yes",
            Allowance::No => "no",
            Allowance::Conditional => "conditional",
        }
    }
}

impl fmt::Display for Allowance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a strict boolean token to a 0/1 flag.
///
/// Unlike [`Allowance`], conditional tokens are rejected.
pub fn parse_flag(token: &str) -> Result<f64> {
    match token.to_lowercase().as_str() {
        "0" | "f" | "false" | "n" | "no" => Ok(0.0),
        "1" | "t" | "true" | "y" | "yes" => Ok(1.0),
        _ => Err(ZonespaceError::Schema(format!(
            "cannot parse boolean value {token}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowance_tokens() {
        assert_eq!(Allowance::from_token("TRUE").unwrap(), Allowance::Yes);
        assert_eq!(Allowance::from_token("n").unwrap(), Allowance::No);
        assert_eq!(
            Allowance::from_token("conditional").unwrap(),
            Allowance::Conditional
        );
    }

    #[test]
    fn test_allowance_rejects_unknown_token() {
        assert!(Allowance::from_token("maybe").is_err());
    }

    #[test]
    fn test_flag_rejects_conditional() {
        assert_eq!(parse_flag("yes").unwrap(), 1.0);
        assert_eq!(parse_flag("F").unwrap(), 0.0);
        assert!(parse_flag("cup").is_err());
    }

    #[test]
    fn test_attr_value_accessors() {
        assert_eq!(AttrValue::Num(3.5).as_num(), Some(3.5));
        assert_eq!(AttrValue::from("abc").as_text(), Some("abc"));
        assert_eq!(AttrValue::Num(3.5).as_text(), None);
    }
}
