//! Postal addresses for senders and recipients.

use std::ops::Deref;

use crate::error::ValidationError;

/// Country the account ships from.
pub const HOME_COUNTRY: &str = "CA";

pub const MAX_STREET_LINE: usize = 44;
pub const MAX_CITY: usize = 40;

/// Fields shared by origins and destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Without spaces, upper-cased.
    pub postal_code: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country_code: String,
}

impl Address {
    pub fn builder(postal_code: impl AsRef<str>) -> AddressBuilder {
        AddressBuilder::new(postal_code)
    }

    pub fn has_street(&self) -> bool {
        self.address1.is_some() || self.address2.is_some()
    }

    pub fn is_domestic(&self) -> bool {
        self.country_code == HOME_COUNTRY
    }
}

/// Where a parcel ships from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin(Address);

impl Deref for Origin {
    type Target = Address;

    fn deref(&self) -> &Address {
        &self.0
    }
}

/// Where a parcel ships to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    address: Address,
    /// Sent as `additional-address-info`.
    pub extra: Option<String>,
}

impl Destination {
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }
}

impl Deref for Destination {
    type Target = Address;

    fn deref(&self) -> &Address {
        &self.address
    }
}

#[derive(Debug, Clone)]
enum Street {
    Single(String),
    Lines(String, String),
}

#[derive(Debug, Clone)]
pub struct AddressBuilder {
    postal_code: String,
    name: Option<String>,
    company: Option<String>,
    phone: Option<String>,
    street: Option<Street>,
    city: Option<String>,
    province: Option<String>,
}

impl AddressBuilder {
    pub fn new(postal_code: impl AsRef<str>) -> Self {
        Self {
            postal_code: normalize_postal_code(postal_code.as_ref()),
            name: None,
            company: None,
            phone: None,
            street: None,
            city: None,
            province: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Street address on one line; split in two when longer than 44 characters.
    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(Street::Single(street.into()));
        self
    }

    /// Street address already split in two lines of up to 44 characters each.
    pub fn street_lines(mut self, line1: impl Into<String>, line2: impl Into<String>) -> Self {
        self.street = Some(Street::Lines(line1.into(), line2.into()));
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    /// Build a sender address in the home country.
    pub fn build_origin(self) -> Result<Origin, ValidationError> {
        self.build(HOME_COUNTRY.to_string()).map(Origin)
    }

    pub fn build_destination(
        self,
        country_code: impl AsRef<str>,
    ) -> Result<Destination, ValidationError> {
        let country_code = country_code.as_ref().trim().to_ascii_uppercase();
        if country_code.is_empty() {
            return Err(ValidationError::Empty("destination country code"));
        }
        Ok(Destination {
            address: self.build(country_code)?,
            extra: None,
        })
    }

    fn build(self, country_code: String) -> Result<Address, ValidationError> {
        let (address1, address2) = match self.street {
            None => (None, None),
            Some(Street::Lines(line1, line2)) => {
                check_len("address line 1", &line1, MAX_STREET_LINE)?;
                check_len("address line 2", &line2, MAX_STREET_LINE)?;
                (non_empty(line1), non_empty(line2))
            }
            Some(Street::Single(street)) => {
                let (line1, line2) = split_street(&street)?;
                (non_empty(line1), line2.and_then(non_empty))
            }
        };
        if let Some(city) = &self.city {
            check_len("city", city, MAX_CITY)?;
        }
        Ok(Address {
            postal_code: self.postal_code,
            name: self.name,
            company: self.company,
            phone: self.phone,
            address1,
            address2,
            city: self.city,
            province: self.province,
            country_code,
        })
    }
}

pub fn normalize_postal_code(postal_code: &str) -> String {
    postal_code
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Split a street address into two lines of at most 44 characters.
///
/// Addresses that already fit stay on one line. Longer ones break at the last
/// space before the 44th character.
pub fn split_street(street: &str) -> Result<(String, Option<String>), ValidationError> {
    let street = street.trim();
    let chars: Vec<char> = street.chars().collect();
    if chars.len() <= MAX_STREET_LINE {
        return Ok((street.to_string(), None));
    }
    if chars.len() > 2 * MAX_STREET_LINE {
        return Err(ValidationError::TooLong {
            field: "street address",
            max: 2 * MAX_STREET_LINE,
            actual: chars.len(),
        });
    }

    let split_at = chars[..MAX_STREET_LINE]
        .iter()
        .rposition(|c| *c == ' ')
        .ok_or_else(|| ValidationError::StreetSplit(street.to_string()))?;
    let line1: String = chars[..split_at].iter().collect();
    let line2: String = chars[split_at..].iter().collect();
    let (line1, line2) = (line1.trim().to_string(), line2.trim().to_string());
    if line2.chars().count() > MAX_STREET_LINE {
        return Err(ValidationError::StreetSplit(street.to_string()));
    }
    Ok((line1, Some(line2)))
}

pub(crate) fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postal_code_is_normalized() {
        let origin = Address::builder(" k1a 0b1 ").build_origin().unwrap();
        assert_eq!(origin.postal_code, "K1A0B1");
        assert_eq!(origin.country_code, "CA");
    }

    #[test]
    fn short_street_stays_on_one_line() {
        let origin = Address::builder("K1A0B1")
            .street("123 Main St")
            .build_origin()
            .unwrap();
        assert_eq!(origin.address1.as_deref(), Some("123 Main St"));
        assert!(origin.address2.is_none());
    }

    #[test]
    fn eighty_char_street_splits_near_forty() {
        let first = "A".repeat(39);
        let second = "B".repeat(40);
        let street = format!("{first} {second}");
        assert_eq!(street.len(), 80);
        let (line1, line2) = split_street(&street).unwrap();
        let line2 = line2.unwrap();
        assert_eq!(line1, first);
        assert_eq!(line2, second);
        assert!(line1.len() < 44 && line2.len() < 44);
    }

    #[test]
    fn ninety_char_street_fails() {
        let street = format!("{} {}", "A".repeat(44), "B".repeat(45));
        assert_eq!(street.len(), 90);
        assert!(split_street(&street).is_err());
    }

    #[test]
    fn street_without_break_fails() {
        let street = "X".repeat(60);
        assert!(matches!(
            split_street(&street),
            Err(ValidationError::StreetSplit(_))
        ));
    }

    #[test]
    fn remainder_over_limit_fails() {
        // the only usable space leaves 50 characters for the second line
        let street = format!("{} {}", "A".repeat(10), "B".repeat(50));
        assert!(matches!(
            split_street(&street),
            Err(ValidationError::StreetSplit(_))
        ));
    }

    #[test]
    fn explicit_lines_are_length_checked() {
        let err = Address::builder("K1A0B1")
            .street_lines("ok", "C".repeat(45))
            .build_origin()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLong {
                field: "address line 2",
                max: 44,
                actual: 45
            }
        );
    }

    #[test]
    fn long_city_is_rejected() {
        let err = Address::builder("K1A0B1")
            .city("Z".repeat(41))
            .build_origin()
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { field: "city", .. }));
    }

    #[test]
    fn destination_requires_country_code() {
        let err = Address::builder("90210").build_destination("  ").unwrap_err();
        assert_eq!(err, ValidationError::Empty("destination country code"));
        let dest = Address::builder("90210")
            .build_destination("us")
            .unwrap()
            .with_extra("Suite 4");
        assert_eq!(dest.country_code, "US");
        assert!(!dest.is_domestic());
        assert_eq!(dest.extra.as_deref(), Some("Suite 4"));
    }
}
