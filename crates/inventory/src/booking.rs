use serde::{Deserialize, Serialize};

use marketbook_core::{DomainError, DomainResult};

/// Booking form as filled in by a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub vendor_name: String,
    pub shop_name: String,
    pub phone: String,
    /// Free-text description of what will be sold.
    pub products: String,
}

/// Validated booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInfo {
    vendor_name: String,
    shop_name: String,
    phone: String,
    products: String,
}

impl BookingInfo {
    /// Minimal booking with only the vendor name (the field that becomes the tenant).
    pub fn for_vendor(vendor_name: impl Into<String>) -> DomainResult<Self> {
        BookingForm { vendor_name: vendor_name.into(), ..BookingForm::default() }.validate_minimal()
    }

    pub fn vendor_name(&self) -> &str {
        &self.vendor_name
    }

    pub fn shop_name(&self) -> &str {
        &self.shop_name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn products(&self) -> &str {
        &self.products
    }
}

impl BookingForm {
    /// Validate the full form: vendor name, shop name and phone are required,
    /// phone must contain only digits, spaces, `+` or `-` and at least 9 digits.
    pub fn validate(&self) -> DomainResult<BookingInfo> {
        let info = self.validate_minimal()?;
        if self.shop_name.trim().is_empty() {
            return Err(DomainError::validation("shop name is required"));
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(DomainError::validation("phone number is required"));
        }
        if !phone.chars().all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-')) {
            return Err(DomainError::validation("phone number contains invalid characters"));
        }
        if phone.chars().filter(char::is_ascii_digit).count() < 9 {
            return Err(DomainError::validation("phone number is too short"));
        }
        Ok(info)
    }

    fn validate_minimal(&self) -> DomainResult<BookingInfo> {
        let vendor_name = self.vendor_name.trim();
        if vendor_name.is_empty() {
            return Err(DomainError::validation("vendor name is required"));
        }
        Ok(BookingInfo {
            vendor_name: vendor_name.to_string(),
            shop_name: self.shop_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            products: self.products.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> BookingForm {
        BookingForm {
            vendor_name: "  Somchai ".to_string(),
            shop_name: "Somchai Skewers".to_string(),
            phone: "081-234-5678".to_string(),
            products: "grilled meatballs".to_string(),
        }
    }

    #[test]
    fn valid_form_trims_fields() {
        let info = filled().validate().unwrap();
        assert_eq!(info.vendor_name(), "Somchai");
        assert_eq!(info.phone(), "081-234-5678");
    }

    #[test]
    fn vendor_name_is_required() {
        let form = BookingForm { vendor_name: "   ".to_string(), ..filled() };
        assert!(matches!(form.validate(), Err(DomainError::Validation(_))));
        assert!(BookingInfo::for_vendor("").is_err());
    }

    #[test]
    fn phone_is_checked() {
        let letters = BookingForm { phone: "call me".to_string(), ..filled() };
        assert!(letters.validate().is_err());
        let short = BookingForm { phone: "1234".to_string(), ..filled() };
        assert!(short.validate().is_err());
    }

    #[test]
    fn for_vendor_skips_contact_fields() {
        let info = BookingInfo::for_vendor("Noi").unwrap();
        assert_eq!(info.vendor_name(), "Noi");
        assert_eq!(info.shop_name(), "");
    }
}
