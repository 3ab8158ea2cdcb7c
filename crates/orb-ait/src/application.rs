//! Application entries carried in an AIT section.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{AitError, Result};

/// An application signalled for a service.
///
/// `id` and `org_id` are wider than their on-air fields (16 and 32 bits).
/// Out-of-range values are rejected by [`Application::validate`], never
/// truncated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Application {
    /// Application id (16-bit on air).
    pub id: u32,
    /// Organisation id (32-bit on air).
    #[cfg_attr(feature = "serde", serde(alias = "orgId"))]
    pub org_id: u64,
    /// Application name, carried in the name descriptor.
    pub name: String,
    /// URL base, carried in the transport protocol descriptor.
    #[cfg_attr(feature = "serde", serde(alias = "baseUrl"))]
    pub base_url: String,
    /// Initial path, carried in the simple application location descriptor.
    #[cfg_attr(feature = "serde", serde(alias = "initialPath"))]
    pub initial_path: String,
}

impl Application {
    /// Create a new application entry.
    pub fn new(
        id: u32,
        org_id: u64,
        name: impl Into<String>,
        base_url: impl Into<String>,
        initial_path: impl Into<String>,
    ) -> Self {
        Self {
            id,
            org_id,
            name: name.into(),
            base_url: base_url.into(),
            initial_path: initial_path.into(),
        }
    }

    /// Check the identifier bit widths.
    ///
    /// Text lengths are checked by the encoder, which knows the descriptor
    /// layout they end up in.
    pub fn validate(&self) -> Result<()> {
        if self.id > u32::from(u16::MAX) {
            return Err(AitError::too_wide("application_id", u64::from(self.id), 16));
        }
        if self.org_id > u64::from(u32::MAX) {
            return Err(AitError::too_wide("organisation_id", self.org_id, 32));
        }
        Ok(())
    }

    /// The initial URL an application manager would load.
    pub fn entry_url(&self) -> String {
        format!("{}{}", self.base_url, self.initial_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id_bounds() {
        let mut app = Application::new(65535, 1, "a", "http://a/", "");
        assert!(app.validate().is_ok());

        app.id = 65536;
        assert_eq!(
            app.validate(),
            Err(AitError::too_wide("application_id", 65536, 16))
        );
    }

    #[test]
    fn test_validate_org_id_bounds() {
        let mut app = Application::new(1, u64::from(u32::MAX), "a", "http://a/", "");
        assert!(app.validate().is_ok());

        app.org_id = 1 << 32;
        assert!(matches!(
            app.validate(),
            Err(AitError::EncodingConstraintViolation { field: "organisation_id", bits: 32, .. })
        ));
    }

    #[test]
    fn test_entry_url() {
        let app = Application::new(1, 2, "n", "http://host/app/", "index.html");
        assert_eq!(app.entry_url(), "http://host/app/index.html");
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_deserialize_scenario_field_names() {
        let json = r#"{"id":1,"orgId":999,"name":"Test","baseUrl":"http://x/","initialPath":"index.html"}"#;
        let app: Application = serde_json::from_str(json).unwrap();
        assert_eq!(app, Application::new(1, 999, "Test", "http://x/", "index.html"));
    }
}
