//! User profile model for risk assessment

use serde::{Deserialize, Serialize};

/// Attributes of the person the risk assessment is made for
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Age in years
    pub age: i32,
    /// Whether the person is pregnant
    pub is_pregnant: bool,
    /// Free-form nationality, matched case-insensitively
    pub nationality: String,
}

impl UserProfile {
    #[must_use]
    pub fn new<S: Into<String>>(age: i32, is_pregnant: bool, nationality: S) -> Self {
        Self {
            age,
            is_pregnant,
            nationality: nationality.into(),
        }
    }

    /// Children, seniors and pregnant people count as vulnerable
    #[must_use]
    pub fn is_vulnerable(&self) -> bool {
        self.age <= 12 || self.age >= 60 || self.is_pregnant
    }
}
