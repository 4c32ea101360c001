use serde::{Deserialize, Serialize};

/// A club registration record.
///
/// `approved` is the flag the annual cancellation sweep clears; a club with
/// a cleared flag must re-register to become active again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubRegistration {
    pub id: String,
    pub club_name: String,
    pub contact_email: String,
    pub approved: bool,
    /// Unix timestamp of record creation.
    pub created_at: i64,
    /// Unix timestamp of the last mutation.
    pub updated_at: i64,
}

/// Payload for creating a registration. New registrations start approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClubRegistration {
    pub club_name: String,
    pub contact_email: String,
}

impl NewClubRegistration {
    /// Basic field validation for the admin/import surface.
    pub fn validate(&self) -> Result<(), String> {
        if self.club_name.trim().is_empty() {
            return Err("club_name must not be empty".to_string());
        }
        if !self.contact_email.contains('@') {
            return Err(format!(
                "contact_email is not a valid address: {}",
                self.contact_email
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_accepts_reasonable_input() {
        let new = NewClubRegistration {
            club_name: "Chess Club".to_string(),
            contact_email: "chess@example.org".to_string(),
        };
        assert!(new.validate().is_ok());
    }

    #[test]
    fn validation_rejects_empty_name() {
        let new = NewClubRegistration {
            club_name: "   ".to_string(),
            contact_email: "chess@example.org".to_string(),
        };
        assert!(new.validate().is_err());
    }

    #[test]
    fn validation_rejects_bad_email() {
        let new = NewClubRegistration {
            club_name: "Chess Club".to_string(),
            contact_email: "not-an-address".to_string(),
        };
        assert!(new.validate().is_err());
    }

    #[test]
    fn registration_serialization_round_trip() {
        let registration = ClubRegistration {
            id: "reg-123".to_string(),
            club_name: "Chess Club".to_string(),
            contact_email: "chess@example.org".to_string(),
            approved: true,
            created_at: 1700000000,
            updated_at: 1700000000,
        };
        let serialized = serde_json::to_string(&registration).unwrap();
        let deserialized: ClubRegistration = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, registration);
    }
}
