use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Mirror of an identity-platform user record. The messaging service only
/// ever reads these rows; the platform's profile sync owns them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub display_name: Option<String>,
    pub avatar_ref: Option<String>,
    pub membership_tier: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    Free,
    Pro,
    Founder,
}

impl MembershipTier {
    pub fn as_str(&self) -> &str {
        match self {
            MembershipTier::Free => "free",
            MembershipTier::Pro => "pro",
            MembershipTier::Founder => "founder",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(MembershipTier::Free),
            "pro" => Some(MembershipTier::Pro),
            "founder" => Some(MembershipTier::Founder),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub display_name: Option<String>,
    pub avatar_ref: Option<String>,
    pub membership_tier: String,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name,
            avatar_ref: profile.avatar_ref,
            membership_tier: profile.membership_tier,
        }
    }
}

impl ProfileResponse {
    /// Stand-in for a participant whose profile record no longer exists.
    /// Conversation history stays listable even if the other account is gone.
    pub fn placeholder(user_id: &str) -> Self {
        Self {
            id: user_id.to_string(),
            display_name: None,
            avatar_ref: None,
            membership_tier: MembershipTier::Free.as_str().to_string(),
        }
    }
}
