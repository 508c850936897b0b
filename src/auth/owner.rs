/// Decides which identity is granted the admin role automatically.
#[derive(Debug, Clone, Default)]
pub struct OwnerPolicy {
    owner_open_id: Option<String>,
}

impl OwnerPolicy {
    /// An empty identity disables the rule.
    pub fn new(owner_open_id: impl Into<String>) -> Self {
        let owner_open_id = owner_open_id.into();
        Self {
            owner_open_id: (!owner_open_id.is_empty()).then_some(owner_open_id),
        }
    }

    pub fn is_owner_identity(&self, open_id: &str) -> bool {
        self.owner_open_id.as_deref() == Some(open_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_the_configured_identity() {
        let policy = OwnerPolicy::new("captain@viyakaptan.com");
        assert!(policy.is_owner_identity("captain@viyakaptan.com"));
        assert!(!policy.is_owner_identity("crew@viyakaptan.com"));
        assert!(!policy.is_owner_identity(""));
    }

    #[test]
    fn empty_owner_matches_nobody() {
        let policy = OwnerPolicy::new("");
        assert!(!policy.is_owner_identity(""));
        assert!(!policy.is_owner_identity("anyone"));
    }
}
