use crate::state::app_settings::AppSettings;

/// Roles allowed to change the schedule.
const SCHEDULE_EDITOR_ROLES: [&str; 3] = ["Administrator", "AccountAdmin", "LeagueAdmin"];

/// Who is using the app. Created once at startup, torn down by logout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    account_id: String,
    token: Option<String>,
    roles: Vec<String>,
}

impl Session {
    pub fn new(account_id: impl Into<String>, token: Option<String>, roles: Vec<String>) -> Self {
        Self {
            account_id: account_id.into(),
            token: token.filter(|t| !t.trim().is_empty()),
            roles,
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.account_id.clone(), settings.token.clone(), settings.roles.clone())
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    /// Token present and, when roles are known, one of them edits schedules.
    /// With no role list the backend has the final word.
    pub fn can_edit_schedule(&self) -> bool {
        self.is_authenticated()
            && (self.roles.is_empty() || SCHEDULE_EDITOR_ROLES.iter().any(|r| self.has_role(r)))
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.roles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_anonymous() {
        let session = Session::new("1", Some("  ".into()), vec![]);
        assert!(!session.is_authenticated());
        assert!(!session.can_edit_schedule());
    }

    #[test]
    fn editing_requires_editor_role_when_roles_known() {
        let viewer = Session::new("1", Some("tok".into()), vec!["TeamAdmin".into()]);
        assert!(!viewer.can_edit_schedule());

        let admin = Session::new("1", Some("tok".into()), vec!["accountadmin".into()]);
        assert!(admin.can_edit_schedule());

        let unknown = Session::new("1", Some("tok".into()), vec![]);
        assert!(unknown.can_edit_schedule());
    }

    #[test]
    fn logout_drops_credentials() {
        let mut session = Session::new("1", Some("tok".into()), vec!["AccountAdmin".into()]);
        session.logout();
        assert_eq!(session.token(), None);
        assert!(!session.has_role("AccountAdmin"));
        assert_eq!(session.account_id(), "1");
    }
}
