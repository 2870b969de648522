//! Shared navigation bar: session-aware login/logout controls and the
//! active-page marker.
//!
//! The bar has two states. Until the session check resolves it renders the
//! unauthenticated variant; a failed or unreachable check looks exactly the
//! same as "not logged in".

mod active;

pub use active::current_page;
pub(crate) use active::set_active_nav_link;

use anyhow::Result;

use crate::api::ApiClient;
use crate::api::protocol::SessionUser;
use crate::messages::Messages;
use crate::page::host::Host;
use crate::page::{Document, Element};
use crate::storage::LocalStore;

/// Element ids mounted by the navbar.
pub mod ids {
    pub const NAV_LOGIN: &str = "navLogin";
    pub const NAV_USER_INFO: &str = "navUserInfo";
    pub const NAV_USERNAME: &str = "navUsername";
    pub const NAV_ELO: &str = "navElo";
    pub const NAV_LOGOUT: &str = "navLogout";
}

pub const HOME_PAGE: &str = "index.html";
pub const AUTH_PAGE: &str = "auth.html";
pub const NAV_LINK_CLASS: &str = "nav-link";
pub const ACTIVE_CLASS: &str = "active";

/// Pages linked from the bar, in display order.
pub const NAV_PAGES: [&str; 3] = [HOME_PAGE, "play.html", "profile.html"];

/// Optional page-provided step run before the logout request, e.g. marking
/// the player offline in a running game.
pub trait PresenceHook {
    fn set_offline(&mut self) -> Result<()>;
}

impl<F> PresenceHook for F
where
    F: FnMut() -> Result<()>,
{
    fn set_offline(&mut self) -> Result<()> {
        self()
    }
}

/// The navbar's view of who is logged in. Replaced wholesale by every
/// session check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    user: Option<SessionUser>,
}

impl SessionState {
    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The user declined the confirmation; nothing happened.
    Declined,
    LoggedOut,
    /// The alert shown to the user. Session state is left as it was.
    Failed(String),
}

pub struct NavbarWidget {
    messages: Messages,
    session: SessionState,
    offline_hook: Option<Box<dyn PresenceHook>>,
}

impl NavbarWidget {
    pub fn new(messages: Messages) -> Self {
        Self {
            messages,
            session: SessionState::default(),
            offline_hook: None,
        }
    }

    pub fn with_offline_hook(mut self, hook: impl PresenceHook + 'static) -> Self {
        self.offline_hook = Some(Box::new(hook));
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Insert the bar in its unauthenticated-looking state.
    pub fn mount(&self, doc: &mut Document) {
        for page in NAV_PAGES {
            doc.insert(
                &nav_link_id(page),
                Element::link(page, self.messages.nav_page_label(page)).class(NAV_LINK_CLASS),
            );
        }
        doc.insert(
            ids::NAV_LOGIN,
            Element::link(AUTH_PAGE, self.messages.login_label()),
        );
        doc.insert(ids::NAV_USER_INFO, Element::new().hidden());
        doc.insert(ids::NAV_USERNAME, Element::new());
        doc.insert(ids::NAV_ELO, Element::new());
        doc.insert(
            ids::NAV_LOGOUT,
            Element::with_text(self.messages.logout_label()).hidden(),
        );
    }

    /// Run once when the page has loaded: resolve the session, then mark the
    /// active link.
    pub fn on_page_loaded(&mut self, doc: &mut Document, api: &ApiClient<'_>) {
        self.init_navbar(doc, api);
        set_active_nav_link(doc);
    }

    fn init_navbar(&mut self, doc: &mut Document, api: &ApiClient<'_>) {
        let user = match api.check_session() {
            Ok(result) if result.success => {
                if result.user.is_none() {
                    tracing::warn!("session check succeeded without a user");
                }
                result.user
            }
            Ok(result) => {
                tracing::debug!(error = ?result.error, "no active session");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "session check failed");
                None
            }
        };
        self.session = SessionState { user };
        self.render(doc);
    }

    fn render(&self, doc: &mut Document) {
        match &self.session.user {
            Some(user) => {
                doc.set_text(ids::NAV_USERNAME, user.username.as_str());
                doc.set_text(ids::NAV_ELO, self.messages.elo(user.elo));
                doc.set_hidden(ids::NAV_LOGIN, true);
                doc.set_hidden(ids::NAV_USER_INFO, false);
                doc.set_hidden(ids::NAV_LOGOUT, false);
            }
            None => {
                doc.set_hidden(ids::NAV_LOGIN, false);
                doc.set_hidden(ids::NAV_USER_INFO, true);
                doc.set_hidden(ids::NAV_LOGOUT, true);
            }
        }
    }

    /// The logout control's click handler.
    pub fn handle_logout(
        &mut self,
        api: &ApiClient<'_>,
        host: &mut dyn Host,
        storage: &mut LocalStore,
    ) -> LogoutOutcome {
        if !host.confirm(self.messages.confirm_logout()) {
            return LogoutOutcome::Declined;
        }

        if let Some(hook) = self.offline_hook.as_mut()
            && let Err(e) = hook.set_offline()
        {
            tracing::warn!(error = %e, "offline hook failed, logout aborted");
            return self.fail(host, self.messages.logout_connection_error().to_string());
        }

        match api.logout() {
            Ok(result) if result.success => {
                if let Err(e) = storage.clear() {
                    tracing::warn!(error = %e, "failed to clear local storage");
                }
                tracing::info!("logged out");
                host.navigate(AUTH_PAGE);
                LogoutOutcome::LoggedOut
            }
            Ok(result) => {
                let error = result
                    .error
                    .unwrap_or_else(|| self.messages.unknown_error().to_string());
                self.fail(host, self.messages.logout_failed(&error))
            }
            Err(e) => {
                tracing::warn!(error = %e, "logout request failed");
                self.fail(host, self.messages.logout_connection_error().to_string())
            }
        }
    }

    fn fail(&self, host: &mut dyn Host, message: String) -> LogoutOutcome {
        host.alert(&message);
        LogoutOutcome::Failed(message)
    }
}

/// Id of the nav link for `page`, e.g. `nav-play` for `play.html`.
pub fn nav_link_id(page: &str) -> String {
    format!("nav-{}", page.trim_end_matches(".html"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_renders_unauthenticated_bar() {
        let mut doc = Document::new("/index.html");
        NavbarWidget::new(Messages::default()).mount(&mut doc);

        assert!(!doc.is_hidden(ids::NAV_LOGIN));
        assert!(doc.is_hidden(ids::NAV_USER_INFO));
        assert!(doc.is_hidden(ids::NAV_LOGOUT));
        assert_eq!(
            doc.get(ids::NAV_LOGIN).unwrap().href.as_deref(),
            Some(AUTH_PAGE)
        );
        assert_eq!(doc.query_class(NAV_LINK_CLASS).count(), NAV_PAGES.len());
    }

    #[test]
    fn nav_link_ids_follow_page_names() {
        assert_eq!(nav_link_id("index.html"), "nav-index");
        assert_eq!(nav_link_id("profile.html"), "nav-profile");
    }

    #[test]
    fn closures_are_presence_hooks() {
        let mut calls = 0;
        let mut hook = || -> Result<()> {
            calls += 1;
            Ok(())
        };
        hook.set_offline().unwrap();
        hook.set_offline().unwrap();
        assert_eq!(calls, 2);
    }
}
