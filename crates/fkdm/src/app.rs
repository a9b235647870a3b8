//! Application context.
//!
//! [`App`] owns everything a command needs: configuration, the slot store,
//! the session, the report repository and the link opener. Commands receive
//! it explicitly; nothing here is global.

use std::rc::Rc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::{Config, OpenerKind};
use crate::error::{Error, Result};
use crate::form::ReportForm;
use crate::navigation::{guard, Navigation, Route};
use crate::presenter::{
    present, share_link, Dashboard, Opener, Presentation, PrintOpener, ShareTarget, SystemOpener,
};
use crate::report::Report;
use crate::repository::{ReportRepository, SlotReportRepository};
use crate::session::{ProfileUpdate, SessionStore, User};
use crate::storage::{MemoryStore, SlotStore, SqliteStore};

/// Everything a command runs against.
#[derive(Debug)]
pub struct App {
    config: Config,
    store: Rc<dyn SlotStore>,
    session: SessionStore,
    reports: SlotReportRepository,
    opener: Box<dyn Opener>,
}

impl App {
    /// Open the on-disk store named by `config` and restore the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened, or if the session
    /// is malformed and strict restore is on.
    pub fn open(config: Config) -> Result<Self> {
        let store = SqliteStore::open(config.database_path(), config.quota())?;
        let opener: Box<dyn Opener> = match config.share.opener {
            OpenerKind::System => Box::new(SystemOpener),
            OpenerKind::Print => Box::new(PrintOpener),
        };
        Self::with_store(config, Rc::new(store), opener)
    }

    /// An app over a fresh in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error only if session restore fails, which cannot happen
    /// on an empty store.
    pub fn in_memory(config: Config, opener: Box<dyn Opener>) -> Result<Self> {
        let store: Rc<dyn SlotStore> = match config.quota() {
            Some(quota) => Rc::new(MemoryStore::with_quota(quota)),
            None => Rc::new(MemoryStore::new()),
        };
        Self::with_store(config, store, opener)
    }

    /// Assemble an app over an existing store and restore the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session slot cannot be read, or is malformed
    /// while strict restore is on.
    pub fn with_store(
        config: Config,
        store: Rc<dyn SlotStore>,
        opener: Box<dyn Opener>,
    ) -> Result<Self> {
        let mut session = SessionStore::new(
            Rc::clone(&store),
            config.storage.session_slot.clone(),
            config.auth.clone(),
            config.session.strict_restore,
        );
        session.restore()?;
        let reports = SlotReportRepository::new(Rc::clone(&store), config.storage.reports_slot.clone());

        Ok(Self {
            config,
            store,
            session,
            reports,
            opener,
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The slot store.
    #[must_use]
    pub fn store(&self) -> &dyn SlotStore {
        self.store.as_ref()
    }

    /// The session.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The report repository.
    #[must_use]
    pub fn reports(&self) -> &dyn ReportRepository {
        &self.reports
    }

    /// Ask the guard for `route`.
    #[must_use]
    pub fn navigate(&self, route: Route) -> Navigation {
        let navigation = guard(route, self.session.is_authenticated());
        debug!("Navigation: {:?}", navigation);
        navigation
    }

    /// Enter a protected route and return the current user.
    ///
    /// # Errors
    ///
    /// Returns [`Denied`] carrying the redirect target when the guard turns
    /// the request away.
    pub fn enter(&self, route: Route) -> std::result::Result<&User, Denied> {
        match (self.navigate(route), self.session.current()) {
            (Navigation::Allow(_), Some(user)) => Ok(user),
            (Navigation::Redirect(to), _) => Err(Denied { redirect: to }),
            (Navigation::Allow(_), None) => Err(Denied {
                redirect: Route::Login,
            }),
        }
    }

    /// Log in.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be persisted.
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool> {
        self.session.login(username, password)
    }

    /// Log out.
    ///
    /// # Errors
    ///
    /// Returns an error if the session slot cannot be removed.
    pub fn logout(&mut self) -> Result<()> {
        self.session.logout()
    }

    /// Apply a profile edit for the current user.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be persisted.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<()> {
        self.session.update_profile(update)
    }

    /// A new report form for the current user.
    #[must_use]
    pub fn new_form(&self) -> ReportForm {
        self.session
            .current()
            .map_or_else(ReportForm::new, ReportForm::for_user)
    }

    /// Submit a filled-in form.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty required fields or the storage
    /// error if the report cannot be saved.
    pub fn submit(&self, form: &ReportForm) -> Result<Report> {
        form.submit(&self.reports)
    }

    /// Open a report's detail view.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub fn view(&self, id: &str) -> Result<Presentation> {
        present(&self.reports, id, self.session.current())
    }

    /// Gather the dashboard for the current user.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails, or if nobody is logged in.
    pub fn dashboard(&self) -> Result<Dashboard> {
        let user = self
            .session
            .current()
            .ok_or_else(|| Error::internal("dashboard requested without a session"))?;
        Dashboard::build(
            &self.reports,
            user,
            Utc::now(),
            self.config.dashboard.recent_limit,
        )
    }

    /// Build the share link for a report and hand it to the opener.
    ///
    /// Returns `None` when no report has that identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the opener cannot launch.
    pub fn share(&self, id: &str, target: ShareTarget) -> Result<Option<String>> {
        let Presentation::Found(view) = self.view(id)? else {
            return Ok(None);
        };
        let url = share_link(target, &self.config.share, &view.transcript);
        self.opener.open(&url)?;
        info!("Opened {} share link for report {}", target, id);
        Ok(Some(url))
    }
}

/// A guard refusal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denied {
    /// Where the guard sends the user instead.
    pub redirect: Route,
}

impl std::fmt::Display for Denied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.redirect {
            Route::Login => write!(f, "not logged in, redirecting to {}", self.redirect),
            _ => write!(f, "redirecting to {}", self.redirect),
        }
    }
}

impl std::error::Error for Denied {}
