//! User management: every non-admin account for admins, a doctor's own
//! patients for doctors.

use log::{error, info};

use super::{PageError, Services};
use crate::api::ListQuery;
use crate::models::{Role, User};
use crate::utils::error_messages::{USERS_FETCH_FAILED, USER_DELETED, USER_DELETE_FAILED};

pub struct UserList {
    services: Services,
    viewer: User,
    users: Vec<User>,
    search: String,
    pending_delete: Option<String>,
}

impl UserList {
    pub async fn open(services: &Services) -> Result<Self, PageError> {
        let viewer = services.current_user()?;
        if viewer.role == Role::Patient {
            return Err(PageError::Forbidden(viewer.role));
        }
        let mut page = Self {
            services: services.clone(),
            viewer,
            users: Vec::new(),
            search: String::new(),
            pending_delete: None,
        };
        page.refresh().await;
        Ok(page)
    }

    pub async fn refresh(&mut self) {
        let fetched = match self.viewer.role {
            Role::Doctor => self.services.users.doctor_patients(&self.viewer.id).await,
            _ => self
                .services
                .users
                .list(&ListQuery::default())
                .await
                .map(|list| list.users),
        };

        match fetched {
            Ok(users) => {
                self.users = users
                    .into_iter()
                    .filter(|user| user.role != Role::Admin)
                    .collect();
            }
            Err(e) => {
                error!("Failed to load users: {e}");
                self.services.notifier.error(USERS_FETCH_FAILED);
            }
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.to_string();
    }

    /// Users whose full name contains the search text, ignoring case.
    pub fn filtered(&self) -> Vec<&User> {
        let needle = self.search.to_lowercase();
        self.users
            .iter()
            .filter(|user| user.full_name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn can_delete(&self, user: &User) -> bool {
        self.viewer.role == Role::Admin && user.role != Role::Admin
    }

    /// First step of a deletion: remembers the target until it is confirmed.
    pub fn request_delete(&mut self, user_id: &str) -> Result<&User, PageError> {
        let target = self
            .users
            .iter()
            .find(|user| user.id == user_id)
            .ok_or_else(|| PageError::NotFound(user_id.to_string()))?;
        if !self.can_delete(target) {
            return Err(PageError::Forbidden(self.viewer.role));
        }
        self.pending_delete = Some(target.id.clone());
        Ok(target)
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub async fn confirm_delete(&mut self) -> Result<(), PageError> {
        let Some(user_id) = self.pending_delete.take() else {
            return Err(PageError::NoEditor);
        };

        match self.services.users.delete(&user_id).await {
            Ok(()) => {
                info!("User {user_id} deleted");
                self.services.notifier.success(USER_DELETED);
                self.refresh().await;
                Ok(())
            }
            Err(e) => Err(self.services.report(e.into(), USER_DELETE_FAILED)),
        }
    }
}
