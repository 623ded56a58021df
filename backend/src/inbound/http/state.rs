//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving
//! ports, so they can be exercised with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users_query: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
}

impl HttpState {
    /// Construct state from separate query and command ports.
    pub fn new(users_query: Arc<dyn UsersQuery>, users_command: Arc<dyn UsersCommand>) -> Self {
        Self {
            users_query,
            users_command,
        }
    }

    /// Construct state from one service implementing both ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use users_backend::domain::UserService;
    /// use users_backend::inbound::http::state::HttpState;
    /// use users_backend::outbound::memory::InMemoryUserRepository;
    ///
    /// let service = UserService::new(Arc::new(InMemoryUserRepository::new()));
    /// let state = HttpState::from_service(Arc::new(service));
    /// let _query = state.users_query.clone();
    /// ```
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: UsersQuery + UsersCommand + 'static,
    {
        Self {
            users_query: service.clone(),
            users_command: service,
        }
    }
}
