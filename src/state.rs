// state.rs
use std::sync::Arc;

use crate::auth::Sessions;
use crate::petition::VotingRules;
use crate::provider::ProviderClient;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<Sessions>,
    pub providers: Arc<ProviderClient>,
    pub rules: VotingRules,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, sessions: Sessions, rules: VotingRules) -> Self {
        Self {
            store,
            sessions: Arc::new(sessions),
            providers: Arc::new(ProviderClient::new()),
            rules,
        }
    }
}
