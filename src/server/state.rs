use axum::extract::FromRef;

use crate::mailer::ContractMailer;
use crate::registry_store::RegistrationStore;
use crate::scheduler::SchedulerHandle;
use crate::server_store::ServerStore;
use crate::work_queue::WorkQueueStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedRegistrationStore = Arc<dyn RegistrationStore>;
pub type GuardedServerStore = Arc<dyn ServerStore>;
pub type GuardedWorkQueueStore = Arc<dyn WorkQueueStore>;
pub type OptionalSchedulerHandle = Option<SchedulerHandle>;
pub type OptionalContractMailer = Option<Arc<ContractMailer>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub registrations: GuardedRegistrationStore,
    pub server_store: GuardedServerStore,
    pub work_queue: GuardedWorkQueueStore,
    pub scheduler_handle: OptionalSchedulerHandle,
    pub contract_mailer: OptionalContractMailer,
    pub hash: String,
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedRegistrationStore {
    fn from_ref(input: &ServerState) -> Self {
        input.registrations.clone()
    }
}

impl FromRef<ServerState> for GuardedServerStore {
    fn from_ref(input: &ServerState) -> Self {
        input.server_store.clone()
    }
}

impl FromRef<ServerState> for GuardedWorkQueueStore {
    fn from_ref(input: &ServerState) -> Self {
        input.work_queue.clone()
    }
}

impl FromRef<ServerState> for OptionalSchedulerHandle {
    fn from_ref(input: &ServerState) -> Self {
        input.scheduler_handle.clone()
    }
}

impl FromRef<ServerState> for OptionalContractMailer {
    fn from_ref(input: &ServerState) -> Self {
        input.contract_mailer.clone()
    }
}
