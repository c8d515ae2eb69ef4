use crate::mutation::MutationEngine;

pub(crate) struct ApiServerState {
    pub(crate) engine: MutationEngine,
}
