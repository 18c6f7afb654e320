// External collaborator interfaces
// The playground consumes these; their implementations belong to the host
// environment (audio engine, auth/storage backend, browser shell)

pub mod auth;
pub mod bus;
pub mod instruments;
pub mod storage;
pub mod templates;
