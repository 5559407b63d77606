use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Body of the root endpoint.
#[derive(Serialize, Debug)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
}
