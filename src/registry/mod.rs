pub mod helm;
pub mod terraform;
pub mod version;

pub use helm::HelmRepository;
pub use terraform::TerraformRegistry;

use crate::error::Result;
use reqwest::blocking::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("tf-latest-version/", env!("CARGO_PKG_VERSION"));

fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}
