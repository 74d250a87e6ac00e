//! hf-project: declarative project files describing hydraulic networks.

pub mod convert;
pub mod schema;
pub mod validate;

pub use convert::build_network;
pub use schema::*;
pub use validate::{ValidationError, validate_network, validate_project};

/// Newest project file version this crate understands.
pub const LATEST_VERSION: u32 = 1;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(#[from] hf_network::NetworkError),

    #[error("Unknown network: {id}")]
    UnknownNetwork { id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub fn from_yaml_str(content: &str) -> ProjectResult<Project> {
    let project: Project = serde_yaml::from_str(content)?;
    validate_project(&project)?;
    Ok(project)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

pub fn save_yaml(path: &std::path::Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_yaml::to_string(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Build the network `id` of `project`.
pub fn load_network(project: &Project, id: &str) -> ProjectResult<hf_network::Network> {
    let def = project
        .network(id)
        .ok_or_else(|| ProjectError::UnknownNetwork { id: id.to_string() })?;
    build_network(def)
}
