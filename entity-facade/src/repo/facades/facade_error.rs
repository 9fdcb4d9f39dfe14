#[derive(thiserror::Error, Debug)]
pub enum FacadeError {
    #[error("module {0} does not exist")]
    InvalidType(String),
    #[error("module id is empty when trying to get {0}")]
    EmptyIdentifier(String),
    #[error("module with name {0} is not found")]
    UnknownModule(String),
    #[error("{module} module with id {id} is not found")]
    NotFound { module: String, id: String },
    #[error("cannot load relationship {relationship} for module {object_name}")]
    RelationshipLoad {
        relationship: String,
        object_name: String,
    },
    #[error("cannot create relationship {relationship} between module {source_object} and {related_object}")]
    RelationshipCreate {
        relationship: String,
        source_object: String,
        related_object: String,
    },
    #[error("cannot delete relationship {relationship} between module {source_object} and {related_object}")]
    RelationshipDelete {
        relationship: String,
        source_object: String,
        related_object: String,
    },
    #[error("repository error :: {0}")]
    RepositoryError(#[from] crate::repo::Error),
}
