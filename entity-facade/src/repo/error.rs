#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown module `{0}`")]
    UnknownModule(String),
    #[error("{module} record with id {id} does not exist")]
    RecordNotFound { module: String, id: String },
    #[error("link `{link}` already defined on module `{module}`")]
    DuplicateLink { module: String, link: String },
}
