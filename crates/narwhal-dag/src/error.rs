pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("cannot build a dag from empty input")]
    EmptyInput,

    #[error("found a duplicate id: {id}")]
    DuplicateId { id: String },

    #[error("node id {id:?} contains the reserved separator character")]
    ReservedSeparator { id: String },

    #[error("node {id} references missing parent {parent}")]
    MissingParent { id: String, parent: String },

    #[error("node index {index} does not belong to this dag")]
    UnknownNode { index: usize },

    #[error("node {id} contains a self loop")]
    SelfLoop { id: String },

    #[error("graph contained a cycle: {path}")]
    Cycle { path: String },

    #[error("node {id} was declared as a root but is a child of another node")]
    RootIsChild { id: String },
}
