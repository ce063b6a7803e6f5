use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayoutError {
    #[error("no such file")]
    NoSuchFile(std::io::Error, String),

    #[error("no such device")]
    NoSuchDevice(String),

    #[error("bad layout description")]
    BadLayout(String),

    #[error("file error")]
    FileError(std::io::Error, String),

    #[error("bad cli arguments")]
    BadArgs(String),

    #[error("resize policy violation")]
    PolicyViolation(String),

    #[error("not implemented")]
    NotImplemented(String),

    #[error("relayout-rs bug")]
    RelayoutBug(String),
}
