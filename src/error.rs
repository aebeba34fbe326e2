use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that end the whole run.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    /// The HTTP client couldn't be built.
    #[display("unable to set up language model client")]
    Setup,
    #[display("language model connection check failed")]
    Connection,
    #[display("unable to read the documents folder")]
    Discovery,
}
