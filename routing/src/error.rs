use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    /// No authenticator/relay-mode combination applies to this signer and
    /// space configuration. The caller must not attempt any submission.
    #[error("no supported authenticator for this connector and space configuration")]
    UnsupportedConfiguration,
}
