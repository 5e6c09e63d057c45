// The `auth` module handles credential acquisition for the Gmail API.

use crate::http::{HttpsConnectorType, build_https_client};
use google_gmail1::{
    Gmail,
    api::Scope,
    yup_oauth2::{
        self, InstalledFlowAuthenticator, InstalledFlowReturnMethod, ServiceAccountAuthenticator,
        authenticator::Authenticator,
    },
};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// A type alias for the authenticated Gmail hub.
pub type GmailHub = Gmail<HttpsConnectorType>;

/// The `AuthError` enum defines the possible errors that can occur while
/// acquiring Gmail credentials.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The credential material on disk could not be read.
    #[error("failed to read credential material from {path}: {source}")]
    CredentialRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The authenticator could not be constructed.
    #[error("failed to build the authenticator: {0}")]
    AuthenticatorBuild(std::io::Error),

    /// No valid access token could be acquired for the requested scopes.
    #[error("failed to acquire an access token: {0}")]
    TokenAcquisition(#[from] yup_oauth2::Error),

    /// The native TLS root store could not be loaded.
    #[error("failed to load native TLS roots: {0}")]
    TlsRoots(std::io::Error),
}

/// The credential strategy for a deployment. Exactly one flow is configured
/// per deployment; both carry their file locations explicitly so nothing is
/// hardcoded to a fixed path.
#[derive(Clone, Debug)]
pub enum AuthFlow {
    /// Interactive delegated authorization. The resulting token is persisted
    /// to `token_cache` and silently refreshed on later runs; the user is
    /// re-prompted only when no cached or refreshable credential exists.
    Installed {
        credentials: PathBuf,
        token_cache: PathBuf,
    },
    /// Non-interactive authentication from a service-account key file.
    ServiceAccount { key: PathBuf },
}

/// Authenticates with the Gmail API and returns a [`GmailHub`].
///
/// A token for the requested scopes is acquired eagerly, so an authentication
/// failure surfaces here, before any mail is touched.
pub async fn gmail_session(flow: &AuthFlow, scopes: &[Scope]) -> Result<GmailHub, AuthError> {
    info!("authenticating with the Gmail API");

    let auth: Authenticator<HttpsConnectorType> = match flow {
        AuthFlow::Installed {
            credentials,
            token_cache,
        } => {
            let secret = yup_oauth2::read_application_secret(credentials)
                .await
                .map_err(|source| AuthError::CredentialRead {
                    path: credentials.clone(),
                    source,
                })?;

            InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
                .persist_tokens_to_disk(token_cache)
                .build()
                .await
                .map_err(AuthError::AuthenticatorBuild)?
        }
        AuthFlow::ServiceAccount { key } => {
            let key_material = yup_oauth2::read_service_account_key(key).await.map_err(
                |source| AuthError::CredentialRead {
                    path: key.clone(),
                    source,
                },
            )?;

            ServiceAccountAuthenticator::builder(key_material)
                .build()
                .await
                .map_err(AuthError::AuthenticatorBuild)?
        }
    };

    let _token = auth.token(scopes).await?;

    let client = build_https_client().map_err(AuthError::TlsRoots)?;
    let hub = Gmail::new(client, auth);

    info!("successfully authenticated with the Gmail API");
    Ok(hub)
}
