//! Application Default Credentials (ADC) wrapper

use gcp_auth::AuthenticationManager as GcpAuthManager;

/// OAuth scope used for both Vertex AI and Firebase Data Connect
const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Failure to obtain Google Cloud credentials or tokens
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AuthError(pub String);

/// Manages GCP authentication tokens using Application Default Credentials
///
/// This wrapper around `gcp_auth::AuthenticationManager` provides token
/// management with automatic caching and refresh for GCP services.
///
/// Supports multiple credential sources:
/// - `GOOGLE_APPLICATION_CREDENTIALS` environment variable
/// - User credentials from `gcloud auth application-default login`
/// - Metadata server (Compute Engine, Cloud Run, GKE)
pub struct AuthenticationManager {
    inner: GcpAuthManager,
}

impl AuthenticationManager {
    /// Create a new authentication manager
    ///
    /// # Errors
    /// Returns an error if no valid credentials can be found.
    pub async fn new() -> Result<Self, AuthError> {
        let inner = GcpAuthManager::new()
            .await
            .map_err(|e| AuthError(format!("Failed to initialize ADC: {}", e)))?;

        Ok(Self { inner })
    }

    /// Get an access token for the cloud platform scope
    ///
    /// The token is cached internally and refreshed when expired.
    pub async fn get_token(&self) -> Result<String, AuthError> {
        let token = self
            .inner
            .get_token(&[CLOUD_PLATFORM_SCOPE])
            .await
            .map_err(|e| AuthError(format!("Failed to get token: {}", e)))?;

        Ok(token.as_str().to_string())
    }
}
