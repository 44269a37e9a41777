//! Identity provider client. All sign-up, credential and token flows are
//! delegated to a Cognito user pool; this layer never stores passwords
//! or tokens.

use aws_config::{BehaviorVersion, Region};
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType, AuthenticationResultType};
use aws_sdk_cognitoidentityprovider::Client;
use thiserror::Error;

use crate::config::CognitoConfig;

#[derive(Debug, Error)]
pub enum IdpError {
    #[error("{0}")]
    Provider(String),

    #[error("user pool tokens were not generated")]
    MissingTokens,
}

impl IdpError {
    fn provider(err: impl std::fmt::Display) -> Self {
        IdpError::Provider(err.to_string())
    }
}

/// Token set returned by the user pool. The refresh token is only present
/// on flows that issue (or rotate) one.
#[derive(Debug, Clone)]
pub struct Tokens {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Clone)]
pub struct CognitoIdp {
    client: Client,
    user_pool_id: String,
    client_id: String,
}

impl CognitoIdp {
    pub async fn new(config: &CognitoConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        Self {
            client: Client::new(&sdk_config),
            user_pool_id: config.user_pool_id.clone(),
            client_id: config.client_id.clone(),
        }
    }

    /// Register a new user. Returns the provider-assigned subject id,
    /// which becomes the local `users.id`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        given_name: &str,
        family_name: &str,
    ) -> Result<String, IdpError> {
        let attribute = |name: &str, value: &str| {
            AttributeType::builder()
                .name(name)
                .value(value)
                .build()
                .map_err(IdpError::provider)
        };

        let output = self
            .client
            .sign_up()
            .client_id(&self.client_id)
            .username(email)
            .password(password)
            .user_attributes(attribute("given_name", given_name)?)
            .user_attributes(attribute("family_name", family_name)?)
            .user_attributes(attribute("email", email)?)
            .send()
            .await
            .map_err(|e| IdpError::provider(e.into_service_error()))?;

        Ok(output.user_sub().to_string())
    }

    pub async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), IdpError> {
        self.client
            .confirm_sign_up()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .send()
            .await
            .map_err(|e| IdpError::provider(e.into_service_error()))?;
        Ok(())
    }

    pub async fn resend_confirmation(&self, email: &str) -> Result<(), IdpError> {
        self.client
            .resend_confirmation_code()
            .client_id(&self.client_id)
            .username(email)
            .send()
            .await
            .map_err(|e| IdpError::provider(e.into_service_error()))?;
        Ok(())
    }

    /// Password-grant login. Issues access, id and refresh tokens.
    pub async fn login(&self, email: &str, password: &str) -> Result<Tokens, IdpError> {
        let output = self
            .client
            .admin_initiate_auth()
            .user_pool_id(&self.user_pool_id)
            .client_id(&self.client_id)
            .auth_flow(AuthFlowType::AdminNoSrpAuth)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password)
            .send()
            .await
            .map_err(|e| IdpError::provider(e.into_service_error()))?;

        tokens_from(output.authentication_result())
    }

    /// Refresh-token grant. The pool only returns a new refresh token
    /// when rotation is enabled on the app client.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Tokens, IdpError> {
        let output = self
            .client
            .admin_initiate_auth()
            .user_pool_id(&self.user_pool_id)
            .client_id(&self.client_id)
            .auth_flow(AuthFlowType::RefreshTokenAuth)
            .auth_parameters("REFRESH_TOKEN", refresh_token)
            .send()
            .await
            .map_err(|e| IdpError::provider(e.into_service_error()))?;

        tokens_from(output.authentication_result())
    }

    /// Invalidate every token issued to the user, on all devices.
    pub async fn global_sign_out(&self, subject_id: &str) -> Result<(), IdpError> {
        self.client
            .admin_user_global_sign_out()
            .user_pool_id(&self.user_pool_id)
            .username(subject_id)
            .send()
            .await
            .map_err(|e| IdpError::provider(e.into_service_error()))?;
        Ok(())
    }

    pub async fn delete_user(&self, subject_id: &str) -> Result<(), IdpError> {
        self.client
            .admin_delete_user()
            .user_pool_id(&self.user_pool_id)
            .username(subject_id)
            .send()
            .await
            .map_err(|e| IdpError::provider(e.into_service_error()))?;
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), IdpError> {
        self.client
            .forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .send()
            .await
            .map_err(|e| IdpError::provider(e.into_service_error()))?;
        Ok(())
    }

    pub async fn confirm_password_reset(
        &self,
        email: &str,
        code: &str,
        password: &str,
    ) -> Result<(), IdpError> {
        self.client
            .confirm_forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .password(password)
            .send()
            .await
            .map_err(|e| IdpError::provider(e.into_service_error()))?;
        Ok(())
    }
}

fn tokens_from(result: Option<&AuthenticationResultType>) -> Result<Tokens, IdpError> {
    let result = result.ok_or(IdpError::MissingTokens)?;

    let access_token = result
        .access_token()
        .ok_or(IdpError::MissingTokens)?
        .to_string();
    let id_token = result.id_token().ok_or(IdpError::MissingTokens)?.to_string();
    let refresh_token = result.refresh_token().map(str::to_string);

    Ok(Tokens {
        access_token,
        id_token,
        refresh_token,
    })
}
