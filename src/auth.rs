//! Principal extraction and branch-level access scoping.
//!
//! Token issuance, refresh and user management live in the identity service;
//! this API only consumes bearer tokens. A validated token becomes an
//! [`AuthUser`] in request extensions, and its [`AccessScope`] is what the
//! POS services consult before touching a branch.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Owner,
    Manager,
    Staff,
}

/// JWT claims as issued by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub role: Role,
    /// Branches this principal may transact against. Admins carry an empty
    /// list; their role grants everything.
    #[serde(default)]
    pub branches: Vec<Uuid>,
    pub exp: i64,
    pub iat: i64,
}

/// The authenticated principal attached to each request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    pub branches: Vec<Uuid>,
}

impl AuthUser {
    pub fn scope(&self) -> AccessScope {
        AccessScope {
            user_id: self.id,
            role: self.role,
            branches: self.branches.clone(),
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            branches: claims.branches,
        }
    }
}

/// What the principal may reach. Services take this by reference and gate
/// every branch-scoped operation through [`AccessScope::ensure_branch`].
#[derive(Debug, Clone)]
pub struct AccessScope {
    pub user_id: Uuid,
    pub role: Role,
    pub branches: Vec<Uuid>,
}

impl AccessScope {
    pub fn can_access_branch(&self, branch_id: Uuid) -> bool {
        match self.role {
            Role::Admin => true,
            _ => self.branches.contains(&branch_id),
        }
    }

    pub fn ensure_branch(&self, branch_id: Uuid) -> Result<(), ServiceError> {
        if self.can_access_branch(branch_id) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "no access to branch {}",
                branch_id
            )))
        }
    }
}

/// Shared verifier state: the HMAC keys for the configured secret.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl_secs: i64,
}

impl AuthKeys {
    pub fn new(secret: &str, token_ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_secs,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {}", e)))
    }

    /// Mints a token for the given principal. Production issuance happens in
    /// the identity service; this exists for tooling and test harnesses that
    /// share the secret.
    pub fn mint(&self, user_id: Uuid, role: Role, branches: Vec<Uuid>) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role,
            branches,
            iat: now,
            exp: now + self.token_ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .expect("HMAC token encoding cannot fail with a valid secret")
    }
}

/// Rejects requests without a valid bearer token and stores the principal
/// in request extensions for handlers to pick up.
pub async fn auth_middleware(
    State(keys): State<Arc<AuthKeys>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let token = match token {
        Some(token) => token,
        None => {
            return ServiceError::Unauthorized("missing bearer token".to_string()).into_response()
        }
    };

    match keys.verify(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser::from(claims));
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
