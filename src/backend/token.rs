use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

use super::ActorSource;
use crate::error::BoardError;
use crate::model::actor::{Actor, Role};

const ROLE_CLAIM_URI: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";
const NAME_ID_CLAIM_URI: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";

/// Derives the actor from a JWT access token. The signature is not checked;
/// the backend does that on every request.
pub struct TokenActor {
    token: String,
}

impl TokenActor {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

impl ActorSource for TokenActor {
    fn current_actor(&self) -> Result<Actor, BoardError> {
        let claims = decode_claims(&self.token)?;
        if let Some(exp) = claims.exp {
            if chrono::Utc::now().timestamp() >= exp {
                return Err(BoardError::Unauthenticated("access token expired".into()));
            }
        }
        claims.into_actor()
    }
}

/// Used when neither a token nor an actor is configured.
pub struct Anonymous;

impl ActorSource for Anonymous {
    fn current_actor(&self) -> Result<Actor, BoardError> {
        Err(BoardError::Unauthenticated(
            "no api.token or [actor] in config".into(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<Value>,
    nameid: Option<Value>,
    #[serde(rename = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier")]
    nameid_uri: Option<Value>,
    id: Option<Value>,
    unique_name: Option<String>,
    name: Option<String>,
    role: Option<Value>,
    #[serde(rename = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role")]
    role_uri: Option<Value>,
    exp: Option<i64>,
}

impl Claims {
    fn into_actor(self) -> Result<Actor, BoardError> {
        let id = [self.sub, self.nameid, self.nameid_uri, self.id]
            .into_iter()
            .flatten()
            .find_map(|v| scalar(&v))
            .ok_or_else(|| {
                BoardError::Unauthenticated(format!(
                    "token has no subject (sub, nameid or {NAME_ID_CLAIM_URI})"
                ))
            })?;
        let role = self
            .role
            .or(self.role_uri)
            .and_then(|v| match v {
                // Multi-role tokens carry an array; the first entry is the primary role.
                Value::Array(roles) => roles.first().and_then(scalar),
                other => scalar(&other),
            })
            .ok_or_else(|| {
                BoardError::Unauthenticated(format!("token has no role (role or {ROLE_CLAIM_URI})"))
            })?;

        Ok(Actor {
            id,
            name: self.unique_name.or(self.name),
            role: Role::from(role),
        })
    }
}

fn scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decode_claims(token: &str) -> Result<Claims, BoardError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| BoardError::Unauthenticated("access token is not a JWT".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| BoardError::Unauthenticated(format!("bad token payload: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| BoardError::Unauthenticated(format!("bad token claims: {e}")))
}
