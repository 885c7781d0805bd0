use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::application::ServiceError;
use crate::domain::ActorId;
use crate::infrastructure::AppState;

/// Actor proven by a bearer JWT signed with the server secret.
#[derive(Debug, Clone)]
pub struct AuthenticatedActor {
    pub id: ActorId,
    pub name: String,
}

#[derive(Debug, serde::Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    name: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedActor {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        extract(parts, &state.jwt_secret)
    }
}

fn extract(parts: &Parts, secret: &str) -> Result<AuthenticatedActor, ServiceError> {
    if secret.is_empty() {
        return Err(ServiceError::Unauthorized("score updates are disabled".into()));
    }

    let token = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("Missing or invalid Authorization header".into()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ServiceError::Unauthorized("Invalid token".into()))?;

    let claims = token_data.claims;
    let id = ActorId::parse(&claims.sub)
        .map_err(|_| ServiceError::Unauthorized("Invalid actor id in token".into()))?;

    Ok(AuthenticatedActor {
        id,
        name: claims.name.unwrap_or_default(),
    })
}

#[cfg(test)]
pub(crate) mod test_tokens {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: String,
        name: &'a str,
        exp: usize,
    }

    pub fn issue(secret: &str, sub: &str, name: &str) -> String {
        let exp = (chrono::Utc::now().timestamp() + 3600) as usize;
        encode(
            &Header::default(),
            &TestClaims {
                sub: sub.to_string(),
                name,
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(header: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/api/score");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_valid_token_yields_actor() {
        let actor = ActorId::new();
        let token = test_tokens::issue("s3cret", &actor.to_string(), "Ada");

        let authenticated = extract(&parts_with(Some(format!("Bearer {token}"))), "s3cret").unwrap();
        assert_eq!(authenticated.id, actor);
        assert_eq!(authenticated.name, "Ada");
    }

    #[test]
    fn test_rejects_missing_and_foreign_tokens() {
        assert!(matches!(
            extract(&parts_with(None), "s3cret"),
            Err(ServiceError::Unauthorized(_))
        ));

        let forged = test_tokens::issue("other", &ActorId::new().to_string(), "Eve");
        assert!(matches!(
            extract(&parts_with(Some(format!("Bearer {forged}"))), "s3cret"),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_empty_secret_disables_scoring() {
        let token = test_tokens::issue("", &ActorId::new().to_string(), "Ada");
        assert!(extract(&parts_with(Some(format!("Bearer {token}"))), "").is_err());
    }
}
