// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Attribution of HTTP requests.
//!
//! Authentication is handled in front of this server. The caller's
//! identity arrives in the `x-actor-id` header and is recorded verbatim
//! on every activity entry the request produces.

use axum::{extract::FromRequestParts, http::request::Parts};
use promo_ops_audit::{Actor, Cause};
use std::convert::Infallible;
use tracing::debug;

/// Header carrying the caller's identity.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Actor recorded when the header is missing or unreadable.
const ANONYMOUS: &str = "anonymous";

/// The actor and cause of the current request.
///
/// ```ignore
/// async fn my_handler(RequestActor(actor, cause): RequestActor) { ... }
/// ```
pub struct RequestActor(pub Actor, pub Cause);

impl<S> FromRequestParts<S> for RequestActor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id: &str = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(ANONYMOUS);

        if actor_id == ANONYMOUS {
            debug!(path = %parts.uri.path(), "Request carries no actor id");
        }

        let cause: Cause = Cause::new(
            String::from("http"),
            format!("{} {}", parts.method, parts.uri.path()),
        );
        Ok(Self(Actor::user(actor_id), cause))
    }
}
