//! # Profile Resolution
//!
//! Maps a verified caller to a stored profile, creating one from the token
//! claims on first sight. Store failures never fail the request; the profile
//! derived from the claims is returned instead and the error is logged.

use crate::db::models::{Profile, Role};
use crate::db::{ProfileStore, StoreError};
use crate::identity::Claims;

/// Profile built from token claims alone.
pub fn profile_from_claims(claims: &Claims) -> Profile {
    Profile {
        sub: claims.sub.clone(),
        first_name: claims.first_name().to_string(),
        last_name: claims.last_name().to_string(),
        email: claims.email.clone(),
        role: Role::User,
    }
}

/// Return the caller's stored profile, creating it on first sight.
///
/// Never fails: when the store reports an error the claims-derived profile is
/// returned instead, so a storage outage cannot block sign-in.
pub async fn resolve_profile(store: &dyn ProfileStore, claims: &Claims) -> Profile {
    match get_or_create(store, claims).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(
                "Profile lookup failed for {}, using token claims: {}",
                claims.sub,
                e
            );
            profile_from_claims(claims)
        }
    }
}

async fn get_or_create(store: &dyn ProfileStore, claims: &Claims) -> Result<Profile, StoreError> {
    if let Some(profile) = store.get(&claims.sub).await? {
        return Ok(profile);
    }

    let profile = profile_from_claims(claims);
    store.put(&profile).await?;
    tracing::info!("Created profile for {}", profile.sub);

    Ok(profile)
}
