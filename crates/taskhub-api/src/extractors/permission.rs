//! Permission-checking extractor.
//!
//! Handlers declare the codes they need in their signature:
//!
//! ```ignore
//! async fn delete_role(auth: Authorized<RolesDelete>, ...) -> ApiResult<...>
//! ```

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use taskhub_entity::user::User;

use super::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// A static set of permission codes, all of which are required.
pub trait RequiredPermissions {
    const CODES: &'static [&'static str];
}

/// An authenticated user holding every code in `P::CODES`.
#[derive(Debug, Clone)]
pub struct Authorized<P> {
    pub user: User,
    _marker: PhantomData<fn() -> P>,
}

impl<P> std::ops::Deref for Authorized<P> {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl<P> FromRequestParts<AppState> for Authorized<P>
where
    P: RequiredPermissions + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        state.access_guard.authorize(&user, P::CODES).await?;
        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}

macro_rules! permission_markers {
    ($($name:ident => [$($code:literal),+ $(,)?];)+) => {
        $(
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl RequiredPermissions for $name {
                const CODES: &'static [&'static str] = &[$($code),+];
            }
        )+
    };
}

permission_markers! {
    UsersView => ["users.view"];
    UsersCreate => ["users.create"];
    UsersUpdate => ["users.update"];
    RolesView => ["roles.view"];
    RolesCreate => ["roles.create"];
    RolesUpdate => ["roles.update"];
    RolesDelete => ["roles.delete"];
}
