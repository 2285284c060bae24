pub mod jwt_auth;

pub use jwt_auth::{
    MaybeUser, jwt_auth_middleware, optional_jwt_auth_middleware, staff_auth_middleware,
};
