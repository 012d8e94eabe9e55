//! Identity, credential and session management.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod credential;
mod store;
mod session;
mod request_context;
mod gate;
mod provider;

pub use principal::Identity;
pub use credential::{generate as generate_credential, CredentialError, ALPHABET, CREDENTIAL_LEN};
pub use store::{CredentialSource, IdentityStore, MemoryIdentityStore, SharedIdentityStore, StoreError};
pub use session::{Claims, SessionToken, TokenError, TokenService, ISSUER, TOKEN_TTL_SECS};
pub use request_context::RequestContext;
pub use gate::{extract_bearer, require_bearer};
pub use provider::{AuthProvider, LoginRequest, LoginResponse, RegisterRequest};
