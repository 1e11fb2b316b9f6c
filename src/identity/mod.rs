//! Session and authorization for the console.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod claims;
mod store;
mod session;
mod authorizer;

pub use principal::{Identity, RoleClaim};
pub use claims::{decode_identity, decode_payload, encode_unsigned, ClaimError};
pub use store::{DetachedTokenStore, FileTokenStore, MemoryTokenStore, TokenStore};
pub use session::{LoginOutcome, LoginRequest, Navigation, SessionManager, TokenPair};
pub use authorizer::{has_permission, has_role, permissions, SUPER_ADMIN};
