//! listkit engine: JWT codec, HTTP page sources and the threaded list controller.
mod algorithm;
mod claims;
mod client;
mod controller;
mod engine;
mod jwt;
mod source;
mod types;

pub use algorithm::Algorithm;
pub use claims::{ClaimSet, ClaimSetBuilder, Validation};
pub use client::{
    decode_response, sign_params, ApiClient, ApiSettings, HttpMethod, JwtResponse, Params,
};
pub use controller::ListController;
pub use engine::{EngineEvent, EngineHandle};
pub use jwt::{decode, decode_and_validate, encode, JwtError};
pub use source::{FnSource, JsonPageSource, PageLayout, PageSource, SearchSource};
pub use types::{FailureKind, FetchError};
