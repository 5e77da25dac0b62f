// gocoax-api: transport and wire decoding for goCoax MoCA adapters
//
// Two layers, both stateless: `client` fetches raw endpoint bodies over
// Basic-authenticated HTTP, `wire` turns a body into tagged raw fields.
// Typed normalization lives in `gocoax-core`.

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod transport;
pub mod wire;

pub use auth::BasicCredentials;
pub use client::{Fetch, HttpTransport};
pub use endpoint::{Encoding, Endpoint};
pub use error::{DecodeError, Error, TransportError};
pub use transport::{TlsMode, TransportConfig, base_url_for_host};
pub use wire::{DecodedPayload, FieldTag, LayoutMatch, RawField, RawValue, Tag, decode};
