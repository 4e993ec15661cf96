//! Domain types returned by and sent to the entity API
//!
//! Every type here is an immutable value object: operations produce new
//! values instead of mutating existing ones.

pub mod auth;
pub mod bitstream;
pub mod entity;
pub mod event;
pub mod identifier;
pub mod page;

pub use auth::{AuthToken, Credentials};
pub use bitstream::{BitStreamInfo, Fixity, GenerationType};
pub use entity::{AddEntityRequest, Entity, EntityType, SecurityTag, UpdateEntityRequest};
pub use event::EventAction;
pub use identifier::{Identifier, IdentifierResponse};
pub use page::Page;
