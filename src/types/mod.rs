//! Domain types shared by the store and the HTTP layer

pub mod ack;
pub mod toy;

pub use ack::{DeleteAck, InsertAck, UpdateAck};
pub use toy::{Toy, ToyFields, ToyId};
