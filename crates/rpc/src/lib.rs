//! RPC encoding contract for citadel actors.
//!
//! Actors never look at bytes directly. They rely on three operations:
//! * head decode: function name and routing metadata, used for admission
//! * body decode: the full argument list, used at dispatch time
//! * encode: building frames for locally originated calls
//!
//! [`PostcardCodec`] is the default wire format. Argument values are carried
//! as [`RpcValue`]s and converted to handler parameter types via [`RpcParam`].

pub mod codec;
pub mod error;
pub mod head;
pub mod param;
pub mod value;

pub use codec::{PostcardCodec, RpcCodec};
pub use error::{CodecError, Result};
pub use head::{PacketHead, RpcHead, RpcPacket};
pub use param::{Msg, RpcArgs, RpcParam};
pub use value::{KindFamily, Param, RpcValue, Signature, ValueKind};
