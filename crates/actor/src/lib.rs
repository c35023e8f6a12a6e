//! Serialized actors with name-based rpc dispatch.
//!
//! Each [`Actor`] owns one dispatch loop that drains a bounded mailbox, a
//! control queue and a replaceable timer. Calls are routed by a
//! case-insensitive function name to typed handler closures; frames whose
//! arguments do not fit the handler's declared shape are logged and dropped
//! before the handler runs.
//!
//! ```no_run
//! use citadel_actor::{Actor, ActorConfig, CallContext};
//!
//! # async fn demo() {
//! let mut actor = Actor::configure(ActorConfig::new("account"));
//! actor.register_call("Account_Login", |ctx: &CallContext, account_id: i64| {
//! 	tracing::info!(socket = ctx.socket_id(), account_id, "login");
//! });
//! actor.start();
//! actor.send_msg("account_login", (7i64,)).await.ok();
//! # }
//! ```

mod actor;
mod config;
mod context;
mod dispatch;
mod envelope;
mod error;
mod handler;
mod id;
mod mailbox;
mod panic;
mod registry;
mod spawn;
mod stats;
mod timer;

pub use actor::{Actor, ActorRef, ActorState};
pub use citadel_rpc as rpc;
pub use config::{ActorConfig, ArgMatching, DEFAULT_MAILBOX_CAPACITY};
pub use context::CallContext;
pub use envelope::Envelope;
pub use error::{RegistryError, SendError};
pub use handler::Handler;
pub use id::ActorId;
pub use registry::{CallRegistry, HandlerDescriptor, normalize};
pub use stats::StatsSnapshot;
pub use timer::TimerCallback;
