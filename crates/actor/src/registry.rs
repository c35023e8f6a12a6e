//! Case-insensitive mapping from function names to handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use citadel_rpc::{CodecError, RpcValue, Signature};

use crate::context::CallContext;
use crate::error::RegistryError;
use crate::handler::Handler;

type InvokeFn = dyn Fn(&CallContext, Vec<RpcValue>) -> Result<(), CodecError> + Send + Sync;

/// Canonical registry key for a function name.
pub fn normalize(name: &str) -> String {
	name.to_lowercase()
}

/// A registered handler with its declared shape.
pub struct HandlerDescriptor {
	name: String,
	signature: Signature,
	invoke: Box<InvokeFn>,
}

impl HandlerDescriptor {
	/// Wraps a typed handler closure.
	pub fn new<Args, H>(name: impl Into<String>, handler: H) -> Self
	where
		H: Handler<Args>,
	{
		Self {
			name: name.into(),
			signature: H::signature(),
			invoke: Box::new(move |ctx: &CallContext, args: Vec<RpcValue>| handler.call(ctx, args)),
		}
	}

	/// Name as given at registration.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn signature(&self) -> &Signature {
		&self.signature
	}

	pub(crate) fn invoke(&self, ctx: &CallContext, args: Vec<RpcValue>) -> Result<(), CodecError> {
		(self.invoke)(ctx, args)
	}
}

impl fmt::Debug for HandlerDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerDescriptor")
			.field("name", &self.name)
			.field("signature", &self.signature.to_string())
			.finish_non_exhaustive()
	}
}

/// Per-actor call table. Built before the actor starts, read-only afterwards.
#[derive(Debug, Default)]
pub struct CallRegistry {
	calls: HashMap<String, Arc<HandlerDescriptor>>,
}

impl CallRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a registry in one validation pass, failing on the first duplicate.
	pub fn build(descriptors: impl IntoIterator<Item = HandlerDescriptor>) -> Result<Self, RegistryError> {
		let mut registry = Self::new();
		for descriptor in descriptors {
			registry.insert(descriptor)?;
		}
		Ok(registry)
	}

	/// Registers a handler closure under `name`.
	pub fn register<Args, H>(&mut self, name: &str, handler: H) -> Result<(), RegistryError>
	where
		H: Handler<Args>,
	{
		self.insert(HandlerDescriptor::new(name, handler))
	}

	/// Adds a prebuilt descriptor keyed by its normalized name.
	pub fn insert(&mut self, descriptor: HandlerDescriptor) -> Result<(), RegistryError> {
		let key = normalize(descriptor.name());
		if self.calls.contains_key(&key) {
			return Err(RegistryError::Duplicate { name: key });
		}
		self.calls.insert(key, Arc::new(descriptor));
		Ok(())
	}

	/// Looks up a handler under any casing of its name.
	pub fn find(&self, name: &str) -> Option<&Arc<HandlerDescriptor>> {
		self.calls.get(&normalize(name))
	}

	/// Whether a handler is registered under any casing of `name`.
	pub fn contains(&self, name: &str) -> bool {
		self.find(name).is_some()
	}

	/// Number of registered handlers.
	pub fn len(&self) -> usize {
		self.calls.len()
	}

	/// Whether no handler is registered.
	pub fn is_empty(&self) -> bool {
		self.calls.is_empty()
	}

	/// Normalized names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<_> = self.calls.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	pub(crate) fn clear(&mut self) {
		self.calls.clear();
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn lookup_ignores_case() {
		let mut registry = CallRegistry::new();
		registry
			.register("C_A_LoginRequest", |_ctx: &CallContext, _account: String| {})
			.expect("first registration");

		assert!(registry.contains("c_a_loginrequest"));
		assert!(registry.contains("C_A_LOGINREQUEST"));
		assert!(registry.contains("c_A_lOgInReQuEsT"));
		assert!(!registry.contains("C_A_RegisterRequest"));
		assert_eq!(registry.find("C_A_LOGINREQUEST").map(|d| d.name()), Some("C_A_LoginRequest"));
	}

	#[test]
	fn duplicate_under_other_casing_is_rejected() {
		let mut registry = CallRegistry::new();
		registry.register("Account_Login", |_ctx: &CallContext| {}).expect("first");
		let err = registry
			.register("ACCOUNT_LOGIN", |_ctx: &CallContext, _id: i64| {})
			.expect_err("duplicate");
		assert_eq!(
			err,
			RegistryError::Duplicate {
				name: "account_login".into()
			}
		);
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn build_validates_whole_batch() {
		let ok = CallRegistry::build([
			HandlerDescriptor::new("W_A_CreatePlayer", |_ctx: &CallContext, _id: i64, _name: String| {}),
			HandlerDescriptor::new("W_A_DeletePlayer", |_ctx: &CallContext, _id: i64, _player: i64| {}),
		])
		.expect("distinct names");
		assert_eq!(ok.names(), vec!["w_a_createplayer", "w_a_deleteplayer"]);

		let dup = CallRegistry::build([
			HandlerDescriptor::new("ping", |_ctx: &CallContext| {}),
			HandlerDescriptor::new("Ping", |_ctx: &CallContext| {}),
		]);
		assert!(matches!(dup, Err(RegistryError::Duplicate { .. })));
	}

	#[test]
	fn descriptor_reports_signature() {
		let descriptor = HandlerDescriptor::new("W_A_CreatePlayer", |_ctx: &CallContext, _id: i64, _name: String, _sex: i32| {});
		assert_eq!(descriptor.signature().to_string(), "fn(i64, string, i32)");
	}
}
