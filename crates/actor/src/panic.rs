use std::any::Any;

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&'static str>() {
		return (*s).to_owned();
	}
	if let Some(s) = payload.downcast_ref::<String>() {
		return s.clone();
	}
	String::from("<non-string panic payload>")
}

#[cfg(test)]
mod tests {
	use std::panic::catch_unwind;

	use super::panic_message;

	#[test]
	fn extracts_static_str_payload() {
		let result: std::thread::Result<()> = catch_unwind(|| panic!("boom-str"));
		let payload = result.unwrap_err();
		assert_eq!(panic_message(&*payload), "boom-str");
	}

	#[test]
	fn extracts_string_payload() {
		let result: std::thread::Result<()> = catch_unwind(|| panic!("{}", String::from("boom-string")));
		let payload = result.unwrap_err();
		assert_eq!(panic_message(&*payload), "boom-string");
	}

	#[test]
	fn opaque_payload_gets_placeholder() {
		let result: std::thread::Result<()> = catch_unwind(|| std::panic::panic_any(17u8));
		let payload = result.unwrap_err();
		assert_eq!(panic_message(&*payload), "<non-string panic payload>");
	}
}
