// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	ffi::{CStr, c_char},
	ptr,
};

use erbridge_abi::{ProductVTableFFI, StatusFFI};
use erbridge_type::Component;

use super::{exception, read_str, run, status};

const PRODUCT: Component = Component::Product;

static VERSION: &CStr = c"{\"PRODUCT_NAME\":\"Simulated Engine\",\"VERSION\":\"4.0.0\",\"BUILD_VERSION\":\"4.0.0.00000\",\"COMPATIBILITY_VERSION\":{\"CONFIG_VERSION\":\"11\"}}";

static LICENSE: &CStr = c"{\"customer\":\"erbridge tests\",\"licenseType\":\"EVAL (Simulated)\",\"issueDate\":\"2025-01-01\",\"expireDate\":\"2099-12-31\",\"recordLimit\":500}";

unsafe extern "C" fn init<const S: usize>(instance: *const c_char, settings: *const c_char, _verbose: i64) -> StatusFFI {
	let args = unsafe { (read_str(instance), read_str(settings)) };
	status::<S>(PRODUCT, "init", |world| {
		args.0?;
		args.1?;
		world.start(PRODUCT);
		Ok(())
	})
}

unsafe extern "C" fn destroy<const S: usize>() -> StatusFFI {
	status::<S>(PRODUCT, "destroy", |world| world.stop(PRODUCT))
}

unsafe extern "C" fn get_license<const S: usize>() -> *const c_char {
	run::<S, _>(PRODUCT, "get_license", |world| world.require(PRODUCT))
		.map(|()| LICENSE.as_ptr())
		.unwrap_or(ptr::null())
}

unsafe extern "C" fn get_version<const S: usize>() -> *const c_char {
	run::<S, _>(PRODUCT, "get_version", |world| world.require(PRODUCT))
		.map(|()| VERSION.as_ptr())
		.unwrap_or(ptr::null())
}

pub(crate) fn vtable<const S: usize>() -> ProductVTableFFI {
	ProductVTableFFI {
		exception: exception::vtable::<S, { exception::PRODUCT }>(),
		init: init::<S>,
		destroy: destroy::<S>,
		get_license: get_license::<S>,
		get_version: get_version::<S>,
	}
}
