// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{cell::RefCell, collections::HashMap, ffi::c_char, ptr};

use erbridge_abi::ExceptionVTableFFI;
use erbridge_type::Component;

use super::{Failure, slot};

thread_local! {
	static LAST_EXCEPTION: RefCell<HashMap<(usize, Component), Failure>> = RefCell::new(HashMap::new());
}

pub(crate) const ENGINE: u8 = 0;
pub(crate) const CONFIGMGR: u8 = 1;
pub(crate) const CONFIG: u8 = 2;
pub(crate) const PRODUCT: u8 = 3;
pub(crate) const DIAGNOSTIC: u8 = 4;

const fn component(tag: u8) -> Component {
	match tag {
		ENGINE => Component::Engine,
		CONFIGMGR => Component::ConfigMgr,
		CONFIG => Component::Config,
		PRODUCT => Component::Product,
		_ => Component::Diagnostic,
	}
}

pub(crate) fn set<const S: usize>(component: Component, failure: Failure) {
	LAST_EXCEPTION.with(|last| {
		last.borrow_mut().insert((S, component), failure);
	});
}

pub(crate) fn pending<const S: usize>(component: Component) -> bool {
	LAST_EXCEPTION.with(|last| last.borrow().contains_key(&(S, component)))
}

pub(crate) fn forget<const S: usize>() {
	LAST_EXCEPTION.with(|last| last.borrow_mut().retain(|(slot, _), _| *slot != S));
}

unsafe extern "C" fn get_last_exception<const S: usize, const C: u8>(buffer: *mut c_char, size: usize) -> i64 {
	LAST_EXCEPTION.with(|last| {
		let last = last.borrow();
		let failure = last.get(&(S, component(C)));
		if failure.is_some_and(|f| f.poisoned) || buffer.is_null() || size == 0 {
			return -1;
		}
		let message = failure.map(|f| f.message.as_bytes()).unwrap_or_default();
		let n = message.len().min(size - 1);
		unsafe {
			ptr::copy_nonoverlapping(message.as_ptr(), buffer.cast::<u8>(), n);
			*buffer.add(n) = 0;
		}
		n as i64
	})
}

unsafe extern "C" fn get_last_exception_code<const S: usize, const C: u8>() -> i64 {
	LAST_EXCEPTION.with(|last| last.borrow().get(&(S, component(C))).map(|f| f.code).unwrap_or(0))
}

unsafe extern "C" fn clear_last_exception<const S: usize, const C: u8>() {
	LAST_EXCEPTION.with(|last| {
		last.borrow_mut().remove(&(S, component(C)));
	});
	slot::<S>().record_clear(component(C));
}

pub(crate) fn vtable<const S: usize, const C: u8>() -> ExceptionVTableFFI {
	ExceptionVTableFFI {
		get_last_exception: get_last_exception::<S, C>,
		get_last_exception_code: get_last_exception_code::<S, C>,
		clear_last_exception: clear_last_exception::<S, C>,
	}
}
