//! Panic-site stack capture.
//!
//! By the time `catch_unwind` hands back a panic payload the stack has
//! already unwound, so a backtrace taken at that point only shows the
//! recovery site. A process-wide panic hook records the backtrace on the
//! panicking thread instead, but only while that thread is polling an
//! intercepted future ("armed"). Panics elsewhere in the process are left to
//! the previously installed hook alone.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::fmt::{self, Write};
use std::future::Future;
use std::pin::Pin;
use std::sync::Once;
use std::task::{Context, Poll};

/// Upper bound, in bytes, of a captured stack trace.
pub const STACK_CAPTURE_LIMIT: usize = 4096;

thread_local! {
    static ARMED: Cell<usize> = const { Cell::new(0) };
    static CAPTURED: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Installs the capturing panic hook, chained in front of the current one.
/// Subsequent calls are no-ops.
pub fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if ARMED.with(|armed| armed.get() > 0) {
                let trace = bounded_trace(&Backtrace::force_capture());
                CAPTURED.with(|slot| *slot.borrow_mut() = Some(trace));
            }
            previous(info);
        }));
    });
}

/// Takes the trace recorded by the most recent armed panic on this thread.
pub fn take_captured() -> Option<String> {
    CAPTURED.with(|slot| slot.borrow_mut().take())
}

/// Renders `trace` through a [`StackBuffer`] of [`STACK_CAPTURE_LIMIT`] bytes.
pub fn bounded_trace(trace: &impl fmt::Display) -> String {
    let mut buf = StackBuffer::new(STACK_CAPTURE_LIMIT);
    // StackBuffer never reports an error.
    let _ = write!(buf, "{trace}");
    buf.into_string()
}

/// Renders a panic payload as text.
///
/// Strings, errors and primitive values are rendered through `Display`;
/// any other payload type cannot be inspected and renders as `Box<dyn Any>`.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    macro_rules! display {
        ($($ty:ty),*) => {
            $(
                if let Some(v) = payload.downcast_ref::<$ty>() {
                    return v.to_string();
                }
            )*
        };
    }

    if let Some(s) = payload.downcast_ref::<&'static str>() {
        return (*s).to_string();
    }
    if let Some(e) = payload.downcast_ref::<Box<dyn Error + Send + Sync>>() {
        return e.to_string();
    }
    display!(
        String, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
        bool, char
    );
    "Box<dyn Any>".to_string()
}

/// A string builder with a fixed byte capacity.
///
/// Writes past the capacity are silently dropped; a write that straddles
/// the limit is cut at the last char boundary that fits.
#[derive(Debug)]
pub struct StackBuffer {
    buf: String,
    cap: usize,
}

impl StackBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            buf: String::with_capacity(cap),
            cap,
        }
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl fmt::Write for StackBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let remaining = self.cap - self.buf.len();
        if s.len() <= remaining {
            self.buf.push_str(s);
        } else {
            let mut end = remaining;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            self.buf.push_str(&s[..end]);
        }
        Ok(())
    }
}

/// Arms the panic hook for the duration of every poll of the inner future.
pub(crate) struct Armed<F> {
    inner: Pin<Box<F>>,
}

impl<F: Future> Armed<F> {
    pub(crate) fn new(inner: F) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }
}

impl<F: Future> Future for Armed<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let _guard = ArmGuard::arm();
        self.inner.as_mut().poll(cx)
    }
}

struct ArmGuard;

impl ArmGuard {
    fn arm() -> Self {
        ARMED.with(|armed| armed.set(armed.get() + 1));
        ArmGuard
    }
}

impl Drop for ArmGuard {
    // Runs during unwinding too, so the flag never leaks past a panic.
    fn drop(&mut self) {
        ARMED.with(|armed| armed.set(armed.get() - 1));
    }
}
