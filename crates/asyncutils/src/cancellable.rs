use derive_more::{Display, Error};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The wrapped work finished, but whoever asked for it no longer cares.
#[derive(Clone, Copy, Debug, Display, Error, PartialEq, Eq)]
#[display("operation cancelled")]
pub struct Cancelled;

/// Something that can be asked "should I still be doing this?".
///
/// Checks are advisory: implementations only flip a flag, and work in
/// progress notices it the next time it looks.
pub trait CancellationSignal {
    fn is_cancelled(&self) -> bool;
}

impl<S: CancellationSignal + ?Sized> CancellationSignal for &S {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

pin_project! {
    /// Runs the inner future to completion, then discards its output if the
    /// signal fired while it was in flight.
    ///
    /// The inner future is never dropped early. Calls into a host that can't
    /// be aborted still finish; only their result is thrown away.
    #[must_use = "futures do nothing unless polled"]
    pub struct Cancellable<F, S> {
        #[pin]
        inner: F,
        signal: S,
    }
}

impl<F, S> Cancellable<F, S> {
    pub fn new(inner: F, signal: S) -> Self {
        Self { inner, signal }
    }
}

impl<F: Future, S: CancellationSignal> Future for Cancellable<F, S> {
    type Output = Result<F::Output, Cancelled>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let output = match this.inner.poll(cx) {
            Poll::Ready(output) => output,
            Poll::Pending => return Poll::Pending,
        };
        match this.signal.is_cancelled() {
            true => Poll::Ready(Err(Cancelled)),
            false => Poll::Ready(Ok(output)),
        }
    }
}

pub trait CancellableExt: Future + Sized {
    /// Wrap this future in a [`Cancellable`] checked against `signal`.
    fn cancellable<S: CancellationSignal>(self, signal: S) -> Cancellable<Self, S> {
        Cancellable::new(self, signal)
    }
}

impl<F: Future> CancellableExt for F {}
