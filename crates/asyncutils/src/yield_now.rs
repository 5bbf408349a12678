use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Future returned by [`yield_now`].
#[derive(Debug, Default)]
#[must_use = "futures do nothing unless polled"]
pub struct YieldNow {
    yielded: bool,
}

/// Hands control back to the executor exactly once.
///
/// The first poll wakes its own waker and returns [`Poll::Pending`], so any
/// other ready task gets a turn before this one resumes. Works on any
/// executor (unlike `tokio::task::yield_now`, which needs a Tokio context).
pub fn yield_now() -> YieldNow {
    YieldNow::default()
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn pending_exactly_once() {
        let mut fut = yield_now();
        assert!((&mut fut).now_or_never().is_none());
        assert!(fut.now_or_never().is_some());
    }

    #[tokio::test]
    async fn lets_sibling_futures_run() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = {
            let log = Rc::clone(&log);
            async move {
                log.borrow_mut().push("a1");
                yield_now().await;
                log.borrow_mut().push("a2");
            }
        };
        let second = {
            let log = Rc::clone(&log);
            async move {
                log.borrow_mut().push("b1");
            }
        };
        futures::join!(first, second);
        assert_eq!(*log.borrow(), vec!["a1", "b1", "a2"]);
    }
}
