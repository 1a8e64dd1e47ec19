// src/pool.rs
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{ mpsc::{self, RecvTimeoutError}, atomic::{ AtomicUsize, Ordering }},
    thread,
    time::Duration,
};

use crate::{
    core::cancel::CancelToken,
    error::{Error, Result},
    progress::Progress,
};

/// Run `work` over `items` on at most `jobs` threads and return the results in item order.
///
/// Workers live for the whole call and pull the next index from a shared counter.
/// Results come back over a channel; each arrival is reported once through `progress`
/// as it lands, so the report order is completion order while the returned order is not.
/// A panic inside `work` fails that item only. Items never started because `cancel`
/// fired come back as `Error::Cancelled`.
pub fn fan_out<I, T, F>(
    items: &[I],
    jobs: usize,
    poll: Duration,
    label: impl Fn(&I) -> String,
    progress: &mut dyn Progress,
    cancel: &CancelToken,
    work: F,
) -> Vec<Result<T>>
where
    I: Sync,
    T: Send,
    F: Fn(&I) -> Result<T> + Sync,
{
    let n = items.len();
    let workers = jobs.min(n).max(1);
    progress.begin(n);
    logd!("Dispatching {n} tasks on {workers} workers");

    let mut slots: Vec<Option<Result<T>>> = (0..n).map(|_| None).collect();
    let counter = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<(usize, Result<T>)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let (counter, work) = (&counter, &work);
            scope.spawn(move || {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let i = counter.fetch_add(1, Ordering::Relaxed);
                    if i >= n {
                        break;
                    }
                    let result = panic::catch_unwind(AssertUnwindSafe(|| work(&items[i])))
                        .unwrap_or_else(|payload| Err(Error::Panicked(panic_message(payload))));
                    if tx.send((i, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx); // collector is the sole receiver now

        let mut done = 0usize;
        while done < n {
            match rx.recv_timeout(poll) {
                Ok((i, result)) => {
                    done += 1;
                    let name = label(&items[i]);
                    match &result {
                        Ok(_) => progress.item_done(&name, done, n),
                        Err(e) => {
                            loge!("{name} failed: {e}");
                            progress.item_failed(&name, &e.to_string());
                        }
                    }
                    slots[i] = Some(result);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break, // workers ended early
            }
        }
    });

    progress.finish();
    slots
        .into_iter()
        .map(|s| s.unwrap_or(Err(Error::Cancelled)))
        .collect()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        s!("unknown panic")
    }
}
