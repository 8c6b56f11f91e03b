//! Bounded worker pool for chunk downloads with fail-fast cancellation.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::error::DownloadError;
use crate::planner::Chunk;
use crate::storage::OutputFile;

use super::chunk::fetch_and_place;
use super::{ChunkResult, FetchOptions};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run all chunks on `min(concurrency, chunks)` worker threads. Results are
/// processed as they arrive; the first failure cancels in-flight transfers,
/// drains the queue, and bounds the wait for stragglers by `shutdown_grace`.
pub(super) fn run_pool(
    url: &str,
    chunks: &[Chunk],
    output: &OutputFile,
    opts: &FetchOptions,
) -> Result<(), DownloadError> {
    let count = chunks.len();
    if count == 0 {
        return Ok(());
    }

    let work: Arc<Mutex<VecDeque<Chunk>>> =
        Arc::new(Mutex::new(chunks.iter().copied().collect()));
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<(Chunk, ChunkResult)>();
    let num_workers = opts.concurrency.min(count);
    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let cancel = Arc::clone(&cancel);
        let url = url.to_string();
        let output = output.clone();
        let http = opts.http.clone();
        handles.push(std::thread::spawn(move || loop {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            let chunk = match lock(&work).pop_front() {
                Some(c) => c,
                None => break,
            };
            let res = fetch_and_place(&url, chunk, &output, &http, &cancel);
            if tx.send((chunk, res)).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let mut first_error: Option<DownloadError> = None;
    let mut deadline: Option<Instant> = None;
    let mut abandoned = false;
    let mut to_receive = count;
    while to_receive > 0 {
        let next = match deadline {
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            Some(d) => rx.recv_timeout(d.saturating_duration_since(Instant::now())),
        };
        let (chunk, res) = match next {
            Ok(pair) => pair,
            Err(RecvTimeoutError::Disconnected) => {
                if first_error.is_none() {
                    first_error = Some(DownloadError::WorkerPanicked);
                }
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    in_flight = to_receive,
                    grace = ?opts.shutdown_grace,
                    "workers still busy after grace period, abandoning them"
                );
                abandoned = true;
                break;
            }
        };
        to_receive -= 1;
        let e = match res {
            Ok(()) => continue,
            Err(e) => e,
        };
        if first_error.is_some() {
            tracing::debug!(%chunk, error = %e, "chunk stopped after an earlier failure");
            continue;
        }

        tracing::warn!(%chunk, error = %e, "chunk failed, cancelling remaining chunks");
        cancel.store(true, Ordering::Relaxed);
        let drained = {
            let mut q = lock(&work);
            let n = q.len();
            q.clear();
            n
        };
        to_receive = to_receive.saturating_sub(drained);
        deadline = Some(Instant::now() + opts.shutdown_grace);
        first_error = Some(e);
    }

    // Abandoned workers are detached; they only touch their own byte ranges.
    if !abandoned {
        for h in handles {
            if h.join().is_err() && first_error.is_none() {
                first_error = Some(DownloadError::WorkerPanicked);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
