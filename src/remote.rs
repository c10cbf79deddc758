use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use crate::api::ApiError;

/// Lifecycle of one remotely fetched value.
#[derive(Debug, Clone)]
pub enum RemoteState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(ApiError),
}

/// State holder for a backend call made off the UI thread.
///
/// Every `start` bumps an attempt counter and tags the worker's result with
/// it; `poll` drops any result whose tag is no longer current, so when two
/// dependent fetches race the later request always wins. Results that arrive
/// while the owning screen is not being drawn simply wait in the channel.
#[derive(Debug)]
pub struct Remote<T> {
    state: RemoteState<T>,
    attempt: u64,
    tx: Sender<(u64, Result<T, ApiError>)>,
    rx: Receiver<(u64, Result<T, ApiError>)>,
}

impl<T: Send + 'static> Remote<T> {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Remote {
            state: RemoteState::Idle,
            attempt: 0,
            tx,
            rx,
        }
    }

    /// Runs `job` on a worker thread. Supersedes any still-running call.
    pub fn start<F>(&mut self, job: F)
    where
        F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    {
        self.attempt += 1;
        self.state = RemoteState::Loading;
        let attempt = self.attempt;
        let tx = self.tx.clone();
        thread::spawn(move || {
            // The receiver may be gone if the whole screen was torn down.
            let _ = tx.send((attempt, job()));
        });
    }

    /// Drains finished work into `state`. Call once per frame.
    pub fn poll(&mut self) {
        while let Ok((attempt, result)) = self.rx.try_recv() {
            if attempt != self.attempt {
                tracing::debug!("discarding stale response (attempt {} of {})", attempt, self.attempt);
                continue;
            }
            self.state = match result {
                Ok(value) => RemoteState::Ready(value),
                Err(error) => RemoteState::Failed(error),
            };
        }
    }

    pub fn state(&self) -> &RemoteState<T> {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RemoteState::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            RemoteState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match &self.state {
            RemoteState::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Takes a finished value, leaving the state idle. For one-shot
    /// operations (login, submits) that must react exactly once.
    pub fn take_ready(&mut self) -> Option<T> {
        if matches!(self.state, RemoteState::Ready(_)) {
            match std::mem::replace(&mut self.state, RemoteState::Idle) {
                RemoteState::Ready(value) => Some(value),
                _ => unreachable!(),
            }
        } else {
            None
        }
    }

    /// Takes a failure, leaving the state idle, so an error toast fires once.
    pub fn take_failed(&mut self) -> Option<ApiError> {
        if matches!(self.state, RemoteState::Failed(_)) {
            match std::mem::replace(&mut self.state, RemoteState::Idle) {
                RemoteState::Failed(error) => Some(error),
                _ => unreachable!(),
            }
        } else {
            None
        }
    }

    /// Forgets everything, including any in-flight call's right to land.
    pub fn reset(&mut self) {
        self.attempt += 1;
        self.state = RemoteState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_job_becomes_ready() {
        let mut remote: Remote<i32> = Remote::new();
        remote.start(|| Ok(42));
        assert!(remote.is_loading());
        // The worker thread is real; wait for its message.
        let message = remote.rx.recv().unwrap();
        assert_eq!(message, (1, Ok(42)));
        remote.tx.send(message).unwrap();
        remote.poll();
        assert_eq!(remote.value(), Some(&42));
    }

    #[test]
    fn stale_response_never_overwrites_a_later_request() {
        let mut remote: Remote<&'static str> = Remote::new();
        // Two dependent fetches raced: attempt 1 ("customer A") resolves
        // after attempt 2 ("customer B") started.
        remote.attempt = 2;
        remote.state = RemoteState::Loading;
        remote.tx.send((2, Ok("projects of B"))).unwrap();
        remote.tx.send((1, Ok("projects of A"))).unwrap();
        remote.poll();
        assert_eq!(remote.value(), Some(&"projects of B"));
    }

    #[test]
    fn failure_is_taken_once() {
        let mut remote: Remote<()> = Remote::new();
        remote.attempt = 1;
        remote.state = RemoteState::Loading;
        remote
            .tx
            .send((1, Err(ApiError::Network("connection refused".to_string()))))
            .unwrap();
        remote.poll();
        let error = remote.take_failed().unwrap();
        assert_eq!(error, ApiError::Network("connection refused".to_string()));
        assert!(remote.take_failed().is_none());
        assert!(matches!(remote.state(), RemoteState::Idle));
    }

    #[test]
    fn reset_invalidates_in_flight_work() {
        let mut remote: Remote<i32> = Remote::new();
        remote.attempt = 1;
        remote.state = RemoteState::Loading;
        remote.reset();
        remote.tx.send((1, Ok(7))).unwrap();
        remote.poll();
        assert!(matches!(remote.state(), RemoteState::Idle));
    }
}
