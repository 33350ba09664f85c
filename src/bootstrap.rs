//! Startup sequence: validate the port, launch the service, wait for it.
//!
//! ```text
//! Uninitialized → Validating ─┬─→ FatalExit
//!                             └─→ Launching → Running → Terminated
//! ```
//!
//! Validation happens before anything is spawned. The readiness flag is created
//! by the caller (still `false`) before the bootstrap runs, and the bootstrap
//! never sets it; that belongs to the service.

use std::fmt;

use crate::launcher::{launch, ServiceEntry, ServiceExit};
use crate::port::{validate, Port, PortError};

/// Bootstrap phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Validating,
    FatalExit,
    Launching,
    Running,
    Terminated,
}

impl Phase {
    /// Whether moving from `self` to `next` is a legal step.
    pub fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Uninitialized, Phase::Validating)
                | (Phase::Validating, Phase::FatalExit)
                | (Phase::Validating, Phase::Launching)
                | (Phase::Launching, Phase::Running)
                | (Phase::Running, Phase::Terminated)
        )
    }

    /// No transition leaves a terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::FatalExit | Phase::Terminated)
    }

    fn step(&mut self, next: Phase) {
        debug_assert!(
            self.can_transition_to(next),
            "illegal bootstrap transition {} -> {}",
            self,
            next
        );
        tracing::debug!(from = %self, to = %next, "Bootstrap phase");
        *self = next;
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Validating => "validating",
            Phase::FatalExit => "fatal_exit",
            Phase::Launching => "launching",
            Phase::Running => "running",
            Phase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Drives one service from raw port text to termination.
pub struct Bootstrap<S> {
    service: S,
    phase: Phase,
}

impl<S: ServiceEntry> Bootstrap<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            phase: Phase::Uninitialized,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Validate `raw_port`, then launch the service and wait for it to end.
    ///
    /// An invalid port returns the error without launching anything; the caller
    /// decides how to exit.
    pub async fn run(mut self, raw_port: &str) -> Result<ServiceExit, PortError> {
        self.phase.step(Phase::Validating);
        let port = match validate(raw_port) {
            Ok(port) => port,
            Err(e) => {
                self.phase.step(Phase::FatalExit);
                return Err(e);
            }
        };
        Ok(self.launch_and_wait(port).await)
    }

    /// Launch with a port the caller has already validated and wait for it to end.
    pub async fn run_validated(mut self, port: Port) -> ServiceExit {
        self.phase.step(Phase::Validating);
        self.launch_and_wait(port).await
    }

    async fn launch_and_wait(mut self, port: Port) -> ServiceExit {
        tracing::debug!(%port, "Port number");

        self.phase.step(Phase::Launching);
        let handle = launch(self.service, port);

        self.phase.step(Phase::Running);
        let exit = handle.wait().await;

        self.phase.step(Phase::Terminated);
        exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::launcher::ServiceError;
    use crate::readiness::Readiness;

    /// Records each invocation and the readiness it saw on entry, then becomes ready.
    struct RecordingService {
        readiness: Readiness,
        calls: Arc<AtomicUsize>,
        ready_at_start: Arc<AtomicBool>,
        seen_port: Arc<AtomicU16>,
    }

    #[async_trait]
    impl ServiceEntry for RecordingService {
        async fn run(&self, port: Port) -> Result<(), ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_port.store(port.get(), Ordering::SeqCst);
            self.ready_at_start
                .store(self.readiness.is_ready(), Ordering::SeqCst);
            self.readiness.set_ready(true);
            Ok(())
        }
    }

    fn recording_service(
        readiness: &Readiness,
    ) -> (RecordingService, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let ready_at_start = Arc::new(AtomicBool::new(true));
        let service = RecordingService {
            readiness: readiness.clone(),
            calls: calls.clone(),
            ready_at_start: ready_at_start.clone(),
            seen_port: Arc::new(AtomicU16::new(0)),
        };
        (service, calls, ready_at_start)
    }

    #[tokio::test]
    async fn test_invalid_port_never_launches_service() {
        for raw in ["0", "70000", "abc", "", "-5"] {
            let readiness = Readiness::new();
            let (service, calls, _) = recording_service(&readiness);

            let result = Bootstrap::new(service).run(raw).await;

            assert!(result.is_err(), "input {raw:?}");
            assert_eq!(calls.load(Ordering::SeqCst), 0, "input {raw:?}");
            assert!(!readiness.is_ready());
        }
    }

    #[tokio::test]
    async fn test_invalid_port_error_names_input() {
        let readiness = Readiness::new();
        let (service, _, _) = recording_service(&readiness);
        let err = Bootstrap::new(service).run("abc").await.unwrap_err();
        assert_eq!(err.input(), "abc");
    }

    #[tokio::test]
    async fn test_readiness_is_false_when_service_starts() {
        let readiness = Readiness::new();
        let (service, calls, ready_at_start) = recording_service(&readiness);

        let exit = Bootstrap::new(service)
            .run("8888")
            .await
            .unwrap();

        assert_eq!(exit, ServiceExit::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!ready_at_start.load(Ordering::SeqCst));
        // The service flipped it; the bootstrap never resets it.
        assert!(readiness.is_ready());
    }

    #[tokio::test]
    async fn test_run_validated_passes_port_through() {
        let readiness = Readiness::new();
        let (service, calls, ready_at_start) = recording_service(&readiness);
        let seen_port = service.seen_port.clone();

        let exit = Bootstrap::new(service)
            .run_validated(validate("65535").unwrap())
            .await;

        assert_eq!(exit, ServiceExit::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(seen_port.load(Ordering::SeqCst), 65535);
        assert!(!ready_at_start.load(Ordering::SeqCst));
    }

    #[test]
    fn test_new_bootstrap_is_uninitialized() {
        let readiness = Readiness::new();
        let (service, _, _) = recording_service(&readiness);
        assert_eq!(Bootstrap::new(service).phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_phase_transitions() {
        use Phase::*;
        let all = [Uninitialized, Validating, FatalExit, Launching, Running, Terminated];
        let legal = [
            (Uninitialized, Validating),
            (Validating, FatalExit),
            (Validating, Launching),
            (Launching, Running),
            (Running, Terminated),
        ];

        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_phases() {
        assert!(Phase::FatalExit.is_terminal());
        assert!(Phase::Terminated.is_terminal());
        assert!(!Phase::Running.is_terminal());
        assert!(!Phase::Running.can_transition_to(Phase::Running));
        assert!(!Phase::Terminated.can_transition_to(Phase::Running));
    }
}
