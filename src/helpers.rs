use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::sleep;
use std::time::{Duration, Instant};

const FLAG_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Sleep for `total`, waking early when the shutdown flag flips.
///
/// The flag is re-checked every 100ms so a signal never waits out a full
/// polling pause.
///
/// # Arguments
/// * `total` - How long to sleep when nothing interrupts
/// * `shutdown` - Flag raised by the signal handlers
///
/// # Returns
/// * `true` - The full duration elapsed
/// * `false` - The flag cut the sleep short
pub fn sleep_unless_shutdown(total: Duration, shutdown: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        sleep((deadline - now).min(FLAG_POLL_INTERVAL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_completes_when_flag_stays_clear() {
        let flag = AtomicBool::new(false);
        assert!(sleep_unless_shutdown(Duration::from_millis(10), &flag));
    }

    #[test]
    fn test_zero_duration_returns_immediately() {
        let flag = AtomicBool::new(false);
        assert!(sleep_unless_shutdown(Duration::ZERO, &flag));
    }

    #[test]
    fn test_returns_early_when_flag_already_set() {
        let flag = AtomicBool::new(true);
        let started = Instant::now();
        assert!(!sleep_unless_shutdown(Duration::from_secs(30), &flag));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_wakes_when_flag_flips_mid_sleep() {
        let flag = Arc::new(AtomicBool::new(false));
        let setter = {
            let flag = flag.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                flag.store(true, Ordering::Relaxed);
            })
        };

        let started = Instant::now();
        assert!(!sleep_unless_shutdown(Duration::from_secs(30), &flag));
        assert!(started.elapsed() < Duration::from_secs(5));
        setter.join().unwrap();
    }
}
