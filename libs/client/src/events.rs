use std::sync::{Arc, RwLock};

type Hook = Box<dyn Fn() + Send + Sync>;

/// Session lifecycle notifications for the host UI.
///
/// The pipeline never navigates anywhere itself; when the session dies it
/// fires the registered hooks and the host decides what "go to login" means.
#[derive(Clone, Default)]
pub struct SessionEvents {
    subscribers: Arc<RwLock<Vec<Hook>>>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_session_expired(&self, hook: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut subscribers) = self.subscribers.write() {
            subscribers.push(Box::new(hook));
        }
    }

    pub(crate) fn notify_session_expired(&self) {
        if let Ok(subscribers) = self.subscribers.read() {
            for hook in subscribers.iter() {
                hook();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn every_subscriber_is_notified() {
        let events = SessionEvents::new();
        let fired = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let fired = Arc::clone(&fired);
            events.on_session_expired(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        events.notify_session_expired();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
