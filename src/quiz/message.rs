use crate::constants::messages::{ERROR_MS, FADE_LEAD_MS, INFO_MS, SUCCESS_MS};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Success,
    Error,
    Info,
}

impl MessageKind {
    pub fn duration(self) -> Duration {
        let ms = match self {
            MessageKind::Success => SUCCESS_MS,
            MessageKind::Error => ERROR_MS,
            MessageKind::Info => INFO_MS,
        };
        Duration::from_millis(ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub fading: bool,
}

#[derive(Debug)]
struct Entry {
    generation: u64,
    message: Message,
}

/// One transient message with its own fade/clear timer.
///
/// Every `show` aborts the pending timer before scheduling a new one, and the
/// timer only touches the cell while its generation is still current.
#[derive(Debug, Default)]
pub struct MessageSlot {
    cell: Arc<Mutex<Option<Entry>>>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl MessageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be called from inside a tokio runtime.
    pub fn show(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.cancel_timer();
        self.generation += 1;
        let generation = self.generation;
        {
            let mut cell = self.cell.lock().unwrap_or_else(|err| err.into_inner());
            *cell = Some(Entry {
                generation,
                message: Message {
                    kind,
                    text: text.into(),
                    fading: false,
                },
            });
        }

        let total = kind.duration();
        let fade = Duration::from_millis(FADE_LEAD_MS).min(total);
        let cell = self.cell.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(total - fade).await;
            {
                let mut guard = cell.lock().unwrap_or_else(|err| err.into_inner());
                match guard.as_mut() {
                    Some(entry) if entry.generation == generation => entry.message.fading = true,
                    _ => return,
                }
            }
            tokio::time::sleep(fade).await;
            let mut guard = cell.lock().unwrap_or_else(|err| err.into_inner());
            if guard.as_ref().map(|entry| entry.generation) == Some(generation) {
                *guard = None;
            }
        }));
    }

    pub fn current(&self) -> Option<Message> {
        let cell = self.cell.lock().unwrap_or_else(|err| err.into_inner());
        cell.as_ref().map(|entry| entry.message.clone())
    }

    pub fn clear(&mut self) {
        self.cancel_timer();
        let mut cell = self.cell.lock().unwrap_or_else(|err| err.into_inner());
        *cell = None;
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for MessageSlot {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::{MessageKind, MessageSlot};
    use std::time::Duration;

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn message_fades_then_clears() {
        let mut slot = MessageSlot::new();
        slot.show(MessageKind::Success, "Austria");
        advance(1_400).await;
        assert!(!slot.current().unwrap().fading);
        advance(200).await;
        assert!(slot.current().unwrap().fading);
        advance(500).await;
        assert!(slot.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_message_outlives_older_timer() {
        let mut slot = MessageSlot::new();
        slot.show(MessageKind::Error, "no match");
        advance(2_000).await;
        slot.show(MessageKind::Info, "hint opened");
        advance(1_200).await;
        let current = slot.current().expect("newer message still shown");
        assert_eq!(current.text, "hint opened");
        assert!(!current.fading);
        advance(900).await;
        assert!(slot.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_pending_timer() {
        let mut slot = MessageSlot::new();
        slot.show(MessageKind::Info, "group complete");
        slot.clear();
        assert!(slot.current().is_none());
        slot.show(MessageKind::Success, "Malta");
        advance(1_000).await;
        assert_eq!(slot.current().unwrap().text, "Malta");
    }
}
