use crate::domains::logger::DomainLogger;
use std::sync::Arc;
use tokio::sync::mpsc;

enum Level {
    Info,
    Warn,
    Error,
}

struct LogMessage {
    level: Level,
    msg: String,
}

struct BufferedLogger {
    sender: mpsc::Sender<LogMessage>,
}

impl BufferedLogger {
    fn push(&self, level: Level, msg: &str) {
        // agent tasks must never wait on logging; drop when full
        let _ = self.sender.try_send(LogMessage {
            level,
            msg: msg.to_string(),
        });
    }
}

impl DomainLogger for BufferedLogger {
    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }
}

/// Non-blocking logger. Messages are forwarded to `bridge` from a background
/// task; `capacity` bounds the queue. Must be called inside a tokio runtime.
pub fn init_buffered_logger(bridge: Arc<dyn DomainLogger>, capacity: usize) -> Arc<dyn DomainLogger> {
    let (tx, mut rx) = mpsc::channel::<LogMessage>(capacity.max(1));

    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match message.level {
                Level::Info => bridge.info(&message.msg),
                Level::Warn => bridge.warn(&message.msg),
                Level::Error => bridge.error(&message.msg),
            }
        }
    });

    Arc::new(BufferedLogger { sender: tx })
}
