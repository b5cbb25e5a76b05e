use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Sender;
use ratatui::crossterm::event::{poll, read, Event as CEvent, KeyEvent, KeyEventKind};

use crate::{
    logger,
    message::{Message, UserEvent},
    panic_set_hook,
};

/// ユーザー入力を受け付けるワーカースレッド
/// キー入力はチャネルを介して描画スレッドに送られる
pub struct UserInput {
    tx: Sender<Message>,
    tx_shutdown: Sender<Result<()>>,
}

impl UserInput {
    pub fn new(tx: Sender<Message>, tx_shutdown: Sender<Result<()>>) -> Self {
        Self { tx, tx_shutdown }
    }

    pub fn start(&self) {
        logger!(info, "user_input start");

        let ret = self.poll();

        if let Err(e) = &ret {
            logger!(error, "{}", e);
        }

        logger!(info, "user_input end");

        if self.tx_shutdown.send(ret).is_err() {
            logger!(error, "failed to send shutdown signal from user_input");
        }
    }

    pub fn set_panic_hook(&self) {
        let tx_shutdown = self.tx_shutdown.clone();

        panic_set_hook!({
            let _ = tx_shutdown.send(Err(anyhow::anyhow!("panic occurred in UserInput worker")));
        });
    }

    fn poll(&self) -> Result<()> {
        loop {
            if let Ok(true) = poll(Duration::from_secs(1)) {
                let ev = read()?;

                logger!(debug, "{:?}", ev);

                match ev {
                    CEvent::Key(
                        ev @ KeyEvent {
                            kind: KeyEventKind::Press | KeyEventKind::Repeat,
                            ..
                        },
                    ) => self.tx.send(UserEvent::Key(ev).into())?,
                    CEvent::Resize(..) => self.tx.send(UserEvent::Resize.into())?,
                    _ => {}
                }
            }
        }
    }
}
