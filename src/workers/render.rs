use std::io;

use anyhow::Result;
use crossbeam::channel::{Receiver, Sender};
use ratatui::{backend::CrosstermBackend, Terminal, TerminalOptions, Viewport};

use crate::{
    features::preferences::PageSize,
    logger,
    message::Message,
    panic_set_hook,
    ui::{Console, ConsoleAction},
    workers::kube::message::Kube,
};

/// 描画スレッド
/// 受け取ったメッセージでコンソールを更新し、kube への要求を送る
pub struct Render {
    tx: Sender<Message>,
    rx: Receiver<Message>,
    tx_shutdown: Sender<Result<()>>,
    page_size: PageSize,
}

impl Render {
    pub fn new(
        tx: Sender<Message>,
        rx: Receiver<Message>,
        tx_shutdown: Sender<Result<()>>,
        page_size: PageSize,
    ) -> Self {
        Self {
            tx,
            rx,
            tx_shutdown,
            page_size,
        }
    }

    pub fn start(&self) {
        logger!(info, "render start");

        let ret = self.render();

        if let Err(e) = &ret {
            logger!(error, "{}", e);
        }

        logger!(info, "render end");

        if self.tx_shutdown.send(ret).is_err() {
            logger!(error, "failed to send shutdown signal from render");
        }
    }

    pub fn set_panic_hook(&self) {
        let tx_shutdown = self.tx_shutdown.clone();

        panic_set_hook!({
            let _ = tx_shutdown.send(Err(anyhow::anyhow!("panic occurred in Render worker")));
        });
    }

    fn render(&self) -> Result<()> {
        let mut console = Console::new(self.page_size);

        let mut terminal = Terminal::with_options(
            CrosstermBackend::new(io::stdout()),
            TerminalOptions {
                viewport: Viewport::Fullscreen,
            },
        )?;

        terminal.clear()?;

        loop {
            terminal.draw(|f| console.render(f))?;

            match self.rx.recv()? {
                Message::User(ev) => match console.on_user_event(ev) {
                    ConsoleAction::Continue => {}
                    ConsoleAction::Quit => break,
                    ConsoleAction::Requests(requests) => {
                        for req in requests {
                            self.tx.send(req.into())?;
                        }
                    }
                },
                Message::Kube(Kube::Response(res)) => console.on_kube_response(res),
                Message::Kube(Kube::Request(_)) | Message::Tick => {}
            }
        }

        Ok(())
    }
}
