mod config;
mod controller;
pub mod message;

pub use config::KubeWorkerConfig;
pub use controller::*;

use anyhow::Result;
use crossbeam::channel::{Receiver, Sender};
use tokio::runtime::Runtime;

use crate::{logger, message::Message, panic_set_hook};

#[derive(Debug, Clone)]
pub struct KubeWorker {
    tx: Sender<Message>,
    rx: Receiver<Message>,
    tx_shutdown: Sender<Result<()>>,
    config: KubeWorkerConfig,
}

impl KubeWorker {
    pub fn new(
        tx: Sender<Message>,
        rx: Receiver<Message>,
        tx_shutdown: Sender<Result<()>>,
        config: KubeWorkerConfig,
    ) -> Self {
        KubeWorker {
            tx,
            rx,
            tx_shutdown,
            config,
        }
    }

    pub fn start(self) {
        logger!(info, "KubeWorker start");

        let ret = Runtime::new()
            .map_err(Into::into)
            .and_then(|rt| rt.block_on(KubeController::new(self.tx, self.rx, self.config).run()));

        if let Err(e) = &ret {
            logger!(error, "{}", e);
        }

        logger!(info, "KubeWorker end");

        if self.tx_shutdown.send(ret).is_err() {
            logger!(error, "failed to send shutdown signal from KubeWorker");
        }
    }

    pub fn set_panic_hook(&self) {
        let tx_shutdown = self.tx_shutdown.clone();

        panic_set_hook!({
            let _ = tx_shutdown.send(Err(anyhow::anyhow!("panic occurred in KubeWorker worker")));
        });
    }
}
